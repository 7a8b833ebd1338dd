//! The network/API boundary.
//!
//! The backend speaks JSON-over-HTTP with `{success, ...payload}` bodies.
//! The core never blocks on it: requests go out through a channel-based
//! client and responses are polled between ticks, so the simulation stays
//! decoupled from transport latency. A failed or `success: false` response
//! is a recoverable failure surfaced to the activity log, never a crash.
//!
//! [`MockServer`] is the in-process stand-in used until a real backend is
//! wired up; it serves the stock catalog and area data synchronously when
//! pumped.

use crossbeam_channel::{unbounded, Receiver, Sender};
use embervale_common::{AreaId, EntityId, ItemId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::area;
use crate::item::{Item, ItemKind, Rarity};
use crate::player::Attribute;

/// Correlates a response with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Every operation the backend exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ApiRequest {
    /// Fetch the current player.
    FetchPlayer,
    /// Create a player with the given name.
    CreatePlayer {
        /// Display name
        username: String,
    },
    /// Report the player's position.
    UpdatePosition {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
        /// Current area
        area: AreaId,
    },
    /// Spend attribute points.
    DistributeAttribute {
        /// Which attribute
        attribute: Attribute,
        /// How many points
        points: u32,
    },
    /// Equip an item server-side.
    EquipItem {
        /// Item to equip
        item_id: ItemId,
    },
    /// Resolve a harvest.
    Harvest {
        /// Resource node
        harvest_id: EntityId,
    },
    /// Resolve a battle.
    Battle {
        /// Enemy NPC
        npc_id: EntityId,
    },
    /// Buy a market item.
    BuyItem {
        /// Catalog item
        item_id: ItemId,
    },
    /// Enhance an item with a scroll.
    EnhanceItem {
        /// Item to enhance
        item_id: ItemId,
        /// Scroll consumed
        scroll_id: ItemId,
    },
    /// List an area's resources.
    ListResources {
        /// Area to list
        area: AreaId,
    },
    /// List an area's NPCs.
    ListNpcs {
        /// Area to list
        area: AreaId,
    },
    /// List the market catalog.
    ListMarket,
    /// Apply one passive regeneration tick.
    RegenTick,
}

/// API failure modes.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never reached the backend.
    #[error("transport error: {0}")]
    Transport(String),
    /// No response arrived in time.
    #[error("request timed out after {after_ms}ms")]
    Timeout {
        /// How long we waited
        after_ms: u64,
    },
    /// The backend answered `success: false`.
    #[error("request rejected: {message}")]
    Rejected {
        /// The backend's error string
        message: String,
    },
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// A backend response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// Error string when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Operation-specific payload
    #[serde(default)]
    pub payload: Value,
}

impl ApiResponse {
    /// A successful response with the given payload.
    #[must_use]
    pub fn ok(payload: Value) -> Self {
        Self {
            success: true,
            error: None,
            payload,
        }
    }

    /// A rejection with the given error message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            payload: Value::Null,
        }
    }

    /// Converts a `success: false` body into [`ApiError::Rejected`].
    pub fn into_result(self) -> ApiResult<Value> {
        if self.success {
            Ok(self.payload)
        } else {
            Err(ApiError::Rejected {
                message: self.error.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

/// Channel-based client half of the boundary.
///
/// `send` queues a request and returns immediately; `poll` drains whatever
/// responses have arrived. Request/response pairs are matched by
/// [`RequestId`].
#[derive(Debug)]
pub struct ApiClient {
    requests: Sender<(RequestId, ApiRequest)>,
    responses: Receiver<(RequestId, ApiResult<ApiResponse>)>,
    next_id: u64,
}

impl ApiClient {
    /// Queues a request toward the backend.
    pub fn send(&mut self, request: ApiRequest) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        if self.requests.send((id, request)).is_err() {
            warn!("api backend gone; request dropped");
        }
        id
    }

    /// Drains all responses received so far.
    pub fn poll(&self) -> Vec<(RequestId, ApiResult<ApiResponse>)> {
        let mut responses = Vec::new();
        while let Ok(response) = self.responses.try_recv() {
            responses.push(response);
        }
        responses
    }
}

/// The stock merchant catalog served by the mock backend.
#[must_use]
pub fn market_catalog() -> Vec<Item> {
    let mut sword = Item::catalog(
        "Iron Sword",
        ItemKind::Weapon,
        Rarity::Uncommon,
        100,
        true,
        "+5 Strength",
    );
    sword.stat_bonuses.insert("strength".to_string(), 5);
    let mut armor = Item::catalog(
        "Leather Armor",
        ItemKind::Armor,
        Rarity::Common,
        80,
        true,
        "+3 Defense",
    );
    armor.stat_bonuses.insert("defense".to_string(), 3);
    vec![
        Item::catalog(
            "Healing Potion",
            ItemKind::Consumable,
            Rarity::Common,
            20,
            false,
            "Restores 50 health",
        ),
        sword,
        armor,
    ]
}

/// In-process mock backend.
#[derive(Debug)]
pub struct MockServer {
    requests: Receiver<(RequestId, ApiRequest)>,
    responses: Sender<(RequestId, ApiResult<ApiResponse>)>,
    catalog: Vec<Item>,
}

/// Creates a connected client/mock-server pair.
#[must_use]
pub fn mock_pair() -> (ApiClient, MockServer) {
    let (request_tx, request_rx) = unbounded();
    let (response_tx, response_rx) = unbounded();
    (
        ApiClient {
            requests: request_tx,
            responses: response_rx,
            next_id: 1,
        },
        MockServer {
            requests: request_rx,
            responses: response_tx,
            catalog: market_catalog(),
        },
    )
}

impl MockServer {
    /// Answers every queued request. Returns how many were served.
    pub fn pump(&self) -> usize {
        let mut served = 0;
        while let Ok((id, request)) = self.requests.try_recv() {
            let response = self.answer(&request);
            let _ = self.responses.send((id, Ok(response)));
            served += 1;
        }
        served
    }

    fn answer(&self, request: &ApiRequest) -> ApiResponse {
        match request {
            ApiRequest::FetchPlayer | ApiRequest::CreatePlayer { .. } => ApiResponse::ok(json!({
                "player": {
                    "username": "Adventurer",
                    "level": 1,
                    "exp": 0,
                    "next_level_exp": 100,
                    "health": 100,
                    "max_health": 100,
                    "gold": 50,
                    "x": 400.0,
                    "y": 300.0,
                }
            })),
            ApiRequest::UpdatePosition { x, y, .. } => {
                ApiResponse::ok(json!({ "position": { "x": x, "y": y } }))
            }
            ApiRequest::DistributeAttribute { points, .. } => {
                if *points == 0 {
                    ApiResponse::rejected("no points to distribute")
                } else {
                    ApiResponse::ok(Value::Null)
                }
            }
            ApiRequest::ListResources { area } => match area::by_id(area) {
                Some(area) => ApiResponse::ok(json!({ "resources": area.resources })),
                None => ApiResponse::rejected(format!("unknown area: {area}")),
            },
            ApiRequest::ListNpcs { area } => match area::by_id(area) {
                Some(area) => ApiResponse::ok(json!({ "npcs": area.npcs })),
                None => ApiResponse::rejected(format!("unknown area: {area}")),
            },
            ApiRequest::ListMarket => ApiResponse::ok(json!({ "items": self.catalog })),
            ApiRequest::BuyItem { item_id } => {
                if self.catalog.iter().any(|item| item.id == *item_id) {
                    ApiResponse::ok(Value::Null)
                } else {
                    ApiResponse::rejected("item not found")
                }
            }
            // These resolve client-side in the mocked build; the backend
            // acknowledges them.
            ApiRequest::EquipItem { .. }
            | ApiRequest::Harvest { .. }
            | ApiRequest::Battle { .. }
            | ApiRequest::EnhanceItem { .. }
            | ApiRequest::RegenTick => ApiResponse::ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let (mut client, server) = mock_pair();
        let id = client.send(ApiRequest::ListMarket);

        assert!(client.poll().is_empty());
        assert_eq!(server.pump(), 1);

        let responses = client.poll();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].0, id);
        let payload = responses[0].1.clone().expect("response").into_result().expect("ok");
        assert_eq!(payload["items"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_rejection_becomes_error() {
        let (mut client, server) = mock_pair();
        client.send(ApiRequest::ListResources {
            area: AreaId::new("nowhere"),
        });
        server.pump();

        let responses = client.poll();
        let result = responses[0].1.clone().expect("transport ok").into_result();
        assert!(matches!(result, Err(ApiError::Rejected { .. })));
    }

    #[test]
    fn test_request_ids_increment() {
        let (mut client, _server) = mock_pair();
        let a = client.send(ApiRequest::RegenTick);
        let b = client.send(ApiRequest::RegenTick);
        assert_ne!(a, b);
    }

    #[test]
    fn test_catalog_contents() {
        let catalog = market_catalog();
        let names: Vec<&str> = catalog.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Healing Potion", "Iron Sword", "Leather Armor"]);
        assert!(catalog[1].equippable);
        assert_eq!(catalog[0].price, Some(20));
    }

    #[test]
    fn test_response_serialization_shape() {
        let response = ApiResponse::rejected("nope");
        let body = serde_json::to_value(&response).expect("serialize");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "nope");
    }
}

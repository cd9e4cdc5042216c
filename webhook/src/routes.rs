//! HTTP route handlers for inbound call notifications.

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::state::ReceiverState;
use crate::store::{CallId, CallStatus};

/// Payload pushed by the call system on every state change.
///
/// Fields are optional on the wire; a missing `recording_available` counts as
/// `false`. The id may arrive as a string or a number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub recording_available: Option<bool>,
}

/// Acknowledgement body returned for every accepted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
}

impl Ack {
    fn received() -> Self {
        Self {
            status: "received".to_string(),
        }
    }
}

/// Build the receiver router with state applied.
pub fn router(state: ReceiverState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(receive_notification))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// POST /webhook - record the latest status for a call.
async fn receive_notification(
    State(state): State<ReceiverState>,
    headers: HeaderMap,
    Json(notification): Json<Notification>,
) -> Result<Json<Ack>, StatusCode> {
    if !state.authorize(&headers) {
        warn!(call_id = ?notification.id, "rejected notification with bad secret");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let Some(call_id) = notification.id.as_ref().and_then(CallId::from_json) else {
        warn!(
            id = ?notification.id,
            status = ?notification.status,
            "notification without usable call id ignored"
        );
        return Ok(Json(Ack::received()));
    };

    let recording_available = notification.recording_available.unwrap_or(false);
    info!(
        call_id = %call_id,
        status = ?notification.status,
        recording_available,
        "notification received"
    );
    state.store.record(
        call_id,
        CallStatus {
            status: notification.status,
            recording_available,
        },
    );

    Ok(Json(Ack::received()))
}

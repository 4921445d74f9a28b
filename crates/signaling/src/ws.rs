//! WebSocket-Endpunkt – Nimmt Upgrades an und startet Sitzungen
//!
//! `GET /ws` wird auf WebSocket umgestellt; jede Verbindung bekommt eine
//! neue `SessionId` und laeuft als `SessionConnection` in einem eigenen Task.
//! Vor dem Upgrade wird ein Verbindungsplatz reserviert; sind alle
//! `max_clients` Plaetze belegt, wird das Upgrade mit 503 abgelehnt.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tandem_core::types::SessionId;
use tandem_protocol::codec::MAX_FRAME_GROESSE;
use tokio::sync::watch;

use crate::connection::SessionConnection;
use crate::error::SignalingResult;
use crate::server_state::SignalingState;

/// Pfad des WebSocket-Endpunkts
pub const WS_PFAD: &str = "/ws";

#[derive(Clone)]
struct WsState {
    state: Arc<SignalingState>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Baut den Router fuer den WebSocket-Endpunkt
pub fn signaling_router(state: Arc<SignalingState>, shutdown_rx: watch::Receiver<bool>) -> Router {
    Router::new()
        .route(WS_PFAD, get(ws_handler))
        .with_state(WsState { state, shutdown_rx })
}

/// `GET /ws` – WebSocket-Upgrade
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(ws_state): State<WsState>,
) -> SignalingResult<Response> {
    let platz = ws_state.state.platz_reservieren().inspect_err(|_| {
        tracing::warn!(
            max = ws_state.state.config.max_clients,
            "Server voll – Verbindung abgelehnt"
        );
    })?;

    let session_id = SessionId::new();
    tracing::debug!(session = %session_id, "WebSocket-Upgrade akzeptiert");

    let WsState { state, shutdown_rx } = ws_state;
    Ok(ws
        .max_message_size(MAX_FRAME_GROESSE)
        .on_upgrade(move |socket| async move {
            SessionConnection::neu(state, session_id)
                .verarbeiten(socket, shutdown_rx)
                .await;
            drop(platz);
        }))
}

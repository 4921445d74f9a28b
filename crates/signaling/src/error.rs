//! Fehlertypen fuer den Signaling-Service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tandem_protocol::ProtocolError;
use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
#[derive(Debug, Error)]
pub enum SignalingError {
    /// WebSocket-Fehler (Lesen/Schreiben)
    #[error("WebSocket-Fehler: {0}")]
    WebSocket(#[from] axum::Error),

    /// Ungueltiges Frame oder unbekanntes Ereignis
    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] ProtocolError),

    /// Verbindung wurde getrennt
    #[error("Verbindung getrennt")]
    VerbindungGetrennt,

    /// Keepalive-Timeout
    #[error("Timeout")]
    Timeout,

    /// Send-Queue lief voll, Empfaenger kommt nicht hinterher
    #[error("Sitzung ueberlastet")]
    Ueberlastet,

    /// Maximale Sitzungsanzahl erreicht
    #[error("Server ist voll")]
    ServerVoll,
}

impl IntoResponse for SignalingError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::ServerVoll => StatusCode::SERVICE_UNAVAILABLE,
            Self::Protokoll(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;

//! Text-Frame-Codec fuer WebSocket-Verbindungen
//!
//! Jedes WebSocket-Text-Frame traegt genau ein JSON-Ereignis:
//!
//! ```text
//! {"event": "<name>", "data": <payload>}
//! ```
//!
//! Frames ueber `MAX_FRAME_GROESSE` werden abgelehnt, ohne sie zu parsen.

use thiserror::Error;

use crate::event::{ClientEvent, ServerEvent};

/// Maximale Groesse eines eingehenden Text-Frames (64 KB)
///
/// SDP-Offers mit vielen Codecs liegen typischerweise bei wenigen KB.
pub const MAX_FRAME_GROESSE: usize = 64 * 1024;

/// Fehler beim Kodieren oder Dekodieren eines Frames
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame ist groesser als erlaubt
    #[error("Frame zu gross: {groesse} Bytes (max {max})")]
    FrameZuGross { groesse: usize, max: usize },

    /// Ungueltiges JSON oder unbekanntes Ereignis
    #[error("Ungueltiges Ereignis: {0}")]
    Json(#[from] serde_json::Error),
}

/// Dekodiert ein eingehendes Text-Frame in ein `ClientEvent`
pub fn decode_client_event(text: &str) -> Result<ClientEvent, ProtocolError> {
    if text.len() > MAX_FRAME_GROESSE {
        return Err(ProtocolError::FrameZuGross {
            groesse: text.len(),
            max: MAX_FRAME_GROESSE,
        });
    }
    Ok(serde_json::from_str(text)?)
}

/// Kodiert ein ausgehendes `ServerEvent` als Text-Frame
pub fn encode_server_event(event: &ServerEvent) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(event)?)
}

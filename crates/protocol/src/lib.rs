//! tandem-protocol – Signaling-Protokoll-Definitionen
//!
//! Dieses Crate definiert alle benannten Ereignisse, die zwischen Client
//! und Server ueber die WebSocket-Verbindung ausgetauscht werden, sowie
//! das Text-Frame-Format (`{"event": ..., "data": ...}`).

pub mod codec;
pub mod event;

pub use codec::{decode_client_event, encode_server_event, ProtocolError};
pub use event::{ClientEvent, ServerEvent, SignalArt, SignalPayload};

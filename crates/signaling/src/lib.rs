//! tandem-signaling – WebSocket-Signaling fuer Peer-Paare
//!
//! Dieser Crate vermittelt den Verbindungsaufbau zwischen genau zwei Peers
//! pro Raum. Er leitet Offer, Answer und ICE-Candidates an den jeweils
//! anderen Peer weiter und bestimmt, wer die Verbindung initiiert.
//! Medien laufen nie ueber diesen Server.
//!
//! ## Architektur
//!
//! ```text
//! WebSocket-Endpunkt (signaling_router, GET /ws)
//!     |
//!     v
//! SessionConnection (pro Verbindung ein Task, Keepalive)
//!     |
//!     v
//! EventDispatcher (join / offer / answer / ice-candidate / leave / disconnect)
//!     |
//!     v
//! RoomCoordinator  – Raum-Tabelle, Initiator, Kapazitaet 2, Relay
//!     |
//!     v
//! ConnectionRegistry – Send-Queues und Transport-Tags je Sitzung
//! ```

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod rooms;
pub mod server_state;
pub mod ws;

// Bequeme Re-Exporte
pub use connection::SessionConnection;
pub use dispatcher::EventDispatcher;
pub use error::{SignalingError, SignalingResult};
pub use registry::ConnectionRegistry;
pub use rooms::{BeitrittsErgebnis, Raum, RaumZustand, RoomCoordinator, RAUM_KAPAZITAET};
pub use server_state::{SignalingConfig, SignalingState};
pub use ws::signaling_router;

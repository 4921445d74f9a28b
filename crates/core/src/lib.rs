//! tandem-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die Identifikationstypen (Sitzung, Raum) und den
//! zentralen Fehler-Enum bereit, die von allen anderen Tandem-Crates
//! gemeinsam genutzt werden.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{Result, TandemError};
pub use types::{RoomKey, SessionId};

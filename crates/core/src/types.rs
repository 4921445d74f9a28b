//! Gemeinsame Identifikationstypen fuer Tandem
//!
//! Sitzungen und Raeume verwenden das Newtype-Pattern, damit eine
//! Sitzungs-ID nie versehentlich als Raum-Schluessel benutzt wird.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige ID einer Transport-Sitzung (eine WebSocket-Verbindung)
///
/// Wird beim Verbindungsaufbau vergeben und ist fuer die Lebensdauer der
/// Verbindung eindeutig. Auf dem Draht erscheint sie als UUID-String.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Erstellt eine neue zufaellige SessionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raum-Schluessel – beliebiger, vom Client gewaehlter Token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomKey(pub String);

impl RoomKey {
    /// Erstellt einen Raum-Schluessel aus einem beliebigen String
    pub fn neu(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl From<&str> for RoomKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl std::fmt::Display for RoomKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_eindeutig() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b, "Zwei neue SessionIds muessen verschieden sein");
    }

    #[test]
    fn session_id_ist_uuid_string_auf_dem_draht() {
        let id = SessionId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn room_key_ist_transparenter_string() {
        let key: RoomKey = serde_json::from_str("\"r1\"").unwrap();
        assert_eq!(key, RoomKey::from("r1"));
        assert_eq!(key.to_string(), "r1");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"r1\"");
    }
}

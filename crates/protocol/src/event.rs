//! Signaling-Ereignisse (Client <-> Server)
//!
//! Definiert alle benannten Ereignisse, die ueber die WebSocket-Verbindung
//! ausgetauscht werden.
//!
//! ## Design
//! - Adjazent getaggte Enums: `{"event": "<name>", "data": <payload>}`
//! - Ereignisnamen in kebab-case (`ice-candidate`, `user-joined`, ...)
//! - Offer/Answer/Candidate-Payloads sind opak und werden unveraendert
//!   weitergeleitet; nur das Feld `room` wird fuer das Routing gelesen

use serde::{Deserialize, Serialize};
use tandem_core::types::{RoomKey, SessionId};

// ---------------------------------------------------------------------------
// Opaker Signal-Payload
// ---------------------------------------------------------------------------

/// Unveraenderter Payload einer Offer-, Answer- oder ICE-Candidate-Nachricht
///
/// Der Server liest nur das Feld `room`; alles andere (SDP, Candidate, ...)
/// gehoert der Verhandlungslogik der Peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalPayload(pub serde_json::Value);

impl SignalPayload {
    /// Gibt den Raum-Schluessel aus dem Feld `room` zurueck
    ///
    /// `None` wenn das Feld fehlt oder kein String ist.
    pub fn raum(&self) -> Option<RoomKey> {
        self.0
            .get("room")
            .and_then(|v| v.as_str())
            .map(RoomKey::from)
    }
}

/// Art einer weitergeleiteten Verhandlungsnachricht
///
/// Fuer das Routing sind alle drei Arten gleichwertig; die Unterscheidung
/// existiert nur fuer den empfangenden Peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalArt {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalArt {
    /// Ereignisname auf dem Draht (auch als Metrik-Label genutzt)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::IceCandidate => "ice-candidate",
        }
    }

    /// Verpackt den Payload in das ausgehende Ereignis gleicher Art
    pub fn als_event(self, payload: SignalPayload) -> ServerEvent {
        match self {
            Self::Offer => ServerEvent::Offer(payload),
            Self::Answer => ServerEvent::Answer(payload),
            Self::IceCandidate => ServerEvent::IceCandidate(payload),
        }
    }
}

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Eingehendes Ereignis einer Sitzung
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Raum betreten (Payload: Raum-Schluessel)
    Join(RoomKey),
    /// SDP-Offer an den anderen Peer
    Offer(SignalPayload),
    /// SDP-Answer an den anderen Peer
    Answer(SignalPayload),
    /// ICE-Candidate an den anderen Peer
    IceCandidate(SignalPayload),
    /// Raum verlassen (Payload: Raum-Schluessel)
    Leave(RoomKey),
}

impl ClientEvent {
    /// Ereignisname fuer Logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice-candidate",
            Self::Leave(_) => "leave",
        }
    }
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Ausgehendes Ereignis an eine Sitzung
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Beitritt bestaetigt (nur an die beitretende Sitzung)
    Joined {
        #[serde(rename = "isInitiator")]
        is_initiator: bool,
        #[serde(rename = "userCount")]
        user_count: usize,
    },
    /// Zweiter Peer ist beigetreten (an das bestehende Mitglied)
    UserJoined {
        #[serde(rename = "userId")]
        user_id: SessionId,
    },
    /// Raum ist bereits mit zwei Peers belegt
    RoomFull,
    /// Peer hat den Raum verlassen oder die Verbindung verloren
    UserLeft {
        #[serde(rename = "userId")]
        user_id: SessionId,
    },
    Offer(SignalPayload),
    Answer(SignalPayload),
    IceCandidate(SignalPayload),
}

impl ServerEvent {
    /// Ereignisname fuer Logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::UserJoined { .. } => "user-joined",
            Self::RoomFull => "room-full",
            Self::UserLeft { .. } => "user-left",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice-candidate",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Connection-Registry – Send-Queues und Transport-Tags aller Sitzungen
//!
//! Die Registry besitzt fuer jede verbundene Sitzung die Send-Queue, aus
//! der die `SessionConnection` liest und ueber den WebSocket schreibt.
//!
//! Zusaetzlich fuehrt sie die Transport-Tags ("in welchen Raeumen haengt
//! diese Verbindung"). Diese Tags sind nur ein abgeleiteter Spiegel; die
//! verbindliche Mitgliedschaft kennt allein der `RoomCoordinator`.
//!
//! Die Registry trifft keine Routing-Entscheidungen.
//!
//! Laeuft die Send-Queue einer Sitzung voll, gilt der Empfaenger als
//! ueberlastet: sein Send-Handle wird entfernt, die `SessionConnection`
//! sieht die geschlossene Queue und trennt die Verbindung mit der
//! normalen Bereinigung.

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tandem_core::types::{RoomKey, SessionId};
use tandem_protocol::ServerEvent;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Standard-Groesse der Send-Queue pro Sitzung
pub const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// SessionSender
// ---------------------------------------------------------------------------

/// Ergebnis eines nicht-blockierenden Sendeversuchs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendeStatus {
    /// Ereignis liegt in der Queue
    Eingereiht,
    /// Queue war voll; die Sitzung muss getrennt werden
    Ueberlastet,
    /// Empfaenger existiert nicht mehr
    Geschlossen,
}

/// Handle auf die Send-Queue einer verbundenen Sitzung
#[derive(Clone, Debug)]
pub struct SessionSender {
    pub session_id: SessionId,
    pub tx: mpsc::Sender<ServerEvent>,
}

impl SessionSender {
    /// Reiht ein Ereignis nicht-blockierend ein
    pub fn senden(&self, event: ServerEvent) -> SendeStatus {
        match self.tx.try_send(event) {
            Ok(()) => SendeStatus::Eingereiht,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    session = %self.session_id,
                    event = event.name(),
                    "Send-Queue voll – Sitzung wird getrennt"
                );
                SendeStatus::Ueberlastet
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(session = %self.session_id, "Send-Queue geschlossen (Sitzung getrennt)");
                SendeStatus::Geschlossen
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

/// Zentrale Registry fuer alle verbundenen Sitzungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<ConnectionRegistryInner>,
}

struct ConnectionRegistryInner {
    /// Send-Handles, indiziert nach SessionId
    sitzungen: DashMap<SessionId, SessionSender>,
    /// Transport-Tags: session_id -> Raeume, an die die Verbindung gehaengt ist
    raum_tags: DashMap<SessionId, HashSet<RoomKey>>,
    /// Kapazitaet jeder neuen Send-Queue
    queue_groesse: usize,
}

impl ConnectionRegistry {
    /// Erstellt eine neue Registry mit Standard-Queue-Groesse
    pub fn neu() -> Self {
        Self::mit_queue_groesse(SEND_QUEUE_GROESSE)
    }

    /// Erstellt eine neue Registry mit eigener Queue-Groesse
    pub fn mit_queue_groesse(queue_groesse: usize) -> Self {
        Self {
            inner: Arc::new(ConnectionRegistryInner {
                sitzungen: DashMap::new(),
                raum_tags: DashMap::new(),
                queue_groesse: queue_groesse.max(1),
            }),
        }
    }

    /// Registriert eine neue Sitzung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die `SessionConnection` liest aus dieser Queue und sendet via WebSocket.
    pub fn sitzung_registrieren(&self, session_id: SessionId) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(self.inner.queue_groesse);
        self.inner
            .sitzungen
            .insert(session_id, SessionSender { session_id, tx });
        tracing::debug!(session = %session_id, "Sitzung in Registry registriert");
        rx
    }

    /// Entfernt eine Sitzung samt Send-Queue und Transport-Tags
    ///
    /// Gibt die Tags zurueck, die zu diesem Zeitpunkt noch gesetzt waren.
    /// Nach einer vollstaendigen Raum-Bereinigung ist die Liste leer.
    pub fn sitzung_entfernen(&self, session_id: &SessionId) -> Vec<RoomKey> {
        self.inner.sitzungen.remove(session_id);
        let rest: Vec<RoomKey> = self
            .inner
            .raum_tags
            .remove(session_id)
            .map(|(_, tags)| tags.into_iter().collect())
            .unwrap_or_default();
        tracing::debug!(session = %session_id, "Sitzung aus Registry entfernt");
        rest
    }

    /// Haengt die Verbindung an einen Raum-Tag
    pub fn raum_ankoppeln(&self, session_id: SessionId, raum: RoomKey) {
        if !self.inner.sitzungen.contains_key(&session_id) {
            return;
        }
        self.inner
            .raum_tags
            .entry(session_id)
            .or_default()
            .insert(raum);
    }

    /// Loest die Verbindung von einem Raum-Tag (no-op wenn nicht gesetzt)
    pub fn raum_abkoppeln(&self, session_id: &SessionId, raum: &RoomKey) {
        if let Some(mut tags) = self.inner.raum_tags.get_mut(session_id) {
            tags.remove(raum);
            let ist_leer = tags.is_empty();
            drop(tags);
            if ist_leer {
                self.inner.raum_tags.remove(session_id);
            }
        }
    }

    /// Gibt die aktuellen Transport-Tags einer Sitzung zurueck
    pub fn raum_tags(&self, session_id: &SessionId) -> Vec<RoomKey> {
        self.inner
            .raum_tags
            .get(session_id)
            .map(|tags| tags.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Sendet ein Ereignis an eine einzelne Sitzung
    ///
    /// Gibt `true` zurueck wenn die Sitzung gefunden und das Ereignis eingereiht wurde.
    /// Bei voller Queue wird das Send-Handle entfernt; die Verbindung der
    /// Sitzung endet danach, sobald sie die restliche Queue geleert hat.
    pub fn an_sitzung_senden(&self, session_id: &SessionId, event: ServerEvent) -> bool {
        let status = match self.inner.sitzungen.get(session_id) {
            Some(sender) => sender.senden(event),
            None => {
                tracing::debug!(session = %session_id, "Senden an unbekannte Sitzung");
                return false;
            }
        };

        if status == SendeStatus::Ueberlastet {
            self.inner.sitzungen.remove(session_id);
        }
        status == SendeStatus::Eingereiht
    }

    /// Gibt die Anzahl der registrierten Sitzungen zurueck
    pub fn sitzungs_anzahl(&self) -> usize {
        self.inner.sitzungen.len()
    }

    /// Prueft ob eine Sitzung registriert ist
    pub fn ist_registriert(&self, session_id: &SessionId) -> bool {
        self.inner.sitzungen.contains_key(session_id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

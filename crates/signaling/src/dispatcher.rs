//! Event-Dispatcher – Routet Sitzungs-Ereignisse an den RoomCoordinator
//!
//! Der Dispatcher ist der Adapter zwischen Transport und Raum-Logik:
//!
//! ```text
//! connect     -> verbinden()   (Send-Queue registrieren, Sitzung bekannt machen)
//! join        -> RoomCoordinator::beitreten
//! offer       -> RoomCoordinator::weiterleiten(Offer)
//! answer      -> RoomCoordinator::weiterleiten(Answer)
//! ice-candidate -> RoomCoordinator::weiterleiten(IceCandidate)
//! leave       -> RoomCoordinator::verlassen
//! disconnect  -> trennen()     (Raeume bereinigen, Send-Queue verwerfen)
//! ```
//!
//! Er trifft selbst keine Broadcast-Entscheidungen.

use std::sync::Arc;
use tandem_core::types::SessionId;
use tandem_protocol::{ClientEvent, ServerEvent, SignalArt, SignalPayload};
use tokio::sync::mpsc;

use crate::rooms::BeitrittsErgebnis;
use crate::server_state::SignalingState;

/// Zentraler Ereignis-Dispatcher
#[derive(Clone)]
pub struct EventDispatcher {
    state: Arc<SignalingState>,
}

impl EventDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<SignalingState>) -> Self {
        Self { state }
    }

    /// Neue Transport-Sitzung: Send-Queue anlegen und Sitzung bekannt machen
    pub fn verbinden(&self, session_id: SessionId) -> mpsc::Receiver<ServerEvent> {
        let rx = self.state.registry.sitzung_registrieren(session_id);
        self.state.coordinator.sitzung_verbunden(session_id);
        tracing::info!(session = %session_id, "Sitzung verbunden");
        rx
    }

    /// Verarbeitet ein eingehendes Ereignis einer Sitzung
    pub fn dispatch(&self, session_id: SessionId, event: ClientEvent) {
        tracing::trace!(session = %session_id, event = event.name(), "Ereignis empfangen");

        match event {
            ClientEvent::Join(raum) => {
                if self.state.coordinator.beitreten(session_id, raum) == BeitrittsErgebnis::Voll {
                    self.state.metriken.rejected_joins_total.inc();
                }
            }
            ClientEvent::Offer(payload) => {
                self.weiterleiten(SignalArt::Offer, session_id, payload);
            }
            ClientEvent::Answer(payload) => {
                self.weiterleiten(SignalArt::Answer, session_id, payload);
            }
            ClientEvent::IceCandidate(payload) => {
                self.weiterleiten(SignalArt::IceCandidate, session_id, payload);
            }
            ClientEvent::Leave(raum) => {
                self.state.coordinator.verlassen(session_id, &raum);
            }
        }
    }

    /// Transport-Sitzung beendet: alle Raeume bereinigen, Queue verwerfen
    ///
    /// Mehrfache Aufrufe sind unschaedlich.
    pub fn trennen(&self, session_id: SessionId) {
        let verlassen = self.state.coordinator.trennen(session_id);
        let rest_tags = self.state.registry.sitzung_entfernen(&session_id);

        if !rest_tags.is_empty() {
            // Transport-Tags ohne logische Mitgliedschaft
            tracing::warn!(
                session = %session_id,
                tags = ?rest_tags,
                "Verwaiste Raum-Tags beim Trennen entfernt"
            );
        }

        tracing::info!(
            session = %session_id,
            rooms = verlassen.len(),
            "Sitzung getrennt"
        );
    }

    fn weiterleiten(&self, art: SignalArt, session_id: SessionId, payload: SignalPayload) {
        let Some(raum) = payload.raum() else {
            tracing::debug!(
                session = %session_id,
                kind = art.name(),
                "Nachricht ohne Raum verworfen"
            );
            return;
        };

        let empfaenger = self
            .state
            .coordinator
            .weiterleiten(art, session_id, &raum, payload);
        if empfaenger > 0 {
            self.state
                .metriken
                .relayed_messages_total
                .with_label_values(&[art.name()])
                .inc_by(empfaenger as u64);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_state::SignalingConfig;
    use serde_json::json;
    use tandem_core::types::RoomKey;
    use tandem_observability::TandemMetrics;

    fn dispatcher() -> (EventDispatcher, Arc<SignalingState>) {
        let state = SignalingState::neu(SignalingConfig::default(), TandemMetrics::neu().unwrap());
        (EventDispatcher::neu(Arc::clone(&state)), state)
    }

    #[tokio::test]
    async fn join_und_offer_werden_geroutet() {
        let (d, state) = dispatcher();
        let sa = SessionId::new();
        let sb = SessionId::new();
        let mut rxa = d.verbinden(sa);
        let mut rxb = d.verbinden(sb);

        d.dispatch(sa, ClientEvent::Join(RoomKey::from("r1")));
        d.dispatch(sb, ClientEvent::Join(RoomKey::from("r1")));
        while rxa.try_recv().is_ok() {}
        while rxb.try_recv().is_ok() {}

        let payload = SignalPayload(json!({"room": "r1", "sdp": "v=0"}));
        d.dispatch(sa, ClientEvent::Offer(payload.clone()));

        assert_eq!(rxb.try_recv().unwrap(), ServerEvent::Offer(payload));
        assert!(rxa.try_recv().is_err());
        assert_eq!(
            state
                .metriken
                .relayed_messages_total
                .with_label_values(&["offer"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn payload_ohne_raum_wird_verworfen() {
        let (d, state) = dispatcher();
        let sa = SessionId::new();
        let sb = SessionId::new();
        let _rxa = d.verbinden(sa);
        let mut rxb = d.verbinden(sb);
        d.dispatch(sa, ClientEvent::Join(RoomKey::from("r1")));
        d.dispatch(sb, ClientEvent::Join(RoomKey::from("r1")));
        while rxb.try_recv().is_ok() {}

        d.dispatch(sa, ClientEvent::Answer(SignalPayload(json!({"sdp": "v=0"}))));
        assert!(rxb.try_recv().is_err());
        assert_eq!(
            state
                .metriken
                .relayed_messages_total
                .with_label_values(&["answer"])
                .get(),
            0
        );
    }

    #[tokio::test]
    async fn voller_raum_zaehlt_ablehnung() {
        let (d, state) = dispatcher();
        let ids: Vec<SessionId> = (0..3).map(|_| SessionId::new()).collect();
        let _rxs: Vec<_> = ids.iter().map(|id| d.verbinden(*id)).collect();

        for id in &ids {
            d.dispatch(*id, ClientEvent::Join(RoomKey::from("r1")));
        }
        assert_eq!(state.metriken.rejected_joins_total.get(), 1);
    }

    #[tokio::test]
    async fn trennen_entfernt_sitzung_ueberall() {
        let (d, state) = dispatcher();
        let sa = SessionId::new();
        let _rxa = d.verbinden(sa);
        d.dispatch(sa, ClientEvent::Join(RoomKey::from("r1")));

        d.trennen(sa);
        assert!(!state.registry.ist_registriert(&sa));
        assert!(!state.coordinator.ist_verbunden(&sa));
        assert_eq!(state.coordinator.raum_anzahl(), 0);

        // Doppeltes Trennen ist ein no-op
        d.trennen(sa);
    }
}

//! Room-Coordinator – Raum-Mitgliedschaft, Initiator-Rolle und Relay
//!
//! Der Coordinator haelt die einzige verbindliche Raum-Tabelle. Jeder Raum
//! hat hoechstens zwei Mitglieder; das erste Mitglied ist Initiator der
//! Peer-Verbindung.
//!
//! ## Raum-Zustaende
//! ```text
//! Leer -> Wartend (1 Mitglied, Initiator gesetzt) -> Gepaart (2 Mitglieder)
//!           ^                                           |
//!           +------------- Leave / Disconnect ----------+
//! Wartend -> Leer (Raum wird sofort geloescht)
//! ```
//!
//! ## Nebenlaeufigkeit
//! Jede Operation nimmt den Tabellen-Lock genau einmal und sammelt dabei
//! die auszuliefernden Ereignisse. Eingereiht werden sie noch unter dem
//! Lock, nicht-blockierend (`try_send`) ueber die `ConnectionRegistry`.
//! Damit entspricht die Reihenfolge in jeder Send-Queue der Reihenfolge
//! der Tabellen-Aenderungen.

use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tandem_core::types::{RoomKey, SessionId};
use tandem_protocol::{ServerEvent, SignalArt, SignalPayload};

use crate::registry::ConnectionRegistry;

/// Maximale Anzahl Mitglieder pro Raum
pub const RAUM_KAPAZITAET: usize = 2;

// ---------------------------------------------------------------------------
// Raum
// ---------------------------------------------------------------------------

/// Zustand eines Raums, abgeleitet aus der Mitgliederzahl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaumZustand {
    Leer,
    Wartend,
    Gepaart,
}

/// Ein Raum in der Tabelle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Raum {
    /// Mitglieder in Beitrittsreihenfolge (eindeutig, max. 2)
    pub mitglieder: Vec<SessionId>,
    /// Initiator der Peer-Verbindung (immer ein Mitglied, solange es welche gibt)
    pub initiator: Option<SessionId>,
}

impl Raum {
    pub fn zustand(&self) -> RaumZustand {
        match self.mitglieder.len() {
            0 => RaumZustand::Leer,
            1 => RaumZustand::Wartend,
            _ => RaumZustand::Gepaart,
        }
    }

    pub fn ist_mitglied(&self, session_id: &SessionId) -> bool {
        self.mitglieder.contains(session_id)
    }
}

/// Ergebnis eines Beitrittsversuchs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeitrittsErgebnis {
    /// Sitzung ist (jetzt oder bereits) Mitglied
    Beigetreten { ist_initiator: bool, anzahl: usize },
    /// Raum war bereits voll, Sitzung wurde abgewiesen
    Voll,
    /// Sitzung ist dem Coordinator unbekannt (nie verbunden oder bereits getrennt)
    Ignoriert,
}

// ---------------------------------------------------------------------------
// Interne Tabelle
// ---------------------------------------------------------------------------

/// Nach dem Lock auszufuehrende Transport-Aktion
#[derive(Debug)]
enum Aktion {
    Senden(SessionId, ServerEvent),
    Ankoppeln(SessionId, RoomKey),
    Abkoppeln(SessionId, RoomKey),
}

#[derive(Default)]
struct RaumTabelle {
    /// Raum-Schluessel -> Raum (nie leer)
    raeume: HashMap<RoomKey, Raum>,
    /// Verbindlicher Mitgliedschafts-Index: Sitzung -> Raeume
    ///
    /// Ein Eintrag existiert genau solange die Sitzung verbunden ist.
    sitzungen: HashMap<SessionId, BTreeSet<RoomKey>>,
}

impl RaumTabelle {
    fn beitreten(
        &mut self,
        session_id: SessionId,
        raum: RoomKey,
        aktionen: &mut Vec<Aktion>,
    ) -> BeitrittsErgebnis {
        let vorherige: Vec<RoomKey> = match self.sitzungen.get(&session_id) {
            Some(raeume) => raeume.iter().filter(|k| **k != raum).cloned().collect(),
            None => return BeitrittsErgebnis::Ignoriert,
        };

        // Erst alle anderen Raeume verlassen (inkl. Initiator-Uebergabe)
        for alter_raum in &vorherige {
            self.verlassen(session_id, alter_raum, aktionen);
        }

        aktionen.push(Aktion::Ankoppeln(session_id, raum.clone()));
        let eintrag = self.raeume.entry(raum.clone()).or_default();

        if eintrag.ist_mitglied(&session_id) {
            let ist_initiator = eintrag.initiator == Some(session_id);
            let anzahl = eintrag.mitglieder.len();
            aktionen.push(Aktion::Senden(
                session_id,
                ServerEvent::Joined {
                    is_initiator: ist_initiator,
                    user_count: anzahl,
                },
            ));
            return BeitrittsErgebnis::Beigetreten {
                ist_initiator,
                anzahl,
            };
        }

        if eintrag.mitglieder.len() >= RAUM_KAPAZITAET {
            aktionen.push(Aktion::Senden(session_id, ServerEvent::RoomFull));
            aktionen.push(Aktion::Abkoppeln(session_id, raum.clone()));
            tracing::info!(session = %session_id, room = %raum, "Raum voll – Beitritt abgelehnt");
            return BeitrittsErgebnis::Voll;
        }

        eintrag.mitglieder.push(session_id);
        if eintrag.mitglieder.len() == 1 {
            eintrag.initiator = Some(session_id);
        }

        let ist_initiator = eintrag.initiator == Some(session_id);
        let anzahl = eintrag.mitglieder.len();
        let andere: Vec<SessionId> = if anzahl == RAUM_KAPAZITAET {
            eintrag
                .mitglieder
                .iter()
                .copied()
                .filter(|m| *m != session_id)
                .collect()
        } else {
            Vec::new()
        };

        self.sitzungen
            .entry(session_id)
            .or_default()
            .insert(raum.clone());

        tracing::info!(
            session = %session_id,
            room = %raum,
            users = anzahl,
            initiator = ist_initiator,
            "Raum beigetreten"
        );

        aktionen.push(Aktion::Senden(
            session_id,
            ServerEvent::Joined {
                is_initiator: ist_initiator,
                user_count: anzahl,
            },
        ));
        for anderer in andere {
            aktionen.push(Aktion::Senden(
                anderer,
                ServerEvent::UserJoined {
                    user_id: session_id,
                },
            ));
        }

        BeitrittsErgebnis::Beigetreten {
            ist_initiator,
            anzahl,
        }
    }

    /// Entfernt eine Sitzung aus einem Raum
    ///
    /// Gibt `true` zurueck wenn die Sitzung Mitglied war.
    fn verlassen(
        &mut self,
        session_id: SessionId,
        raum: &RoomKey,
        aktionen: &mut Vec<Aktion>,
    ) -> bool {
        aktionen.push(Aktion::Abkoppeln(session_id, raum.clone()));

        if let Some(raeume) = self.sitzungen.get_mut(&session_id) {
            raeume.remove(raum);
        }

        let Some(eintrag) = self.raeume.get_mut(raum) else {
            return false;
        };
        let Some(pos) = eintrag.mitglieder.iter().position(|m| *m == session_id) else {
            return false;
        };
        eintrag.mitglieder.remove(pos);

        for verbleibend in &eintrag.mitglieder {
            aktionen.push(Aktion::Senden(
                *verbleibend,
                ServerEvent::UserLeft {
                    user_id: session_id,
                },
            ));
        }

        if eintrag.mitglieder.is_empty() {
            self.raeume.remove(raum);
            tracing::info!(room = %raum, "Raum geloescht");
        } else if eintrag.initiator == Some(session_id) {
            eintrag.initiator = eintrag.mitglieder.first().copied();
            if let Some(neu) = eintrag.initiator {
                tracing::info!(room = %raum, initiator = %neu, "Neuer Initiator");
            }
        }

        tracing::info!(session = %session_id, room = %raum, "Raum verlassen");
        true
    }
}

// ---------------------------------------------------------------------------
// RoomCoordinator
// ---------------------------------------------------------------------------

/// Verwaltet alle Raeume und leitet Verhandlungsnachrichten weiter
///
/// Thread-safe via Arc + Mutex. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct RoomCoordinator {
    registry: ConnectionRegistry,
    tabelle: Arc<Mutex<RaumTabelle>>,
}

impl RoomCoordinator {
    /// Erstellt einen neuen Coordinator, der ueber `registry` ausliefert
    pub fn neu(registry: ConnectionRegistry) -> Self {
        Self {
            registry,
            tabelle: Arc::new(Mutex::new(RaumTabelle::default())),
        }
    }

    /// Macht eine neu verbundene Sitzung bekannt
    pub fn sitzung_verbunden(&self, session_id: SessionId) {
        self.tabelle.lock().sitzungen.entry(session_id).or_default();
    }

    /// Sitzung tritt einem Raum bei (verlaesst vorher alle anderen Raeume)
    pub fn beitreten(&self, session_id: SessionId, raum: RoomKey) -> BeitrittsErgebnis {
        let mut aktionen = Vec::new();
        let mut tab = self.tabelle.lock();
        let ergebnis = tab.beitreten(session_id, raum, &mut aktionen);
        self.ausfuehren(aktionen);
        drop(tab);

        if ergebnis == BeitrittsErgebnis::Ignoriert {
            tracing::debug!(session = %session_id, "Beitritt einer unbekannten Sitzung ignoriert");
        }
        ergebnis
    }

    /// Leitet einen Verhandlungs-Payload an alle anderen Mitglieder weiter
    ///
    /// Gibt die Anzahl der Empfaenger zurueck. Unbekannte Raeume und
    /// unbekannte Sitzungen ergeben 0, ohne Fehler.
    pub fn weiterleiten(
        &self,
        art: SignalArt,
        session_id: SessionId,
        raum: &RoomKey,
        payload: SignalPayload,
    ) -> usize {
        let tab = self.tabelle.lock();
        if !tab.sitzungen.contains_key(&session_id) {
            return 0;
        }
        let aktionen: Vec<Aktion> = tab
            .raeume
            .get(raum)
            .map(|eintrag| {
                eintrag
                    .mitglieder
                    .iter()
                    .filter(|m| **m != session_id)
                    .map(|ziel| Aktion::Senden(*ziel, art.als_event(payload.clone())))
                    .collect()
            })
            .unwrap_or_default();
        let anzahl = aktionen.len();
        self.ausfuehren(aktionen);
        drop(tab);

        tracing::debug!(
            session = %session_id,
            room = %raum,
            kind = art.name(),
            recipients = anzahl,
            "Nachricht weitergeleitet"
        );
        anzahl
    }

    /// Sitzung verlaesst einen Raum
    ///
    /// Gibt `true` zurueck wenn die Sitzung Mitglied war. Der Transport-Tag
    /// wird in jedem Fall entfernt.
    pub fn verlassen(&self, session_id: SessionId, raum: &RoomKey) -> bool {
        let mut aktionen = Vec::new();
        let mut tab = self.tabelle.lock();
        let war_mitglied = tab.verlassen(session_id, raum, &mut aktionen);
        self.ausfuehren(aktionen);
        war_mitglied
    }

    /// Bereinigt alle Mitgliedschaften einer getrennten Sitzung
    ///
    /// Verwendet ausschliesslich den eigenen Mitgliedschafts-Index. Ein
    /// zweiter Aufruf fuer dieselbe Sitzung ist ein no-op.
    pub fn trennen(&self, session_id: SessionId) -> Vec<RoomKey> {
        let mut aktionen = Vec::new();
        let mut tab = self.tabelle.lock();
        let Some(raeume) = tab.sitzungen.remove(&session_id) else {
            tracing::debug!(session = %session_id, "Sitzung bereits bereinigt");
            return Vec::new();
        };
        for raum in &raeume {
            tab.verlassen(session_id, raum, &mut aktionen);
        }
        self.ausfuehren(aktionen);
        raeume.into_iter().collect()
    }

    // -----------------------------------------------------------------------
    // Abfragen
    // -----------------------------------------------------------------------

    /// Gibt eine Kopie eines Raums zurueck
    pub fn raum(&self, raum: &RoomKey) -> Option<Raum> {
        self.tabelle.lock().raeume.get(raum).cloned()
    }

    /// Gibt Kopien aller Raeume zurueck
    pub fn alle_raeume(&self) -> Vec<(RoomKey, Raum)> {
        self.tabelle
            .lock()
            .raeume
            .iter()
            .map(|(k, r)| (k.clone(), r.clone()))
            .collect()
    }

    /// Gibt die Anzahl existierender Raeume zurueck
    pub fn raum_anzahl(&self) -> usize {
        self.tabelle.lock().raeume.len()
    }

    /// Gibt die Raeume zurueck, in denen eine Sitzung Mitglied ist
    pub fn raeume_von(&self, session_id: &SessionId) -> Vec<RoomKey> {
        self.tabelle
            .lock()
            .sitzungen
            .get(session_id)
            .map(|raeume| raeume.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Prueft ob eine Sitzung dem Coordinator bekannt ist
    pub fn ist_verbunden(&self, session_id: &SessionId) -> bool {
        self.tabelle.lock().sitzungen.contains_key(session_id)
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden
    // -----------------------------------------------------------------------

    /// Reiht die gesammelten Aktionen ein; Aufrufer haelt den Tabellen-Lock
    fn ausfuehren(&self, aktionen: Vec<Aktion>) {
        for aktion in aktionen {
            match aktion {
                Aktion::Senden(ziel, event) => {
                    self.registry.an_sitzung_senden(&ziel, event);
                }
                Aktion::Ankoppeln(session_id, raum) => {
                    self.registry.raum_ankoppeln(session_id, raum);
                }
                Aktion::Abkoppeln(session_id, raum) => {
                    self.registry.raum_abkoppeln(&session_id, &raum);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct Aufbau {
        registry: ConnectionRegistry,
        coordinator: RoomCoordinator,
    }

    impl Aufbau {
        fn neu() -> Self {
            let registry = ConnectionRegistry::neu();
            let coordinator = RoomCoordinator::neu(registry.clone());
            Self {
                registry,
                coordinator,
            }
        }

        fn verbinden(&self) -> (SessionId, mpsc::Receiver<ServerEvent>) {
            let sid = SessionId::new();
            let rx = self.registry.sitzung_registrieren(sid);
            self.coordinator.sitzung_verbunden(sid);
            (sid, rx)
        }
    }

    fn leeren(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn r1() -> RoomKey {
        RoomKey::from("r1")
    }

    #[test]
    fn erster_beitritt_wird_initiator() {
        let a = Aufbau::neu();
        let (sa, mut rxa) = a.verbinden();

        let ergebnis = a.coordinator.beitreten(sa, r1());
        assert_eq!(
            ergebnis,
            BeitrittsErgebnis::Beigetreten {
                ist_initiator: true,
                anzahl: 1
            }
        );
        assert_eq!(
            leeren(&mut rxa),
            vec![ServerEvent::Joined {
                is_initiator: true,
                user_count: 1
            }]
        );

        let raum = a.coordinator.raum(&r1()).unwrap();
        assert_eq!(raum.zustand(), RaumZustand::Wartend);
        assert_eq!(raum.initiator, Some(sa));
        assert_eq!(a.registry.raum_tags(&sa), vec![r1()]);
    }

    #[test]
    fn zweiter_beitritt_benachrichtigt_initiator() {
        let a = Aufbau::neu();
        let (sa, mut rxa) = a.verbinden();
        let (sb, mut rxb) = a.verbinden();

        a.coordinator.beitreten(sa, r1());
        leeren(&mut rxa);
        a.coordinator.beitreten(sb, r1());

        assert_eq!(
            leeren(&mut rxb),
            vec![ServerEvent::Joined {
                is_initiator: false,
                user_count: 2
            }]
        );
        assert_eq!(
            leeren(&mut rxa),
            vec![ServerEvent::UserJoined { user_id: sb }]
        );
        assert_eq!(
            a.coordinator.raum(&r1()).unwrap().zustand(),
            RaumZustand::Gepaart
        );
    }

    #[test]
    fn dritter_beitritt_wird_abgewiesen() {
        let a = Aufbau::neu();
        let (sa, mut rxa) = a.verbinden();
        let (sb, mut rxb) = a.verbinden();
        let (sc, mut rxc) = a.verbinden();

        a.coordinator.beitreten(sa, r1());
        a.coordinator.beitreten(sb, r1());
        leeren(&mut rxa);
        leeren(&mut rxb);

        assert_eq!(a.coordinator.beitreten(sc, r1()), BeitrittsErgebnis::Voll);
        assert_eq!(leeren(&mut rxc), vec![ServerEvent::RoomFull]);
        assert!(leeren(&mut rxa).is_empty(), "Mitglieder werden nicht informiert");
        assert!(leeren(&mut rxb).is_empty());

        let raum = a.coordinator.raum(&r1()).unwrap();
        assert_eq!(raum.mitglieder, vec![sa, sb]);
        assert!(a.registry.raum_tags(&sc).is_empty());
        assert!(a.coordinator.raeume_von(&sc).is_empty());
    }

    #[test]
    fn erneuter_beitritt_ist_idempotent() {
        let a = Aufbau::neu();
        let (sa, mut rxa) = a.verbinden();
        let (sb, mut rxb) = a.verbinden();

        a.coordinator.beitreten(sa, r1());
        a.coordinator.beitreten(sb, r1());
        leeren(&mut rxa);
        leeren(&mut rxb);

        let ergebnis = a.coordinator.beitreten(sb, r1());
        assert_eq!(
            ergebnis,
            BeitrittsErgebnis::Beigetreten {
                ist_initiator: false,
                anzahl: 2
            }
        );
        assert_eq!(a.coordinator.raum(&r1()).unwrap().mitglieder, vec![sa, sb]);
        assert!(leeren(&mut rxa).is_empty(), "kein zweites user-joined");
    }

    #[test]
    fn beitritt_verlaesst_vorherigen_raum() {
        let a = Aufbau::neu();
        let (sa, mut rxa) = a.verbinden();
        let (sb, mut rxb) = a.verbinden();
        let r2 = RoomKey::from("r2");

        a.coordinator.beitreten(sa, r1());
        a.coordinator.beitreten(sb, r1());
        leeren(&mut rxa);
        leeren(&mut rxb);

        // Initiator wechselt den Raum
        a.coordinator.beitreten(sa, r2.clone());

        assert_eq!(leeren(&mut rxb), vec![ServerEvent::UserLeft { user_id: sa }]);
        let alter = a.coordinator.raum(&r1()).unwrap();
        assert_eq!(alter.mitglieder, vec![sb]);
        assert_eq!(alter.initiator, Some(sb));
        assert_eq!(a.coordinator.raeume_von(&sa), vec![r2.clone()]);
        assert_eq!(a.registry.raum_tags(&sa), vec![r2]);
    }

    #[test]
    fn abgewiesener_beitritt_verlaesst_trotzdem_alten_raum() {
        let a = Aufbau::neu();
        let (sa, _rxa) = a.verbinden();
        let (sb, _rxb) = a.verbinden();
        let (sc, _rxc) = a.verbinden();
        let r2 = RoomKey::from("r2");

        a.coordinator.beitreten(sc, r2.clone());
        a.coordinator.beitreten(sa, r1());
        a.coordinator.beitreten(sb, r1());

        assert_eq!(a.coordinator.beitreten(sc, r1()), BeitrittsErgebnis::Voll);
        assert!(a.coordinator.raum(&r2).is_none(), "alter Raum ist leer und geloescht");
        assert!(a.coordinator.raeume_von(&sc).is_empty());
    }

    #[test]
    fn verlassen_gibt_initiator_weiter_und_loescht_leeren_raum() {
        let a = Aufbau::neu();
        let (sa, mut rxa) = a.verbinden();
        let (sb, mut rxb) = a.verbinden();

        a.coordinator.beitreten(sa, r1());
        a.coordinator.beitreten(sb, r1());
        leeren(&mut rxa);
        leeren(&mut rxb);

        assert!(a.coordinator.verlassen(sa, &r1()));
        assert_eq!(leeren(&mut rxb), vec![ServerEvent::UserLeft { user_id: sa }]);
        let raum = a.coordinator.raum(&r1()).unwrap();
        assert_eq!(raum.mitglieder, vec![sb]);
        assert_eq!(raum.initiator, Some(sb));
        assert!(leeren(&mut rxb).is_empty(), "Uebergabe erfolgt still");

        assert!(a.coordinator.verlassen(sb, &r1()));
        assert!(a.coordinator.raum(&r1()).is_none());
        assert_eq!(a.coordinator.raum_anzahl(), 0);
    }

    #[test]
    fn verlassen_unbekannter_raum_ist_noop() {
        let a = Aufbau::neu();
        let (sa, mut rxa) = a.verbinden();
        assert!(!a.coordinator.verlassen(sa, &RoomKey::from("gibt-es-nicht")));
        assert!(leeren(&mut rxa).is_empty());
    }

    #[test]
    fn relay_erreicht_nur_den_anderen_peer() {
        let a = Aufbau::neu();
        let (sa, mut rxa) = a.verbinden();
        let (sb, mut rxb) = a.verbinden();

        a.coordinator.beitreten(sa, r1());
        let payload = SignalPayload(json!({"room": "r1", "sdp": "v=0"}));

        // Allein im Raum: kein Empfaenger
        assert_eq!(
            a.coordinator
                .weiterleiten(SignalArt::Offer, sa, &r1(), payload.clone()),
            0
        );

        a.coordinator.beitreten(sb, r1());
        leeren(&mut rxa);
        leeren(&mut rxb);

        assert_eq!(
            a.coordinator
                .weiterleiten(SignalArt::Offer, sa, &r1(), payload.clone()),
            1
        );
        assert_eq!(leeren(&mut rxb), vec![ServerEvent::Offer(payload)]);
        assert!(leeren(&mut rxa).is_empty(), "Sender bekommt nichts zurueck");
    }

    #[test]
    fn relay_an_unbekannten_raum_ist_noop() {
        let a = Aufbau::neu();
        let (sa, _rxa) = a.verbinden();
        let payload = SignalPayload(json!({"room": "nirgends"}));
        assert_eq!(
            a.coordinator.weiterleiten(
                SignalArt::IceCandidate,
                sa,
                &RoomKey::from("nirgends"),
                payload
            ),
            0
        );
    }

    #[test]
    fn trennen_bereinigt_und_ist_idempotent() {
        let a = Aufbau::neu();
        let (sa, mut rxa) = a.verbinden();
        let (sb, mut rxb) = a.verbinden();

        a.coordinator.beitreten(sa, r1());
        a.coordinator.beitreten(sb, r1());
        leeren(&mut rxa);
        leeren(&mut rxb);

        assert_eq!(a.coordinator.trennen(sa), vec![r1()]);
        assert_eq!(leeren(&mut rxb), vec![ServerEvent::UserLeft { user_id: sa }]);
        assert_eq!(a.coordinator.raum(&r1()).unwrap().initiator, Some(sb));
        assert!(!a.coordinator.ist_verbunden(&sa));

        assert!(a.coordinator.trennen(sa).is_empty());
        assert!(leeren(&mut rxb).is_empty());
    }

    #[test]
    fn nach_trennen_werden_ereignisse_ignoriert() {
        let a = Aufbau::neu();
        let (sa, _rxa) = a.verbinden();
        a.coordinator.trennen(sa);

        assert_eq!(a.coordinator.beitreten(sa, r1()), BeitrittsErgebnis::Ignoriert);
        assert!(a.coordinator.raum(&r1()).is_none());
    }

    #[test]
    fn clone_teilt_inneren_state() {
        let a = Aufbau::neu();
        let zweiter = a.coordinator.clone();
        let (sa, _rxa) = a.verbinden();

        a.coordinator.beitreten(sa, r1());
        assert_eq!(zweiter.raum_anzahl(), 1);
    }

    /// Zaehlt aus der Ereignisfolge nach, wie viele Mitglieder ein Peer sieht
    fn sichtbare_anzahl(events: &[ServerEvent]) -> Option<usize> {
        let mut anzahl = None;
        for event in events {
            anzahl = match (event, anzahl) {
                (ServerEvent::Joined { user_count, .. }, _) => Some(*user_count),
                (ServerEvent::UserJoined { .. }, Some(n)) => Some(n + 1),
                (ServerEvent::UserLeft { .. }, Some(n)) => Some(n - 1),
                (anderes, None) => panic!("{anderes:?} vor joined"),
                (_, n) => n,
            };
        }
        anzahl
    }

    #[test]
    fn gleichzeitiges_beitreten_und_verlassen_bleibt_konsistent() {
        for _ in 0..500 {
            let a = Aufbau::neu();
            let (sa, mut rxa) = a.verbinden();
            let (sb, mut rxb) = a.verbinden();
            a.coordinator.beitreten(sa, r1());

            let coordinator = a.coordinator.clone();
            let beitritt = std::thread::spawn(move || coordinator.beitreten(sb, r1()));
            a.coordinator.verlassen(sa, &r1());
            beitritt.join().unwrap();

            let raum = a.coordinator.raum(&r1()).unwrap();
            assert_eq!(raum.mitglieder, vec![sb]);
            assert_eq!(raum.initiator, Some(sb));

            let events_b = leeren(&mut rxb);
            assert_eq!(
                sichtbare_anzahl(&events_b),
                Some(raum.mitglieder.len()),
                "B sieht {events_b:?}"
            );

            // A hat B nur gesehen, wenn B auch A gehen sah
            let events_a = leeren(&mut rxa);
            let a_sah_b = events_a.contains(&ServerEvent::UserJoined { user_id: sb });
            let b_sah_abgang = events_b.contains(&ServerEvent::UserLeft { user_id: sa });
            assert_eq!(a_sah_b, b_sah_abgang);
        }
    }
}

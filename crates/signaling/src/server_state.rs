//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt Registry, Coordinator und Metriken als geteilte Handles, die
//! sicher zwischen tokio-Tasks geteilt werden koennen.

use std::sync::Arc;
use tandem_observability::{AuslastungsQuelle, TandemMetrics};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{SignalingError, SignalingResult};
use crate::registry::{ConnectionRegistry, SEND_QUEUE_GROESSE};
use crate::rooms::RoomCoordinator;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Maximale gleichzeitige Sitzungen
    pub max_clients: u32,
    /// Keepalive-Intervall in Sekunden (WebSocket-Ping)
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// Groesse der Send-Queue pro Sitzung
    pub send_queue_groesse: usize,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            max_clients: 1024,
            keepalive_sek: 25,
            verbindungs_timeout_sek: 60,
            send_queue_groesse: SEND_QUEUE_GROESSE,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState {
    /// Signaling-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Send-Queues und Transport-Tags aller Sitzungen
    pub registry: ConnectionRegistry,
    /// Raum-Tabelle und Relay-Logik
    pub coordinator: RoomCoordinator,
    /// Prometheus-Metriken
    pub metriken: TandemMetrics,
    /// Freie Verbindungsplaetze (`max_clients` Permits)
    verbindungs_plaetze: Arc<Semaphore>,
}

impl SignalingState {
    /// Erstellt einen neuen SignalingState
    pub fn neu(config: SignalingConfig, metriken: TandemMetrics) -> Arc<Self> {
        let registry = ConnectionRegistry::mit_queue_groesse(config.send_queue_groesse);
        let coordinator = RoomCoordinator::neu(registry.clone());
        let verbindungs_plaetze = Arc::new(Semaphore::new(config.max_clients as usize));
        Arc::new(Self {
            config: Arc::new(config),
            registry,
            coordinator,
            metriken,
            verbindungs_plaetze,
        })
    }

    /// Reserviert einen Verbindungsplatz vor dem WebSocket-Upgrade
    ///
    /// Der Platz ist belegt, solange das Permit lebt.
    pub fn platz_reservieren(&self) -> SignalingResult<OwnedSemaphorePermit> {
        Arc::clone(&self.verbindungs_plaetze)
            .try_acquire_owned()
            .map_err(|_| SignalingError::ServerVoll)
    }
}

impl AuslastungsQuelle for SignalingState {
    fn sitzungs_anzahl(&self) -> usize {
        self.registry.sitzungs_anzahl()
    }

    fn raum_anzahl(&self) -> usize {
        self.coordinator.raum_anzahl()
    }
}

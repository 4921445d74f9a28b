//! Prometheus-kompatible Metriken fuer Tandem
//!
//! Registrierte Metriken:
//! - `tandem_connected_sessions` – Gauge: Aktuell verbundene Sitzungen
//! - `tandem_active_rooms` – Gauge: Existierende Raeume (wartend oder gepaart)
//! - `tandem_relayed_messages_total` – Counter: Weitergeleitete Nachrichten (kind)
//! - `tandem_rejected_joins_total` – Counter: Abgelehnte Beitritte (Raum voll)
//!
//! Die beiden Gauges werden beim Scrape aus der `AuslastungsQuelle` gelesen.

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::health::AuslastungsQuelle;

/// Alle Tandem-Prometheus-Metriken
#[derive(Clone)]
pub struct TandemMetrics {
    pub registry: Arc<Registry>,

    pub connected_sessions: IntGauge,
    pub active_rooms: IntGauge,
    pub relayed_messages_total: IntCounterVec,
    pub rejected_joins_total: IntCounter,
}

impl TandemMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let connected_sessions = IntGauge::with_opts(Opts::new(
            "tandem_connected_sessions",
            "Anzahl aktuell verbundener Sitzungen",
        ))?;
        registry.register(Box::new(connected_sessions.clone()))?;

        let active_rooms = IntGauge::with_opts(Opts::new(
            "tandem_active_rooms",
            "Anzahl existierender Raeume",
        ))?;
        registry.register(Box::new(active_rooms.clone()))?;

        let relayed_messages_total = IntCounterVec::new(
            Opts::new(
                "tandem_relayed_messages_total",
                "Gesamtanzahl weitergeleiteter Verhandlungsnachrichten",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(relayed_messages_total.clone()))?;

        let rejected_joins_total = IntCounter::with_opts(Opts::new(
            "tandem_rejected_joins_total",
            "Gesamtanzahl abgelehnter Beitritte (Raum voll)",
        ))?;
        registry.register(Box::new(rejected_joins_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            connected_sessions,
            active_rooms,
            relayed_messages_total,
            rejected_joins_total,
        })
    }

    /// Uebernimmt die aktuelle Auslastung in die Gauges
    pub fn auslastung_uebernehmen(&self, quelle: &dyn AuslastungsQuelle) {
        self.connected_sessions.set(quelle.sitzungs_anzahl() as i64);
        self.active_rooms.set(quelle.raum_anzahl() as i64);
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[derive(Clone)]
struct MetricsState {
    metriken: TandemMetrics,
    quelle: Arc<dyn AuslastungsQuelle>,
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: TandemMetrics, quelle: Arc<dyn AuslastungsQuelle>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(MetricsState { metriken, quelle })
}

async fn metrics_handler(State(state): State<MetricsState>) -> impl IntoResponse {
    state.metriken.auslastung_uebernehmen(state.quelle.as_ref());

    match state.metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

//! Health-Check-Endpunkt fuer Tandem
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime, Sitzungs- und Raumanzahl

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Liefert die aktuelle Auslastung des Signaling-Dienstes
///
/// Wird vom Signaling-Zustand implementiert, damit dieses Crate nichts
/// ueber Raeume oder Sitzungen wissen muss.
pub trait AuslastungsQuelle: Send + Sync + 'static {
    /// Anzahl aktuell verbundener Sitzungen
    fn sitzungs_anzahl(&self) -> usize;
    /// Anzahl existierender (nicht leerer) Raeume
    fn raum_anzahl(&self) -> usize;
}

/// Status des Health-Checks
///
/// Der Dienst hat keine externen Abhaengigkeiten; solange der Endpunkt
/// antwortet, ist er gesund.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub sessions: usize,
    pub rooms: usize,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
struct HealthState {
    start_time: Instant,
    quelle: Arc<dyn AuslastungsQuelle>,
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(quelle: Arc<dyn AuslastungsQuelle>) -> Router {
    let state = HealthState {
        start_time: Instant::now(),
        quelle,
    };
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        sessions: state.quelle.sitzungs_anzahl(),
        rooms: state.quelle.raum_anzahl(),
    };

    (StatusCode::OK, Json(response))
}

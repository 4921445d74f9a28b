//! # tandem-observability
//!
//! Observability-Crate fuer Tandem:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Health-Check-Endpunkt (`/health`) mit Sitzungs- und Raumanzahl
//! - Structured Logging via tracing-subscriber (text/json)
//! - HTTP-Tracing via tower-http

pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use health::{health_router, AuslastungsQuelle, HealthResponse, HealthStatus};
pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, TandemMetrics};
pub use middleware::request_timing_layer;

use axum::Router;
use std::sync::Arc;

/// Baut den Router fuer alle Observability-Endpunkte
///
/// Endpunkte:
/// - `GET /metrics` – Prometheus scrape format
/// - `GET /health`  – Health-Check JSON
pub fn observability_router(
    quelle: Arc<dyn AuslastungsQuelle>,
    metriken: TandemMetrics,
) -> Router {
    Router::new()
        .merge(metrics_router(metriken, Arc::clone(&quelle)))
        .merge(health_router(quelle))
}

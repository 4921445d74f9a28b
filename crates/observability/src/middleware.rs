//! HTTP-Tracing fuer Axum
//!
//! Jede HTTP-Anfrage bekommt einen tower-http Span mit Methode, Pfad,
//! Status und Dauer. WebSocket-Upgrades erscheinen hier nur mit der
//! Dauer des Handshakes.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;

/// Erstellt den tower-http Trace-Layer fuer HTTP-Spans.
pub fn request_timing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

//! tandem-server – Bibliotheks-Root
//!
//! Baut aus der Konfiguration den gemeinsamen Zustand und den HTTP-Router
//! und stellt den oeffentlichen Einstiegspunkt fuer Integrationstests bereit.

pub mod config;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use axum::Router;
use config::ServerConfig;
use std::future::Future;
use std::sync::Arc;
use tandem_observability::{
    observability_router, request_timing_layer, AuslastungsQuelle, TandemMetrics,
};
use tandem_signaling::{signaling_router, SignalingState};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
    state: Arc<SignalingState>,
    shutdown_tx: watch::Sender<bool>,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Result<Self> {
        let metriken = TandemMetrics::neu().context("Metriken konnten nicht registriert werden")?;
        let state = SignalingState::neu(config.signaling_config(), metriken);
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            state,
            shutdown_tx,
        })
    }

    /// Gemeinsamer Signaling-Zustand (Registry, Coordinator, Metriken)
    pub fn state(&self) -> Arc<SignalingState> {
        Arc::clone(&self.state)
    }

    /// Baut den vollstaendigen HTTP-Router
    ///
    /// - `GET /ws` – WebSocket-Signaling
    /// - `GET /health`, `GET /metrics` – falls Observability aktiviert
    pub fn router(&self) -> Router {
        let mut router = signaling_router(self.state(), self.shutdown_tx.subscribe());

        if self.config.observability.aktiviert {
            let quelle: Arc<dyn AuslastungsQuelle> = self.state();
            router = router.merge(observability_router(quelle, self.state.metriken.clone()));
        }

        router
            .layer(self.cors_layer())
            .layer(request_timing_layer())
    }

    fn cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);
        if self.config.cors.origins.is_empty() {
            return layer.allow_origin(Any);
        }

        let origins: Vec<HeaderValue> = self
            .config
            .cors
            .origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(wert) => Some(wert),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ungueltiger CORS-Origin ignoriert");
                    None
                }
            })
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }

    /// Bindet den Listener und laeuft bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        let adresse = self.config.bind_adresse();
        let listener = TcpListener::bind(&adresse)
            .await
            .with_context(|| format!("Bind auf {adresse} fehlgeschlagen"))?;

        self.ausfuehren(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Bedient einen bereits gebundenen Listener bis `shutdown` fertig ist
    ///
    /// Beim Shutdown werden alle offenen WebSocket-Sitzungen geschlossen
    /// und bereinigt.
    pub async fn ausfuehren<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let adresse = listener.local_addr()?;
        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %adresse,
            max_clients = self.config.server.max_clients,
            observability = self.config.observability.aktiviert,
            "Server laeuft"
        );

        let router = self.router();
        let shutdown_tx = self.shutdown_tx.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown-Signal empfangen, Sitzungen werden geschlossen");
                let _ = shutdown_tx.send(true);
            })
            .await
            .context("HTTP-Server abgebrochen")?;

        tracing::info!(
            offene_sitzungen = self.state.registry.sitzungs_anzahl(),
            "Server beendet"
        );
        Ok(())
    }
}

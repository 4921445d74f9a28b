//! Session-Connection – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede WebSocket-Verbindung bekommt eine `SessionConnection` in einem
//! eigenen tokio-Task. Eingehende Frames werden der Reihe nach dekodiert
//! und an den `EventDispatcher` gegeben; ausgehende Ereignisse kommen aus
//! der Send-Queue der Registry.
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen WebSocket-Ping
//! - Kommt laenger als `verbindungs_timeout_sek` kein Frame, wird getrennt
//! - Schliesst die Registry die Send-Queue (Empfaenger ueberlastet), wird
//!   die Verbindung nach dem Leeren der Queue geschlossen
//! - Jedes Verbindungsende (Close, Fehler, Timeout, Ueberlast, Shutdown)
//!   fuehrt genau einmal zur Bereinigung via `EventDispatcher::trennen`

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tandem_core::types::SessionId;
use tandem_protocol::{decode_client_event, encode_server_event, ServerEvent};
use tokio::time::Instant;

use crate::dispatcher::EventDispatcher;
use crate::error::{SignalingError, SignalingResult};
use crate::server_state::SignalingState;

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct SessionConnection {
    state: Arc<SignalingState>,
    session_id: SessionId,
}

impl SessionConnection {
    /// Erstellt eine neue SessionConnection
    pub fn neu(state: Arc<SignalingState>, session_id: SessionId) -> Self {
        Self { state, session_id }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht.
    pub async fn verarbeiten(
        self,
        socket: WebSocket,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let session_id = self.session_id;
        let keepalive_intervall = Duration::from_secs(self.state.config.keepalive_sek.max(1));
        let timeout_dauer = Duration::from_secs(self.state.config.verbindungs_timeout_sek);

        let dispatcher = EventDispatcher::neu(Arc::clone(&self.state));
        let mut sende_rx = dispatcher.verbinden(session_id);

        let (mut sink, mut stream) = socket.split();

        let mut letzter_empfang = Instant::now();
        let mut ping_takt =
            tokio::time::interval_at(Instant::now() + keepalive_intervall, keepalive_intervall);

        let grund = loop {
            tokio::select! {
                // Eingehendes Frame vom Client
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            letzter_empfang = Instant::now();
                            match decode_client_event(&text) {
                                Ok(event) => dispatcher.dispatch(session_id, event),
                                Err(e) => {
                                    tracing::warn!(
                                        session = %session_id,
                                        fehler = %e,
                                        "Ungueltiges Frame ignoriert"
                                    );
                                }
                            }
                        }
                        Some(Ok(Message::Binary(_))) => {
                            letzter_empfang = Instant::now();
                            tracing::warn!(session = %session_id, "Binaer-Frame ignoriert");
                        }
                        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                            letzter_empfang = Instant::now();
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::debug!(session = %session_id, frame = ?frame, "Close-Frame empfangen");
                            break SignalingError::VerbindungGetrennt;
                        }
                        Some(Err(e)) => break SignalingError::WebSocket(e),
                        None => break SignalingError::VerbindungGetrennt,
                    }
                }

                // Ausgehendes Ereignis aus der Registry
                ausgehend = sende_rx.recv() => {
                    let Some(ausgehend) = ausgehend else {
                        let _ = sink.send(Message::Close(None)).await;
                        break SignalingError::Ueberlastet;
                    };
                    if let Err(e) = ereignis_senden(&mut sink, &ausgehend).await {
                        break e;
                    }
                }

                // Keepalive-Ping und Timeout-Pruefung
                _ = ping_takt.tick() => {
                    if letzter_empfang.elapsed() > timeout_dauer {
                        break SignalingError::Timeout;
                    }
                    if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                        break SignalingError::WebSocket(e);
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::debug!(session = %session_id, "Shutdown-Signal – Verbindung wird getrennt");
                        let _ = sink.send(Message::Close(None)).await;
                        break SignalingError::VerbindungGetrennt;
                    }
                }
            }
        };

        match grund {
            SignalingError::VerbindungGetrennt => {
                tracing::debug!(session = %session_id, "Verbindung beendet");
            }
            SignalingError::Timeout => {
                tracing::warn!(session = %session_id, "Verbindungs-Timeout");
            }
            andere => {
                tracing::warn!(session = %session_id, fehler = %andere, "Verbindung abgebrochen");
            }
        }

        // Cleanup beim Verbindungsende
        dispatcher.trennen(session_id);
    }
}

/// Kodiert ein Ereignis und schreibt es als Text-Frame
async fn ereignis_senden(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> SignalingResult<()> {
    let text = encode_server_event(event)?;
    sink.send(Message::Text(text)).await?;
    Ok(())
}

//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};
use tandem_core::{Result, TandemError};
use tandem_signaling::SignalingConfig;

/// Umgebungsvariable, die den Port ueberschreibt
pub const PORT_ENV: &str = "PORT";

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Signaling-Einstellungen (Keepalive, Queues)
    pub signaling: SignalingEinstellungen,
    /// CORS-Einstellungen
    pub cors: CorsEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken, Health)
    pub observability: ObservabilityEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale Anzahl gleichzeitiger Sitzungen
    pub max_clients: u32,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Tandem Signaling".into(),
            max_clients: 1024,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer HTTP und WebSocket
    pub bind_adresse: String,
    /// Port fuer HTTP und WebSocket
    pub port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// Signaling-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalingEinstellungen {
    /// Intervall der WebSocket-Pings in Sekunden
    pub keepalive_sek: u64,
    /// Stille in Sekunden, nach der eine Verbindung getrennt wird
    pub verbindungs_timeout_sek: u64,
    /// Groesse der Send-Queue pro Sitzung
    pub send_queue_groesse: usize,
}

impl Default for SignalingEinstellungen {
    fn default() -> Self {
        let standard = SignalingConfig::default();
        Self {
            keepalive_sek: standard.keepalive_sek,
            verbindungs_timeout_sek: standard.verbindungs_timeout_sek,
            send_queue_groesse: standard.send_queue_groesse,
        }
    }
}

/// CORS-Einstellungen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsEinstellungen {
    /// Erlaubte Origins (leer = alle erlaubt)
    pub origins: Vec<String>,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen (Metriken + Health-Check)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Aktiviert `/metrics` und `/health`
    pub aktiviert: bool,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self { aktiviert: true }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    ///
    /// Die Umgebungsvariable `PORT` ueberschreibt den Port aus der Datei.
    pub fn laden(pfad: &str) -> Result<Self> {
        let mut config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => Self::aus_toml(&inhalt)
                .map_err(|e| TandemError::konfiguration(format!("'{pfad}': {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Ok(port) = std::env::var(PORT_ENV) {
            config.port_ueberschreiben(&port)?;
        }

        config.validieren()?;
        Ok(config)
    }

    /// Parst eine Konfiguration aus einem TOML-String
    pub fn aus_toml(inhalt: &str) -> Result<Self> {
        toml::from_str(inhalt).map_err(|e| TandemError::konfiguration(e.to_string()))
    }

    /// Setzt den Port aus einem Text-Wert (z.B. aus der Umgebung)
    pub fn port_ueberschreiben(&mut self, wert: &str) -> Result<()> {
        let port = wert.trim().parse::<u16>().map_err(|_| {
            TandemError::konfiguration(format!("{PORT_ENV}='{wert}' ist kein gueltiger Port"))
        })?;
        self.netzwerk.port = port;
        Ok(())
    }

    /// Prueft Werte, die serde allein nicht ausschliessen kann
    pub fn validieren(&self) -> Result<()> {
        if self.server.max_clients == 0 {
            return Err(TandemError::konfiguration("server.max_clients muss > 0 sein"));
        }
        if self.signaling.keepalive_sek == 0 {
            return Err(TandemError::konfiguration("signaling.keepalive_sek muss > 0 sein"));
        }
        if self.signaling.verbindungs_timeout_sek <= self.signaling.keepalive_sek {
            return Err(TandemError::konfiguration(
                "signaling.verbindungs_timeout_sek muss groesser als keepalive_sek sein",
            ));
        }
        if !tandem_observability::logging::log_format_gueltig(&self.logging.format) {
            return Err(TandemError::konfiguration(format!(
                "logging.format '{}' unbekannt (text oder json)",
                self.logging.format
            )));
        }
        if !tandem_observability::logging::log_level_gueltig(&self.logging.level) {
            return Err(TandemError::konfiguration(format!(
                "logging.level '{}' ungueltig",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse zurueck
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port)
    }

    /// Leitet die Laufzeit-Konfiguration des Signaling-Service ab
    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            max_clients: self.server.max_clients,
            keepalive_sek: self.signaling.keepalive_sek,
            verbindungs_timeout_sek: self.signaling.verbindungs_timeout_sek,
            send_queue_groesse: self.signaling.send_queue_groesse,
        }
    }
}

//! Fehlertypen fuer Tandem
//!
//! Gemeinsame Fehlerzustaende, die ausserhalb des Signaling-Transports
//! auftreten (Konfiguration, Dateizugriff). Transport- und Protokollfehler
//! haben eigene Enums in den jeweiligen Crates.

use thiserror::Error;

/// Globaler Result-Alias fuer Tandem
pub type Result<T> = std::result::Result<T, TandemError>;

/// Gemeinsame Fehler im Tandem-System
#[derive(Debug, Error)]
pub enum TandemError {
    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Ein-/Ausgabe ---
    #[error("E/A-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

impl TandemError {
    /// Erstellt einen Konfigurationsfehler aus einer beliebigen Nachricht
    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }
}

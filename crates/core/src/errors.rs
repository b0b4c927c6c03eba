use thiserror::Error;

/// Unified error type for the entire coin-watch-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    // ── Search ──────────────────────────────────────────────────────
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Coin not found: {0}")]
    NotFound(String),

    // ── Pinned coins ────────────────────────────────────────────────
    #[error("Cannot pin {rejected}: already tracking {capacity} coins")]
    CapacityExceeded { capacity: usize, rejected: String },

    #[error("No coins were selected")]
    NothingPinned,

    #[error("Pinned coins no longer in the catalog were removed: {}", .removed.join(", "))]
    StaleReference { removed: Vec<String> },

    // ── Live report ─────────────────────────────────────────────────
    #[error("Failed to retrieve live data on the following: {}", .failed.join(", "))]
    PartialResolution { failed: Vec<String> },

    // ── Storage / Config ────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Text shown to the user in the UI region nearest to the failed action.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Network(_) | CoreError::Api { .. } => "Connection Failed!".to_string(),
            CoreError::InvalidInput(_) => "Please enter a valid search query...".to_string(),
            CoreError::NotFound(_) => {
                "The requested coin was not found. Please make sure it was typed correctly..."
                    .to_string()
            }
            CoreError::CapacityExceeded { .. } => {
                "You've reached the limit of checked coins!".to_string()
            }
            CoreError::NothingPinned => "No coins were selected!".to_string(),
            CoreError::StaleReference { .. } => {
                "Some of your checked coins from your last session were not found and therefore removed."
                    .to_string()
            }
            other => other.to_string(),
        }
    }

    /// True for failures of the transport or the upstream payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, CoreError::Network(_) | CoreError::Api { .. })
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Query strings carry the requested symbol list; keep messages short
        // and free of request parameters.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

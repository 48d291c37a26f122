use thiserror::Error;

/// Unified error type for the entire gold-rate-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// The quote-failure variants double as user-facing status text: the refresh
/// loop stores their `Display` output verbatim in `MarketSnapshot::api_error`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage ─────────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Quote upstream ──────────────────────────────────────────────
    #[error("Missing API Key")]
    MissingApiKey,

    #[error("Unauthorized (401)")]
    Unauthorized,

    #[error("Invalid Key (403)")]
    InvalidKey,

    #[error("Limit Exceeded (429)")]
    LimitExceeded,

    #[error("HTTP Error {0}")]
    Http(u16),

    #[error("Connection Timeout")]
    Timeout,

    #[error("Network Error: {0}")]
    Network(String),

    /// Upstream-reported logical failure (e.g. plan limit). The message is
    /// whatever the API put in its error envelope, surfaced verbatim.
    #[error("{0}")]
    Upstream(String),

    #[error("No Data for {0}")]
    NoData(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Unsupported karat: {0}")]
    UnsupportedKarat(u32),
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
        if e.is_timeout() {
            return CoreError::Timeout;
        }
        // Sanitize error message: strip query parameters from URLs to prevent
        // API key leakage. reqwest errors often contain full URLs with secrets.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

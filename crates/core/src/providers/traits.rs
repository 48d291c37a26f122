use async_trait::async_trait;

use crate::errors::CoreError;

/// A single upstream spot quote. Prices are USD per troy ounce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotQuote {
    pub gold_usd: f64,
    /// Some upstreams omit silver; the refresh loop then keeps the previous
    /// silver price.
    pub silver_usd: Option<f64>,
}

/// Trait abstraction for the live quote source.
///
/// The refresh loop talks only to this trait, so the HTTP service can be
/// swapped (or mocked in tests) without touching the scheduler. The API key
/// is a call argument rather than constructor state: it lives in Settings
/// and can change between ticks.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the latest gold/silver quote. Fails with one of the
    /// distinguished `CoreError` quote variants; no internal retry — the
    /// scheduler's next tick is the retry.
    async fn fetch_latest(&self, api_key: &str) -> Result<SpotQuote, CoreError>;

    /// Lightweight key validation for the admin surface.
    async fn check_key(&self, api_key: &str) -> Result<(), CoreError>;
}

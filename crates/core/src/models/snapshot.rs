use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hardcoded fallback gold price (USD per troy ounce) used before any real
/// data arrives. The refresh loop treats a snapshot still at this value as
/// "never updated" when deciding whether to synthesize on upstream failure.
pub const DEFAULT_GOLD_USD: f64 = 2500.0;

/// Hardcoded fallback silver price (USD per troy ounce).
pub const DEFAULT_SILVER_USD: f64 = 30.0;

/// The last observed market state, persisted as the `gold_data` record so a
/// restart doesn't flash defaults. Replaced wholesale on every applied tick;
/// never authoritative over a fresh tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,

    #[serde(rename = "priceSilverUSD")]
    pub price_silver_usd: f64,

    pub last_updated: DateTime<Utc>,

    /// Percent change of gold against the immediately preceding snapshot.
    pub trend: f64,

    /// Percent change of silver against the immediately preceding snapshot.
    pub trend_silver: f64,

    /// True only when the prices came from the live upstream service.
    pub is_live: bool,

    /// User-visible status text of the last upstream failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_error: Option<String>,
}

impl Default for MarketSnapshot {
    fn default() -> Self {
        Self {
            price_usd: DEFAULT_GOLD_USD,
            price_silver_usd: DEFAULT_SILVER_USD,
            last_updated: Utc::now(),
            trend: 0.0,
            trend_silver: 0.0,
            is_live: false,
            api_error: None,
        }
    }
}

impl MarketSnapshot {
    /// A snapshot carrying the operator's manual overrides. Trends are reset
    /// and any stale error is cleared.
    pub fn manual(gold_usd: f64, silver_usd: f64) -> Self {
        Self {
            price_usd: gold_usd,
            price_silver_usd: silver_usd,
            last_updated: Utc::now(),
            trend: 0.0,
            trend_silver: 0.0,
            is_live: false,
            api_error: None,
        }
    }

    /// Whether both prices still sit at their hardcoded defaults.
    pub fn is_at_defaults(&self) -> bool {
        self.price_usd == DEFAULT_GOLD_USD && self.price_silver_usd == DEFAULT_SILVER_USD
    }
}

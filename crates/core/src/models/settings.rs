use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::errors::CoreError;

/// Gold purities the pricing grid supports, in display order.
pub const KARATS: [u32; 4] = [24, 22, 21, 18];

/// PIN used for admin access when the stored one is absent or empty.
pub const DEFAULT_ADMIN_PIN: &str = "123456";

/// A regional making-charge row shown under the price grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    /// Unique row id. Default rows use "1".."8"; new rows get a UUID.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub charge_type: ChargeType,
    pub value: f64,
    /// Free-form display text (e.g. "4.5 - 3.8"). When present it is shown
    /// instead of `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl Charge {
    /// Create a new charge row with a fresh unique id.
    pub fn new(name: impl Into<String>, charge_type: ChargeType, value: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            charge_type,
            value,
            subtitle: None,
        }
    }

    /// Attach a display subtitle.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    fn seeded(id: &str, name: &str, value: f64, subtitle: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            charge_type: ChargeType::Fixed,
            value,
            subtitle: Some(subtitle.to_string()),
        }
    }
}

/// How a charge's `value` is meant to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeType {
    Fixed,
    Percent,
}

impl std::fmt::Display for ChargeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChargeType::Fixed => write!(f, "fixed"),
            ChargeType::Percent => write!(f, "percent"),
        }
    }
}

/// Display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

/// User-configurable settings, persisted as the `gold_settings` record.
///
/// Serialized with the stored record's camelCase field names, so blobs
/// written by earlier builds load unchanged. Mutated only by replacing the
/// whole object through `GoldRateDashboard::update_settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub api_key: String,

    /// When true, quotes are synthesized instead of fetched upstream.
    pub is_demo_mode: bool,

    /// When true, the quote source is bypassed entirely and the manual
    /// overrides below are authoritative.
    pub use_manual_price: bool,

    #[serde(rename = "manualPriceUSD")]
    pub manual_price_usd: f64,

    #[serde(rename = "manualPriceSilverUSD")]
    pub manual_price_silver_usd: f64,

    /// Multiplier from USD/troy-ounce to the local 10-Tola base unit.
    /// Invariant: > 0.
    pub currency_conversion: f64,

    pub currency_symbol: String,

    pub charges: Vec<Charge>,

    pub show_making_charges: bool,

    /// Visibility toggle for the premium inputs in the admin surface.
    /// The per-karat premiums are applied to the grid regardless.
    pub enable_premium_markup: bool,

    /// Per-gram premium per karat. Always holds one entry per supported
    /// karat; loading fills missing karats with 0.
    pub premium_markup_values: BTreeMap<u32, f64>,

    #[serde(rename = "premium10Tola")]
    pub premium_10_tola: f64,

    /// Present in the admin surface but not part of the posted Ginni rate.
    pub premium_ginni: f64,

    pub auto_rotate_language: bool,

    /// Language rotation period in seconds. Invariant: > 0.
    pub rotate_interval: u64,

    /// Refresh period in seconds. A 5 s floor is applied at scheduling time.
    pub fetch_interval: u64,

    pub theme: Theme,

    /// Empty falls back to `DEFAULT_ADMIN_PIN` at verification time.
    pub admin_pin: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            is_demo_mode: false,
            use_manual_price: false,
            manual_price_usd: 2500.0,
            manual_price_silver_usd: 30.0,
            currency_conversion: 1.4485,
            currency_symbol: "OMR".to_string(),
            charges: Settings::default_charges(),
            show_making_charges: true,
            enable_premium_markup: true,
            premium_markup_values: KARATS.iter().map(|&k| (k, 0.0)).collect(),
            premium_10_tola: 6.0,
            premium_ginni: 0.0,
            auto_rotate_language: false,
            rotate_interval: 5,
            fetch_interval: 120,
            theme: Theme::Dark,
            admin_pin: DEFAULT_ADMIN_PIN.to_string(),
        }
    }
}

impl Settings {
    /// The eight region rows a fresh install starts with.
    pub fn default_charges() -> Vec<Charge> {
        vec![
            Charge::seeded("1", "TURKISH", 4.5, "4.5 - 3.8"),
            Charge::seeded("2", "SAUDI", 4.8, "4.8 - 4"),
            Charge::seeded("3", "SINGAPORE", 3.5, "3.5 - 3"),
            Charge::seeded("4", "OMANI", 3.5, "3.5 - 3"),
            Charge::seeded("5", "EMIRATI", 3.8, "3.8 - 2.8"),
            Charge::seeded("6", "INDIAN", 4.0, "4 - 3.5"),
            Charge::seeded("7", "BAHRAINI", 4.0, "4 - 3.5"),
            Charge::seeded("8", "KHWATI", 4.0, "4 - 3.5"),
        ]
    }

    /// Reject configurations that would break the pipeline's invariants.
    /// Called at the edit boundary, before anything is persisted; stored
    /// records are never validated on load.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.currency_conversion.is_finite() && self.currency_conversion > 0.0) {
            return Err(CoreError::ValidationError(format!(
                "currencyConversion must be a positive number, got {}",
                self.currency_conversion
            )));
        }
        if self.rotate_interval == 0 {
            return Err(CoreError::ValidationError(
                "rotateInterval must be greater than zero".into(),
            ));
        }
        if self.fetch_interval == 0 {
            return Err(CoreError::ValidationError(
                "fetchInterval must be greater than zero".into(),
            ));
        }
        for price in [self.manual_price_usd, self.manual_price_silver_usd] {
            if !(price.is_finite() && price >= 0.0) {
                return Err(CoreError::ValidationError(format!(
                    "manual prices must be finite and non-negative, got {price}"
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for charge in &self.charges {
            if charge.id.trim().is_empty() {
                return Err(CoreError::ValidationError(
                    "charge id must not be empty".into(),
                ));
            }
            if charge.name.trim().is_empty() {
                return Err(CoreError::ValidationError(format!(
                    "charge '{}' has an empty name",
                    charge.id
                )));
            }
            if !seen.insert(charge.id.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "duplicate charge id '{}'",
                    charge.id
                )));
            }
        }

        Ok(())
    }

    /// The admin PIN in effect: the stored one, or the default when the
    /// stored one is empty.
    pub fn effective_admin_pin(&self) -> &str {
        if self.admin_pin.is_empty() {
            DEFAULT_ADMIN_PIN
        } else {
            &self.admin_pin
        }
    }
}

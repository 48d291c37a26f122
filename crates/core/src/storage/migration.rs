use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::settings::{Charge, Settings, Theme, KARATS};

/// Permissive mirror of `Settings` used only on the load path: every field
/// is optional, unknown fields are ignored, and the legacy single-scalar
/// premium is still accepted. `migrate` turns any instance of this into a
/// complete `Settings`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub is_demo_mode: Option<bool>,
    #[serde(default)]
    pub use_manual_price: Option<bool>,
    #[serde(default, rename = "manualPriceUSD")]
    pub manual_price_usd: Option<f64>,
    #[serde(default, rename = "manualPriceSilverUSD")]
    pub manual_price_silver_usd: Option<f64>,
    #[serde(default)]
    pub currency_conversion: Option<f64>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub charges: Option<Vec<Charge>>,
    #[serde(default)]
    pub show_making_charges: Option<bool>,
    #[serde(default)]
    pub enable_premium_markup: Option<bool>,
    /// Superseded single-scalar premium from records written before the
    /// per-karat map existed.
    #[serde(default)]
    pub premium_markup_value: Option<f64>,
    #[serde(default)]
    pub premium_markup_values: Option<BTreeMap<u32, f64>>,
    #[serde(default, rename = "premium10Tola")]
    pub premium_10_tola: Option<f64>,
    #[serde(default)]
    pub premium_ginni: Option<f64>,
    #[serde(default)]
    pub auto_rotate_language: Option<bool>,
    #[serde(default)]
    pub rotate_interval: Option<u64>,
    #[serde(default)]
    pub fetch_interval: Option<u64>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub admin_pin: Option<String>,
}

/// Total migration from a stored record of any vintage to a complete
/// `Settings`. Applied on every load, in this order:
///
/// 1. If the per-karat premium map is absent but the legacy scalar is
///    present, the scalar becomes the premium of every supported karat.
/// 2. The loaded per-karat map is merged over a fully-populated default map,
///    so missing karats exist with 0 while present ones keep their exact
///    values.
/// 3. Every other field default-fills only when the record omits it; loaded
///    values always win over defaults.
pub fn migrate(raw: RawSettings) -> Settings {
    let defaults = Settings::default();

    let loaded_premiums = match (raw.premium_markup_values, raw.premium_markup_value) {
        (Some(map), _) => map,
        (None, Some(scalar)) => KARATS.iter().map(|&k| (k, scalar)).collect(),
        (None, None) => BTreeMap::new(),
    };

    let mut premium_markup_values: BTreeMap<u32, f64> =
        KARATS.iter().map(|&k| (k, 0.0)).collect();
    premium_markup_values.extend(loaded_premiums);

    Settings {
        api_key: raw.api_key.unwrap_or(defaults.api_key),
        is_demo_mode: raw.is_demo_mode.unwrap_or(defaults.is_demo_mode),
        use_manual_price: raw.use_manual_price.unwrap_or(defaults.use_manual_price),
        manual_price_usd: raw.manual_price_usd.unwrap_or(defaults.manual_price_usd),
        manual_price_silver_usd: raw
            .manual_price_silver_usd
            .unwrap_or(defaults.manual_price_silver_usd),
        currency_conversion: raw
            .currency_conversion
            .unwrap_or(defaults.currency_conversion),
        currency_symbol: raw.currency_symbol.unwrap_or(defaults.currency_symbol),
        charges: raw.charges.unwrap_or(defaults.charges),
        show_making_charges: raw
            .show_making_charges
            .unwrap_or(defaults.show_making_charges),
        enable_premium_markup: raw
            .enable_premium_markup
            .unwrap_or(defaults.enable_premium_markup),
        premium_markup_values,
        premium_10_tola: raw.premium_10_tola.unwrap_or(defaults.premium_10_tola),
        premium_ginni: raw.premium_ginni.unwrap_or(defaults.premium_ginni),
        auto_rotate_language: raw
            .auto_rotate_language
            .unwrap_or(defaults.auto_rotate_language),
        rotate_interval: raw.rotate_interval.unwrap_or(defaults.rotate_interval),
        fetch_interval: raw.fetch_interval.unwrap_or(defaults.fetch_interval),
        theme: raw.theme.unwrap_or(defaults.theme),
        admin_pin: raw.admin_pin.unwrap_or(defaults.admin_pin),
    }
}

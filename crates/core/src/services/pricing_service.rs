use crate::errors::CoreError;
use crate::models::settings::{Charge, Settings, KARATS};
use super::locale_service::{Language, LocaleService};

/// Grams in the "10 Tola" bulk-pricing unit.
pub const GRAMS_PER_TEN_TOLA: f64 = 116.64;

/// The Ginni coin weighs eight grams and is priced at 21-karat purity.
pub const GINNI_GRAMS: f64 = 8.0;
const GINNI_PURITY: f64 = 0.875;

/// Derives every display price from a spot quote and the current settings.
///
/// Pure and deterministic: no caching, no hidden state. Callers recompute on
/// every read, which keeps the derived values trivially consistent with
/// whatever Settings/MarketSnapshot pair they hold.
pub struct PricingService;

impl PricingService {
    pub fn new() -> Self {
        Self
    }

    /// Purity factor for a supported karat.
    pub fn karat_factor(&self, karat: u32) -> Result<f64, CoreError> {
        match karat {
            24 => Ok(1.0),
            22 => Ok(0.916),
            21 => Ok(0.875),
            18 => Ok(0.750),
            other => Err(CoreError::UnsupportedKarat(other)),
        }
    }

    /// 10 Tola in local currency, before any premium.
    pub fn ten_tola_base(&self, price_usd: f64, settings: &Settings) -> f64 {
        price_usd * settings.currency_conversion
    }

    /// 24-karat price of one gram: the 10-Tola base spread over 116.64 g.
    pub fn base_per_gram(&self, price_usd: f64, settings: &Settings) -> f64 {
        self.ten_tola_base(price_usd, settings) / GRAMS_PER_TEN_TOLA
    }

    /// Displayed per-gram price for a karat.
    ///
    /// The per-karat premium is added whenever one is configured;
    /// `enable_premium_markup` only hides the admin inputs, it does not gate
    /// the calculation.
    pub fn per_gram_price(
        &self,
        price_usd: f64,
        settings: &Settings,
        karat: u32,
    ) -> Result<f64, CoreError> {
        let factor = self.karat_factor(karat)?;
        let premium = settings
            .premium_markup_values
            .get(&karat)
            .copied()
            .unwrap_or(0.0);
        Ok(self.base_per_gram(price_usd, settings) * factor + premium)
    }

    /// Displayed 10-Tola price: base plus its flat premium.
    pub fn ten_tola_price(&self, price_usd: f64, settings: &Settings) -> f64 {
        self.ten_tola_base(price_usd, settings) + settings.premium_10_tola
    }

    /// Displayed Ginni price: eight grams at 21-karat purity, rounded half-up
    /// to a whole unit. The posted rate carries no premium of any kind —
    /// `premium_ginni` is deliberately not part of this formula.
    pub fn ginni_price(&self, price_usd: f64, settings: &Settings) -> i64 {
        (self.base_per_gram(price_usd, settings) * GINNI_PURITY * GINNI_GRAMS).round() as i64
    }

    /// Every supported karat with its per-gram price, in display order.
    pub fn karat_grid(&self, price_usd: f64, settings: &Settings) -> Vec<(u32, f64)> {
        KARATS
            .iter()
            .filter_map(|&karat| {
                self.per_gram_price(price_usd, settings, karat)
                    .ok()
                    .map(|price| (karat, price))
            })
            .collect()
    }

    /// What a charge row displays: its subtitle when present, otherwise its
    /// raw numeric value — either way with localized digits.
    pub fn charge_display_value(
        &self,
        locale: &LocaleService,
        charge: &Charge,
        language: Language,
    ) -> String {
        match charge.subtitle.as_deref().filter(|s| !s.is_empty()) {
            Some(subtitle) => locale.localize_digits(subtitle, language),
            None => locale.format_number(charge.value, language),
        }
    }
}

impl Default for PricingService {
    fn default() -> Self {
        Self::new()
    }
}

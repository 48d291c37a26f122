use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use super::traits::{QuoteProvider, SpotQuote};

const BASE_URL: &str = "https://api.metalpriceapi.com/v1";

/// Relay paths tried, in order, when the direct call is unreachable.
/// Each wraps the percent-encoded target URL.
const RELAY_PREFIXES: [&str; 2] = [
    "https://corsproxy.io/?",
    "https://api.allorigins.win/raw?url=",
];

/// Per-attempt HTTP timeout. Three attempts keep the whole fetch bounded.
#[cfg(not(target_arch = "wasm32"))]
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// MetalPriceAPI provider for gold (XAU) and silver (XAG) spot prices.
///
/// - **Contract**: `/v1/latest?api_key=…&base=USD&currencies=XAU,XAG`
///   returns rates relative to USD; price per ounce is `1 / rate`.
/// - **Reachability**: direct call first, then two relay paths; the first
///   response wins, all three failing collapses to one network error.
/// - **No retry**: a failed tick is retried by the scheduler's next tick.
pub struct MetalPriceApiProvider {
    client: Client,
}

impl MetalPriceApiProvider {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(REQUEST_TIMEOUT);
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    /// Try direct, then each relay in order. Any HTTP response (including a
    /// non-2xx status) ends the cascade so API errors can be mapped; only
    /// transport failures move on to the next path.
    async fn robust_get(&self, url: &str) -> Result<reqwest::Response, CoreError> {
        let mut last_error: Option<CoreError> = None;

        match self.client.get(url).send().await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                log::debug!("direct quote fetch failed: {e}");
                last_error = Some(e.into());
            }
        }

        for prefix in RELAY_PREFIXES {
            let relay_url = format!("{prefix}{}", percent_encode(url));
            match self.client.get(&relay_url).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    log::debug!("relay quote fetch failed: {e}");
                    last_error = Some(e.into());
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::Timeout))
    }
}

impl Default for MetalPriceApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── MetalPriceAPI response types ────────────────────────────────────

#[derive(Deserialize)]
struct LatestResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl LatestResponse {
    /// The upstream's own failure reason, surfaced verbatim to the user.
    fn upstream_reason(&self) -> String {
        self.error
            .as_ref()
            .and_then(|e| e.kind.clone().or_else(|| e.info.clone()))
            .unwrap_or_else(|| "API Error".to_string())
    }
}

fn status_error(status: StatusCode) -> CoreError {
    match status.as_u16() {
        401 => CoreError::Unauthorized,
        403 => CoreError::InvalidKey,
        429 => CoreError::LimitExceeded,
        s => CoreError::Http(s),
    }
}

/// Invert an upstream rate into a per-ounce price, rejecting rates that
/// would produce a non-finite or non-positive price.
fn invert_rate(rate: f64) -> Option<f64> {
    if rate.is_finite() && rate > 0.0 {
        Some(1.0 / rate)
    } else {
        None
    }
}

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for MetalPriceApiProvider {
    fn name(&self) -> &str {
        "MetalPriceAPI"
    }

    async fn fetch_latest(&self, api_key: &str) -> Result<SpotQuote, CoreError> {
        if api_key.is_empty() {
            return Err(CoreError::MissingApiKey);
        }

        let url = format!("{BASE_URL}/latest?api_key={api_key}&base=USD&currencies=XAU,XAG");
        let resp = self.robust_get(&url).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body: LatestResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::Malformed(format!("failed to parse latest rates: {e}")))?;

        if body.success == Some(false) {
            return Err(CoreError::Upstream(body.upstream_reason()));
        }

        let rates = body
            .rates
            .ok_or_else(|| CoreError::NoData("XAU".to_string()))?;

        let gold_usd = rates
            .get("XAU")
            .copied()
            .and_then(invert_rate)
            .ok_or_else(|| CoreError::NoData("XAU".to_string()))?;

        // Silver is best-effort: an absent or bogus XAG rate is not an error.
        let silver_usd = rates.get("XAG").copied().and_then(invert_rate);

        Ok(SpotQuote {
            gold_usd,
            silver_usd,
        })
    }

    async fn check_key(&self, api_key: &str) -> Result<(), CoreError> {
        if api_key.is_empty() {
            return Err(CoreError::MissingApiKey);
        }

        // Lightweight probe: ask for USD against USD just to validate the key.
        let url = format!("{BASE_URL}/latest?api_key={api_key}&base=USD&currencies=USD");
        let resp = self.robust_get(&url).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body: LatestResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::Malformed(format!("failed to parse key check: {e}")))?;

        if body.success == Some(false) {
            return Err(CoreError::Upstream(body.upstream_reason()));
        }

        Ok(())
    }
}

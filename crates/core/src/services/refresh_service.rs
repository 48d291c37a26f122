use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::models::settings::Settings;
use crate::models::snapshot::MarketSnapshot;
use crate::providers::metal_price_api::MetalPriceApiProvider;
use crate::providers::synthetic::{
    generate_synthetic_quote, DEMO_FETCH_DELAY_MS, DEMO_GOLD_BASE, DEMO_GOLD_VOLATILITY,
    DEMO_SILVER_BASE, DEMO_SILVER_VOLATILITY,
};
use crate::providers::traits::QuoteProvider;
use crate::storage::manager::ConfigStore;
use crate::{read_lock, write_lock};

/// Floor applied to the configured fetch interval at scheduling time.
pub const MIN_FETCH_INTERVAL_SECS: u64 = 5;

/// How old default-valued price data must be before an upstream failure is
/// allowed to fall back to synthetic generation.
const STALE_AFTER_HOURS: i64 = 1;

/// Result of one refresh tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The snapshot was replaced with this value.
    Applied(MarketSnapshot),
    /// A fetch was already in flight; nothing changed.
    Skipped,
}

/// Executes refresh ticks: picks the quote path (manual / demo / live),
/// applies the fallback policy, and produces the next `MarketSnapshot`.
///
/// At most one fetch is in flight at a time; a tick arriving while the
/// previous one is unresolved is dropped, so snapshot writes never
/// interleave.
pub struct RefreshService {
    provider: Arc<dyn QuoteProvider>,
    in_flight: AtomicBool,
}

impl RefreshService {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            provider,
            in_flight: AtomicBool::new(false),
        }
    }

    /// A service backed by the real MetalPriceAPI upstream.
    pub fn live() -> Self {
        Self::new(Arc::new(MetalPriceApiProvider::new()))
    }

    /// The quote provider, for collaborators that need direct access
    /// (e.g. the admin key check).
    pub fn provider(&self) -> Arc<dyn QuoteProvider> {
        Arc::clone(&self.provider)
    }

    /// Run one tick against the given settings and the previous snapshot.
    ///
    /// Manual mode short-circuits before the in-flight guard: it involves no
    /// fetch, so it must never be blocked by (or block) one.
    pub async fn tick(&self, settings: &Settings, prev: &MarketSnapshot) -> TickOutcome {
        if settings.use_manual_price {
            return TickOutcome::Applied(MarketSnapshot::manual(
                settings.manual_price_usd,
                settings.manual_price_silver_usd,
            ));
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return TickOutcome::Skipped;
        }

        let (new_gold, new_silver, is_live, api_error) = if settings.is_demo_mode {
            // Simulate network latency so demo mode paces like the real thing.
            tokio::time::sleep(Duration::from_millis(DEMO_FETCH_DELAY_MS)).await;
            (
                generate_synthetic_quote(prev.price_usd, DEMO_GOLD_BASE, DEMO_GOLD_VOLATILITY),
                generate_synthetic_quote(
                    prev.price_silver_usd,
                    DEMO_SILVER_BASE,
                    DEMO_SILVER_VOLATILITY,
                ),
                false,
                None,
            )
        } else {
            match self.provider.fetch_latest(&settings.api_key).await {
                Ok(quote) => (
                    quote.gold_usd,
                    // Keep the previous silver price when the response omits it.
                    quote.silver_usd.unwrap_or(prev.price_silver_usd),
                    true,
                    None,
                ),
                Err(e) => {
                    let reason = e.to_string();
                    log::warn!("quote fetch failed ({}): {reason}", self.provider.name());

                    let stale = prev.last_updated < Utc::now() - chrono::Duration::hours(STALE_AFTER_HOURS);
                    if prev.is_at_defaults() && stale {
                        // Nothing real was ever shown and even the defaults
                        // are old: synthesize so the user sees movement.
                        (
                            generate_synthetic_quote(
                                prev.price_usd,
                                DEMO_GOLD_BASE,
                                DEMO_GOLD_VOLATILITY,
                            ),
                            generate_synthetic_quote(
                                prev.price_silver_usd,
                                DEMO_SILVER_BASE,
                                DEMO_SILVER_VOLATILITY,
                            ),
                            false,
                            Some(reason),
                        )
                    } else {
                        // Valid data on screen: never overwrite it with noise.
                        (prev.price_usd, prev.price_silver_usd, false, Some(reason))
                    }
                }
            }
        };

        self.in_flight.store(false, Ordering::SeqCst);

        TickOutcome::Applied(MarketSnapshot {
            price_usd: new_gold,
            price_silver_usd: new_silver,
            last_updated: Utc::now(),
            trend: percent_change(prev.price_usd, new_gold),
            trend_silver: percent_change(prev.price_silver_usd, new_silver),
            is_live,
            api_error,
        })
    }
}

/// Trend against the immediately preceding value; a zero base yields zero
/// rather than a division blowup.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Everything a scheduled tick needs, cloneable into the spawned task.
/// Settings and snapshot stay single-writer: the facade writes settings,
/// ticks write the snapshot.
#[derive(Clone)]
pub struct RefreshContext {
    pub settings: Arc<RwLock<Settings>>,
    pub snapshot: Arc<RwLock<MarketSnapshot>>,
    pub service: Arc<RefreshService>,
    pub store: Arc<ConfigStore>,
}

/// Run one tick against the shared records: read the latest settings and
/// previous snapshot, apply the outcome, persist it. Manual-mode snapshots
/// are fully derived from Settings, so persisting them is skipped.
pub async fn run_tick(ctx: &RefreshContext) -> TickOutcome {
    let settings = read_lock(&ctx.settings).clone();
    let prev = read_lock(&ctx.snapshot).clone();

    match ctx.service.tick(&settings, &prev).await {
        TickOutcome::Applied(next) => {
            *write_lock(&ctx.snapshot) = next.clone();
            if !settings.use_manual_price {
                ctx.store.save_snapshot(&next);
            }
            log::debug!(
                "refresh tick applied: gold={:.2} silver={:.2} live={}",
                next.price_usd,
                next.price_silver_usd,
                next.is_live
            );
            TickOutcome::Applied(next)
        }
        TickOutcome::Skipped => {
            log::debug!("refresh tick skipped: fetch already in flight");
            TickOutcome::Skipped
        }
    }
}

/// The periodic driver: a cancellable repeating task whose first tick fires
/// immediately and whose period is the configured interval floored at
/// `MIN_FETCH_INTERVAL_SECS`.
pub struct RefreshScheduler {
    ctx: RefreshContext,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(ctx: RefreshContext) -> Self {
        Self { ctx, handle: None }
    }

    pub fn context(&self) -> &RefreshContext {
        &self.ctx
    }

    /// Cancel any pending timer and start a fresh cadence with an immediate
    /// first tick. Must be called from within a tokio runtime.
    pub fn reschedule(&mut self, interval_secs: u64) {
        self.cancel();

        let ctx = self.ctx.clone();
        let period = Duration::from_secs(interval_secs.max(MIN_FETCH_INTERVAL_SECS));
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                run_tick(&ctx).await;
            }
        }));
        log::debug!("refresh scheduler running every {}s", period.as_secs());
    }

    /// Fire one tick outside the periodic cadence (e.g. when leaving manual
    /// mode). No-op outside a tokio runtime.
    pub fn trigger_once(&self) {
        if tokio::runtime::Handle::try_current().is_err() {
            return;
        }
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            run_tick(&ctx).await;
        });
    }

    /// Abort the pending periodic task. An in-flight fetch inside a running
    /// tick is not interrupted; its snapshot write is last-write-wins.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("refresh scheduler cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

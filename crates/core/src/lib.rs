pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use errors::CoreError;
use models::settings::{Charge, Settings};
use models::snapshot::MarketSnapshot;
use providers::traits::QuoteProvider;
use services::locale_service::{Language, LanguageRotator, LocaleService};
use services::pricing_service::PricingService;
use services::refresh_service::{
    run_tick, RefreshContext, RefreshScheduler, RefreshService, TickOutcome,
};
use storage::manager::ConfigStore;

/// Acquire a read guard, recovering from a poisoned lock. Writers never
/// leave the records in a torn state (whole-object replace), so the value
/// behind a poisoned lock is still coherent.
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Main entry point for the Gold Rate core library.
///
/// Owns the persisted Settings record, the live MarketSnapshot, the display
/// language, and the services that operate on them. Rendering code receives
/// read views from here — there is no ambient global state.
///
/// Single-writer ownership: Settings are written only through
/// `update_settings`, the snapshot only by refresh ticks, the language by
/// the toggle/rotator. Everything else reads.
#[must_use]
pub struct GoldRateDashboard {
    settings: Arc<RwLock<Settings>>,
    snapshot: Arc<RwLock<MarketSnapshot>>,
    language: Arc<RwLock<Language>>,
    store: Arc<ConfigStore>,
    refresh_service: Arc<RefreshService>,
    ctx: RefreshContext,
    scheduler: RefreshScheduler,
    rotator: LanguageRotator,
    pricing_service: PricingService,
    locale_service: LocaleService,
    is_admin: bool,
}

impl std::fmt::Debug for GoldRateDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoldRateDashboard")
            .field("settings", &*read_lock(&self.settings))
            .field("snapshot", &*read_lock(&self.snapshot))
            .field("language", &*read_lock(&self.language))
            .field("scheduler_running", &self.scheduler.is_running())
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

impl GoldRateDashboard {
    /// Build against the live MetalPriceAPI upstream.
    pub fn new(store: ConfigStore) -> Self {
        Self::build(store, Arc::new(RefreshService::live()))
    }

    /// Build with a custom quote provider (tests, alternative upstreams).
    pub fn with_provider(store: ConfigStore, provider: Arc<dyn QuoteProvider>) -> Self {
        Self::build(store, Arc::new(RefreshService::new(provider)))
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Begin periodic refresh (immediate first tick) and, if configured,
    /// language rotation. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        let settings = self.settings();
        self.scheduler.reschedule(settings.fetch_interval);
        self.rotator.apply(
            Arc::clone(&self.language),
            settings.auto_rotate_language,
            settings.rotate_interval,
        );
    }

    /// Cancel both recurring tasks. An in-flight fetch is not interrupted;
    /// its snapshot write is last-write-wins.
    pub fn stop(&mut self) {
        self.scheduler.cancel();
        self.rotator.cancel();
    }

    /// Whether the periodic refresh is currently scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Run one refresh tick right now, outside the periodic cadence.
    pub async fn refresh(&self) -> TickOutcome {
        run_tick(&self.ctx).await
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Current settings (cloned read view).
    #[must_use]
    pub fn settings(&self) -> Settings {
        read_lock(&self.settings).clone()
    }

    /// Replace the whole Settings record: validate, swap, persist, and apply
    /// the side effects a source change demands.
    ///
    /// - Switching manual mode ON rewrites the snapshot from the overrides
    ///   immediately (trends reset, stale errors cleared).
    /// - Switching manual mode OFF fires one extra immediate tick on top of
    ///   the rescheduled cadence.
    /// - Changing the fetch interval, API key, demo flag, or manual flag
    ///   cancels the pending timer and reschedules with a fresh immediate
    ///   tick.
    /// - Changing rotation settings restarts the language rotator.
    pub fn update_settings(&mut self, new_settings: Settings) -> Result<(), CoreError> {
        new_settings.validate()?;

        let old = {
            let mut guard = write_lock(&self.settings);
            std::mem::replace(&mut *guard, new_settings.clone())
        };
        self.store.save_settings(&new_settings);

        if new_settings.use_manual_price {
            *write_lock(&self.snapshot) = MarketSnapshot::manual(
                new_settings.manual_price_usd,
                new_settings.manual_price_silver_usd,
            );
        }

        if self.scheduler.is_running() {
            let source_changed = old.fetch_interval != new_settings.fetch_interval
                || old.api_key != new_settings.api_key
                || old.is_demo_mode != new_settings.is_demo_mode
                || old.use_manual_price != new_settings.use_manual_price;
            if source_changed {
                self.scheduler.reschedule(new_settings.fetch_interval);
            }
            if old.use_manual_price && !new_settings.use_manual_price {
                self.scheduler.trigger_once();
            }

            let rotation_changed = old.auto_rotate_language != new_settings.auto_rotate_language
                || old.rotate_interval != new_settings.rotate_interval;
            if rotation_changed {
                self.rotator.apply(
                    Arc::clone(&self.language),
                    new_settings.auto_rotate_language,
                    new_settings.rotate_interval,
                );
            }
        }

        Ok(())
    }

    // ── Snapshot & derived prices ───────────────────────────────────

    /// Latest market snapshot (cloned read view).
    #[must_use]
    pub fn snapshot(&self) -> MarketSnapshot {
        read_lock(&self.snapshot).clone()
    }

    /// Per-gram display price for a karat, recomputed from the current
    /// snapshot and settings.
    pub fn per_gram_price(&self, karat: u32) -> Result<f64, CoreError> {
        let snapshot = self.snapshot();
        let settings = self.settings();
        self.pricing_service
            .per_gram_price(snapshot.price_usd, &settings, karat)
    }

    /// The full karat grid in display order.
    #[must_use]
    pub fn karat_grid(&self) -> Vec<(u32, f64)> {
        let snapshot = self.snapshot();
        let settings = self.settings();
        self.pricing_service
            .karat_grid(snapshot.price_usd, &settings)
    }

    /// Displayed 10-Tola price (base plus flat premium).
    #[must_use]
    pub fn ten_tola_price(&self) -> f64 {
        let snapshot = self.snapshot();
        let settings = self.settings();
        self.pricing_service
            .ten_tola_price(snapshot.price_usd, &settings)
    }

    /// Displayed Ginni price, rounded to a whole unit.
    #[must_use]
    pub fn ginni_price(&self) -> i64 {
        let snapshot = self.snapshot();
        let settings = self.settings();
        self.pricing_service
            .ginni_price(snapshot.price_usd, &settings)
    }

    /// What a charge row displays in the current language.
    #[must_use]
    pub fn charge_display_value(&self, charge: &Charge) -> String {
        self.pricing_service
            .charge_display_value(&self.locale_service, charge, self.language())
    }

    // ── Language & formatting ───────────────────────────────────────

    #[must_use]
    pub fn language(&self) -> Language {
        *read_lock(&self.language)
    }

    pub fn toggle_language(&self) {
        let mut guard = write_lock(&self.language);
        *guard = guard.toggle();
    }

    /// Stringify a value with the current language's digit glyphs.
    #[must_use]
    pub fn format_number(&self, value: impl std::fmt::Display) -> String {
        self.locale_service.format_number(value, self.language())
    }

    // ── Admin ───────────────────────────────────────────────────────

    /// Check a PIN against the configured admin PIN (empty stored PIN falls
    /// back to the default). Grants admin on match.
    pub fn verify_admin(&mut self, pin: &str) -> bool {
        let ok = pin == self.settings().effective_admin_pin();
        if ok {
            self.is_admin = true;
        }
        ok
    }

    pub fn logout_admin(&mut self) {
        self.is_admin = false;
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Validate an API key against the upstream without touching any state.
    pub async fn check_api_key(&self, api_key: &str) -> Result<(), CoreError> {
        self.refresh_service.provider().check_key(api_key).await
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(store: ConfigStore, refresh_service: Arc<RefreshService>) -> Self {
        let settings = store.load_settings();

        // Manual mode wins immediately; otherwise restore the last known
        // snapshot so a restart doesn't flash defaults.
        let snapshot = if settings.use_manual_price {
            MarketSnapshot::manual(settings.manual_price_usd, settings.manual_price_silver_usd)
        } else {
            store.load_snapshot().unwrap_or_default()
        };

        let settings = Arc::new(RwLock::new(settings));
        let snapshot = Arc::new(RwLock::new(snapshot));
        let language = Arc::new(RwLock::new(Language::En));
        let store = Arc::new(store);

        let ctx = RefreshContext {
            settings: Arc::clone(&settings),
            snapshot: Arc::clone(&snapshot),
            service: Arc::clone(&refresh_service),
            store: Arc::clone(&store),
        };
        let scheduler = RefreshScheduler::new(ctx.clone());

        Self {
            settings,
            snapshot,
            language,
            store,
            refresh_service,
            ctx,
            scheduler,
            rotator: LanguageRotator::new(),
            pricing_service: PricingService::new(),
            locale_service: LocaleService::new(),
            is_admin: false,
        }
    }
}

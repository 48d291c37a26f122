use rand::Rng;

/// Demo-mode gold baseline, USD per troy ounce.
pub const DEMO_GOLD_BASE: f64 = 2500.0;
/// Demo-mode silver baseline, USD per troy ounce.
pub const DEMO_SILVER_BASE: f64 = 30.0;
/// Per-tick gold jitter width.
pub const DEMO_GOLD_VOLATILITY: f64 = 5.0;
/// Per-tick silver jitter width.
pub const DEMO_SILVER_VOLATILITY: f64 = 0.2;
/// Simulated network latency for demo fetches, in milliseconds.
pub const DEMO_FETCH_DELAY_MS: u64 = 600;

/// Random-walk the previous price by a uniform step in
/// `[-volatility/2, +volatility/2]`, floored at 80% of the baseline so a
/// long losing streak can never walk the display price into the ground.
pub fn generate_synthetic_quote(previous: f64, base: f64, volatility: f64) -> f64 {
    let change = rand::thread_rng().gen_range(-0.5..0.5) * volatility;
    (previous + change).max(base * 0.8)
}

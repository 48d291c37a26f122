pub mod traits;

// Quote source implementations
pub mod metal_price_api;
pub mod synthetic;

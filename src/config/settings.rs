#[derive(Debug, Clone)]
pub struct GameSettings {
    /// Fastest humanly plausible reaction; anything quicker is a bot tap.
    pub reaction_floor_ms: i64,
    /// Flat latency allowance added on top of each fish's catch window.
    pub reaction_pad_ms: i64,
    /// Maximum clock skew between client event and server time.
    pub timestamp_skew_secs: i64,
    pub rate_limit_catches: i64,
    pub rate_limit_window_secs: i64,
    pub premium_xp_multiplier: f64,
    pub coins_per_weight: f64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            reaction_floor_ms: 50,
            reaction_pad_ms: 500,
            timestamp_skew_secs: 60,
            rate_limit_catches: 3,
            rate_limit_window_secs: 30,
            premium_xp_multiplier: 2.0,
            coins_per_weight: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketplaceSettings {
    /// Fee fraction taken from the seller's proceeds.
    pub fee_rate: f64,
    pub listing_ttl_days: i64,
}

impl Default for MarketplaceSettings {
    fn default() -> Self {
        Self {
            fee_rate: 0.10,
            listing_ttl_days: 7,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub game: GameSettings,
    pub marketplace: MarketplaceSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn database_path() -> String {
    std::env::var("DATABASE_PATH").unwrap_or_else(|_| "fishing_derby.db".to_string())
}

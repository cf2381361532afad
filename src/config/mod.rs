pub mod settings;

pub use settings::{AppConfig, GameSettings, MarketplaceSettings, database_path};

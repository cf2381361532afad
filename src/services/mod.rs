pub mod catches;
pub mod marketplace;
pub mod rankings;
pub mod server;
pub mod settlement;

pub use catches::{CatchEvent, CatchOutcome, CatchService};
pub use marketplace::MarketplaceExchange;
pub use rankings::RankLedger;
pub use settlement::{Settlement, SettlementEngine};

pub mod audit;
pub mod catch_log;
pub mod connection;
pub mod entries;
pub mod inventories;
pub mod listings;
pub mod models;
pub mod players;
pub mod setup;
pub mod tournaments;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
pub use models::*;

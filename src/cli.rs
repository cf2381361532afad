use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "fishing-derby economy backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Use a throwaway in-memory database
        #[arg(long, default_value_t = false)]
        ephemeral: bool,
    },
    /// Create a tournament (admin)
    Tournament {
        /// daily, weekly, boss or championship
        #[arg(long)]
        kind: String,

        #[arg(long)]
        title: String,

        #[arg(long, default_value_t = 0.0)]
        prize_pool: f64,

        #[arg(long, default_value_t = 0.0)]
        entry_fee: f64,

        #[arg(long, default_value_t = 10.0)]
        house_cut_percent: f64,

        #[arg(long, default_value_t = 100)]
        max_participants: i32,

        #[arg(long, default_value_t = 1440)]
        duration_minutes: i64,
    },
    /// Settle ended tournaments and expire stale listings (cron entry point)
    Sweep,
    /// Drop and recreate the database schema
    ResetDb,
}

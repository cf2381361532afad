pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod notify;
pub mod rewards;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

use crate::cli::Command;
use crate::config::settings::{AppConfig, database_path};
use crate::database::models::TournamentType;
use crate::notify::LogBroadcaster;
use crate::services::server::ServerService;
use crate::services::{MarketplaceExchange, RankLedger, SettlementEngine};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16, ephemeral: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config, ephemeral);
        service.run().await
    })
}

#[allow(clippy::too_many_arguments)]
pub fn handle_create_tournament(
    kind: &str,
    title: &str,
    prize_pool: f64,
    entry_fee: f64,
    house_cut_percent: f64,
    max_participants: i32,
    duration_minutes: i64,
) -> Result<()> {
    let tournament_type = TournamentType::parse(kind)
        .ok_or_else(|| anyhow::anyhow!("unknown tournament type: {kind}"))?;

    let pool = database::create_pool(&database_path())?;
    let ledger = RankLedger::new(pool, Arc::new(LogBroadcaster));

    let tournament = ledger.create_tournament(
        tournament_type,
        title,
        prize_pool,
        entry_fee,
        house_cut_percent,
        max_participants,
        duration_minutes,
    )?;

    println!(
        "Created tournament {} ({}) ending at {}",
        tournament.id,
        tournament.title,
        tournament.end_time
    );
    Ok(())
}

/// Cron entry point: both background sweeps in one invocation.
pub fn handle_sweep() -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&database_path())?;
    let broadcaster = Arc::new(LogBroadcaster);

    let settlement = SettlementEngine::new(pool.clone(), broadcaster);
    let settled = settlement.settle_ended_tournaments()?;

    let marketplace = MarketplaceExchange::new(pool, config);
    let expired = marketplace.sweep_expired()?;

    println!("Settled {settled} tournaments, expired {expired} listings");
    Ok(())
}

pub fn handle_reset_db() -> Result<()> {
    let pool = database::create_pool(&database_path())?;
    let mut conn = database::get_connection(&pool)?;
    database::setup::reset_database(&mut conn)?;
    Ok(())
}

use anyhow::Result;

use fishing_derby::cli::Command;
use fishing_derby::{
    handle_create_tournament, handle_reset_db, handle_serve, handle_sweep, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port, ephemeral } => handle_serve(*port, *ephemeral),
        Command::Tournament {
            kind,
            title,
            prize_pool,
            entry_fee,
            house_cut_percent,
            max_participants,
            duration_minutes,
        } => handle_create_tournament(
            kind,
            title,
            *prize_pool,
            *entry_fee,
            *house_cut_percent,
            *max_participants,
            *duration_minutes,
        ),
        Command::Sweep => handle_sweep(),
        Command::ResetDb => handle_reset_db(),
    }
}

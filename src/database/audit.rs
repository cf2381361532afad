use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, params};

use super::models::SettledWinner;

/// Persists the settlement audit record. Winners are stored as JSON so the
/// full breakdown survives even if entry rows are later re-ranked.
pub fn insert_settlement_audit(
    conn: &Connection,
    tournament_id: i64,
    gross_pool: f64,
    house_cut_amount: f64,
    net_pool: f64,
    winners: &[SettledWinner],
    settled_at: NaiveDateTime,
) -> Result<()> {
    let winners_json =
        serde_json::to_string(winners).context("Failed to serialize settlement winners")?;

    conn.execute(
        "INSERT INTO settlement_audit (tournament_id, gross_pool, house_cut_amount, net_pool, winners_json, settled_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![tournament_id, gross_pool, house_cut_amount, net_pool, winners_json, settled_at],
    )
    .context("Failed to insert settlement audit record")
    .map(|_| ())
}

pub fn count_settlements(conn: &Connection, tournament_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM settlement_audit WHERE tournament_id = ?1",
        params![tournament_id],
        |row| row.get(0),
    )
    .context("Failed to count settlement records")
}

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, params};

pub fn record_catch(
    conn: &Connection,
    player_id: i64,
    fish_id: &str,
    caught_at: NaiveDateTime,
) -> Result<()> {
    conn.execute(
        "INSERT INTO catch_log (player_id, fish_id, caught_at) VALUES (?1, ?2, ?3)",
        params![player_id, fish_id, caught_at],
    )
    .context("Failed to record catch")
    .map(|_| ())
}

/// Validated catches for one player since `window_start`, for the rolling
/// rate-limit check.
pub fn count_since(conn: &Connection, player_id: i64, window_start: NaiveDateTime) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM catch_log WHERE player_id = ?1 AND caught_at >= ?2",
        params![player_id, window_start],
        |row| row.get(0),
    )
    .context("Failed to count recent catches")
}

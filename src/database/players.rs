use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};

use super::models::Player;

const PLAYER_COLUMNS: &str = "id, xp, level, coins, premium_until, casts_remaining, max_casts, pending_chests, created_at";

/// Players are created lazily on first contact with the backend.
pub fn get_or_create_player(conn: &Connection, id: i64) -> Result<Player> {
    conn.execute(
        "INSERT OR IGNORE INTO players (id) VALUES (?1)",
        params![id],
    )
    .context("Failed to create player")?;

    find_by_id(conn, id)?.context("Player missing after insert")
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn add_xp_and_coins(conn: &Connection, id: i64, xp: i64, coins: i64) -> Result<()> {
    conn.execute(
        "UPDATE players SET xp = xp + ?2, coins = coins + ?3 WHERE id = ?1",
        params![id, xp, coins],
    )
    .context("Failed to apply xp/coin reward")
    .map(|_| ())
}

pub fn set_level(conn: &Connection, id: i64, level: i32) -> Result<()> {
    conn.execute(
        "UPDATE players SET level = ?2 WHERE id = ?1",
        params![id, level],
    )
    .context("Failed to update player level")
    .map(|_| ())
}

pub fn credit_coins(conn: &Connection, id: i64, amount: i64) -> Result<()> {
    conn.execute(
        "UPDATE players SET coins = coins + ?2 WHERE id = ?1",
        params![id, amount],
    )
    .context("Failed to credit coins")
    .map(|_| ())
}

/// Conditional debit. Returns false when the balance is too low; the
/// balance check and the decrement are one statement so concurrent debits
/// cannot both observe the same starting balance.
pub fn try_debit_coins(conn: &Connection, id: i64, amount: i64) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE players SET coins = coins - ?2 WHERE id = ?1 AND coins >= ?2",
            params![id, amount],
        )
        .context("Failed to debit coins")?;

    Ok(affected > 0)
}

/// Consumes one cast. Returns false when no casts remain.
pub fn try_decrement_cast(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE players SET casts_remaining = casts_remaining - 1 WHERE id = ?1 AND casts_remaining > 0",
            params![id],
        )
        .context("Failed to decrement casts")?;

    Ok(affected > 0)
}

/// Adds bonus casts, clamped to the player's cap.
pub fn add_bonus_casts(conn: &Connection, id: i64, count: i32) -> Result<()> {
    conn.execute(
        "UPDATE players SET casts_remaining = MIN(casts_remaining + ?2, max_casts) WHERE id = ?1",
        params![id, count],
    )
    .context("Failed to grant bonus casts")
    .map(|_| ())
}

pub fn refill_casts(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(
        "UPDATE players SET casts_remaining = max_casts WHERE id = ?1",
        params![id],
    )
    .context("Failed to refill casts")
    .map(|_| ())
}

pub fn increment_pending_chests(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(
        "UPDATE players SET pending_chests = pending_chests + 1 WHERE id = ?1",
        params![id],
    )
    .context("Failed to increment pending chests")
    .map(|_| ())
}

pub fn set_premium_until(conn: &Connection, id: i64, until: NaiveDateTime) -> Result<()> {
    conn.execute(
        "UPDATE players SET premium_until = ?2 WHERE id = ?1",
        params![id, until],
    )
    .context("Failed to update premium status")
    .map(|_| ())
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        xp: row.get(1)?,
        level: row.get(2)?,
        coins: row.get(3)?,
        premium_until: row.get(4)?,
        casts_remaining: row.get(5)?,
        max_casts: row.get(6)?,
        pending_chests: row.get(7)?,
        created_at: row.get(8)?,
    })
}

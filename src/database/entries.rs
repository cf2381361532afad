use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};

use super::models::TournamentEntry;

const ENTRY_COLUMNS: &str = "id, tournament_id, player_id, score, rank, payout, entry_method, joined_at";

pub fn find_entry(
    conn: &Connection,
    tournament_id: i64,
    player_id: i64,
) -> Result<Option<TournamentEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM tournament_entries WHERE tournament_id = ?1 AND player_id = ?2"
    );

    conn.query_row(&sql, params![tournament_id, player_id], parse_entry_row)
        .optional()
        .context("Failed to query tournament entry")
}

pub fn insert_entry(
    conn: &Connection,
    tournament_id: i64,
    player_id: i64,
    score: f64,
    entry_method: &str,
    joined_at: NaiveDateTime,
) -> Result<TournamentEntry> {
    let sql = format!(
        "INSERT INTO tournament_entries (tournament_id, player_id, score, entry_method, joined_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {ENTRY_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![tournament_id, player_id, score, entry_method, joined_at],
        parse_entry_row,
    )
    .context("Failed to insert tournament entry")
}

/// Compare-and-swap score update. The stored score only moves up: a lower
/// or equal submission matches zero rows and leaves the entry untouched,
/// regardless of the order concurrent submissions land in.
pub fn try_raise_score(
    conn: &Connection,
    tournament_id: i64,
    player_id: i64,
    score: f64,
) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE tournament_entries SET score = ?3 \
             WHERE tournament_id = ?1 AND player_id = ?2 AND score < ?3",
            params![tournament_id, player_id, score],
        )
        .context("Failed to update entry score")?;

    Ok(affected > 0)
}

/// Entries in ranking order: score descending, ties broken by join time
/// ascending. Prize slots key off this ordering, so the tie-break is part
/// of the contract, not a presentation detail.
pub fn list_ranked(conn: &Connection, tournament_id: i64) -> Result<Vec<TournamentEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM tournament_entries \
         WHERE tournament_id = ?1 ORDER BY score DESC, joined_at ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_entry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn set_rank(conn: &Connection, entry_id: i64, rank: i32) -> Result<()> {
    conn.execute(
        "UPDATE tournament_entries SET rank = ?2 WHERE id = ?1",
        params![entry_id, rank],
    )
    .context("Failed to update entry rank")
    .map(|_| ())
}

pub fn set_rank_and_payout(conn: &Connection, entry_id: i64, rank: i32, payout: f64) -> Result<()> {
    conn.execute(
        "UPDATE tournament_entries SET rank = ?2, payout = ?3 WHERE id = ?1",
        params![entry_id, rank, payout],
    )
    .context("Failed to record entry payout")
    .map(|_| ())
}

fn parse_entry_row(row: &rusqlite::Row) -> rusqlite::Result<TournamentEntry> {
    Ok(TournamentEntry {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        player_id: row.get(2)?,
        score: row.get(3)?,
        rank: row.get(4)?,
        payout: row.get(5)?,
        entry_method: row.get(6)?,
        joined_at: row.get(7)?,
    })
}

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};

use super::models::{Tournament, TournamentStatus, TournamentType};

const TOURNAMENT_COLUMNS: &str = "id, tournament_type, title, prize_pool, entry_fee, house_cut_percent, max_participants, current_participants, status, start_time, end_time, settled_at, created_at";

#[allow(clippy::too_many_arguments)]
pub fn insert_tournament(
    conn: &Connection,
    tournament_type: TournamentType,
    title: &str,
    prize_pool: f64,
    entry_fee: f64,
    house_cut_percent: f64,
    max_participants: i32,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
) -> Result<Tournament> {
    let sql = format!(
        "INSERT INTO tournaments (tournament_type, title, prize_pool, entry_fee, house_cut_percent, max_participants, start_time, end_time) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING {TOURNAMENT_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            tournament_type.as_str(),
            title,
            prize_pool,
            entry_fee,
            house_cut_percent,
            max_participants,
            start_time,
            end_time
        ],
        parse_tournament_row,
    )
    .context("Failed to insert new tournament")
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Tournament>> {
    let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by id")
}

/// Reserves a participant slot. Returns false when the tournament is full;
/// the capacity check and the increment are one statement, so two concurrent
/// entries cannot both take the last slot.
pub fn try_increment_participants(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE tournaments SET current_participants = current_participants + 1 \
             WHERE id = ?1 AND current_participants < max_participants",
            params![id],
        )
        .context("Failed to increment participant count")?;

    Ok(affected > 0)
}

/// Conditional OPEN/LIVE -> ENDED flip. Exactly one caller wins this
/// transition; everyone else sees false and must treat the tournament as
/// already settled.
pub fn try_mark_ended(conn: &Connection, id: i64, settled_at: NaiveDateTime) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE tournaments SET status = 'ENDED', settled_at = ?2 \
             WHERE id = ?1 AND status IN ('OPEN', 'LIVE')",
            params![id, settled_at],
        )
        .context("Failed to mark tournament ended")?;

    Ok(affected > 0)
}

/// Tournaments past their end time that still need settlement.
pub fn list_settleable(conn: &Connection, now: NaiveDateTime) -> Result<Vec<Tournament>> {
    let sql = format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments \
         WHERE status IN ('OPEN', 'LIVE') AND end_time <= ?1"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![now], parse_tournament_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    let type_str: String = row.get(1)?;
    let status_str: String = row.get(8)?;

    Ok(Tournament {
        id: row.get(0)?,
        tournament_type: parse_enum_column(1, &type_str, TournamentType::parse)?,
        title: row.get(2)?,
        prize_pool: row.get(3)?,
        entry_fee: row.get(4)?,
        house_cut_percent: row.get(5)?,
        max_participants: row.get(6)?,
        current_participants: row.get(7)?,
        status: parse_enum_column(8, &status_str, TournamentStatus::parse)?,
        start_time: row.get(9)?,
        end_time: row.get(10)?,
        settled_at: row.get(11)?,
        created_at: row.get(12)?,
    })
}

pub(super) fn parse_enum_column<T>(
    idx: usize,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unrecognized value: {raw}").into(),
        )
    })
}

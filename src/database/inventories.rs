use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::models::{BaitStack, OwnedRod};

pub fn list_baits(conn: &Connection, player_id: i64) -> Result<Vec<BaitStack>> {
    let sql = "SELECT bait_id, count FROM inventory_baits WHERE player_id = ?1 AND count > 0";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok(BaitStack {
                bait_id: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn bait_count(conn: &Connection, player_id: i64, bait_id: &str) -> Result<i64> {
    let sql = "SELECT count FROM inventory_baits WHERE player_id = ?1 AND bait_id = ?2";

    let count: Option<i64> = conn
        .query_row(sql, params![player_id, bait_id], |row| row.get(0))
        .optional()
        .context("Failed to query bait count")?;

    Ok(count.unwrap_or(0))
}

pub fn add_bait(conn: &Connection, player_id: i64, bait_id: &str, count: i64) -> Result<()> {
    let sql = "INSERT INTO inventory_baits (player_id, bait_id, count) VALUES (?1, ?2, ?3)
               ON CONFLICT (player_id, bait_id) DO UPDATE SET count = count + ?3";

    conn.execute(sql, params![player_id, bait_id, count])
        .context("Failed to add bait")
        .map(|_| ())
}

/// Conditional removal. Returns false when the player holds fewer than
/// `count`; the ownership check and the decrement are a single statement.
pub fn try_remove_bait(conn: &Connection, player_id: i64, bait_id: &str, count: i64) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE inventory_baits SET count = count - ?3 WHERE player_id = ?1 AND bait_id = ?2 AND count >= ?3",
            params![player_id, bait_id, count],
        )
        .context("Failed to remove bait")?;

    Ok(affected > 0)
}

pub fn find_rod(conn: &Connection, player_id: i64, rod_id: &str) -> Result<Option<OwnedRod>> {
    let sql = "SELECT rod_id, soulbound FROM inventory_rods WHERE player_id = ?1 AND rod_id = ?2";

    conn.query_row(sql, params![player_id, rod_id], |row| {
        Ok(OwnedRod {
            rod_id: row.get(0)?,
            soulbound: row.get(1)?,
        })
    })
    .optional()
    .context("Failed to query rod")
}

pub fn add_rod(conn: &Connection, player_id: i64, rod_id: &str, soulbound: bool) -> Result<()> {
    let sql = "INSERT OR IGNORE INTO inventory_rods (player_id, rod_id, soulbound) VALUES (?1, ?2, ?3)";

    conn.execute(sql, params![player_id, rod_id, soulbound])
        .context("Failed to add rod")
        .map(|_| ())
}

pub fn remove_rod(conn: &Connection, player_id: i64, rod_id: &str) -> Result<bool> {
    let affected = conn
        .execute(
            "DELETE FROM inventory_rods WHERE player_id = ?1 AND rod_id = ?2",
            params![player_id, rod_id],
        )
        .context("Failed to remove rod")?;

    Ok(affected > 0)
}

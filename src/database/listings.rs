use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};

use super::models::{ItemType, ListingStatus, MarketplaceListing, MarketplacePurchase};
use super::tournaments::parse_enum_column;

const LISTING_COLUMNS: &str = "id, seller_id, item_type, item_id, quantity, price_coins, status, created_at, expires_at";

#[allow(clippy::too_many_arguments)]
pub fn insert_listing(
    conn: &Connection,
    seller_id: i64,
    item_type: ItemType,
    item_id: &str,
    quantity: i64,
    price_coins: i64,
    created_at: NaiveDateTime,
    expires_at: NaiveDateTime,
) -> Result<MarketplaceListing> {
    let sql = format!(
        "INSERT INTO marketplace_listings (seller_id, item_type, item_id, quantity, price_coins, created_at, expires_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {LISTING_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            seller_id,
            item_type.as_str(),
            item_id,
            quantity,
            price_coins,
            created_at,
            expires_at
        ],
        parse_listing_row,
    )
    .context("Failed to insert marketplace listing")
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<MarketplaceListing>> {
    let sql = format!("SELECT {LISTING_COLUMNS} FROM marketplace_listings WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_listing_row)
        .optional()
        .context("Failed to query listing by id")
}

/// Conditional ACTIVE -> terminal transition. Buy, cancel and expire all
/// gate on this, so at most one of them wins a given listing.
pub fn try_finalize(conn: &Connection, id: i64, to: ListingStatus) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE marketplace_listings SET status = ?2 WHERE id = ?1 AND status = 'ACTIVE'",
            params![id, to.as_str()],
        )
        .context("Failed to transition listing status")?;

    Ok(affected > 0)
}

pub fn list_active(conn: &Connection) -> Result<Vec<MarketplaceListing>> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS} FROM marketplace_listings WHERE status = 'ACTIVE' ORDER BY created_at DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_listing_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// ACTIVE listings whose expiry has passed, for the background sweep.
pub fn list_expired_active(conn: &Connection, now: NaiveDateTime) -> Result<Vec<MarketplaceListing>> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS} FROM marketplace_listings WHERE status = 'ACTIVE' AND expires_at <= ?1"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![now], parse_listing_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn insert_purchase(
    conn: &Connection,
    listing_id: i64,
    buyer_id: i64,
    price_paid: i64,
    marketplace_fee: i64,
    purchased_at: NaiveDateTime,
) -> Result<MarketplacePurchase> {
    let sql = "INSERT INTO marketplace_purchases (listing_id, buyer_id, price_paid, marketplace_fee, purchased_at) \
               VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id, listing_id, buyer_id, price_paid, marketplace_fee, purchased_at";

    conn.query_row(
        sql,
        params![listing_id, buyer_id, price_paid, marketplace_fee, purchased_at],
        |row| {
            Ok(MarketplacePurchase {
                id: row.get(0)?,
                listing_id: row.get(1)?,
                buyer_id: row.get(2)?,
                price_paid: row.get(3)?,
                marketplace_fee: row.get(4)?,
                purchased_at: row.get(5)?,
            })
        },
    )
    .context("Failed to insert purchase receipt")
}

fn parse_listing_row(row: &rusqlite::Row) -> rusqlite::Result<MarketplaceListing> {
    let item_type_str: String = row.get(2)?;
    let status_str: String = row.get(6)?;

    Ok(MarketplaceListing {
        id: row.get(0)?,
        seller_id: row.get(1)?,
        item_type: parse_enum_column(2, &item_type_str, ItemType::parse)?,
        item_id: row.get(3)?,
        quantity: row.get(4)?,
        price_coins: row.get(5)?,
        status: parse_enum_column(6, &status_str, ListingStatus::parse)?,
        created_at: row.get(7)?,
        expires_at: row.get(8)?,
    })
}

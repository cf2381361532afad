use anyhow::Context;
use chrono::{Duration, Utc};
use log::{error, info};
use rusqlite::{Connection, TransactionBehavior};

use crate::config::settings::AppConfig;
use crate::database::models::{ItemType, ListingStatus, MarketplaceListing, MarketplacePurchase};
use crate::database::{self, DbPool};
use crate::errors::{CoreError, CoreResult};

/// Peer-to-peer trading: listings, purchases, cancellation and expiry.
///
/// Every status change goes through the conditional ACTIVE -> terminal
/// transition in the listings table, so buy, cancel and expire are mutually
/// exclusive per listing without any in-process lock.
pub struct MarketplaceExchange {
    pool: DbPool,
    config: AppConfig,
}

impl MarketplaceExchange {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        Self { pool, config }
    }

    /// Creates a listing, reserving the quantity immediately: the items
    /// leave the seller's inventory here, not at purchase time, so a seller
    /// cannot oversell the same stack across concurrent listings.
    pub fn create_listing(
        &self,
        seller_id: i64,
        item_type: ItemType,
        item_id: &str,
        quantity: i64,
        price_coins: i64,
    ) -> CoreResult<MarketplaceListing> {
        if quantity <= 0 || price_coins <= 0 {
            return Err(CoreError::invalid("quantity and price must be positive"));
        }

        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start listing transaction")?;
        let now = Utc::now().naive_utc();

        let seller = database::players::find_by_id(&tx, seller_id)?
            .ok_or_else(|| CoreError::NotFound(format!("player {seller_id}")))?;
        if !seller.is_premium(now) {
            return Err(CoreError::invalid("selling requires premium status"));
        }

        self.reserve_items(&tx, seller_id, item_type, item_id, quantity)?;

        let expires_at = now + Duration::days(self.config.marketplace.listing_ttl_days);
        let listing = database::listings::insert_listing(
            &tx, seller_id, item_type, item_id, quantity, price_coins, now, expires_at,
        )?;
        tx.commit().context("Failed to commit listing")?;

        info!(
            "listing created id={} seller={} item={} qty={} price={}",
            listing.id, seller_id, item_id, quantity, price_coins
        );
        Ok(listing)
    }

    fn reserve_items(
        &self,
        tx: &Connection,
        seller_id: i64,
        item_type: ItemType,
        item_id: &str,
        quantity: i64,
    ) -> CoreResult<()> {
        match item_type {
            ItemType::Bait => {
                if !database::inventories::try_remove_bait(tx, seller_id, item_id, quantity)? {
                    return Err(CoreError::InsufficientFunds(format!(
                        "not enough {item_id} to list"
                    )));
                }
            }
            ItemType::Rod => {
                if quantity != 1 {
                    return Err(CoreError::invalid("rods are listed one at a time"));
                }
                let rod = database::inventories::find_rod(tx, seller_id, item_id)?
                    .ok_or_else(|| {
                        CoreError::InsufficientFunds(format!("rod {item_id} not owned"))
                    })?;
                if rod.soulbound {
                    return Err(CoreError::invalid("soulbound rods cannot be sold"));
                }
                database::inventories::remove_rod(tx, seller_id, item_id)?;
            }
        }
        Ok(())
    }

    /// Atomic purchase: coin debit, fee-adjusted credit, item transfer,
    /// SOLD flip and receipt are one transaction. A listing found past its
    /// expiry is flipped to EXPIRED (and its items returned) before the
    /// call fails.
    pub fn buy_listing(&self, listing_id: i64, buyer_id: i64) -> CoreResult<MarketplacePurchase> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start purchase transaction")?;
        let now = Utc::now().naive_utc();

        let listing = database::listings::find_by_id(&tx, listing_id)?
            .ok_or_else(|| CoreError::NotFound(format!("listing {listing_id}")))?;

        if listing.status != ListingStatus::Active {
            return Err(CoreError::conflict("listing is not active"));
        }
        if listing.seller_id == buyer_id {
            return Err(CoreError::invalid("cannot buy your own listing"));
        }
        if listing.expires_at <= now {
            // Lazy expiry: persist the flip and the item return, then fail.
            if database::listings::try_finalize(&tx, listing_id, ListingStatus::Expired)? {
                self.return_items(&tx, &listing)?;
                tx.commit().context("Failed to commit lazy expiry")?;
            }
            return Err(CoreError::conflict("listing has expired"));
        }

        let buyer = database::players::get_or_create_player(&tx, buyer_id)?;
        if buyer.coins < listing.price_coins {
            return Err(CoreError::InsufficientFunds(format!(
                "need {} coins, have {}",
                listing.price_coins, buyer.coins
            )));
        }

        if !database::listings::try_finalize(&tx, listing_id, ListingStatus::Sold)? {
            return Err(CoreError::conflict("listing is not active"));
        }

        let fee = (listing.price_coins as f64 * self.config.marketplace.fee_rate).floor() as i64;
        if !database::players::try_debit_coins(&tx, buyer_id, listing.price_coins)? {
            return Err(CoreError::InsufficientFunds("balance changed".to_string()));
        }
        database::players::credit_coins(&tx, listing.seller_id, listing.price_coins - fee)?;
        self.deliver_items(&tx, buyer_id, &listing)?;

        let purchase = database::listings::insert_purchase(
            &tx,
            listing_id,
            buyer_id,
            listing.price_coins,
            fee,
            now,
        )?;
        tx.commit().context("Failed to commit purchase")?;

        info!(
            "listing {} sold to {} for {} (fee {})",
            listing_id, buyer_id, listing.price_coins, fee
        );
        Ok(purchase)
    }

    /// Returns the reserved quantity to the seller and cancels the listing.
    pub fn cancel_listing(&self, listing_id: i64, seller_id: i64) -> CoreResult<MarketplaceListing> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start cancel transaction")?;

        let listing = database::listings::find_by_id(&tx, listing_id)?
            .ok_or_else(|| CoreError::NotFound(format!("listing {listing_id}")))?;

        if listing.seller_id != seller_id {
            return Err(CoreError::invalid("only the seller can cancel a listing"));
        }
        if !database::listings::try_finalize(&tx, listing_id, ListingStatus::Cancelled)? {
            return Err(CoreError::conflict("listing is not active"));
        }

        self.return_items(&tx, &listing)?;
        tx.commit().context("Failed to commit cancel")?;

        drop(conn);

        info!("listing {} cancelled by seller {}", listing_id, seller_id);
        self.get_listing(listing_id)
    }

    pub fn get_listing(&self, listing_id: i64) -> CoreResult<MarketplaceListing> {
        let conn = database::get_connection(&self.pool)?;
        database::listings::find_by_id(&conn, listing_id)?
            .ok_or_else(|| CoreError::NotFound(format!("listing {listing_id}")))
    }

    pub fn list_active(&self) -> CoreResult<Vec<MarketplaceListing>> {
        let conn = database::get_connection(&self.pool)?;
        Ok(database::listings::list_active(&conn)?)
    }

    /// Periodic sweep over stale ACTIVE listings. Each listing expires in
    /// its own transaction; one bad row is logged and skipped so it cannot
    /// abort the batch.
    pub fn sweep_expired(&self) -> CoreResult<usize> {
        let stale: Vec<MarketplaceListing> = {
            let conn = database::get_connection(&self.pool)?;
            let now = Utc::now().naive_utc();
            database::listings::list_expired_active(&conn, now)?
        };

        let mut expired = 0;
        for listing in stale {
            match self.expire_one(&listing) {
                Ok(true) => expired += 1,
                Ok(false) => {} // lost the race to a buy/cancel, nothing to do
                Err(e) => error!("failed to expire listing {}: {e}", listing.id),
            }
        }

        if expired > 0 {
            info!("expired {} stale listings", expired);
        }
        Ok(expired)
    }

    fn expire_one(&self, listing: &MarketplaceListing) -> CoreResult<bool> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start expiry transaction")?;

        if !database::listings::try_finalize(&tx, listing.id, ListingStatus::Expired)? {
            return Ok(false);
        }
        self.return_items(&tx, listing)?;
        tx.commit().context("Failed to commit expiry")?;
        Ok(true)
    }

    fn return_items(&self, tx: &Connection, listing: &MarketplaceListing) -> CoreResult<()> {
        match listing.item_type {
            ItemType::Bait => database::inventories::add_bait(
                tx,
                listing.seller_id,
                &listing.item_id,
                listing.quantity,
            )?,
            ItemType::Rod => {
                database::inventories::add_rod(tx, listing.seller_id, &listing.item_id, false)?
            }
        }
        Ok(())
    }

    fn deliver_items(
        &self,
        tx: &Connection,
        buyer_id: i64,
        listing: &MarketplaceListing,
    ) -> CoreResult<()> {
        match listing.item_type {
            ItemType::Bait => {
                database::inventories::add_bait(tx, buyer_id, &listing.item_id, listing.quantity)?
            }
            // Traded rods arrive unbound.
            ItemType::Rod => database::inventories::add_rod(tx, buyer_id, &listing.item_id, false)?,
        }
        Ok(())
    }
}

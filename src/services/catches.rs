use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime, Utc};
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};

use crate::config::settings::AppConfig;
use crate::database::models::{BaitStack, Player};
use crate::database::{self, DbPool};
use crate::errors::CoreResult;
use crate::rewards;

/// A claimed catch as reported by the game client. Everything in here is
/// untrusted until it survives validation.
#[derive(Debug, Clone)]
pub struct CatchEvent {
    pub player_id: i64,
    pub fish_id: String,
    pub claimed_rarity: String,
    pub reaction_ms: i64,
    pub weight: f64,
    pub bait_id: String,
    pub client_timestamp: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct CatchOutcome {
    pub accepted: bool,
    pub reason: Option<String>,
    pub xp_gained: i64,
    pub coins_gained: i64,
    pub leveled_up_to: Option<i32>,
}

impl CatchOutcome {
    fn rejected(reason: &str) -> Self {
        Self {
            accepted: false,
            reason: Some(reason.to_string()),
            xp_gained: 0,
            coins_gained: 0,
            leveled_up_to: None,
        }
    }
}

/// Server-side validation and reward application for gameplay catches.
pub struct CatchService {
    pool: DbPool,
    config: AppConfig,
}

impl CatchService {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        Self { pool, config }
    }

    /// Runs the anti-cheat checks in order, short-circuiting on the first
    /// failure. A rejection is a normal outcome, not an error; only
    /// datastore failures surface as `Err`. On acceptance the cast
    /// decrement, XP/coin grant and any level rewards commit atomically.
    pub fn validate_catch(&self, event: &CatchEvent) -> CoreResult<CatchOutcome> {
        let mut conn = database::get_connection(&self.pool)?;
        // Mutating transactions take the write lock up front. A deferred
        // lock upgrade after the reads fails under write contention
        // instead of waiting out the busy timeout.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start catch transaction")?;
        let now = Utc::now().naive_utc();

        let Some(player) = database::players::find_by_id(&tx, event.player_id)? else {
            return Ok(CatchOutcome::rejected("unknown player"));
        };

        if let Some(reason) = self.check_event(&tx, &player, event, now)? {
            return Ok(CatchOutcome::rejected(reason));
        }

        let outcome = self.apply_reward(&tx, &player, event, now)?;
        tx.commit().context("Failed to commit catch transaction")?;

        info!(
            "catch accepted player={} fish={} xp=+{} coins=+{}",
            event.player_id, event.fish_id, outcome.xp_gained, outcome.coins_gained
        );
        Ok(outcome)
    }

    /// First-contact sync: creates the player row if needed, refills the
    /// cast budget and returns the current state with the bait inventory.
    /// Premium players bypass cast accounting, so their count is left
    /// untouched.
    pub fn sync_player(&self, player_id: i64) -> CoreResult<(Player, Vec<BaitStack>)> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start sync transaction")?;
        let now = Utc::now().naive_utc();

        let player = database::players::get_or_create_player(&tx, player_id)?;
        let player = if player.is_premium(now) {
            player
        } else {
            database::players::refill_casts(&tx, player_id)?;
            database::players::find_by_id(&tx, player_id)?
                .context("player missing after refill")?
        };
        let baits = database::inventories::list_baits(&tx, player_id)?;
        tx.commit().context("Failed to commit sync transaction")?;

        Ok((player, baits))
    }

    /// Returns the rejection reason, or None when every check passes.
    fn check_event(
        &self,
        tx: &Connection,
        player: &Player,
        event: &CatchEvent,
        now: NaiveDateTime,
    ) -> CoreResult<Option<&'static str>> {
        let game = &self.config.game;

        if !player.is_premium(now) && player.casts_remaining <= 0 {
            return Ok(Some("no casts remaining"));
        }

        let Some(fish) = rewards::find_fish(&event.fish_id) else {
            return Ok(Some("unknown fish"));
        };

        if rewards::Rarity::parse(&event.claimed_rarity) != Some(fish.rarity) {
            return Ok(Some("rarity mismatch"));
        }

        let window = self.allowed_reaction_ms(fish.catch_window_ms, player.level);
        if event.reaction_ms < game.reaction_floor_ms {
            return Ok(Some("reaction too fast"));
        }
        if event.reaction_ms > window {
            return Ok(Some("reaction outside catch window"));
        }

        let skew = (now - event.client_timestamp).num_seconds().abs();
        if skew > game.timestamp_skew_secs {
            return Ok(Some("stale event timestamp"));
        }

        if rewards::find_bait(&event.bait_id).is_none() {
            return Ok(Some("unknown bait"));
        }

        if self.is_rate_limited(tx, event.player_id, now) {
            return Ok(Some("too many catches"));
        }

        Ok(None)
    }

    /// Widened reaction window: base catch window scaled by up to +50% for
    /// high-level players, plus a flat latency pad.
    fn allowed_reaction_ms(&self, catch_window_ms: i64, level: i32) -> i64 {
        let level_bonus = (level as f64 / 100.0).min(0.5);
        (catch_window_ms as f64 * (1.0 + level_bonus)).floor() as i64
            + self.config.game.reaction_pad_ms
    }

    /// Rolling-window rate limit. This is a soft anti-abuse signal, so an
    /// infrastructure failure here fails open: we log and let the catch
    /// through rather than block legitimate play.
    fn is_rate_limited(&self, tx: &Connection, player_id: i64, now: NaiveDateTime) -> bool {
        let window_start = now - Duration::seconds(self.config.game.rate_limit_window_secs);

        match database::catch_log::count_since(tx, player_id, window_start) {
            Ok(count) => count >= self.config.game.rate_limit_catches,
            Err(e) => {
                warn!("rate-limit check failed open for player {player_id}: {e:#}");
                false
            }
        }
    }

    fn apply_reward(
        &self,
        tx: &Connection,
        player: &Player,
        event: &CatchEvent,
        now: NaiveDateTime,
    ) -> Result<CatchOutcome> {
        let game = &self.config.game;
        let fish = rewards::find_fish(&event.fish_id)
            .context("fish disappeared from table mid-validation")?;

        let premium = player.is_premium(now);
        let premium_bonus = if premium { game.premium_xp_multiplier } else { 1.0 };
        let xp_gained = (fish.xp as f64 * rewards::rod_multiplier(player.level) * premium_bonus)
            .floor() as i64;

        // The client reports the rolled weight; clamp it to the fish's
        // canonical range so a forged payload cannot inflate the coin grant.
        let weight = event.weight.clamp(fish.min_weight, fish.max_weight);
        let coins_gained = (weight * game.coins_per_weight).floor() as i64;

        if !premium && !database::players::try_decrement_cast(tx, player.id)? {
            anyhow::bail!("cast count changed during validation");
        }

        database::players::add_xp_and_coins(tx, player.id, xp_gained, coins_gained)?;
        let leveled_up_to = self.grant_level_ups(tx, player, xp_gained)?;
        database::catch_log::record_catch(tx, player.id, &event.fish_id, now)?;

        Ok(CatchOutcome {
            accepted: true,
            reason: None,
            xp_gained,
            coins_gained,
            leveled_up_to,
        })
    }

    /// Applies every level crossed by this XP grant. Multi-level jumps pay
    /// each level's reward, and milestone levels queue a chest.
    fn grant_level_ups(
        &self,
        tx: &Connection,
        player: &Player,
        xp_gained: i64,
    ) -> Result<Option<i32>> {
        let new_level = rewards::level_for_xp(player.xp + xp_gained);
        if new_level <= player.level {
            return Ok(None);
        }

        database::players::set_level(tx, player.id, new_level)?;

        for level in (player.level + 1)..=new_level {
            let reward = rewards::level_up_reward(level);
            database::players::add_bonus_casts(tx, player.id, reward.bonus_casts)?;
            database::inventories::add_bait(tx, player.id, reward.bait_id, reward.bait_count)?;
            if reward.grants_chest {
                database::players::increment_pending_chests(tx, player.id)?;
            }
        }

        info!("player {} leveled up to {}", player.id, new_level);
        Ok(Some(new_level))
    }
}

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use log::{error, info};
use rusqlite::TransactionBehavior;

use crate::database::models::SettledWinner;
use crate::database::{self, DbPool};
use crate::errors::{CoreError, CoreResult};
use crate::notify::{BroadcastAction, Broadcaster};
use crate::rewards;

#[derive(Debug, Clone)]
pub struct Settlement {
    pub tournament_id: i64,
    pub gross_pool: f64,
    pub house_cut_amount: f64,
    pub net_pool: f64,
    pub winners: Vec<SettledWinner>,
}

/// One-shot prize distribution for ended tournaments.
pub struct SettlementEngine {
    pool: DbPool,
    broadcaster: Arc<dyn Broadcaster>,
}

impl SettlementEngine {
    pub fn new(pool: DbPool, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { pool, broadcaster }
    }

    /// Settles one tournament exactly once.
    ///
    /// The conditional OPEN/LIVE -> ENDED flip is the exclusivity gate:
    /// it, the payout writes and the coin credits are one transaction, so a
    /// crash rolls everything back and a retry either wins the flip or
    /// fails fast with `StateConflict`. No path pays twice.
    pub fn settle(&self, tournament_id: i64) -> CoreResult<Settlement> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start settlement transaction")?;
        let now = Utc::now().naive_utc();

        let tournament = database::tournaments::find_by_id(&tx, tournament_id)?
            .ok_or_else(|| CoreError::NotFound(format!("tournament {tournament_id}")))?;

        if !database::tournaments::try_mark_ended(&tx, tournament_id, now)? {
            return Err(CoreError::conflict("tournament already settled"));
        }

        let gross_pool = tournament.prize_pool;
        let house_cut_amount = gross_pool * tournament.house_cut_percent / 100.0;
        let net_pool = gross_pool - house_cut_amount;

        let shares = rewards::payout_shares(tournament.tournament_type);
        let entries = database::entries::list_ranked(&tx, tournament_id)?;

        // Unfilled slots pay nothing and their share stays with the house;
        // the remainder is deliberately not redistributed.
        let mut winners = Vec::new();
        for (slot, &share) in shares.iter().enumerate() {
            let Some(entry) = entries.get(slot) else {
                break;
            };

            let rank = (slot + 1) as i32;
            let payout = net_pool * share;
            let coins = payout.floor() as i64;

            database::entries::set_rank_and_payout(&tx, entry.id, rank, payout)?;
            database::players::credit_coins(&tx, entry.player_id, coins)?;

            winners.push(SettledWinner {
                player_id: entry.player_id,
                rank,
                payout,
                coins_credited: coins,
            });
        }

        database::audit::insert_settlement_audit(
            &tx,
            tournament_id,
            gross_pool,
            house_cut_amount,
            net_pool,
            &winners,
            now,
        )?;
        tx.commit().context("Failed to commit settlement")?;

        info!(
            "settled tournament={} gross={} net={} winners={}",
            tournament_id,
            gross_pool,
            net_pool,
            winners.len()
        );
        self.broadcaster.notify(tournament_id, BroadcastAction::Settled);

        Ok(Settlement {
            tournament_id,
            gross_pool,
            house_cut_amount,
            net_pool,
            winners,
        })
    }

    /// Periodic sweep: settles every tournament past its end time. A
    /// failure on one tournament is logged and must not starve the rest;
    /// it will be retried on the next cycle.
    pub fn settle_ended_tournaments(&self) -> CoreResult<usize> {
        let due: Vec<i64> = {
            let conn = database::get_connection(&self.pool)?;
            let now = Utc::now().naive_utc();
            database::tournaments::list_settleable(&conn, now)?
                .into_iter()
                .map(|t| t.id)
                .collect()
        };

        let mut settled = 0;
        for tournament_id in due {
            match self.settle(tournament_id) {
                Ok(settlement) => {
                    settled += 1;
                    info!(
                        "sweep settled tournament {} ({} winners)",
                        tournament_id,
                        settlement.winners.len()
                    );
                }
                Err(CoreError::StateConflict(_)) => {
                    // Another worker got there first.
                }
                Err(e) => {
                    error!("sweep failed to settle tournament {tournament_id}: {e}");
                }
            }
        }

        Ok(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TournamentType;
    use crate::database::{DbPool, create_memory_pool, get_connection, setup};
    use crate::notify::{BroadcastAction, RecordingBroadcaster};
    use crate::services::RankLedger;

    fn fixtures() -> (SettlementEngine, RankLedger, DbPool, Arc<RecordingBroadcaster>) {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        setup::reset_database(&mut conn).unwrap();
        drop(conn);

        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let engine = SettlementEngine::new(pool.clone(), broadcaster.clone());
        let ledger = RankLedger::new(pool.clone(), broadcaster.clone());
        (engine, ledger, pool, broadcaster)
    }

    fn coins_of(pool: &DbPool, player_id: i64) -> i64 {
        let conn = get_connection(pool).unwrap();
        database::players::find_by_id(&conn, player_id)
            .unwrap()
            .unwrap()
            .coins
    }

    fn seed_players(pool: &DbPool, ids: &[i64]) {
        let conn = get_connection(pool).unwrap();
        for &id in ids {
            database::players::get_or_create_player(&conn, id).unwrap();
        }
    }

    #[test]
    fn daily_settlement_splits_the_net_pool() {
        let (engine, ledger, pool, broadcaster) = fixtures();
        seed_players(&pool, &[1, 2]);

        let tid = ledger
            .create_tournament(TournamentType::Daily, "Daily", 30.0, 0.0, 10.0, 10, 60)
            .unwrap()
            .id;
        ledger.submit_score(tid, 1, 10.0).unwrap();
        ledger.submit_score(tid, 2, 5.0).unwrap();

        let settlement = engine.settle(tid).unwrap();
        assert_eq!(settlement.house_cut_amount, 3.0);
        assert_eq!(settlement.net_pool, 27.0);
        assert_eq!(settlement.winners.len(), 2);
        assert_eq!(settlement.winners[0].payout, 13.5);
        assert!((settlement.winners[1].payout - 8.1).abs() < 1e-9);

        let paid: f64 = settlement.winners.iter().map(|w| w.payout).sum();
        assert!(paid <= settlement.net_pool);

        // Coin credits are floored.
        assert_eq!(coins_of(&pool, 1), 13);
        assert_eq!(coins_of(&pool, 2), 8);
        assert!(broadcaster.events().contains(&(tid, BroadcastAction::Settled)));
    }

    #[test]
    fn settling_twice_fails_fast_and_pays_nothing_extra() {
        let (engine, ledger, pool, _) = fixtures();
        seed_players(&pool, &[1]);

        let tid = ledger
            .create_tournament(TournamentType::Championship, "Champ", 100.0, 0.0, 10.0, 10, 60)
            .unwrap()
            .id;
        ledger.submit_score(tid, 1, 42.0).unwrap();

        engine.settle(tid).unwrap();
        let coins_after_first = coins_of(&pool, 1);

        let err = engine.settle(tid).unwrap_err();
        assert!(matches!(err, CoreError::StateConflict(_)));
        assert_eq!(coins_of(&pool, 1), coins_after_first);

        let conn = get_connection(&pool).unwrap();
        assert_eq!(database::audit::count_settlements(&conn, tid).unwrap(), 1);
    }

    #[test]
    fn missing_tournament_is_not_found() {
        let (engine, _, _, _) = fixtures();
        let err = engine.settle(404).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn unfilled_slots_stay_with_the_house() {
        let (engine, ledger, pool, _) = fixtures();
        seed_players(&pool, &[1]);

        // Daily pays four slots but only one entry exists.
        let tid = ledger
            .create_tournament(TournamentType::Daily, "Quiet day", 100.0, 0.0, 10.0, 10, 60)
            .unwrap()
            .id;
        ledger.submit_score(tid, 1, 1.0).unwrap();

        let settlement = engine.settle(tid).unwrap();
        assert_eq!(settlement.winners.len(), 1);
        assert_eq!(settlement.winners[0].payout, 45.0); // 90 net * 0.5
        assert_eq!(coins_of(&pool, 1), 45);
    }

    #[test]
    fn sweep_settles_due_tournaments_and_skips_running_ones() {
        let (engine, ledger, pool, _) = fixtures();
        seed_players(&pool, &[1]);

        let due = ledger
            .create_tournament(TournamentType::Daily, "Over", 10.0, 0.0, 10.0, 10, 60)
            .unwrap()
            .id;
        let running = ledger
            .create_tournament(TournamentType::Daily, "Running", 10.0, 0.0, 10.0, 10, 60)
            .unwrap()
            .id;
        ledger.submit_score(due, 1, 5.0).unwrap();

        {
            let conn = get_connection(&pool).unwrap();
            conn.execute(
                "UPDATE tournaments SET end_time = datetime('now', '-1 hour') WHERE id = ?1",
                rusqlite::params![due],
            )
            .unwrap();
        }

        assert_eq!(engine.settle_ended_tournaments().unwrap(), 1);

        let conn = get_connection(&pool).unwrap();
        let settled = database::tournaments::find_by_id(&conn, due).unwrap().unwrap();
        assert_eq!(settled.status.as_str(), "ENDED");
        let still_open = database::tournaments::find_by_id(&conn, running).unwrap().unwrap();
        assert_eq!(still_open.status.as_str(), "OPEN");
    }
}

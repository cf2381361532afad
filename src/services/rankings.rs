use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

use crate::database::models::{Tournament, TournamentEntry, TournamentType};
use crate::database::{self, DbPool};
use crate::errors::{CoreError, CoreResult};
use crate::notify::{BroadcastAction, Broadcaster};

/// Live tournament standings: score submission and rank recalculation.
pub struct RankLedger {
    pool: DbPool,
    broadcaster: Arc<dyn Broadcaster>,
}

impl RankLedger {
    pub fn new(pool: DbPool, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { pool, broadcaster }
    }

    /// Conditional score upsert with full rank recalculation.
    ///
    /// Scores are monotonic per entry: a lower or equal resubmission is a
    /// no-op that returns the stored entry unchanged. The player row is
    /// created lazily on first contact. Creating a new entry
    /// and reserving its participant slot happen in the same transaction,
    /// as does the rank rewrite, so readers never observe a half-updated
    /// table.
    pub fn submit_score(
        &self,
        tournament_id: i64,
        player_id: i64,
        score: f64,
    ) -> CoreResult<TournamentEntry> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start score transaction")?;

        let tournament = database::tournaments::find_by_id(&tx, tournament_id)?
            .ok_or_else(|| CoreError::conflict("tournament is not active"))?;
        if !tournament.status.accepts_scores() {
            return Err(CoreError::conflict("tournament is not active"));
        }

        database::players::get_or_create_player(&tx, player_id)?;
        let existing = database::entries::find_entry(&tx, tournament_id, player_id)?;

        let action = match existing {
            Some(entry) => {
                if !database::entries::try_raise_score(&tx, tournament_id, player_id, score)? {
                    // Lower or equal score: nothing changed, nothing to
                    // recompute or announce.
                    return Ok(entry);
                }
                BroadcastAction::ScoreUpdated
            }
            None => {
                if !database::tournaments::try_increment_participants(&tx, tournament_id)? {
                    return Err(CoreError::conflict("tournament is full"));
                }
                let now = Utc::now().naive_utc();
                database::entries::insert_entry(&tx, tournament_id, player_id, score, "free", now)?;
                BroadcastAction::NewEntry
            }
        };

        recompute_ranks(&tx, tournament_id)?;

        let entry = database::entries::find_entry(&tx, tournament_id, player_id)?
            .context("entry missing after upsert")?;
        tx.commit().context("Failed to commit score transaction")?;

        info!(
            "score accepted tournament={} player={} score={} rank={}",
            tournament_id, player_id, entry.score, entry.rank
        );
        self.broadcaster.notify(tournament_id, action);
        Ok(entry)
    }

    pub fn standings(&self, tournament_id: i64) -> CoreResult<Vec<TournamentEntry>> {
        let conn = database::get_connection(&self.pool)?;
        Ok(database::entries::list_ranked(&conn, tournament_id)?)
    }

    pub fn get_tournament(&self, tournament_id: i64) -> CoreResult<Tournament> {
        let conn = database::get_connection(&self.pool)?;
        database::tournaments::find_by_id(&conn, tournament_id)?
            .ok_or_else(|| CoreError::NotFound(format!("tournament {tournament_id}")))
    }

    /// Admin entry point: open a new tournament running from now.
    pub fn create_tournament(
        &self,
        tournament_type: TournamentType,
        title: &str,
        prize_pool: f64,
        entry_fee: f64,
        house_cut_percent: f64,
        max_participants: i32,
        duration_minutes: i64,
    ) -> CoreResult<Tournament> {
        if prize_pool < 0.0 || !(0.0..=100.0).contains(&house_cut_percent) {
            return Err(CoreError::invalid("bad prize pool or house cut"));
        }

        let conn = database::get_connection(&self.pool)?;
        let start = Utc::now().naive_utc();
        let end = start + Duration::minutes(duration_minutes);

        let tournament = database::tournaments::insert_tournament(
            &conn,
            tournament_type,
            title,
            prize_pool,
            entry_fee,
            house_cut_percent,
            max_participants,
            start,
            end,
        )?;

        info!(
            "tournament created id={} type={} pool={}",
            tournament.id,
            tournament_type.as_str(),
            prize_pool
        );
        Ok(tournament)
    }
}

/// Rewrites ranks for a whole tournament from a consistent snapshot:
/// score descending, ties broken by earlier join. Runs inside the caller's
/// transaction so a concurrent entry can never leave two rows on one rank.
pub(crate) fn recompute_ranks(tx: &Connection, tournament_id: i64) -> anyhow::Result<()> {
    let entries = database::entries::list_ranked(tx, tournament_id)?;

    for (position, entry) in entries.iter().enumerate() {
        let rank = (position + 1) as i32;
        if entry.rank != rank {
            database::entries::set_rank(tx, entry.id, rank)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, setup};
    use crate::notify::RecordingBroadcaster;

    fn ledger() -> (RankLedger, Arc<RecordingBroadcaster>) {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        setup::reset_database(&mut conn).unwrap();
        drop(conn);

        let broadcaster = Arc::new(RecordingBroadcaster::default());
        (RankLedger::new(pool, broadcaster.clone()), broadcaster)
    }

    fn daily_tournament(ledger: &RankLedger, max_participants: i32) -> i64 {
        ledger
            .create_tournament(
                TournamentType::Daily,
                "Daily Derby",
                30.0,
                0.0,
                10.0,
                max_participants,
                60,
            )
            .unwrap()
            .id
    }

    #[test]
    fn first_submission_creates_entry_and_reserves_slot() {
        let (ledger, broadcaster) = ledger();
        let tid = daily_tournament(&ledger, 10);

        let entry = ledger.submit_score(tid, 1, 50.0).unwrap();
        assert_eq!(entry.score, 50.0);
        assert_eq!(entry.rank, 1);

        let tournament = ledger.get_tournament(tid).unwrap();
        assert_eq!(tournament.current_participants, 1);
        assert_eq!(broadcaster.events(), vec![(tid, BroadcastAction::NewEntry)]);
    }

    #[test]
    fn first_submission_creates_the_player_row() {
        let (ledger, _) = ledger();
        let tid = daily_tournament(&ledger, 10);

        // No prior sync: the player row does not exist yet.
        ledger.submit_score(tid, 7, 12.0).unwrap();

        let conn = database::get_connection(&ledger.pool).unwrap();
        assert!(database::players::find_by_id(&conn, 7).unwrap().is_some());
    }

    #[test]
    fn lower_or_equal_score_is_a_no_op() {
        let (ledger, broadcaster) = ledger();
        let tid = daily_tournament(&ledger, 10);

        ledger.submit_score(tid, 1, 80.0).unwrap();

        let unchanged = ledger.submit_score(tid, 1, 50.0).unwrap();
        assert_eq!(unchanged.score, 80.0);
        let tied = ledger.submit_score(tid, 1, 80.0).unwrap();
        assert_eq!(tied.score, 80.0);

        // Only the original submission was announced.
        assert_eq!(broadcaster.events().len(), 1);
        let tournament = ledger.get_tournament(tid).unwrap();
        assert_eq!(tournament.current_participants, 1);
    }

    #[test]
    fn score_submissions_converge_to_the_maximum_in_any_order() {
        let (ledger, _) = ledger();

        // 50 then 80.
        let tid = daily_tournament(&ledger, 10);
        ledger.submit_score(tid, 1, 50.0).unwrap();
        let entry = ledger.submit_score(tid, 1, 80.0).unwrap();
        assert_eq!(entry.score, 80.0);

        // 80 then 50.
        let tid = daily_tournament(&ledger, 10);
        ledger.submit_score(tid, 1, 80.0).unwrap();
        let entry = ledger.submit_score(tid, 1, 50.0).unwrap();
        assert_eq!(entry.score, 80.0);
    }

    #[test]
    fn ranks_follow_scores_with_join_time_tiebreak() {
        let (ledger, _) = ledger();
        let tid = daily_tournament(&ledger, 10);

        // Seed tied scores with distinct join times directly.
        let conn = database::get_connection(&ledger.pool).unwrap();
        for id in [1, 2, 3] {
            database::players::get_or_create_player(&conn, id).unwrap();
        }
        let base = Utc::now().naive_utc();
        database::entries::insert_entry(&conn, tid, 1, 10.0, "free", base).unwrap();
        database::entries::insert_entry(&conn, tid, 2, 10.0, "free", base + Duration::seconds(5))
            .unwrap();
        database::entries::insert_entry(&conn, tid, 3, 25.0, "free", base + Duration::seconds(9))
            .unwrap();
        recompute_ranks(&conn, tid).unwrap();

        let standings = database::entries::list_ranked(&conn, tid).unwrap();
        let order: Vec<(i64, i32)> = standings.iter().map(|e| (e.player_id, e.rank)).collect();
        // Highest score first; the earlier joiner wins the tie.
        assert_eq!(order, vec![(3, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn full_tournament_rejects_new_entries() {
        let (ledger, _) = ledger();
        let tid = daily_tournament(&ledger, 2);

        ledger.submit_score(tid, 1, 10.0).unwrap();
        ledger.submit_score(tid, 2, 20.0).unwrap();

        let err = ledger.submit_score(tid, 3, 30.0).unwrap_err();
        assert!(matches!(err, CoreError::StateConflict(_)));

        // Existing entrants can still improve their score.
        let entry = ledger.submit_score(tid, 1, 40.0).unwrap();
        assert_eq!(entry.score, 40.0);
    }

    #[test]
    fn missing_or_ended_tournament_is_a_state_conflict() {
        let (ledger, _) = ledger();

        let err = ledger.submit_score(999, 1, 10.0).unwrap_err();
        assert!(matches!(err, CoreError::StateConflict(_)));

        let tid = daily_tournament(&ledger, 10);
        {
            let conn = database::get_connection(&ledger.pool).unwrap();
            database::tournaments::try_mark_ended(&conn, tid, Utc::now().naive_utc()).unwrap();
        }
        let err = ledger.submit_score(tid, 1, 10.0).unwrap_err();
        assert!(matches!(err, CoreError::StateConflict(_)));
    }
}

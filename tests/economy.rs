//! End-to-end economy flows across the catch, tournament and marketplace
//! services, all running against one in-memory database.

use std::sync::Arc;

use chrono::{Duration, Utc};

use fishing_derby::config::settings::AppConfig;
use fishing_derby::database::models::{ItemType, TournamentType};
use fishing_derby::database::{self, DbPool};
use fishing_derby::errors::CoreError;
use fishing_derby::notify::{BroadcastAction, RecordingBroadcaster};
use fishing_derby::services::{
    CatchEvent, CatchService, MarketplaceExchange, RankLedger, SettlementEngine,
};

struct World {
    pool: DbPool,
    catches: CatchService,
    rankings: RankLedger,
    settlement: SettlementEngine,
    marketplace: MarketplaceExchange,
    broadcaster: Arc<RecordingBroadcaster>,
}

fn world() -> World {
    let pool = database::create_memory_pool().unwrap();
    let mut conn = database::get_connection(&pool).unwrap();
    database::setup::reset_database(&mut conn).unwrap();
    drop(conn);

    let config = AppConfig::new();
    let broadcaster = Arc::new(RecordingBroadcaster::default());

    World {
        pool: pool.clone(),
        catches: CatchService::new(pool.clone(), config.clone()),
        rankings: RankLedger::new(pool.clone(), broadcaster.clone()),
        settlement: SettlementEngine::new(pool.clone(), broadcaster.clone()),
        marketplace: MarketplaceExchange::new(pool, config),
        broadcaster,
    }
}

fn seed_player(world: &World, id: i64) {
    let conn = database::get_connection(&world.pool).unwrap();
    database::players::get_or_create_player(&conn, id).unwrap();
}

fn make_premium(world: &World, id: i64) {
    let conn = database::get_connection(&world.pool).unwrap();
    let until = Utc::now().naive_utc() + Duration::days(30);
    database::players::set_premium_until(&conn, id, until).unwrap();
}

fn give_coins(world: &World, id: i64, coins: i64) {
    let conn = database::get_connection(&world.pool).unwrap();
    database::players::credit_coins(&conn, id, coins).unwrap();
}

fn coins_of(world: &World, id: i64) -> i64 {
    let conn = database::get_connection(&world.pool).unwrap();
    database::players::find_by_id(&conn, id)
        .unwrap()
        .unwrap()
        .coins
}

fn catch_event(player_id: i64, fish_id: &str, rarity: &str, weight: f64) -> CatchEvent {
    CatchEvent {
        player_id,
        fish_id: fish_id.to_string(),
        claimed_rarity: rarity.to_string(),
        reaction_ms: 300,
        weight,
        bait_id: "worm".to_string(),
        client_timestamp: Utc::now().naive_utc(),
    }
}

#[test]
fn catch_to_settlement_flow() {
    let world = world();
    seed_player(&world, 1);
    seed_player(&world, 2);

    // Both players land a validated catch and earn coins server-side.
    let outcome = world
        .catches
        .validate_catch(&catch_event(1, "mackerel", "common", 1.5))
        .unwrap();
    assert!(outcome.accepted);
    assert_eq!(coins_of(&world, 1), 15);

    let outcome = world
        .catches
        .validate_catch(&catch_event(2, "perch", "common", 0.8))
        .unwrap();
    assert!(outcome.accepted);

    // They enter the daily tournament with their catch weights as scores.
    let tid = world
        .rankings
        .create_tournament(TournamentType::Daily, "Daily Derby", 30.0, 0.0, 10.0, 50, 60)
        .unwrap()
        .id;
    world.rankings.submit_score(tid, 1, 10.0).unwrap();
    world.rankings.submit_score(tid, 2, 5.0).unwrap();

    let before_1 = coins_of(&world, 1);
    let before_2 = coins_of(&world, 2);

    let settlement = world.settlement.settle(tid).unwrap();
    assert_eq!(settlement.house_cut_amount, 3.0);
    assert_eq!(settlement.net_pool, 27.0);

    // Daily shares are 50/30/15/5: rank 1 gets 13.5, rank 2 gets 8.1,
    // 21.6 of the 27 net pool paid out in total.
    let paid: f64 = settlement.winners.iter().map(|w| w.payout).sum();
    assert!((paid - 21.6).abs() < 1e-9);
    assert!(paid <= settlement.net_pool);
    assert_eq!(coins_of(&world, 1), before_1 + 13);
    assert_eq!(coins_of(&world, 2), before_2 + 8);

    // A retry cannot double-pay.
    assert!(matches!(
        world.settlement.settle(tid).unwrap_err(),
        CoreError::StateConflict(_)
    ));
    assert_eq!(coins_of(&world, 1), before_1 + 13);

    let events = world.broadcaster.events();
    assert_eq!(
        events,
        vec![
            (tid, BroadcastAction::NewEntry),
            (tid, BroadcastAction::NewEntry),
            (tid, BroadcastAction::Settled),
        ]
    );
}

#[test]
fn marketplace_trade_conserves_coins_minus_fee() {
    let world = world();
    seed_player(&world, 1);
    seed_player(&world, 2);
    make_premium(&world, 1);
    give_coins(&world, 1, 100);
    give_coins(&world, 2, 777);

    {
        let conn = database::get_connection(&world.pool).unwrap();
        database::inventories::add_bait(&conn, 1, "abyssal_lure", 1).unwrap();
    }

    let listing = world
        .marketplace
        .create_listing(1, ItemType::Bait, "abyssal_lure", 1, 333)
        .unwrap();

    let seller_before = coins_of(&world, 1);
    let buyer_before = coins_of(&world, 2);

    let purchase = world.marketplace.buy_listing(listing.id, 2).unwrap();
    let fee = purchase.marketplace_fee;
    assert_eq!(fee, 33); // floor(333 * 0.10)

    let seller_after = coins_of(&world, 1);
    let buyer_after = coins_of(&world, 2);

    assert_eq!(buyer_after, buyer_before - 333);
    assert_eq!(seller_after, seller_before + 333 - fee);
    // The two deltas sum to -fee: the fee leaves circulation.
    assert_eq!(
        (buyer_after - buyer_before) + (seller_after - seller_before),
        -fee
    );

    let conn = database::get_connection(&world.pool).unwrap();
    assert_eq!(
        database::inventories::bait_count(&conn, 2, "abyssal_lure").unwrap(),
        1
    );
}

#[test]
fn reserved_quantity_cannot_be_double_listed() {
    let world = world();
    seed_player(&world, 1);
    make_premium(&world, 1);

    {
        let conn = database::get_connection(&world.pool).unwrap();
        database::inventories::add_bait(&conn, 1, "shrimp", 3).unwrap();
    }

    world
        .marketplace
        .create_listing(1, ItemType::Bait, "shrimp", 3, 90)
        .unwrap();

    {
        let conn = database::get_connection(&world.pool).unwrap();
        assert_eq!(database::inventories::bait_count(&conn, 1, "shrimp").unwrap(), 0);
    }

    let err = world
        .marketplace
        .create_listing(1, ItemType::Bait, "shrimp", 3, 90)
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientFunds(_)));
}

#[test]
fn concurrent_submissions_converge_on_a_file_backed_pool() {
    // The in-memory pool is capped at one connection, so contention only
    // shows up against a real file with multiple writers.
    let path = std::env::temp_dir().join(format!(
        "fishing_derby_concurrency_{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let pool = database::create_pool(path.to_str().unwrap()).unwrap();
    let mut conn = database::get_connection(&pool).unwrap();
    database::setup::reset_database(&mut conn).unwrap();
    drop(conn);

    let ledger = Arc::new(RankLedger::new(
        pool.clone(),
        Arc::new(RecordingBroadcaster::default()),
    ));
    let tid = ledger
        .create_tournament(TournamentType::Daily, "Rush Hour", 10.0, 0.0, 10.0, 50, 60)
        .unwrap()
        .id;

    let handles: Vec<_> = (1..=4)
        .map(|player_id: i64| {
            let ledger = ledger.clone();
            std::thread::spawn(move || {
                for step in 0..10 {
                    let score = (player_id * 100 + step) as f64;
                    ledger.submit_score(tid, player_id, score).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every submission succeeded and each entry holds that player's
    // maximum, regardless of interleaving.
    let standings = ledger.standings(tid).unwrap();
    assert_eq!(standings.len(), 4);
    for entry in &standings {
        assert_eq!(entry.score, (entry.player_id * 100 + 9) as f64);
    }
    let ranked: Vec<(i64, i32)> = standings.iter().map(|e| (e.player_id, e.rank)).collect();
    assert_eq!(ranked, vec![(4, 1), (3, 2), (2, 3), (1, 4)]);

    drop(ledger);
    drop(pool);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn tournament_winnings_fund_marketplace_purchases() {
    let world = world();
    seed_player(&world, 1);
    seed_player(&world, 2);
    make_premium(&world, 2);

    {
        let conn = database::get_connection(&world.pool).unwrap();
        database::inventories::add_bait(&conn, 2, "glow_lure", 1).unwrap();
    }

    let tid = world
        .rankings
        .create_tournament(TournamentType::Championship, "Grand Final", 100.0, 0.0, 10.0, 8, 60)
        .unwrap()
        .id;
    world.rankings.submit_score(tid, 1, 99.0).unwrap();
    world.settlement.settle(tid).unwrap();

    // Winner takes the whole 90-coin net pool, floored.
    assert_eq!(coins_of(&world, 1), 90);

    let listing = world
        .marketplace
        .create_listing(2, ItemType::Bait, "glow_lure", 1, 60)
        .unwrap();
    world.marketplace.buy_listing(listing.id, 1).unwrap();

    assert_eq!(coins_of(&world, 1), 30);
    assert_eq!(coins_of(&world, 2), 54); // 60 - floor(60 * 0.10)
}

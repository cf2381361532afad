use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::api::models::{
    BaitItem, BuyRequest, CancelRequest, CatchRequest, CatchResponse, CreateListingRequest,
    CreateTournamentRequest, EntryItem, ListingItem, PlayerResponse, PurchaseResponse,
    ScoreRequest, StandingsResponse, SweepResponse, TournamentResponse,
};
use crate::database::models::{
    ItemType, MarketplaceListing, Tournament, TournamentEntry, TournamentType,
};
use crate::errors::CoreError;
use crate::services::{CatchEvent, CatchService, MarketplaceExchange, RankLedger, SettlementEngine};

pub struct AppState {
    pub catches: CatchService,
    pub rankings: RankLedger,
    pub settlement: SettlementEngine,
    pub marketplace: MarketplaceExchange,
}

fn error_response(err: CoreError) -> Response {
    let status = match &err {
        CoreError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        CoreError::StateConflict(_) => StatusCode::CONFLICT,
        CoreError::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}

pub async fn post_catch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CatchRequest>,
) -> impl IntoResponse {
    let event = CatchEvent {
        player_id: req.player_id,
        fish_id: req.fish_id,
        claimed_rarity: req.claimed_rarity,
        reaction_ms: req.reaction_ms,
        weight: req.weight,
        bait_id: req.bait_id,
        client_timestamp: req.client_timestamp,
    };

    match state.catches.validate_catch(&event) {
        Ok(outcome) => Json(CatchResponse {
            accepted: outcome.accepted,
            reason: outcome.reason,
            xp_gained: outcome.xp_gained,
            coins_gained: outcome.coins_gained,
            leveled_up_to: outcome.leveled_up_to,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn post_score(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
    Json(req): Json<ScoreRequest>,
) -> impl IntoResponse {
    match state
        .rankings
        .submit_score(tournament_id, req.player_id, req.score)
    {
        Ok(entry) => Json(entry_item(&entry)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_standings(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
) -> impl IntoResponse {
    let tournament = match state.rankings.get_tournament(tournament_id) {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };
    let entries = match state.rankings.standings(tournament_id) {
        Ok(entries) => entries,
        Err(e) => return error_response(e),
    };

    Json(StandingsResponse {
        tournament_id,
        status: tournament.status.as_str().to_string(),
        current_participants: tournament.current_participants,
        max_participants: tournament.max_participants,
        entries: entries.iter().map(entry_item).collect(),
    })
    .into_response()
}

/// Creates the player row on first contact, refills casts and returns the
/// current state.
pub async fn post_sync(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> impl IntoResponse {
    match state.catches.sync_player(player_id) {
        Ok((player, baits)) => {
            let now = chrono::Utc::now().naive_utc();
            Json(PlayerResponse {
                id: player.id,
                xp: player.xp,
                level: player.level,
                coins: player.coins,
                premium: player.is_premium(now),
                casts_remaining: player.casts_remaining,
                max_casts: player.max_casts,
                pending_chests: player.pending_chests,
                baits: baits
                    .into_iter()
                    .map(|b| BaitItem {
                        bait_id: b.bait_id,
                        count: b.count,
                    })
                    .collect(),
            })
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn get_listings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.marketplace.list_active() {
        Ok(listings) => {
            Json(listings.iter().map(listing_item).collect::<Vec<_>>()).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn post_listing(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateListingRequest>,
) -> impl IntoResponse {
    let Some(item_type) = ItemType::parse(&req.item_type) else {
        return (StatusCode::BAD_REQUEST, "unknown item type").into_response();
    };

    match state.marketplace.create_listing(
        req.seller_id,
        item_type,
        &req.item_id,
        req.quantity,
        req.price_coins,
    ) {
        Ok(listing) => Json(listing_item(&listing)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn post_buy(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<i64>,
    Json(req): Json<BuyRequest>,
) -> impl IntoResponse {
    match state.marketplace.buy_listing(listing_id, req.buyer_id) {
        Ok(purchase) => Json(PurchaseResponse {
            listing_id: purchase.listing_id,
            buyer_id: purchase.buyer_id,
            price_paid: purchase.price_paid,
            marketplace_fee: purchase.marketplace_fee,
            purchased_at: purchase.purchased_at,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn post_cancel(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<i64>,
    Json(req): Json<CancelRequest>,
) -> impl IntoResponse {
    match state.marketplace.cancel_listing(listing_id, req.seller_id) {
        Ok(listing) => Json(listing_item(&listing)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn admin_create_tournament(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTournamentRequest>,
) -> impl IntoResponse {
    let Some(tournament_type) = TournamentType::parse(&req.tournament_type) else {
        return (StatusCode::BAD_REQUEST, "unknown tournament type").into_response();
    };

    match state.rankings.create_tournament(
        tournament_type,
        &req.title,
        req.prize_pool,
        req.entry_fee,
        req.house_cut_percent.unwrap_or(10.0),
        req.max_participants,
        req.duration_minutes,
    ) {
        Ok(tournament) => Json(tournament_response(&tournament)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Runs both background sweeps: settle ended tournaments, expire stale
/// listings. Wired to a cron collaborator in production.
pub async fn admin_sweep(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tournaments_settled = match state.settlement.settle_ended_tournaments() {
        Ok(n) => n,
        Err(e) => return error_response(e),
    };
    let listings_expired = match state.marketplace.sweep_expired() {
        Ok(n) => n,
        Err(e) => return error_response(e),
    };

    Json(SweepResponse {
        tournaments_settled,
        listings_expired,
    })
    .into_response()
}

fn entry_item(entry: &TournamentEntry) -> EntryItem {
    EntryItem {
        player_id: entry.player_id,
        score: entry.score,
        rank: entry.rank,
        payout: entry.payout,
        joined_at: entry.joined_at,
    }
}

fn listing_item(listing: &MarketplaceListing) -> ListingItem {
    ListingItem {
        id: listing.id,
        seller_id: listing.seller_id,
        item_type: listing.item_type.as_str().to_string(),
        item_id: listing.item_id.clone(),
        quantity: listing.quantity,
        price_coins: listing.price_coins,
        status: listing.status.as_str().to_string(),
        expires_at: listing.expires_at,
    }
}

fn tournament_response(tournament: &Tournament) -> TournamentResponse {
    TournamentResponse {
        id: tournament.id,
        tournament_type: tournament.tournament_type.as_str().to_string(),
        title: tournament.title.clone(),
        prize_pool: tournament.prize_pool,
        status: tournament.status.as_str().to_string(),
        start_time: tournament.start_time,
        end_time: tournament.end_time,
    }
}

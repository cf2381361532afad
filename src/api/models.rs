use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchRequest {
    pub player_id: i64,
    pub fish_id: String,
    pub claimed_rarity: String,
    pub reaction_ms: i64,
    pub weight: f64,
    pub bait_id: String,
    pub client_timestamp: NaiveDateTime,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchResponse {
    pub accepted: bool,
    pub reason: Option<String>,
    pub xp_gained: i64,
    pub coins_gained: i64,
    pub leveled_up_to: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub player_id: i64,
    pub score: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryItem {
    pub player_id: i64,
    pub score: f64,
    pub rank: i32,
    pub payout: Option<f64>,
    pub joined_at: NaiveDateTime,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub tournament_id: i64,
    pub status: String,
    pub current_participants: i32,
    pub max_participants: i32,
    pub entries: Vec<EntryItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: i64,
    pub xp: i64,
    pub level: i32,
    pub coins: i64,
    pub premium: bool,
    pub casts_remaining: i32,
    pub max_casts: i32,
    pub pending_chests: i32,
    pub baits: Vec<BaitItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaitItem {
    pub bait_id: String,
    pub count: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub seller_id: i64,
    pub item_type: String,
    pub item_id: String,
    pub quantity: i64,
    pub price_coins: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    pub id: i64,
    pub seller_id: i64,
    pub item_type: String,
    pub item_id: String,
    pub quantity: i64,
    pub price_coins: i64,
    pub status: String,
    pub expires_at: NaiveDateTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    pub buyer_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub seller_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub listing_id: i64,
    pub buyer_id: i64,
    pub price_paid: i64,
    pub marketplace_fee: i64,
    pub purchased_at: NaiveDateTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentRequest {
    pub tournament_type: String,
    pub title: String,
    pub prize_pool: f64,
    pub entry_fee: f64,
    pub house_cut_percent: Option<f64>,
    pub max_participants: i32,
    pub duration_minutes: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentResponse {
    pub id: i64,
    pub tournament_type: String,
    pub title: String,
    pub prize_pool: f64,
    pub status: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
    pub tournaments_settled: usize,
    pub listings_expired: usize,
}

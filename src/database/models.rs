use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Player {
    pub id: i64,
    pub xp: i64,
    pub level: i32,
    pub coins: i64,
    pub premium_until: Option<NaiveDateTime>,
    pub casts_remaining: i32,
    pub max_casts: i32,
    pub pending_chests: i32,
    pub created_at: Option<NaiveDateTime>,
}

impl Player {
    pub fn is_premium(&self, now: NaiveDateTime) -> bool {
        self.premium_until.is_some_and(|until| until > now)
    }
}

#[derive(Debug, Clone)]
pub struct BaitStack {
    pub bait_id: String,
    pub count: i64,
}

#[derive(Debug, Clone)]
pub struct OwnedRod {
    pub rod_id: String,
    pub soulbound: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentType {
    Daily,
    Weekly,
    Boss,
    Championship,
}

impl TournamentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentType::Daily => "daily",
            TournamentType::Weekly => "weekly",
            TournamentType::Boss => "boss",
            TournamentType::Championship => "championship",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(TournamentType::Daily),
            "weekly" => Some(TournamentType::Weekly),
            "boss" => Some(TournamentType::Boss),
            "championship" => Some(TournamentType::Championship),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentStatus {
    Open,
    Live,
    Ended,
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Open => "OPEN",
            TournamentStatus::Live => "LIVE",
            TournamentStatus::Ended => "ENDED",
            TournamentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(TournamentStatus::Open),
            "LIVE" => Some(TournamentStatus::Live),
            "ENDED" => Some(TournamentStatus::Ended),
            "CANCELLED" => Some(TournamentStatus::Cancelled),
            _ => None,
        }
    }

    /// OPEN and LIVE tournaments accept score submissions.
    pub fn accepts_scores(&self) -> bool {
        matches!(self, TournamentStatus::Open | TournamentStatus::Live)
    }
}

#[derive(Debug, Clone)]
pub struct Tournament {
    pub id: i64,
    pub tournament_type: TournamentType,
    pub title: String,
    pub prize_pool: f64,
    pub entry_fee: f64,
    pub house_cut_percent: f64,
    pub max_participants: i32,
    pub current_participants: i32,
    pub status: TournamentStatus,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub settled_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct TournamentEntry {
    pub id: i64,
    pub tournament_id: i64,
    pub player_id: i64,
    pub score: f64,
    pub rank: i32,
    pub payout: Option<f64>,
    pub entry_method: String,
    pub joined_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    Active,
    Sold,
    Cancelled,
    Expired,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "ACTIVE",
            ListingStatus::Sold => "SOLD",
            ListingStatus::Cancelled => "CANCELLED",
            ListingStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ListingStatus::Active),
            "SOLD" => Some(ListingStatus::Sold),
            "CANCELLED" => Some(ListingStatus::Cancelled),
            "EXPIRED" => Some(ListingStatus::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Bait,
    Rod,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Bait => "bait",
            ItemType::Rod => "rod",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bait" => Some(ItemType::Bait),
            "rod" => Some(ItemType::Rod),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketplaceListing {
    pub id: i64,
    pub seller_id: i64,
    pub item_type: ItemType,
    pub item_id: String,
    pub quantity: i64,
    pub price_coins: i64,
    pub status: ListingStatus,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct MarketplacePurchase {
    pub id: i64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub price_paid: i64,
    pub marketplace_fee: i64,
    pub purchased_at: NaiveDateTime,
}

/// One paid slot in a settlement, persisted as part of the audit record.
#[derive(Debug, Clone, Serialize)]
pub struct SettledWinner {
    pub player_id: i64,
    pub rank: i32,
    pub payout: f64,
    pub coins_credited: i64,
}

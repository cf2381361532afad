//! Canonical fish and bait tables. These are server truth: anything the
//! client claims about a catch is checked against this module.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Relative spawn weight out of 100.
    pub fn spawn_weight(&self) -> u32 {
        match self {
            Rarity::Common => 55,
            Rarity::Uncommon => 25,
            Rarity::Rare => 12,
            Rarity::Epic => 6,
            Rarity::Legendary => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FishSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub rarity: Rarity,
    pub xp: i64,
    /// Base reaction window in milliseconds; the validator widens it by
    /// level and a fixed latency pad.
    pub catch_window_ms: i64,
    pub min_weight: f64,
    pub max_weight: f64,
}

pub const FISH: &[FishSpec] = &[
    FishSpec { id: "minnow", name: "Minnow", rarity: Rarity::Common, xp: 5, catch_window_ms: 1400, min_weight: 0.1, max_weight: 0.4 },
    FishSpec { id: "perch", name: "Perch", rarity: Rarity::Common, xp: 8, catch_window_ms: 1300, min_weight: 0.3, max_weight: 1.2 },
    FishSpec { id: "mackerel", name: "Mackerel", rarity: Rarity::Common, xp: 10, catch_window_ms: 1200, min_weight: 0.5, max_weight: 2.0 },
    FishSpec { id: "bass", name: "Sea Bass", rarity: Rarity::Uncommon, xp: 18, catch_window_ms: 1000, min_weight: 1.0, max_weight: 4.5 },
    FishSpec { id: "snapper", name: "Red Snapper", rarity: Rarity::Uncommon, xp: 22, catch_window_ms: 950, min_weight: 1.5, max_weight: 6.0 },
    FishSpec { id: "pike", name: "Pike", rarity: Rarity::Rare, xp: 40, catch_window_ms: 800, min_weight: 2.0, max_weight: 12.0 },
    FishSpec { id: "tuna", name: "Bluefin Tuna", rarity: Rarity::Rare, xp: 55, catch_window_ms: 700, min_weight: 15.0, max_weight: 80.0 },
    FishSpec { id: "swordfish", name: "Swordfish", rarity: Rarity::Epic, xp: 90, catch_window_ms: 550, min_weight: 30.0, max_weight: 150.0 },
    FishSpec { id: "giant_squid", name: "Giant Squid", rarity: Rarity::Epic, xp: 110, catch_window_ms: 500, min_weight: 50.0, max_weight: 250.0 },
    FishSpec { id: "kraken", name: "Kraken", rarity: Rarity::Legendary, xp: 250, catch_window_ms: 350, min_weight: 200.0, max_weight: 800.0 },
    FishSpec { id: "leviathan", name: "Leviathan", rarity: Rarity::Legendary, xp: 300, catch_window_ms: 320, min_weight: 300.0, max_weight: 1000.0 },
];

#[derive(Debug, Clone, Copy)]
pub struct BaitSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub price_coins: i64,
}

pub const BAITS: &[BaitSpec] = &[
    BaitSpec { id: "worm", name: "Worm", price_coins: 5 },
    BaitSpec { id: "shrimp", name: "Shrimp", price_coins: 15 },
    BaitSpec { id: "squid_chunk", name: "Squid Chunk", price_coins: 40 },
    BaitSpec { id: "glow_lure", name: "Glow Lure", price_coins: 120 },
    BaitSpec { id: "abyssal_lure", name: "Abyssal Lure", price_coins: 400 },
];

pub fn find_fish(id: &str) -> Option<&'static FishSpec> {
    FISH.iter().find(|f| f.id == id)
}

pub fn find_bait(id: &str) -> Option<&'static BaitSpec> {
    BAITS.iter().find(|b| b.id == id)
}

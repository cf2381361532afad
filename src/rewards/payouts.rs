//! Prize split tables per tournament type.
//!
//! One canonical table per type. Slot `i` of the table is the share of the
//! net pool paid to rank `i + 1`; a fully populated table sums to exactly
//! 1.0. When a tournament has fewer ranked entries than slots, the unfilled
//! shares are not redistributed and stay with the house.

use crate::database::models::TournamentType;

const DAILY_SHARES: &[f64] = &[0.50, 0.30, 0.15, 0.05];
const WEEKLY_SHARES: &[f64] = &[0.40, 0.25, 0.15, 0.10, 0.06, 0.04];
const BOSS_SHARES: &[f64] = &[0.50, 0.25, 0.15, 0.07, 0.03];
const CHAMPIONSHIP_SHARES: &[f64] = &[1.0];

pub fn payout_shares(tournament_type: TournamentType) -> &'static [f64] {
    match tournament_type {
        TournamentType::Daily => DAILY_SHARES,
        TournamentType::Weekly => WEEKLY_SHARES,
        TournamentType::Boss => BOSS_SHARES,
        TournamentType::Championship => CHAMPIONSHIP_SHARES,
    }
}

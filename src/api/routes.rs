use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::handlers::{
    AppState, admin_create_tournament, admin_sweep, get_listings, get_standings, post_buy,
    post_cancel, post_catch, post_listing, post_score, post_sync,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/catch", post(post_catch))
        .route("/api/player/:id/sync", post(post_sync))
        .route("/api/tournament/:id/score", post(post_score))
        .route("/api/tournament/:id/standings", get(get_standings))
        .route("/api/marketplace/listings", get(get_listings).post(post_listing))
        .route("/api/marketplace/listings/:id/buy", post(post_buy))
        .route("/api/marketplace/listings/:id/cancel", post(post_cancel))
        .route("/api/admin/tournaments", post(admin_create_tournament))
        .route("/api/admin/sweep", post(admin_sweep))
        .with_state(state)
}

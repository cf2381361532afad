use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use log::info;
use tower_http::cors::CorsLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::settings::{AppConfig, database_path};
use crate::database;
use crate::notify::LogBroadcaster;
use crate::services::{CatchService, MarketplaceExchange, RankLedger, SettlementEngine};

pub struct ServerService {
    port: u16,
    config: AppConfig,
    ephemeral: bool,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig, ephemeral: bool) -> Self {
        Self {
            port,
            config,
            ephemeral,
        }
    }

    pub async fn run(&self) -> Result<()> {
        let pool = if self.ephemeral {
            let pool = database::create_memory_pool()?;
            let mut conn = database::get_connection(&pool)?;
            database::setup::reset_database(&mut conn)?;
            pool
        } else {
            database::create_pool(&database_path())?
        };

        let broadcaster = Arc::new(LogBroadcaster);

        let state = Arc::new(AppState {
            catches: CatchService::new(pool.clone(), self.config.clone()),
            rankings: RankLedger::new(pool.clone(), broadcaster.clone()),
            settlement: SettlementEngine::new(pool.clone(), broadcaster.clone()),
            marketplace: MarketplaceExchange::new(pool, self.config.clone()),
        });

        let app = create_router(state).layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

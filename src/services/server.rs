use anyhow::{Context, Result};
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::settings::AppConfig;
use crate::database;
use crate::services::challenges::ChallengeService;
use crate::services::notify::LogNotifier;
use crate::services::recompute::RecomputeService;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let db_path = &self.config.server.database_path;
        let pool = database::create_pool(db_path)?;
        {
            let conn = database::get_connection(&pool)?;
            database::initialize_database(&conn)?;
        }
        if self.config.server.admin_token.is_none() {
            log::warn!("ADMIN_TOKEN not set, admin endpoints are disabled");
        }

        let state = Arc::new(AppState {
            challenges: ChallengeService::new(
                pool.clone(),
                self.config.clone(),
                Arc::new(LogNotifier),
            ),
            recompute: RecomputeService::new(pool.clone(), self.config.clone()),
            pool,
            config: self.config.clone(),
        });

        let app = create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {} (database {})", addr, db_path);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

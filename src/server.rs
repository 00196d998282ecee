//! HTTP move service.
//!
//! Exposes the CPU tiers over `POST /api/cpu-move`. The hard-tier budget
//! is shared by every request the service handles.

use crate::games::tictactoe::TieredOpponent;
use crate::protocol::{MoveRequest, MoveResponse};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::{Arc, Mutex};
use tower::ServiceBuilder;
use tracing::{error, info, instrument};

/// Shared state of the move service.
#[derive(Debug, Clone)]
pub struct MoveService {
    opponent: Arc<Mutex<TieredOpponent>>,
}

impl MoveService {
    /// Creates a service answering with `opponent`.
    #[instrument(skip(opponent), fields(hard_budget = ?opponent.hard_budget()))]
    pub fn new(opponent: TieredOpponent) -> Self {
        info!("Creating move service");
        Self {
            opponent: Arc::new(Mutex::new(opponent)),
        }
    }

    /// Builds the router.
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/cpu-move", post(cpu_move))
            .route("/health", get(health))
            .with_state(self)
            .layer(ServiceBuilder::new().map_request(|req: Request| {
                info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
                req
            }))
    }
}

#[instrument(skip_all, fields(difficulty = %request.difficulty, history_rounds = request.history.len()))]
async fn cpu_move(
    State(service): State<MoveService>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, StatusCode> {
    let mut opponent = service.opponent.lock().map_err(|_| {
        error!("Opponent lock poisoned");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(opponent.respond(&request)))
}

async fn health() -> &'static str {
    "ok"
}

/// Serves the move service until the process is stopped.
#[instrument(skip(service))]
pub async fn serve(host: String, port: u16, service: MoveService) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(address = %listener.local_addr()?, "Move service ready");
    axum::serve(listener, service.router()).await?;
    Ok(())
}

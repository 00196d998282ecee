//! The seam between the series controller and whatever plays the CPU.

use super::error::ProviderError;
use crate::games::tictactoe::TieredOpponent;
use crate::protocol::{MoveRequest, MoveResponse};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::instrument;

/// Produces the CPU's reply to a move request.
#[async_trait]
pub trait MoveProvider: Send + Sync {
    /// Returns the CPU's reply.
    async fn next_move(&self, request: &MoveRequest) -> Result<MoveResponse, ProviderError>;

    /// Short name for logs and the status line.
    fn name(&self) -> &str;
}

/// Runs the CPU in-process.
#[derive(Debug, Default)]
pub struct LocalProvider {
    opponent: Mutex<TieredOpponent>,
}

impl LocalProvider {
    /// Wraps an opponent.
    pub fn new(opponent: TieredOpponent) -> Self {
        Self {
            opponent: Mutex::new(opponent),
        }
    }
}

#[async_trait]
impl MoveProvider for LocalProvider {
    #[instrument(skip_all)]
    async fn next_move(&self, request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        let mut opponent = self
            .opponent
            .lock()
            .map_err(|_| ProviderError::new("Opponent lock poisoned"))?;
        Ok(opponent.respond(request))
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[async_trait]
impl<P: MoveProvider + ?Sized> MoveProvider for Box<P> {
    async fn next_move(&self, request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        (**self).next_move(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

//! Drives a [`Session`] against a move provider and keeps storage current.

use crate::games::tictactoe::{Difficulty, Position};
use crate::remote::MoveProvider;
use crate::series::{SeriesConfig, SeriesState, Session, Transition};
use crate::storage::{SERIES_KEY, Storage, THEME_KEY, Theme, load_theme};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Default bound on a single CPU request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns the controller, the CPU's provider, and the store.
///
/// Every intent is applied, then the stable series state is written back.
/// A failed write is logged and play continues.
pub struct SeriesDriver<P, S> {
    session: Session,
    provider: P,
    storage: S,
    theme: Theme,
    request_timeout: Duration,
}

impl<P: MoveProvider, S: Storage> SeriesDriver<P, S> {
    /// Restores the series and theme from `storage`.
    ///
    /// Invalid stored data is discarded in favour of a fresh series.
    #[instrument(skip(provider, storage))]
    pub fn load(config: SeriesConfig, provider: P, storage: S) -> Self {
        let raw = match storage.get(SERIES_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Could not read stored series");
                None
            }
        };
        let state = SeriesState::restore_or_default(raw.as_deref(), &config);
        let theme = load_theme(&storage);
        info!(round = state.round(), %theme, provider = provider.name(), "Series loaded");

        Self {
            session: Session::resume(config, state),
            provider,
            storage,
            theme,
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the starting difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.session = self.session.with_difficulty(difficulty);
        self
    }

    /// Overrides how long notices stay up.
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.session = self.session.with_notice_ttl(ttl);
        self
    }

    /// The controller.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Name of the move provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The player picks a cell; the CPU replies before this returns.
    ///
    /// A provider error or timeout undoes the player's move.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn play_cell(&mut self, pos: Position) -> Transition {
        let request = match self.session.select_cell(pos) {
            Transition::AwaitingOpponent(request) => request,
            other => {
                self.persist_if_changed(&other);
                return other;
            }
        };

        let reply = tokio::time::timeout(self.request_timeout, self.provider.next_move(&request)).await;
        let transition = match reply {
            Ok(Ok(response)) => self.session.resolve_opponent(response, Instant::now()),
            Ok(Err(e)) => self.session.abort_opponent(&e.to_string()),
            Err(_) => {
                let reason = format!("no reply within {:?}", self.request_timeout);
                self.session.abort_opponent(&reason)
            }
        };
        debug!(?transition, "CPU turn resolved");
        self.persist();
        transition
    }

    /// Starts the next round.
    pub fn advance_round(&mut self) -> Transition {
        let transition = self.session.advance_round();
        self.persist_if_changed(&transition);
        transition
    }

    /// Resets the series.
    pub fn reset(&mut self) -> Transition {
        let transition = self.session.reset();
        self.persist_if_changed(&transition);
        transition
    }

    /// Changes the difficulty.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Transition {
        self.session.set_difficulty(difficulty)
    }

    /// Clears the notice.
    pub fn dismiss_notice(&mut self) -> Transition {
        self.session.dismiss_notice()
    }

    /// Expires the notice if due. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.session.tick(now)
    }

    /// Switches between light and dark and stores the choice.
    #[instrument(skip(self))]
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = self.storage.set(THEME_KEY, &self.theme.to_string()) {
            warn!(error = %e, "Could not store theme");
        }
        self.theme
    }

    fn persist_if_changed(&self, transition: &Transition) {
        if !matches!(transition, Transition::Ignored(_)) {
            self.persist();
        }
    }

    fn persist(&self) {
        let state = self.session.stable_state();
        let result = serde_json::to_string(state)
            .map_err(crate::storage::StorageError::from)
            .and_then(|raw| self.storage.set(SERIES_KEY, &raw));
        if let Err(e) = result {
            warn!(error = %e, "Could not store series");
        }
    }
}

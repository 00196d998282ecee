//! Series controller.
//!
//! [`Session`] is the single path through which every intent flows. Each
//! operation either applies a complete transition or reports why the
//! intent was ignored; an ignored intent never changes state.
//!
//! The CPU's reply is optimistic: the player's mark is placed at once,
//! the pre-move state is kept aside, and the request is marked pending.
//! Resolving the request commits; aborting it restores the kept state.

use super::notice::{NOTICE_TTL, Notice};
use super::state::{Phase, RoundOutcome, SeriesConfig, SeriesOutcome, SeriesState, Side};
use crate::games::tictactoe::{Difficulty, Position};
use crate::protocol::{MOVE_HISTORY_ROUNDS, MoveRequest, MoveResponse};
use derive_more::Display;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Why an intent was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Ignored {
    /// A CPU reply is in flight.
    #[display("a CPU move is pending")]
    RequestPending,
    /// Nothing to resolve or abort.
    #[display("no CPU move is pending")]
    NothingPending,
    /// The cell already holds a mark.
    #[display("{} is already taken", _0)]
    CellOccupied(Position),
    /// The round is decided.
    #[display("the round is over")]
    RoundOver,
    /// The round is still being played.
    #[display("the round is still in progress")]
    RoundInProgress,
    /// The series is decided.
    #[display("the series is over")]
    SeriesOver,
}

/// What an intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Ignored(Ignored),
    /// The player's mark is down; this request must be sent.
    AwaitingOpponent(MoveRequest),
    /// The CPU replied and the round continues.
    PlayerToMove,
    /// The round ended.
    RoundOver(RoundOutcome),
    /// The round ended and with it the series.
    SeriesOver(SeriesOutcome),
    /// The pending request failed; the player's move was undone.
    RolledBack,
    /// A new round began.
    RoundStarted(u32),
    /// Everything was reinitialized.
    Reset,
    /// The difficulty for the next request changed.
    DifficultyChanged(Difficulty),
    /// The notice was cleared.
    NoticeDismissed,
}

/// State set aside while a CPU reply is pending.
#[derive(Debug, Clone)]
struct PendingMove {
    before: SeriesState,
    round_moves_before: Vec<usize>,
    request: MoveRequest,
}

/// Controller for one series against the CPU.
#[derive(Debug, Clone)]
pub struct Session {
    config: SeriesConfig,
    state: SeriesState,
    pending: Option<PendingMove>,
    difficulty: Difficulty,
    round_moves: Vec<usize>,
    move_history: Vec<Vec<usize>>,
    notice: Option<Notice>,
    notice_ttl: Duration,
}

impl Session {
    /// Starts a fresh series.
    #[instrument]
    pub fn new(config: SeriesConfig) -> Self {
        Self::resume(config, SeriesState::new())
    }

    /// Continues from a validated state.
    #[instrument(skip(state))]
    pub fn resume(config: SeriesConfig, state: SeriesState) -> Self {
        Self {
            config,
            state,
            pending: None,
            difficulty: Difficulty::default(),
            round_moves: Vec::new(),
            move_history: Vec::new(),
            notice: None,
            notice_ttl: NOTICE_TTL,
        }
    }

    /// Overrides how long notices stay up.
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    /// Sets the starting difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// The series rules.
    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    /// Current series state.
    pub fn state(&self) -> &SeriesState {
        &self.state
    }

    /// State to persist: the pre-move state while a request is in flight.
    pub fn stable_state(&self) -> &SeriesState {
        self.pending
            .as_ref()
            .map_or(&self.state, |pending| &pending.before)
    }

    /// Current phase, accounting for an in-flight request.
    pub fn phase(&self) -> Phase {
        if self.pending.is_some() {
            Phase::AwaitingMoveResponse
        } else {
            self.state.phase(&self.config)
        }
    }

    /// Whether a CPU reply is in flight.
    pub fn is_request_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The in-flight request, if any.
    pub fn opponent_request(&self) -> Option<&MoveRequest> {
        self.pending.as_ref().map(|pending| &pending.request)
    }

    /// Selected difficulty.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Player move lists of recent completed rounds.
    pub fn move_history(&self) -> &[Vec<usize>] {
        &self.move_history
    }

    /// Active notice, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Final outcome once the series is over.
    pub fn outcome(&self) -> Option<SeriesOutcome> {
        self.state.outcome(&self.config)
    }

    /// The player picks a cell.
    #[instrument(skip(self), fields(round = self.state.round()))]
    pub fn select_cell(&mut self, pos: Position) -> Transition {
        match self.phase() {
            Phase::PlayerTurn => {}
            Phase::AwaitingMoveResponse => return self.ignore(Ignored::RequestPending),
            Phase::RoundOver => return self.ignore(Ignored::RoundOver),
            Phase::SeriesOver => return self.ignore(Ignored::SeriesOver),
        }
        if !self.state.board().is_empty(pos) {
            return self.ignore(Ignored::CellOccupied(pos));
        }

        let before = self.state.clone();
        let round_moves_before = self.round_moves.clone();

        self.state.place(pos, Side::Player);
        self.round_moves.push(pos.to_index());
        info!(position = %pos, "Player move");

        if let Some(outcome) = self.state.evaluate() {
            return self.finish_round(outcome);
        }

        self.state.turn = Side::Opponent;
        let request = MoveRequest {
            board: self.state.board().clone(),
            difficulty: self.difficulty,
            history: self.move_history.clone(),
        };
        self.pending = Some(PendingMove {
            before,
            round_moves_before,
            request: request.clone(),
        });
        Transition::AwaitingOpponent(request)
    }

    /// Commits the CPU's reply.
    ///
    /// The returned board is used only if it is a well-formed nine-cell
    /// board; otherwise the board stays as the player left it. The round
    /// outcome is always evaluated locally.
    #[instrument(skip(self, response, now))]
    pub fn resolve_opponent(&mut self, response: MoveResponse, now: Instant) -> Transition {
        if self.pending.take().is_none() {
            return self.ignore(Ignored::NothingPending);
        }

        match response.parsed_board() {
            Some(board) => self.state.board = board,
            None => warn!("Discarding malformed CPU board"),
        }
        self.state.turn = Side::Player;

        if response.fallback {
            let used = response.difficulty_used.unwrap_or(Difficulty::Medium);
            info!(requested = %self.difficulty, %used, "CPU downgraded difficulty");
            self.notice = Some(Notice::new(
                format!(
                    "{} difficulty is unavailable right now; switching to {}.",
                    self.difficulty, used
                ),
                now,
                self.notice_ttl,
            ));
            self.difficulty = used;
        }

        let outcome = self.state.evaluate();
        let reported = response.winner.map(|mark| RoundOutcome::from(Side::from(mark)));
        let reported = reported.or(response.draw.then_some(RoundOutcome::Draw));
        if reported != outcome {
            warn!(?reported, ?outcome, "CPU result disagrees with the board");
        }

        match outcome {
            Some(outcome) => self.finish_round(outcome),
            None => Transition::PlayerToMove,
        }
    }

    /// Abandons the pending request and undoes the player's move.
    #[instrument(skip(self))]
    pub fn abort_opponent(&mut self, reason: &str) -> Transition {
        let Some(pending) = self.pending.take() else {
            return self.ignore(Ignored::NothingPending);
        };
        warn!(reason, "CPU move failed, rolling back");
        self.state = pending.before;
        self.round_moves = pending.round_moves_before;
        Transition::RolledBack
    }

    /// Starts the next round after a decided one.
    #[instrument(skip(self))]
    pub fn advance_round(&mut self) -> Transition {
        match self.phase() {
            Phase::RoundOver => {}
            Phase::AwaitingMoveResponse => return self.ignore(Ignored::RequestPending),
            Phase::SeriesOver => return self.ignore(Ignored::SeriesOver),
            Phase::PlayerTurn => return self.ignore(Ignored::RoundInProgress),
        }
        self.state.start_next_round(&self.config);
        self.round_moves.clear();
        info!(round = self.state.round(), "Round started");
        Transition::RoundStarted(self.state.round())
    }

    /// Reinitializes the whole series. The difficulty is kept.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> Transition {
        if self.pending.is_some() {
            return self.ignore(Ignored::RequestPending);
        }
        self.state = SeriesState::new();
        self.round_moves.clear();
        self.move_history.clear();
        self.notice = None;
        info!("Series reset");
        Transition::Reset
    }

    /// Changes the difficulty for the next request.
    #[instrument(skip(self))]
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Transition {
        if self.pending.is_some() {
            return self.ignore(Ignored::RequestPending);
        }
        self.difficulty = difficulty;
        Transition::DifficultyChanged(difficulty)
    }

    /// Clears the notice.
    pub fn dismiss_notice(&mut self) -> Transition {
        self.notice = None;
        Transition::NoticeDismissed
    }

    /// Clears the notice once it has expired. Returns whether it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            debug!("Notice expired");
            self.notice = None;
            return true;
        }
        false
    }

    fn finish_round(&mut self, outcome: RoundOutcome) -> Transition {
        self.state.finish_round(outcome, &self.config);

        let moves = std::mem::take(&mut self.round_moves);
        if !moves.is_empty() {
            self.move_history.push(moves);
            let excess = self.move_history.len().saturating_sub(MOVE_HISTORY_ROUNDS);
            self.move_history.drain(..excess);
        }

        info!(%outcome, round = self.state.round(), "Round over");
        match self.outcome() {
            Some(series) => Transition::SeriesOver(series),
            None => Transition::RoundOver(outcome),
        }
    }

    fn ignore(&self, reason: Ignored) -> Transition {
        debug!(%reason, "Intent ignored");
        Transition::Ignored(reason)
    }
}

//! Series controller scenarios through the public API.

use gato::{
    HistoryEntry, Ignored, Mark, MoveResponse, Phase, Position, RoundOutcome, SeriesConfig,
    SeriesOutcome, SeriesState, Session, Side, Transition,
};
use std::time::Instant;

use Position::*;

/// Player plays `pos`; if the CPU is asked, it answers with `reply`.
fn play(session: &mut Session, pos: Position, reply: Option<Position>) -> Transition {
    match session.select_cell(pos) {
        Transition::AwaitingOpponent(request) => {
            let reply = reply.expect("CPU asked but no reply scripted");
            let board = request.board.with(reply, Mark::O);
            session.resolve_opponent(MoveResponse::with_board(&board), Instant::now())
        }
        other => other,
    }
}

/// X takes the 0-4-8 diagonal while O plays 1 and 2.
fn player_wins_round(session: &mut Session) -> Transition {
    play(session, TopLeft, Some(TopCenter));
    play(session, Center, Some(TopRight));
    play(session, BottomRight, None)
}

/// Ends in a full board with no line.
fn drawn_round(session: &mut Session) -> Transition {
    play(session, TopLeft, Some(Center));
    play(session, TopRight, Some(TopCenter));
    play(session, BottomCenter, Some(BottomLeft));
    play(session, MiddleLeft, Some(MiddleRight));
    play(session, BottomRight, None)
}

#[test]
fn test_diagonal_win_scores_for_player() {
    let mut session = Session::new(SeriesConfig::default());
    let transition = player_wins_round(&mut session);

    assert_eq!(transition, Transition::RoundOver(RoundOutcome::Player));
    let state = session.state();
    assert_eq!(state.scores().get(Side::Player), 1);
    assert_eq!(state.scores().get(Side::Opponent), 0);
    assert_eq!(state.round_result(), Some(RoundOutcome::Player));
    assert_eq!(state.history(), &[HistoryEntry::new(1, RoundOutcome::Player)]);
    assert_eq!(session.phase(), Phase::RoundOver);
    assert_eq!(session.move_history(), &[vec![0, 4, 8]]);
}

#[test]
fn test_cell_selection_after_round_is_ignored() {
    let mut session = Session::new(SeriesConfig::default());
    player_wins_round(&mut session);
    let before = session.state().clone();

    assert_eq!(
        session.select_cell(MiddleLeft),
        Transition::Ignored(Ignored::RoundOver)
    );
    assert_eq!(session.state(), &before);
}

#[test]
fn test_occupied_cell_is_ignored() {
    let mut session = Session::new(SeriesConfig::default());
    play(&mut session, TopLeft, Some(Center));
    let before = session.state().clone();

    assert_eq!(
        session.select_cell(Center),
        Transition::Ignored(Ignored::CellOccupied(Center))
    );
    assert_eq!(session.state(), &before);
}

#[test]
fn test_threshold_ends_series() {
    let mut session = Session::new(SeriesConfig::default());
    for round in 1..=2 {
        assert_eq!(
            player_wins_round(&mut session),
            Transition::RoundOver(RoundOutcome::Player)
        );
        assert_eq!(session.advance_round(), Transition::RoundStarted(round + 1));
    }

    assert_eq!(
        player_wins_round(&mut session),
        Transition::SeriesOver(SeriesOutcome::Winner(Side::Player))
    );
    assert_eq!(session.phase(), Phase::SeriesOver);
    assert_eq!(session.state().series_winner(), Some(Side::Player));
    assert_eq!(
        session.advance_round(),
        Transition::Ignored(Ignored::SeriesOver)
    );
    assert_eq!(session.state().round(), 3);
}

#[test]
fn test_round_cap_without_threshold_ties() {
    let config = SeriesConfig::new(2, 2).unwrap();
    let mut session = Session::new(config);

    assert_eq!(
        drawn_round(&mut session),
        Transition::RoundOver(RoundOutcome::Draw)
    );
    session.advance_round();
    assert_eq!(
        drawn_round(&mut session),
        Transition::SeriesOver(SeriesOutcome::Tied)
    );
    assert_eq!(session.outcome(), Some(SeriesOutcome::Tied));
    assert_eq!(session.state().series_winner(), None);
}

#[test]
fn test_reset_from_any_state() {
    let mut session = Session::new(SeriesConfig::default());
    player_wins_round(&mut session);
    session.advance_round();
    play(&mut session, Center, Some(TopLeft));

    assert_eq!(session.reset(), Transition::Reset);
    assert_eq!(session.state(), &SeriesState::new());
    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert!(session.move_history().is_empty());
    assert!(session.notice().is_none());
}

#[test]
fn test_cell_selection_after_series_is_ignored() {
    let mut session = Session::new(SeriesConfig::default());
    for _ in 0..2 {
        player_wins_round(&mut session);
        session.advance_round();
    }
    assert_eq!(
        player_wins_round(&mut session),
        Transition::SeriesOver(SeriesOutcome::Winner(Side::Player))
    );
    let before = session.state().clone();

    for pos in Position::ALL {
        assert_eq!(
            session.select_cell(pos),
            Transition::Ignored(Ignored::SeriesOver)
        );
    }
    assert_eq!(session.state(), &before);
    assert_eq!(session.phase(), Phase::SeriesOver);
}

#[test]
fn test_reset_after_round_over() {
    let mut session = Session::new(SeriesConfig::default());
    player_wins_round(&mut session);
    assert_eq!(session.phase(), Phase::RoundOver);

    assert_eq!(session.reset(), Transition::Reset);
    assert_eq!(session.state(), &SeriesState::new());
    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert!(session.move_history().is_empty());
}

#[test]
fn test_reset_after_series_won() {
    let mut session = Session::new(SeriesConfig::default());
    for _ in 0..2 {
        player_wins_round(&mut session);
        session.advance_round();
    }
    player_wins_round(&mut session);
    assert_eq!(session.phase(), Phase::SeriesOver);

    assert_eq!(session.reset(), Transition::Reset);
    assert_eq!(session.state(), &SeriesState::new());
    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert_eq!(session.outcome(), None);
}

#[test]
fn test_reset_after_tied_series() {
    let mut session = Session::new(SeriesConfig::new(2, 2).unwrap());
    drawn_round(&mut session);
    session.advance_round();
    assert_eq!(
        drawn_round(&mut session),
        Transition::SeriesOver(SeriesOutcome::Tied)
    );

    assert_eq!(session.reset(), Transition::Reset);
    assert_eq!(session.state(), &SeriesState::new());
    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert_eq!(
        play(&mut session, TopLeft, Some(Center)),
        Transition::PlayerToMove
    );
}

#[test]
fn test_advance_mid_round_is_ignored() {
    let mut session = Session::new(SeriesConfig::default());
    assert_eq!(
        session.advance_round(),
        Transition::Ignored(Ignored::RoundInProgress)
    );
}

#[test]
fn test_request_history_carries_previous_rounds() {
    let mut session = Session::new(SeriesConfig::default());
    player_wins_round(&mut session);
    session.advance_round();

    let Transition::AwaitingOpponent(request) = session.select_cell(Center) else {
        panic!("expected a CPU request");
    };
    assert_eq!(request.history, vec![vec![0, 4, 8]]);
    assert_eq!(request.board.get(Center).mark(), Some(Mark::X));
}

#[test]
fn test_snapshot_roundtrip_resumes_series() {
    let config = SeriesConfig::default();
    let mut session = Session::new(config);
    player_wins_round(&mut session);

    let raw = serde_json::to_string(session.stable_state()).unwrap();
    let restored = SeriesState::restore(&raw, &config).unwrap();
    assert_eq!(&restored, session.state());

    let resumed = Session::resume(config, restored);
    assert_eq!(resumed.phase(), Phase::RoundOver);
}

#[test]
fn test_corrupted_snapshot_gives_fresh_series() {
    let config = SeriesConfig::default();
    assert_eq!(
        SeriesState::restore_or_default(Some("{\"board\": 12}"), &config),
        SeriesState::new()
    );
    assert_eq!(
        SeriesState::restore_or_default(None, &config),
        SeriesState::new()
    );
}

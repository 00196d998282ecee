//! Driver tests: CPU replies, failures, timeouts and persistence.

use async_trait::async_trait;
use gato::{
    Difficulty, FileStorage, LocalProvider, MemoryStorage, Mark, MoveProvider, MoveRequest,
    MoveResponse, Phase, Position, ProviderError, SERIES_KEY, SeriesConfig, SeriesDriver,
    SeriesState, Storage, THEME_KEY, Theme, TieredOpponent, Transition,
};
use std::time::{Duration, Instant};

/// Provider that always fails.
struct Unreachable;

#[async_trait]
impl MoveProvider for Unreachable {
    async fn next_move(&self, _request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        Err(ProviderError::new("connection refused"))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

/// Provider that never answers in time.
struct Stalled;

#[async_trait]
impl MoveProvider for Stalled {
    async fn next_move(&self, _request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(ProviderError::new("unreachable"))
    }

    fn name(&self) -> &str {
        "stalled"
    }
}

/// Provider that always reports a tier downgrade.
struct Downgrading;

#[async_trait]
impl MoveProvider for Downgrading {
    async fn next_move(&self, request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        let mut response = TieredOpponent::seeded(None, 0).respond(&MoveRequest {
            difficulty: Difficulty::Medium,
            ..request.clone()
        });
        response.fallback = true;
        Ok(response)
    }

    fn name(&self) -> &str {
        "downgrading"
    }
}

/// Provider that answers with a fixed, possibly unusable, board.
struct FixedBoard(serde_json::Value);

#[async_trait]
impl MoveProvider for FixedBoard {
    async fn next_move(&self, _request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        Ok(MoveResponse {
            board: Some(self.0.clone()),
            ..MoveResponse::default()
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Starts a new driver from whatever `storage` holds.
fn reload(storage: &MemoryStorage) -> SeriesDriver<LocalProvider, MemoryStorage> {
    let copy = MemoryStorage::new();
    if let Some(raw) = storage.get(SERIES_KEY).unwrap() {
        copy.set(SERIES_KEY, &raw).unwrap();
    }
    SeriesDriver::load(SeriesConfig::default(), local(), copy)
}

fn local() -> LocalProvider {
    LocalProvider::new(TieredOpponent::seeded(None, 11))
}

#[tokio::test]
async fn test_cpu_replies_and_state_is_persisted() {
    let mut driver = SeriesDriver::load(SeriesConfig::default(), local(), MemoryStorage::new());

    assert_eq!(
        driver.play_cell(Position::TopLeft).await,
        Transition::PlayerToMove
    );
    let board = driver.session().state().board().clone();
    assert_eq!(board.get(Position::Center).mark(), Some(Mark::O));

    let raw = driver.storage().get(SERIES_KEY).unwrap().unwrap();
    let stored: SeriesState = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.board(), &board);
}

#[tokio::test]
async fn test_provider_failure_rolls_back() {
    let mut driver = SeriesDriver::load(SeriesConfig::default(), Unreachable, MemoryStorage::new());

    assert_eq!(
        driver.play_cell(Position::Center).await,
        Transition::RolledBack
    );
    assert_eq!(driver.session().state(), &SeriesState::new());
    assert_eq!(driver.session().phase(), Phase::PlayerTurn);
    assert!(driver.session().notice().is_none());
}

#[tokio::test]
async fn test_timeout_rolls_back() {
    let mut driver = SeriesDriver::load(SeriesConfig::default(), Stalled, MemoryStorage::new())
        .with_request_timeout(Duration::from_millis(50));

    assert_eq!(
        driver.play_cell(Position::Center).await,
        Transition::RolledBack
    );
    assert_eq!(driver.session().state(), &SeriesState::new());
    assert!(!driver.session().is_request_pending());
}

#[tokio::test]
async fn test_fallback_notice_expires() {
    let mut driver = SeriesDriver::load(SeriesConfig::default(), Downgrading, MemoryStorage::new())
        .with_difficulty(Difficulty::Hard)
        .with_notice_ttl(Duration::from_secs(1));

    driver.play_cell(Position::TopLeft).await;
    assert_eq!(driver.session().difficulty(), Difficulty::Medium);
    let notice = driver.session().notice().unwrap();
    assert!(notice.message().contains("medium"));

    assert!(!driver.tick(Instant::now()));
    assert!(driver.tick(Instant::now() + Duration::from_secs(5)));
    assert!(driver.session().notice().is_none());
}

#[tokio::test]
async fn test_series_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gato_state.json");

    let played = {
        let mut driver =
            SeriesDriver::load(SeriesConfig::default(), local(), FileStorage::new(&path));
        driver.play_cell(Position::TopLeft).await;
        driver.play_cell(Position::TopRight).await;
        driver.toggle_theme();
        driver.session().state().clone()
    };

    let driver = SeriesDriver::load(SeriesConfig::default(), local(), FileStorage::new(&path));
    assert_eq!(driver.session().state(), &played);
    assert_eq!(driver.theme(), Theme::Dark);
}

#[tokio::test]
async fn test_invalid_stored_series_is_discarded() {
    let storage = MemoryStorage::new();
    storage
        .set(SERIES_KEY, r#"{"board":[null,null,null,null,null,null,null,null,null],"turn":"player","round":9,"scores":{"player":0,"cpu":0},"roundResult":null,"seriesWinner":null,"history":[]}"#)
        .unwrap();
    storage.set(THEME_KEY, "neon").unwrap();

    let driver = SeriesDriver::load(SeriesConfig::default(), local(), storage);
    assert_eq!(driver.session().state(), &SeriesState::new());
    assert_eq!(driver.theme(), Theme::Light);
}

#[tokio::test]
async fn test_reset_is_persisted() {
    let mut driver = SeriesDriver::load(SeriesConfig::default(), local(), MemoryStorage::new());
    driver.play_cell(Position::TopLeft).await;

    assert_eq!(driver.reset(), Transition::Reset);
    let raw = driver.storage().get(SERIES_KEY).unwrap().unwrap();
    let stored: SeriesState = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, SeriesState::new());
}

#[tokio::test]
async fn test_discarded_cpu_board_survives_reload() {
    let mut driver = SeriesDriver::load(
        SeriesConfig::default(),
        FixedBoard(serde_json::json!(["X", "O"])),
        MemoryStorage::new(),
    );

    assert_eq!(
        driver.play_cell(Position::Center).await,
        Transition::PlayerToMove
    );
    let live = driver.session().state().clone();
    assert_eq!(live.board().get(Position::Center).mark(), Some(Mark::X));
    assert_eq!(live.board().count(Mark::O), 0);

    assert_eq!(reload(driver.storage()).session().state(), &live);
}

#[tokio::test]
async fn test_adopted_cpu_board_survives_reload() {
    let mut driver = SeriesDriver::load(
        SeriesConfig::default(),
        FixedBoard(serde_json::json!([
            "O", null, "O", null, "X", null, null, null, null
        ])),
        MemoryStorage::new(),
    );

    assert_eq!(
        driver.play_cell(Position::Center).await,
        Transition::PlayerToMove
    );
    let live = driver.session().state().clone();
    assert_eq!(live.board().count(Mark::O), 2);

    assert_eq!(reload(driver.storage()).session().state(), &live);
}

//! Best-of-N series against the CPU.

mod notice;
mod session;
mod snapshot;
mod state;

pub use notice::{NOTICE_TTL, Notice};
pub use session::{Ignored, Session, Transition};
pub use snapshot::SnapshotError;
pub use state::{
    HistoryEntry, Phase, RoundOutcome, Scores, SeriesConfig, SeriesConfigError, SeriesOutcome,
    SeriesState, Side,
};

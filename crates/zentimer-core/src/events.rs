use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerMode, TimerState};

/// Every state change in the engine produces an Event.
/// The view layer polls for events to drive rendering and notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        session_id: String,
        mode: TimerMode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. Emitted exactly once per session.
    TimerCompleted {
        session_id: String,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        mode: TimerMode,
        session_id: Option<String>,
        initial_secs: u64,
        elapsed_secs: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
}

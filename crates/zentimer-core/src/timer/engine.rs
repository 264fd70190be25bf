//! Timer engine implementation.
//!
//! The engine is a wall-clock-based state machine. Elapsed time is always
//! recomputed from timestamps, never from counting tick deliveries, so a
//! delayed or dropped callback cannot drift the displayed countdown. The
//! cost is that paused intervals must be tracked explicitly.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed -> start() -> Running
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.start(25 * 60)?;
//! // Once per second while running:
//! engine.tick(); // Returns Some(Event::TimerCompleted) when the countdown ends
//! ```
//!
//! Ticks are delivered by an external scheduler (see
//! [`TickRunner`](super::TickRunner)) once per second while the engine is
//! armed. A tick that arrives after `pause` or `reset` is discarded.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Count down from a fixed target; completes when it reaches zero.
    Countdown,
    /// Count up with no target; ends only via `reset`.
    Stopwatch,
}

/// Core timer engine.
///
/// Owns one session at a time. All commands have an `*_at` variant taking
/// the wall clock as epoch milliseconds; the plain variants read the system
/// clock and are what production callers use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    state: TimerState,
    mode: TimerMode,
    session_id: Option<String>,
    /// Countdown target in seconds. Set once at `start`, immutable until `reset`.
    initial_secs: u64,
    /// Epoch ms captured at `start`.
    started_at_ms: Option<u64>,
    /// Epoch ms captured at `pause`; only meaningful while Paused.
    paused_at_ms: Option<u64>,
    /// Milliseconds spent paused across all pause/resume cycles this session.
    total_paused_ms: u64,
    /// Derived on every tick; never written by callers.
    elapsed_secs: u64,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self {
            state: TimerState::Idle,
            mode: TimerMode::Countdown,
            session_id: None,
            initial_secs: 0,
            started_at_ms: None,
            paused_at_ms: None,
            total_paused_ms: 0,
            elapsed_secs: 0,
        }
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn initial_secs(&self) -> u64 {
        self.initial_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Seconds left on the countdown, clamped at zero. Always zero for
    /// stopwatch sessions, which have no target.
    pub fn remaining_secs(&self) -> u64 {
        match self.mode {
            TimerMode::Countdown => self.initial_secs.saturating_sub(self.elapsed_secs),
            TimerMode::Stopwatch => 0,
        }
    }

    /// Whether a periodic tick source should currently be delivering ticks:
    /// true exactly while `Running`. Derived from the state rather than
    /// tracked separately, so the engine and its tick source cannot hold
    /// diverging notions of "armed". At most one tick source may obey this
    /// per engine.
    pub fn is_armed(&self) -> bool {
        self.state == TimerState::Running
    }

    /// 0.0 .. 1.0 progress through the countdown.
    pub fn progress(&self) -> f64 {
        if self.mode == TimerMode::Stopwatch || self.initial_secs == 0 {
            return 0.0;
        }
        (self.elapsed_secs as f64 / self.initial_secs as f64).min(1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            mode: self.mode,
            session_id: self.session_id.clone(),
            initial_secs: self.initial_secs,
            elapsed_secs: self.elapsed_secs,
            remaining_secs: self.remaining_secs(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a countdown session of `duration_secs`.
    ///
    /// Valid only from `Idle` or `Completed`; starting while a session is
    /// live is rejected rather than restarting it.
    pub fn start(&mut self, duration_secs: u64) -> Result<Event> {
        self.start_at(duration_secs, now_ms())
    }

    pub fn start_at(&mut self, duration_secs: u64, now_ms: u64) -> Result<Event> {
        self.ensure_startable("start")?;
        if duration_secs == 0 {
            return Err(CoreError::InvalidDuration {
                secs: duration_secs,
            });
        }
        self.begin(TimerMode::Countdown, duration_secs, now_ms);
        Ok(Event::TimerStarted {
            session_id: self.session_id.clone().unwrap_or_default(),
            mode: self.mode,
            duration_secs,
            at: Utc::now(),
        })
    }

    /// Start an open-ended count-up session.
    pub fn start_stopwatch(&mut self) -> Result<Event> {
        self.start_stopwatch_at(now_ms())
    }

    pub fn start_stopwatch_at(&mut self, now_ms: u64) -> Result<Event> {
        self.ensure_startable("start")?;
        self.begin(TimerMode::Stopwatch, 0, now_ms);
        Ok(Event::TimerStarted {
            session_id: self.session_id.clone().unwrap_or_default(),
            mode: self.mode,
            duration_secs: 0,
            at: Utc::now(),
        })
    }

    /// Pause the running session. No ticks are delivered while paused.
    pub fn pause(&mut self) -> Result<Event> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&mut self, now_ms: u64) -> Result<Event> {
        if self.state != TimerState::Running {
            return Err(CoreError::IllegalState {
                operation: "pause",
                state: self.state,
            });
        }
        // Flush elapsed time first so the frozen display is exact.
        self.refresh_elapsed(now_ms);
        self.paused_at_ms = Some(now_ms);
        self.state = TimerState::Paused;
        Ok(Event::TimerPaused {
            remaining_secs: self.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Resume a paused session. The pause interval is added to
    /// `total_paused_ms` so the countdown picks up exactly where it stopped,
    /// however long the pause lasted.
    pub fn resume(&mut self) -> Result<Event> {
        self.resume_at(now_ms())
    }

    pub fn resume_at(&mut self, now_ms: u64) -> Result<Event> {
        if self.state != TimerState::Paused {
            return Err(CoreError::IllegalState {
                operation: "resume",
                state: self.state,
            });
        }
        let paused_at = self.paused_at_ms.take().unwrap_or(now_ms);
        self.total_paused_ms = self
            .total_paused_ms
            .saturating_add(now_ms.saturating_sub(paused_at));
        self.state = TimerState::Running;
        Ok(Event::TimerResumed {
            remaining_secs: self.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Call once per scheduling interval while armed. Returns
    /// `Some(Event::TimerCompleted)` when the countdown reaches zero.
    ///
    /// A stale tick delivered after `pause`/`reset` is not an error; the
    /// scheduling host may not cancel an in-flight callback immediately.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.refresh_elapsed(now_ms);
        if self.mode == TimerMode::Countdown && self.remaining_secs() == 0 {
            self.state = TimerState::Completed;
            return Some(Event::TimerCompleted {
                session_id: self.session_id.clone().unwrap_or_default(),
                at: Utc::now(),
            });
        }
        None
    }

    /// Valid from any state: disarm the tick, discard the session, return
    /// to `Idle`.
    pub fn reset(&mut self) -> Event {
        *self = Self::default();
        Event::TimerReset { at: Utc::now() }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_startable(&self, operation: &'static str) -> Result<()> {
        match self.state {
            TimerState::Idle | TimerState::Completed => Ok(()),
            state => Err(CoreError::IllegalState { operation, state }),
        }
    }

    fn begin(&mut self, mode: TimerMode, initial_secs: u64, now_ms: u64) {
        *self = Self {
            state: TimerState::Running,
            mode,
            session_id: Some(Uuid::new_v4().to_string()),
            initial_secs,
            started_at_ms: Some(now_ms),
            paused_at_ms: None,
            total_paused_ms: 0,
            elapsed_secs: 0,
        };
    }

    fn refresh_elapsed(&mut self, now_ms: u64) {
        if let Some(started) = self.started_at_ms {
            let active_ms = now_ms
                .saturating_sub(started)
                .saturating_sub(self.total_paused_ms);
            self.elapsed_secs = active_ms / 1000;
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::new();
        assert_eq!(engine.state(), TimerState::Idle);

        engine.start(300).unwrap();
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.is_armed());

        engine.pause().unwrap();
        assert_eq!(engine.state(), TimerState::Paused);
        assert!(!engine.is_armed());

        engine.resume().unwrap();
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.is_armed());
    }

    #[test]
    fn start_rejects_zero_duration() {
        let mut engine = TimerEngine::new();
        let err = engine.start(0).unwrap_err();
        assert_eq!(err, CoreError::InvalidDuration { secs: 0 });
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn start_while_running_is_rejected_without_mutation() {
        let mut engine = TimerEngine::new();
        engine.start_at(300, 0).unwrap();
        engine.tick_at(10_000);
        let first_session = engine.session_id().unwrap().to_string();

        let err = engine.start(600).unwrap_err();
        assert_eq!(
            err,
            CoreError::IllegalState {
                operation: "start",
                state: TimerState::Running,
            }
        );
        assert_eq!(engine.initial_secs(), 300);
        assert_eq!(engine.elapsed_secs(), 10);
        assert_eq!(engine.session_id().unwrap(), first_session);
    }

    #[test]
    fn pause_from_idle_is_illegal() {
        let mut engine = TimerEngine::new();
        let err = engine.pause().unwrap_err();
        assert_eq!(
            err,
            CoreError::IllegalState {
                operation: "pause",
                state: TimerState::Idle,
            }
        );
    }

    #[test]
    fn resume_while_running_is_illegal() {
        let mut engine = TimerEngine::new();
        engine.start(300).unwrap();
        let err = engine.resume().unwrap_err();
        assert_eq!(
            err,
            CoreError::IllegalState {
                operation: "resume",
                state: TimerState::Running,
            }
        );
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn start_from_paused_is_illegal() {
        let mut engine = TimerEngine::new();
        engine.start(300).unwrap();
        engine.pause().unwrap();
        assert!(engine.start(300).is_err());
        assert_eq!(engine.state(), TimerState::Paused);
    }

    #[test]
    fn elapsed_is_derived_from_wall_clock() {
        let mut engine = TimerEngine::new();
        engine.start_at(300, 1_000).unwrap();

        // Three ticks arrive late and bunched together; elapsed still
        // reflects the wall clock, not the delivery count.
        engine.tick_at(5_000);
        engine.tick_at(5_001);
        engine.tick_at(8_500);
        assert_eq!(engine.elapsed_secs(), 7);
        assert_eq!(engine.remaining_secs(), 293);
    }

    #[test]
    fn pause_interval_does_not_leak_into_elapsed() {
        let mut engine = TimerEngine::new();
        engine.start_at(300, 0).unwrap();
        engine.tick_at(12_000);
        engine.pause_at(12_000).unwrap();
        assert_eq!(engine.remaining_secs(), 288);

        // A very long pause.
        engine.resume_at(500_000).unwrap();
        assert_eq!(engine.remaining_secs(), 288);

        engine.tick_at(505_000);
        assert_eq!(engine.remaining_secs(), 283);
    }

    #[test]
    fn multiple_pause_cycles_accumulate() {
        let mut engine = TimerEngine::new();
        engine.start_at(100, 0).unwrap();
        engine.pause_at(10_000).unwrap();
        engine.resume_at(20_000).unwrap();
        engine.pause_at(30_000).unwrap();
        engine.resume_at(60_000).unwrap();
        engine.tick_at(70_000);
        // 70s on the clock, 40s of it paused.
        assert_eq!(engine.elapsed_secs(), 30);
        assert_eq!(engine.remaining_secs(), 70);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let mut engine = TimerEngine::new();
        engine.start_at(5, 0).unwrap();
        assert!(engine.tick_at(4_000).is_none());

        let event = engine.tick_at(5_000);
        assert!(matches!(event, Some(Event::TimerCompleted { .. })));
        assert_eq!(engine.state(), TimerState::Completed);
        assert!(!engine.is_armed());

        // Stale tick after completion changes nothing.
        assert!(engine.tick_at(6_000).is_none());
        assert_eq!(engine.remaining_secs(), 0);
    }

    #[test]
    fn overshot_tick_still_clamps_remaining_to_zero() {
        let mut engine = TimerEngine::new();
        engine.start_at(5, 0).unwrap();
        let event = engine.tick_at(900_000);
        assert!(matches!(event, Some(Event::TimerCompleted { .. })));
        assert_eq!(engine.remaining_secs(), 0);
    }

    #[test]
    fn tick_after_reset_is_discarded() {
        let mut engine = TimerEngine::new();
        engine.start_at(300, 0).unwrap();
        engine.reset();
        assert!(engine.tick_at(10_000).is_none());
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.elapsed_secs(), 0);
    }

    #[test]
    fn reset_is_idempotent_from_every_state() {
        let mut engine = TimerEngine::new();
        for _ in 0..2 {
            engine.reset();
            assert_eq!(engine.state(), TimerState::Idle);
        }

        engine.start(300).unwrap();
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.initial_secs(), 0);
        assert_eq!(engine.elapsed_secs(), 0);
        assert_eq!(engine.remaining_secs(), 0);
        assert!(!engine.is_armed());
        assert!(engine.session_id().is_none());

        engine.start(300).unwrap();
        engine.pause().unwrap();
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn completed_session_can_be_restarted() {
        let mut engine = TimerEngine::new();
        engine.start_at(5, 0).unwrap();
        engine.tick_at(5_000);
        assert_eq!(engine.state(), TimerState::Completed);

        engine.start_at(10, 100_000).unwrap();
        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(engine.remaining_secs(), 10);
    }

    #[test]
    fn each_session_gets_a_fresh_id() {
        let mut engine = TimerEngine::new();
        engine.start_at(5, 0).unwrap();
        let first = engine.session_id().unwrap().to_string();
        engine.reset();
        engine.start_at(5, 0).unwrap();
        assert_ne!(engine.session_id().unwrap(), first);
    }

    #[test]
    fn stopwatch_counts_up_and_never_completes() {
        let mut engine = TimerEngine::new();
        engine.start_stopwatch_at(0).unwrap();
        assert_eq!(engine.mode(), TimerMode::Stopwatch);

        assert!(engine.tick_at(90_000).is_none());
        assert_eq!(engine.elapsed_secs(), 90);
        assert_eq!(engine.remaining_secs(), 0);

        assert!(engine.tick_at(3_600_000).is_none());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn snapshot_reflects_current_state() {
        let mut engine = TimerEngine::new();
        engine.start_at(300, 0).unwrap();
        engine.tick_at(60_000);
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                initial_secs,
                elapsed_secs,
                remaining_secs,
                ..
            } => {
                assert_eq!(state, TimerState::Running);
                assert_eq!(initial_secs, 300);
                assert_eq!(elapsed_secs, 60);
                assert_eq!(remaining_secs, 240);
            }
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn progress_tracks_the_countdown() {
        let mut engine = TimerEngine::new();
        assert_eq!(engine.progress(), 0.0);
        engine.start_at(100, 0).unwrap();
        engine.tick_at(25_000);
        assert!((engine.progress() - 0.25).abs() < f64::EPSILON);
    }
}

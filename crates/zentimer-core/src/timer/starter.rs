//! Session initiation.
//!
//! When the user asks to start a focus session they may or may not have
//! already picked an activity and a duration. The starter resolves whatever
//! is missing to defaults, tells the user what was resolved through the
//! transient info-text collaborator, and hands the resolved pair to the
//! engine. The four combinations form an explicit decision table rather
//! than nested conditionals, so each row stays independently testable.

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::timer::{TimerEngine, TimerState};

pub const MSG_DEFAULT_TIME_AND_ACTIVITY: &str = "Default time and activity selected.";
pub const MSG_DEFAULT_TIME: &str = "Default time selected.";
pub const MSG_DEFAULT_ACTIVITY: &str = "Default activity selected.";

/// Status flags and timer values pushed to the app's state store.
/// Calls are synchronous, ordered, and fire-and-forget.
pub trait StatusDispatch {
    fn set_first_run(&mut self, value: bool);
    fn set_has_started(&mut self, value: bool);
    fn set_initial_time(&mut self, secs: u64);
    fn set_remaining_time(&mut self, secs: u64);
}

/// Transient advisory messaging. The sink owns its own display timeout and
/// clears itself; the starter only ever writes, at most once per launch.
pub trait InfoTextSink {
    fn update_info_text(&mut self, message: &str);
    /// Cancel pending timeouts and blank the message. Belongs to the view
    /// layer; the starter never calls it.
    fn clear_timeouts_and_message(&mut self);
}

/// What the user has chosen so far. Both fields are independently optional:
/// "no activity picked" and "no duration picked" are distinct conditions
/// and neither is ever encoded as a zero or sentinel value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSelection {
    pub activity: Option<String>,
    pub duration_secs: Option<u64>,
}

/// The resolved `(activity, duration)` pair plus the advisory message that
/// accompanies it, if default resolution happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupOutcome {
    pub activity: String,
    pub duration_secs: u64,
    pub message: Option<&'static str>,
}

/// Fallbacks applied when the user starts without choosing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartDefaults {
    pub activity: String,
    pub duration_secs: u64,
}

impl Default for StartDefaults {
    fn default() -> Self {
        Self {
            activity: crate::activity::ActivityCatalog::default()
                .default_activity()
                .to_string(),
            duration_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStarter {
    defaults: StartDefaults,
}

impl SessionStarter {
    pub fn new(defaults: StartDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &StartDefaults {
        &self.defaults
    }

    /// Resolve a selection against the defaults. Pure: no side effects,
    /// the selection is not consumed or mutated, and no engine state is
    /// consulted. Double-start rejection happens in [`launch`](Self::launch),
    /// the guarded entry point; `decide` alone starts nothing.
    pub fn decide(&self, selection: &SessionSelection) -> StartupOutcome {
        let defaults = &self.defaults;
        match (&selection.activity, selection.duration_secs) {
            (None, None) => StartupOutcome {
                activity: defaults.activity.clone(),
                duration_secs: defaults.duration_secs,
                message: Some(MSG_DEFAULT_TIME_AND_ACTIVITY),
            },
            (Some(activity), None) => StartupOutcome {
                activity: activity.clone(),
                duration_secs: defaults.duration_secs,
                message: Some(MSG_DEFAULT_TIME),
            },
            (None, Some(secs)) => StartupOutcome {
                activity: defaults.activity.clone(),
                duration_secs: secs,
                message: Some(MSG_DEFAULT_ACTIVITY),
            },
            (Some(activity), Some(secs)) => StartupOutcome {
                activity: activity.clone(),
                duration_secs: secs,
                message: None,
            },
        }
    }

    /// Decide and perform the ordered start side effects.
    ///
    /// Rows with a default resolution emit the advisory message and then
    /// start the engine. The fully-chosen row instead dispatches
    /// `set_first_run(true)` strictly before `set_has_started(true)`;
    /// downstream indicators key off that exact order.
    ///
    /// All validation happens before the first collaborator call: on error
    /// nothing was dispatched, no message was shown, and the engine is
    /// untouched.
    pub fn launch<D, I>(
        &self,
        selection: &SessionSelection,
        engine: &mut TimerEngine,
        dispatch: &mut D,
        info: &mut I,
    ) -> Result<StartupOutcome>
    where
        D: StatusDispatch + ?Sized,
        I: InfoTextSink + ?Sized,
    {
        // Double-starts (and launches over a paused session) are a caller
        // error, checked before any side effect.
        match engine.state() {
            TimerState::Idle | TimerState::Completed => {}
            state => {
                return Err(CoreError::IllegalState {
                    operation: "launch",
                    state,
                });
            }
        }

        let outcome = self.decide(selection);
        // A chosen-but-zero duration must fail before the collaborators
        // observe a session that never starts.
        if outcome.duration_secs == 0 {
            return Err(CoreError::InvalidDuration {
                secs: outcome.duration_secs,
            });
        }

        match outcome.message {
            Some(message) => info.update_info_text(message),
            None => {
                dispatch.set_first_run(true);
                dispatch.set_has_started(true);
            }
        }

        engine.start(outcome.duration_secs)?;
        dispatch.set_initial_time(outcome.duration_secs);
        dispatch.set_remaining_time(engine.remaining_secs());
        info!(
            "session launched: activity={}, duration={}s",
            outcome.activity, outcome.duration_secs
        );
        Ok(outcome)
    }
}

//! # ZenTimer Core Library
//!
//! This library provides the core timing logic for the ZenTimer focus app.
//! The mobile client is a thin presentation layer over this crate: screens
//! render what the engine reports and forward user intent back into it.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based countdown/stopwatch state machine.
//!   An external scheduler re-enters it once per second while a session runs;
//!   elapsed time is always recomputed from timestamps so callback jitter
//!   cannot drift the display
//! - **Session Starter**: Resolves missing user selections (activity,
//!   duration) to defaults and performs the ordered start side effects
//! - **Events**: Every state change produces an [`Event`] the UI can poll
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SessionStarter`]: Session-initiation decision table
//! - [`TickRunner`]: tokio-based periodic tick source
//! - [`ActivityCatalog`]: Named focus activities with a default entry

pub mod activity;
pub mod error;
pub mod events;
pub mod timer;

pub use activity::ActivityCatalog;
pub use error::{CoreError, Result};
pub use events::Event;
pub use timer::{
    format_clock, InfoTextSink, SessionSelection, SessionStarter, StartDefaults, StartupOutcome,
    StatusDispatch, TickRunner, TimerEngine, TimerMode, TimerState, MSG_DEFAULT_ACTIVITY,
    MSG_DEFAULT_TIME, MSG_DEFAULT_TIME_AND_ACTIVITY,
};

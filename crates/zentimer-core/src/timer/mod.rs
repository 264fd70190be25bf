mod display;
mod engine;
mod runner;
mod starter;

pub use display::format_clock;
pub use engine::{TimerEngine, TimerMode, TimerState};
pub use runner::TickRunner;
pub use starter::{
    InfoTextSink, SessionSelection, SessionStarter, StartDefaults, StartupOutcome,
    StatusDispatch, MSG_DEFAULT_ACTIVITY, MSG_DEFAULT_TIME, MSG_DEFAULT_TIME_AND_ACTIVITY,
};

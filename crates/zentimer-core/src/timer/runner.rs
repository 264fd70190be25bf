//! Tick scheduling.
//!
//! The engine never spawns anything itself; an external scheduler re-enters
//! it once per second while a session runs. `TickRunner` is that scheduler
//! for hosts with a tokio runtime: one abortable task per engine, delivering
//! `tick()` and forwarding the remaining time to the status dispatcher.

use std::{sync::Arc, time::Duration};

use log::{debug, info};
use tokio::{sync::Mutex, task::JoinHandle, time};

use super::engine::TimerEngine;
use super::starter::StatusDispatch;

pub struct TickRunner<D>
where
    D: StatusDispatch + Send + 'static,
{
    engine: Arc<Mutex<TimerEngine>>,
    dispatch: Arc<Mutex<D>>,
    handle: Option<JoinHandle<()>>,
    tick_interval: Duration,
}

impl<D> TickRunner<D>
where
    D: StatusDispatch + Send + 'static,
{
    pub fn new(engine: Arc<Mutex<TimerEngine>>, dispatch: Arc<Mutex<D>>) -> Self {
        Self {
            engine,
            dispatch,
            handle: None,
            tick_interval: Duration::from_secs(1),
        }
    }

    /// Override the nominal 1000 ms interval.
    pub fn with_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Arm the periodic tick. Any previously armed task is aborted first:
    /// at most one tick source may exist per engine.
    pub fn arm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }

        let engine = Arc::clone(&self.engine);
        let dispatch = Arc::clone(&self.dispatch);
        let tick_interval = self.tick_interval;

        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            loop {
                interval.tick().await;

                let completed = {
                    let mut guard = engine.lock().await;
                    // The engine disarms on pause/reset/completion; obey its
                    // signal rather than keeping a second notion of "armed".
                    if !guard.is_armed() {
                        debug!("tick source stopping: engine disarmed");
                        break;
                    }
                    let event = guard.tick();
                    dispatch.lock().await.set_remaining_time(guard.remaining_secs());
                    event
                };

                if completed.is_some() {
                    info!("countdown completed; tick source stopping");
                    break;
                }
            }
        }));
    }

    /// Abort the tick task. Safe to call when nothing is armed.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl<D> Drop for TickRunner<D>
where
    D: StatusDispatch + Send + 'static,
{
    fn drop(&mut self) {
        self.disarm();
    }
}

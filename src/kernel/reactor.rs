use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::effect::SideEffect;
use super::event::{AlertKind, Event};
use crate::error::{MonitorError, Result};
use crate::monitor::monitor::SessionMonitor;
use crate::monitor::types::StatusSnapshot;
use crate::session::SessionHandle;

/// What the reactor pushes to the presentation side.
#[derive(Debug, Clone)]
pub enum MonitorOutput {
    Effect(SideEffect),
    /// Emitted after every tick.
    Snapshot(StatusSnapshot),
}

/// Cloneable producer side of the reactor's queue. Lifecycle callbacks from
/// any thread go through here so they land on the monitor's timeline.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<Event>,
}

impl MonitorHandle {
    pub async fn send(&self, event: Event) -> Result<()> {
        self.tx.send(event).await.map_err(|_| MonitorError::QueueClosed)
    }

    /// For callers that cannot await (signal handlers, foreign threads).
    pub fn try_send(&self, event: Event) -> Result<()> {
        self.tx.try_send(event).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => MonitorError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => MonitorError::QueueClosed,
        })
    }

    /// Must not be called from inside an async runtime.
    pub fn blocking_send(&self, event: Event) -> Result<()> {
        self.tx.blocking_send(event).map_err(|_| MonitorError::QueueClosed)
    }

    pub async fn stream_started(&self, session: SessionHandle) -> Result<()> {
        self.send(Event::StreamStarted(session)).await
    }

    pub async fn stream_stopped(&self) -> Result<()> {
        self.send(Event::StreamStopped).await
    }

    pub async fn recording_started(&self, session: SessionHandle) -> Result<()> {
        self.send(Event::RecordingStarted(session)).await
    }

    pub async fn recording_stopped(&self) -> Result<()> {
        self.send(Event::RecordingStopped).await
    }

    pub async fn reconnect(&self, timeout_seconds: u32) -> Result<()> {
        self.send(Event::Reconnect { timeout_seconds }).await
    }

    pub async fn reconnect_success(&self) -> Result<()> {
        self.send(Event::ReconnectSuccess).await
    }

    pub async fn acknowledge(&self, kind: AlertKind) -> Result<()> {
        self.send(Event::Acknowledge(kind)).await
    }
}

/// Single consumer of the event queue and sole owner of the monitor.
pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    pub monitor: SessionMonitor,
}

impl Reactor {
    /// Returns the reactor and the handle producers should clone.
    pub fn new(monitor: SessionMonitor) -> (Self, MonitorHandle) {
        let (tx, receiver) = mpsc::channel(monitor.config().event_queue_capacity.max(1));
        (Self { receiver, monitor }, MonitorHandle { tx })
    }

    /// Deterministic step: apply a batch of events in order, then one tick.
    /// MUST NOT await; the async driver and tests both go through here.
    pub fn tick_step(&mut self, events: Vec<Event>, now: Instant) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        for event in events {
            effects.extend(self.monitor.handle(event, now));
        }
        effects.extend(self.monitor.tick(now));
        effects
    }

    /// Async driver loop. Events are applied as they arrive; the tick fires on
    /// the configured cadence. Stops on cancellation, when every handle has
    /// been dropped, or when the output side hangs up.
    pub async fn run(mut self, output: mpsc::Sender<MonitorOutput>, cancel: CancellationToken) -> SessionMonitor {
        let period = self.monitor.config().tick_interval();
        info!(period_ms = period.as_millis() as u64, "reactor started");

        let mut cadence = interval(period);
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick completes immediately; the first status
        // period should be a full one.
        cadence.tick().await;

        loop {
            let (effects, ticked) = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("reactor cancelled");
                    break;
                }
                event = self.receiver.recv() => match event {
                    Some(event) => (self.monitor.handle(event, now()), false),
                    None => {
                        info!("all monitor handles dropped, reactor stopping");
                        break;
                    }
                },
                _ = cadence.tick() => (self.monitor.tick(now()), true),
            };

            if !self.dispatch(&output, effects, ticked).await {
                warn!("monitor output closed, reactor stopping");
                break;
            }
        }

        self.monitor
    }

    async fn dispatch(&self, output: &mpsc::Sender<MonitorOutput>, effects: Vec<SideEffect>, ticked: bool) -> bool {
        let count = effects.len();
        for effect in effects {
            if output.send(MonitorOutput::Effect(effect)).await.is_err() {
                return false;
            }
        }
        if ticked
            && self.monitor.is_active()
            && output.send(MonitorOutput::Snapshot(self.monitor.snapshot())).await.is_err()
        {
            return false;
        }
        if count > 0 {
            debug!(count, "side effects dispatched");
        }
        true
    }
}

// The monitor measures bandwidth against the runtime clock so paused-time
// tests see consistent intervals.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

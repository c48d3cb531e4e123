use std::sync::{Arc, Weak};
use std::time::Instant;

use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::bandwidth::BandwidthEstimator;
use super::congestion::{CongestionSmoother, Indicator};
use super::overload::OverloadDetector;
use super::reconnect::ReconnectTracker;
use super::types::{CpuReading, DroppedFrames, Elapsed, StatusLine, StatusMessage, StatusSnapshot};
use crate::config::MonitorConfig;
use crate::kernel::effect::{Notice, NotifyLevel, SideEffect};
use crate::kernel::event::{AlertKind, Event};
use crate::kernel::telemetry::event::{OutputKind, TelemetryEvent};
use crate::kernel::telemetry::recorder::TelemetryRecorder;
use crate::kernel::time::Tick;
use crate::session::{CpuProbe, OutputSession, SessionHandle, VideoPipeline};

/// Counters that live for one activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTotals {
    pub stream_seconds: u64,
    pub record_seconds: u64,
    /// Pipeline lifetime counters at activation; skip percentages are relative to these.
    pub start_skipped: u64,
    pub start_rendered: u64,
    pub last_skipped: u64,
}

/// Owns every piece of derived state for the stream + record lifecycle.
///
/// Not thread-safe by itself: all calls must come from one timeline, which the
/// reactor provides. `handle` applies a lifecycle event, `tick` advances one
/// period; both return the side effects the driver should execute.
pub struct SessionMonitor {
    config: MonitorConfig,
    pipeline: Arc<dyn VideoPipeline>,
    cpu: Arc<dyn CpuProbe>,

    // Non-owning; the output collaborator keeps the session alive.
    stream: Option<Weak<dyn OutputSession>>,
    record: Option<Weak<dyn OutputSession>>,

    session_id: Option<Uuid>,
    tick: Tick,
    activated_at: Tick,
    totals: SessionTotals,

    bandwidth: BandwidthEstimator,
    congestion: CongestionSmoother,
    indicator: Indicator,
    overload: OverloadDetector,
    reconnect: ReconnectTracker,
    status_line: StatusLine,

    // One tray notification per hidden period for skipped-frame bursts.
    resource_notify_armed: bool,
    visible: bool,

    cpu_reading: CpuReading,
    dropped_frames: Option<DroppedFrames>,

    telemetry: TelemetryRecorder,
}

impl SessionMonitor {
    pub fn new(config: MonitorConfig, pipeline: Arc<dyn VideoPipeline>, cpu: Arc<dyn CpuProbe>, now: Instant) -> Self {
        Self {
            bandwidth: BandwidthEstimator::new(config.bitrate_update_ticks, now),
            congestion: CongestionSmoother::new(config.congestion_epsilon),
            overload: OverloadDetector::new(config.window_size, config.cpu_overload_percent, config.drop_spike_frames),
            config,
            pipeline,
            cpu,
            stream: None,
            record: None,
            session_id: None,
            tick: Tick::new(),
            activated_at: Tick::new(),
            totals: SessionTotals::default(),
            indicator: Indicator::Hidden,
            reconnect: ReconnectTracker::new(),
            status_line: StatusLine::default(),
            resource_notify_armed: true,
            visible: true,
            cpu_reading: CpuReading::default(),
            dropped_frames: None,
            telemetry: TelemetryRecorder::new(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    /// Tracked from `StreamStarted`/`StreamStopped` (and `DelayStarting`),
    /// not read back from the output.
    pub fn is_stream_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Tracked from `RecordingStarted`/`RecordingStopped`.
    pub fn is_record_active(&self) -> bool {
        self.record.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn totals(&self) -> SessionTotals {
        self.totals
    }

    pub fn overload(&self) -> &OverloadDetector {
        &self.overload
    }

    pub fn reconnect(&self) -> &ReconnectTracker {
        &self.reconnect
    }

    pub fn bandwidth(&self) -> &BandwidthEstimator {
        &self.bandwidth
    }

    pub fn telemetry(&self) -> &TelemetryRecorder {
        &self.telemetry
    }

    /// Apply one lifecycle event.
    pub fn handle(&mut self, event: Event, now: Instant) -> Vec<SideEffect> {
        trace!(event = event.name(), "handling event");
        let mut effects = Vec::new();

        match event {
            Event::StreamStarted(session) => {
                self.attach_stream(&session, now);
                self.reconnect.clear_retries();
                self.bandwidth.start(now);
                self.activate();
            }
            Event::StreamStopped => self.stream_stopped(),
            Event::RecordingStarted(session) => {
                if self.record.is_none() {
                    info!("recording attached");
                    self.telemetry.record(TelemetryEvent::OutputAttached { output: OutputKind::Record, tick: self.tick });
                }
                self.record = Some(Arc::downgrade(&session));
                self.activate();
            }
            Event::RecordingStopped => {
                if self.record.take().is_some() {
                    info!("recording detached");
                    self.telemetry.record(TelemetryEvent::OutputDetached { output: OutputKind::Record, tick: self.tick });
                }
                self.deactivate();
            }
            Event::DelayStarting { seconds, session } => {
                self.attach_stream(&session, now);
                self.reconnect.on_delay_starting(seconds);
                self.activate();
            }
            Event::DelayStopping { seconds } => self.reconnect.on_delay_stopping(seconds),
            Event::Reconnect { timeout_seconds } => {
                let stream = self.live_stream();
                if self.reconnect.on_reconnect(timeout_seconds, stream.as_deref()) {
                    warn!(timeout_seconds, "stream disconnected, reconnecting");
                    effects.push(SideEffect::Notify {
                        notice: Notice::Reconnecting,
                        level: NotifyLevel::Warning,
                    });
                }
                self.telemetry.record(TelemetryEvent::ReconnectAttempt {
                    attempt: self.reconnect.retries(),
                    timeout_seconds,
                });
            }
            Event::ReconnectSuccess => {
                let attempts = self.reconnect.retries();
                info!(attempts, "reconnect successful");

                self.status_line.show_for(StatusMessage::ReconnectSuccessful, self.config.message_hold_ticks);
                self.raise(AlertKind::ReconnectSuccess, &mut effects);
                effects.push(SideEffect::Notify {
                    notice: Notice::ReconnectSuccessful,
                    level: NotifyLevel::Information,
                });

                let stream = self.live_stream();
                self.reconnect.on_success(stream.as_deref());
                self.bandwidth.reset_after_reconnect(now);
                self.telemetry.record(TelemetryEvent::ReconnectSucceeded { after_attempts: attempts });
            }
            Event::Acknowledge(kind) => {
                if self.overload.hint(kind).is_some() {
                    debug!(?kind, "hint suppressed for this session");
                    self.overload.acknowledge(kind);
                    self.telemetry.record(TelemetryEvent::AlertSuppressed { kind });
                }
            }
            Event::VisibilityChanged { visible } => {
                if self.visible && !visible {
                    self.resource_notify_armed = true;
                }
                self.visible = visible;
            }
        }

        effects
    }

    /// One status period. A no-op while inactive, so a tick racing a
    /// deactivation is harmless.
    pub fn tick(&mut self, now: Instant) -> Vec<SideEffect> {
        self.tick = self.tick.next();
        if self.session_id.is_none() {
            trace!(tick = self.tick.frame, "inactive, tick ignored");
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.status_line.tick();

        let stream = self.live_stream();
        if let Some(session) = &stream {
            self.update_bandwidth(session.as_ref(), now, &mut effects);

            self.totals.stream_seconds += 1;
            if let Some(message) = self.reconnect.tick() {
                self.status_line.show(message);
            }
        }

        if self.live_record().is_some() {
            self.totals.record_seconds += 1;
        }

        if let Some(session) = &stream {
            self.update_dropped_frames(session.as_ref(), &mut effects);
        }
        self.update_cpu(&mut effects);
        self.update_skipped_frames(&mut effects);

        effects
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            active: self.is_active(),
            session_id: self.session_id,
            stream_attached: self.is_stream_active(),
            record_attached: self.is_record_active(),
            stream_time: Elapsed(self.totals.stream_seconds),
            record_time: Elapsed(self.totals.record_seconds),
            cpu: self.cpu_reading,
            bandwidth_kbps: self.bandwidth.last_rate(),
            dropped_frames: self.dropped_frames,
            status_message: self.status_line.current(),
            delay_message: self.reconnect.delay_message(),
            reconnect: self.reconnect.phase(),
            indicator: self.indicator,
        }
    }

    fn live_stream(&self) -> Option<SessionHandle> {
        self.stream.as_ref().and_then(Weak::upgrade)
    }

    fn live_record(&self) -> Option<SessionHandle> {
        self.record.as_ref().and_then(Weak::upgrade)
    }

    fn attach_stream(&mut self, session: &SessionHandle, now: Instant) {
        if self.stream.is_none() {
            info!("stream attached");
            self.telemetry.record(TelemetryEvent::OutputAttached { output: OutputKind::Stream, tick: self.tick });
            self.bandwidth.start(now);
            self.congestion.reset();
            self.indicator = Indicator::Pending;
        }
        self.stream = Some(Arc::downgrade(session));
    }

    fn stream_stopped(&mut self) {
        self.reconnect.clear();
        if self.stream.take().is_none() {
            return;
        }

        info!("stream detached");
        self.telemetry.record(TelemetryEvent::OutputDetached { output: OutputKind::Stream, tick: self.tick });
        self.bandwidth.clear();
        self.congestion.reset();
        self.indicator = Indicator::Hidden;
        self.dropped_frames = None;
        self.status_line.clear();
        self.deactivate();
    }

    fn activate(&mut self) {
        if self.session_id.is_some() {
            return;
        }

        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.activated_at = self.tick;
        self.totals = SessionTotals {
            start_skipped: self.pipeline.skipped_frames(),
            start_rendered: self.pipeline.total_rendered_frames(),
            ..SessionTotals::default()
        };
        self.overload.rearm();
        self.resource_notify_armed = true;
        self.status_line.clear();

        self.telemetry.clear();
        self.telemetry.record(TelemetryEvent::Activated { session_id });
        info!(session = %session_id, stream = self.is_stream_active(), record = self.is_record_active(), "monitor activated");
    }

    /// Safe to call any number of times; only the last output stopping
    /// actually tears the session down.
    fn deactivate(&mut self) {
        let fully_stopped = self.stream.is_none() && self.record.is_none();

        if fully_stopped {
            if let Some(session_id) = self.session_id.take() {
                let duration_ticks = self.tick.periods_since(self.activated_at);
                let summary = self.telemetry.aggregate_session(
                    session_id,
                    duration_ticks,
                    self.totals.stream_seconds,
                    self.totals.record_seconds,
                );
                info!(session = %session_id, ?summary, "monitor deactivated");

                self.reconnect.reset();
                self.bandwidth.clear();
                self.dropped_frames = None;
                self.cpu_reading = CpuReading::default();
                self.status_line.clear();
                self.indicator = Indicator::Hidden;
                self.overload.rearm();
                self.resource_notify_armed = true;
            }
        }

        if self.stream.is_none() {
            self.totals.stream_seconds = 0;
        }
        if self.record.is_none() {
            self.totals.record_seconds = 0;
        }
    }

    fn raise(&mut self, kind: AlertKind, effects: &mut Vec<SideEffect>) {
        match kind {
            AlertKind::ReconnectSuccess => debug!(?kind, "alert raised"),
            _ => warn!(?kind, "alert raised"),
        }
        self.telemetry.record(TelemetryEvent::AlertRaised { kind, tick: self.tick });
        effects.push(SideEffect::Alert(kind));
    }

    fn update_bandwidth(&mut self, session: &dyn OutputSession, now: Instant, effects: &mut Vec<SideEffect>) {
        if let Some(kbps) = self.bandwidth.on_tick(session.total_bytes_sent(), now) {
            debug!(kbps, "bandwidth published");
            self.telemetry.record(TelemetryEvent::BandwidthPublished { kbps });
            effects.push(SideEffect::BandwidthUpdated(kbps));
        }
    }

    fn update_dropped_frames(&mut self, session: &dyn OutputSession, effects: &mut Vec<SideEffect>) {
        let total = session.total_frames();
        if total == 0 {
            return;
        }

        let dropped = session.frames_dropped();
        self.dropped_frames = Some(DroppedFrames {
            dropped,
            total,
            percent: f64::from(dropped) / f64::from(total) * 100.0,
        });

        if self.overload.on_dropped_frames(dropped) {
            self.raise(AlertKind::DropFrameSpike, effects);
        }

        self.indicator = self.congestion.on_sample(session.congestion()).into();
    }

    fn update_cpu(&mut self, effects: &mut Vec<SideEffect>) {
        let usage = self.cpu.cpu_usage();
        self.cpu_reading = CpuReading {
            usage_percent: usage,
            fps: self.pipeline.current_fps(),
        };

        if self.overload.on_cpu_sample(usage) {
            self.raise(AlertKind::CpuOverload, effects);
        }
    }

    fn update_skipped_frames(&mut self, effects: &mut Vec<SideEffect>) {
        let skipped = self.pipeline.skipped_frames().saturating_sub(self.totals.start_skipped);
        let rendered = self.pipeline.total_rendered_frames().saturating_sub(self.totals.start_rendered);
        let burst = skipped.saturating_sub(self.totals.last_skipped);
        self.totals.last_skipped = skipped;

        if rendered == 0 {
            return;
        }

        let percentage = skipped as f64 / rendered as f64 * 100.0;
        if burst <= self.config.skip_burst_frames || percentage < self.config.skip_burst_percent {
            return;
        }

        self.status_line.show_for(StatusMessage::HighResourceUsage, self.config.message_hold_ticks);
        self.raise(AlertKind::HighResourceUsage, effects);

        if !self.visible && self.resource_notify_armed {
            effects.push(SideEffect::Notify {
                notice: Notice::HighResourceUsage,
                level: NotifyLevel::Warning,
            });
            self.resource_notify_armed = false;
        }
    }
}

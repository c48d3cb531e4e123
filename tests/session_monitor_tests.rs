use std::sync::Arc;
use std::time::{Duration, Instant};

use sessionmon::kernel::effect::{Notice, NotifyLevel, SideEffect};
use sessionmon::kernel::event::{AlertKind, Event};
use sessionmon::monitor::congestion::{CongestionColor, Indicator};
use sessionmon::monitor::overload::HintState;
use sessionmon::monitor::types::{Elapsed, StatusMessage};
use sessionmon::session::sim::{SimulatedCpu, SimulatedOutput, SimulatedPipeline};
use sessionmon::{MonitorConfig, SessionMonitor};

struct Rig {
    pipeline: Arc<SimulatedPipeline>,
    cpu: Arc<SimulatedCpu>,
    output: Arc<SimulatedOutput>,
    monitor: SessionMonitor,
    now: Instant,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(MonitorConfig::default())
    }

    fn with_config(config: MonitorConfig) -> Self {
        let pipeline = SimulatedPipeline::new();
        let cpu = SimulatedCpu::new();
        let now = Instant::now();
        let monitor = SessionMonitor::new(config, pipeline.clone(), cpu.clone(), now);
        Self {
            pipeline,
            cpu,
            output: SimulatedOutput::new(),
            monitor,
            now,
        }
    }

    fn send(&mut self, event: Event) -> Vec<SideEffect> {
        self.monitor.handle(event, self.now)
    }

    fn start_stream(&mut self) -> Vec<SideEffect> {
        let session = self.output.handle();
        self.send(Event::StreamStarted(session))
    }

    fn tick(&mut self) -> Vec<SideEffect> {
        self.now += Duration::from_secs(1);
        self.monitor.tick(self.now)
    }
}

fn alerts(effects: &[SideEffect]) -> Vec<AlertKind> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            SideEffect::Alert(kind) => Some(*kind),
            _ => None,
        })
        .collect()
}

fn notices(effects: &[SideEffect]) -> Vec<Notice> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            SideEffect::Notify { notice, .. } => Some(*notice),
            _ => None,
        })
        .collect()
}

#[test]
fn test_bandwidth_first_publish_on_second_tick() {
    let mut rig = Rig::new();
    rig.output.set_bytes_sent(0);
    rig.start_stream();

    rig.output.set_bytes_sent(4_000);
    let first = rig.tick();
    assert!(!first.iter().any(|e| matches!(e, SideEffect::BandwidthUpdated(_))));

    rig.output.set_bytes_sent(9_000);
    let second = rig.tick();
    assert!(second.contains(&SideEffect::BandwidthUpdated(36.0)));
    assert_eq!(rig.monitor.snapshot().bandwidth_kbps, Some(36.0));
    assert_eq!(rig.monitor.snapshot().bandwidth_label().as_deref(), Some("kb/s: 36"));
}

#[test]
fn test_cpu_overload_fires_on_tenth_sample_and_acknowledgement_latches() {
    let mut rig = Rig::new();
    rig.start_stream();
    rig.cpu.set_usage(60.0);

    for tick in 1..10 {
        assert!(alerts(&rig.tick()).is_empty(), "no overload before the window fills (tick {tick})");
    }
    assert_eq!(alerts(&rig.tick()), vec![AlertKind::CpuOverload]);

    rig.send(Event::Acknowledge(AlertKind::CpuOverload));
    assert_eq!(rig.monitor.overload().hint(AlertKind::CpuOverload), Some(HintState::Disarmed));
    assert!(rig.monitor.overload().cpu_window().all().iter().all(|v| *v == 0.0));

    assert!(alerts(&rig.tick()).is_empty(), "a single fresh sample must not refire");
    for _ in 0..20 {
        assert!(alerts(&rig.tick()).is_empty(), "acknowledged hint stays off for the session");
    }
}

#[test]
fn test_unanswered_overload_alerts_repeat_once_windows_refill() {
    let mut rig = Rig::new();
    rig.start_stream();
    rig.cpu.set_usage(60.0);

    let mut cpu_ticks = Vec::new();
    let mut drop_ticks = Vec::new();
    let mut dropped = 0;
    for tick in 1..=40u32 {
        dropped += 100;
        rig.output.set_frames(dropped, tick * 1_000);
        let raised = alerts(&rig.tick());
        if raised.contains(&AlertKind::CpuOverload) {
            cpu_ticks.push(tick);
        }
        if raised.contains(&AlertKind::DropFrameSpike) {
            drop_ticks.push(tick);
        }
    }

    assert_eq!(cpu_ticks, vec![10, 20, 30, 40]);
    assert_eq!(drop_ticks, vec![10, 20, 30, 40]);
    assert_eq!(rig.monitor.overload().hint(AlertKind::CpuOverload), Some(HintState::Armed));
}

#[test]
fn test_cpu_dip_below_threshold_breaks_the_run() {
    let mut rig = Rig::new();
    rig.start_stream();

    rig.cpu.set_usage(90.0);
    for _ in 0..5 {
        rig.tick();
    }
    rig.cpu.set_usage(49.0);
    rig.tick();
    rig.cpu.set_usage(90.0);
    for _ in 0..9 {
        assert!(alerts(&rig.tick()).is_empty());
    }
    assert_eq!(alerts(&rig.tick()), vec![AlertKind::CpuOverload]);
}

// The lookback is the slot at the write index, which is still zero for the
// first N-1 pushes; tick N compares against the very first sample and may fire.
#[test]
fn test_drop_spike_lookback_first_fires_on_tick_n() {
    let mut rig = Rig::new();
    rig.start_stream();

    let mut dropped = 0;
    for tick in 1..10 {
        dropped += 100;
        rig.output.set_frames(dropped, tick * 1_000);
        assert!(alerts(&rig.tick()).is_empty(), "warm-up tick {tick} must not fire");
    }

    dropped += 100;
    rig.output.set_frames(dropped, 10_000);
    assert_eq!(alerts(&rig.tick()), vec![AlertKind::DropFrameSpike]);
    assert!(rig.monitor.overload().drop_window().all().iter().all(|v| *v == 0));

    rig.send(Event::Acknowledge(AlertKind::DropFrameSpike));
    for _ in 0..30 {
        dropped += 100;
        rig.output.set_frames(dropped, 20_000);
        assert!(alerts(&rig.tick()).is_empty());
    }
}

#[test]
fn test_steady_drops_below_spike_limit_never_fire() {
    let mut rig = Rig::new();
    rig.start_stream();

    let mut dropped = 1;
    for tick in 1..40 {
        dropped += 5;
        rig.output.set_frames(dropped, tick * 60);
        assert!(alerts(&rig.tick()).is_empty());
    }
}

#[test]
fn test_dropped_frames_reading_and_zero_total_guard() {
    let mut rig = Rig::new();
    rig.start_stream();

    rig.output.set_frames(0, 0);
    rig.output.set_congestion(1.0);
    rig.tick();
    let snapshot = rig.monitor.snapshot();
    assert_eq!(snapshot.dropped_frames, None);
    assert_eq!(snapshot.indicator, Indicator::Pending);

    rig.output.set_frames(3, 200);
    rig.tick();
    let dropped = rig.monitor.snapshot().dropped_frames.expect("reading once frames exist");
    assert_eq!(dropped.dropped, 3);
    assert!((dropped.percent - 1.5).abs() < 1e-9);
    assert_eq!(dropped.to_string(), "Dropped Frames 3 (1.5%)");
}

#[test]
fn test_congestion_indicator_follows_smoother() {
    let mut rig = Rig::new();
    rig.start_stream();
    assert_eq!(rig.monitor.snapshot().indicator, Indicator::Pending);
    rig.output.set_frames(0, 100);

    rig.output.set_congestion(0.0);
    rig.tick();
    assert_eq!(
        rig.monitor.snapshot().indicator,
        Indicator::Congestion { smoothed: 0.0, color: CongestionColor::Good }
    );

    rig.output.set_congestion(1.0);
    rig.tick();
    assert_eq!(
        rig.monitor.snapshot().indicator,
        Indicator::Congestion { smoothed: 1.0, color: CongestionColor::Bad }
    );

    rig.output.set_congestion(0.0);
    rig.tick();
    let indicator = rig.monitor.snapshot().indicator;
    assert_eq!(
        indicator,
        Indicator::Congestion { smoothed: 0.5, color: CongestionColor::Blend { red: 1.0, green: 1.0 } }
    );
    assert_eq!(indicator.rgb(), Some((255, 255, 0)));
}

#[test]
fn test_skip_burst_advisory_and_hidden_window_notification() {
    let mut rig = Rig::new();
    rig.pipeline.set_frames(1_000, 100_000);
    rig.start_stream();

    rig.pipeline.advance(0, 30);
    assert!(alerts(&rig.tick()).is_empty());

    // exactly at the burst limit: not a burst
    rig.pipeline.advance(10, 30);
    assert!(alerts(&rig.tick()).is_empty());

    rig.pipeline.advance(11, 30);
    let effects = rig.tick();
    assert_eq!(alerts(&effects), vec![AlertKind::HighResourceUsage]);
    assert!(notices(&effects).is_empty(), "visible window gets no tray notification");
    assert_eq!(rig.monitor.snapshot().status_message, Some(StatusMessage::HighResourceUsage));

    rig.send(Event::VisibilityChanged { visible: false });
    rig.pipeline.advance(11, 30);
    let effects = rig.tick();
    assert_eq!(alerts(&effects), vec![AlertKind::HighResourceUsage]);
    assert_eq!(
        effects.iter().filter(|e| matches!(e, SideEffect::Notify { .. })).cloned().collect::<Vec<_>>(),
        vec![SideEffect::Notify { notice: Notice::HighResourceUsage, level: NotifyLevel::Warning }]
    );

    rig.pipeline.advance(11, 30);
    let effects = rig.tick();
    assert_eq!(alerts(&effects), vec![AlertKind::HighResourceUsage], "advisory repeats");
    assert!(notices(&effects).is_empty(), "notification is one-shot per hidden period");

    rig.send(Event::VisibilityChanged { visible: true });
    rig.send(Event::VisibilityChanged { visible: false });
    rig.pipeline.advance(11, 30);
    assert_eq!(notices(&rig.tick()), vec![Notice::HighResourceUsage]);
}

#[test]
fn test_skip_percentage_is_relative_to_activation() {
    let mut rig = Rig::new();
    // Lots of lifetime skips from before the session must not count.
    rig.pipeline.set_frames(50_000, 60_000);
    rig.start_stream();

    rig.pipeline.advance(0, 100_000);
    rig.tick();
    // 11 skipped out of ~100k rendered this session: below 0.1%.
    rig.pipeline.advance(11, 30);
    assert!(alerts(&rig.tick()).is_empty());
}

#[test]
fn test_transient_status_message_expires() {
    let mut rig = Rig::new();
    rig.start_stream();
    rig.pipeline.advance(0, 30);
    rig.tick();
    rig.pipeline.advance(20, 30);
    rig.tick();
    assert_eq!(rig.monitor.snapshot().status_message, Some(StatusMessage::HighResourceUsage));

    for _ in 0..3 {
        rig.pipeline.advance(0, 30);
        rig.tick();
        assert_eq!(rig.monitor.snapshot().status_message, Some(StatusMessage::HighResourceUsage));
    }
    rig.pipeline.advance(0, 30);
    rig.tick();
    assert_eq!(rig.monitor.snapshot().status_message, None);
}

#[test]
fn test_activation_needs_either_output_and_deactivation_needs_both() {
    let mut rig = Rig::new();
    assert!(!rig.monitor.is_active());
    assert!(rig.tick().is_empty(), "inactive tick is a no-op");

    let recording = SimulatedOutput::new();
    rig.start_stream();
    rig.send(Event::RecordingStarted(recording.handle()));
    let session_id = rig.monitor.session_id();
    assert!(session_id.is_some());

    for _ in 0..3 {
        rig.tick();
    }
    let snapshot = rig.monitor.snapshot();
    assert_eq!(snapshot.stream_time, Elapsed(3));
    assert_eq!(snapshot.record_time, Elapsed(3));
    assert_eq!(snapshot.stream_label(), "LIVE: 00:00:03");

    rig.send(Event::StreamStopped);
    assert!(rig.monitor.is_active(), "recording keeps the session alive");
    assert_eq!(rig.monitor.session_id(), session_id);
    rig.tick();
    let snapshot = rig.monitor.snapshot();
    assert_eq!(snapshot.stream_time, Elapsed(0));
    assert_eq!(snapshot.record_time, Elapsed(4));
    assert_eq!(snapshot.indicator, Indicator::Hidden);

    rig.send(Event::RecordingStopped);
    assert!(!rig.monitor.is_active());
    let snapshot = rig.monitor.snapshot();
    assert_eq!(snapshot.record_time, Elapsed(0));
    assert_eq!(snapshot.session_id, None);
    assert_eq!(snapshot.record_label(), "REC: 00:00:00");

    // redundant stops and late ticks are harmless
    rig.send(Event::RecordingStopped);
    rig.send(Event::StreamStopped);
    assert!(rig.tick().is_empty());
    assert!(!rig.monitor.is_active());
}

#[test]
fn test_reactivation_rearms_hints_and_starts_fresh_session() {
    let mut rig = Rig::new();
    rig.start_stream();
    rig.cpu.set_usage(80.0);
    for _ in 0..10 {
        rig.tick();
    }
    rig.send(Event::Acknowledge(AlertKind::CpuOverload));
    let first_session = rig.monitor.session_id();

    rig.send(Event::StreamStopped);
    assert_eq!(rig.monitor.overload().hint(AlertKind::CpuOverload), Some(HintState::Armed));

    rig.start_stream();
    assert_ne!(rig.monitor.session_id(), first_session);
    assert_eq!(rig.monitor.totals().stream_seconds, 0);
    for _ in 0..9 {
        assert!(alerts(&rig.tick()).is_empty());
    }
    assert_eq!(alerts(&rig.tick()), vec![AlertKind::CpuOverload]);
}

#[test]
fn test_dropped_session_handle_only_disables_stream_work() {
    let mut rig = Rig::new();
    let recording = SimulatedOutput::new();
    rig.start_stream();
    rig.send(Event::RecordingStarted(recording.handle()));
    rig.output.set_bytes_sent(10_000);
    rig.tick();

    // The output collaborator released the stream without telling us.
    let stream = std::mem::replace(&mut rig.output, SimulatedOutput::new());
    drop(stream);

    for _ in 0..3 {
        assert!(!rig.tick().iter().any(|e| matches!(e, SideEffect::BandwidthUpdated(_))));
    }
    let snapshot = rig.monitor.snapshot();
    assert_eq!(snapshot.stream_time, Elapsed(1));
    assert_eq!(snapshot.record_time, Elapsed(4));
    assert!(snapshot.stream_attached);
}

#[test]
fn test_telemetry_summarizes_session() {
    let mut rig = Rig::new();
    rig.start_stream();
    rig.cpu.set_usage(100.0);
    for step in 1..=10u64 {
        rig.output.set_bytes_sent(step * 125_000);
        rig.tick();
    }

    let snap = rig.monitor.telemetry().snapshot();
    assert_eq!(snap.alert_stats.cpu_overload, 1);
    assert_eq!(snap.bandwidth_stats.publishes, 5);
    assert_eq!(snap.bandwidth_stats.peak_kbps, 1_000.0);

    rig.send(Event::StreamStopped);
    let last = rig.monitor.telemetry().events().last().cloned();
    assert!(matches!(
        last,
        Some(sessionmon::kernel::telemetry::event::TelemetryEvent::SessionSummary { stream_seconds: 10, alerts: 1, .. })
    ));
}

#[test]
fn test_record_only_session_runs_shared_checks_without_stream_values() {
    let mut rig = Rig::new();
    let recording = SimulatedOutput::new();
    recording.set_bytes_sent(50_000);
    recording.set_frames(40, 100);
    recording.set_congestion(1.0);
    rig.send(Event::RecordingStarted(recording.handle()));
    assert!(rig.monitor.is_active());
    assert!(!rig.monitor.is_stream_active());

    rig.cpu.set_usage(95.0);
    let mut raised = Vec::new();
    for tick in 1..=10u64 {
        rig.pipeline.advance(if tick == 5 { 20 } else { 0 }, 30);
        raised.extend(alerts(&rig.tick()));
    }
    assert_eq!(raised, vec![AlertKind::HighResourceUsage, AlertKind::CpuOverload]);

    let snapshot = rig.monitor.snapshot();
    assert_eq!(snapshot.record_time, Elapsed(10));
    assert_eq!(snapshot.stream_time, Elapsed(0));
    assert_eq!(snapshot.bandwidth_kbps, None);
    assert_eq!(snapshot.dropped_frames, None);
    assert_eq!(snapshot.indicator, Indicator::Hidden);
    assert_eq!(snapshot.cpu.usage_percent, 95.0);
}

#[test]
fn test_status_line_does_not_leak_across_sessions() {
    let mut rig = Rig::new();
    let recording = SimulatedOutput::new();
    rig.cpu.set_usage(40.0);
    rig.send(Event::RecordingStarted(recording.handle()));
    rig.pipeline.advance(0, 30);
    rig.tick();
    rig.pipeline.advance(20, 30);
    assert_eq!(alerts(&rig.tick()), vec![AlertKind::HighResourceUsage]);
    assert_eq!(rig.monitor.snapshot().status_message, Some(StatusMessage::HighResourceUsage));

    rig.send(Event::RecordingStopped);
    let snapshot = rig.monitor.snapshot();
    assert!(!snapshot.active);
    assert_eq!(snapshot.status_message, None);
    assert_eq!(snapshot.cpu.usage_percent, 0.0);

    rig.send(Event::RecordingStarted(recording.handle()));
    assert_eq!(rig.monitor.snapshot().status_message, None);
    rig.pipeline.advance(0, 30);
    assert!(alerts(&rig.tick()).is_empty());
    assert_eq!(rig.monitor.snapshot().status_message, None);
}

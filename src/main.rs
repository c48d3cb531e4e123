use std::time::Instant;

use anyhow::{Context, Result};
use sessionmon::kernel::effect::SideEffect;
use sessionmon::kernel::event::AlertKind;
use sessionmon::kernel::reactor::{MonitorOutput, Reactor};
use sessionmon::session::sim::{SimulatedCpu, SimulatedOutput, SimulatedPipeline};
use sessionmon::{MonitorConfig, SessionMonitor};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const DEMO_SECONDS: u32 = 30;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1).or_else(|| std::env::var("SESSIONMON_CONFIG").ok()) {
        Some(path) => MonitorConfig::load(&path).with_context(|| format!("loading config from {path}"))?,
        None => MonitorConfig::default(),
    };
    tracing::info!(?config, "sessionmon demo starting");

    // Simulated collaborators
    let pipeline = SimulatedPipeline::new();
    pipeline.set_fps(30.0);
    let cpu = SimulatedCpu::new();
    cpu.set_usage(18.5);
    let output = SimulatedOutput::new();

    let monitor = SessionMonitor::new(config.clone(), pipeline.clone(), cpu.clone(), Instant::now());
    let (reactor, handle) = Reactor::new(monitor);
    let (out_tx, mut out_rx) = mpsc::channel(256);
    let cancel = CancellationToken::new();
    let reactor_task = tokio::spawn(reactor.run(out_tx, cancel.clone()));

    // Presentation side: print snapshots, answer hints like a user would.
    let ui_handle = handle.clone();
    let printer = tokio::spawn(async move {
        while let Some(item) = out_rx.recv().await {
            match item {
                MonitorOutput::Snapshot(snapshot) => match serde_json::to_string(&snapshot) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!("Failed to serialize snapshot: {}", e),
                },
                MonitorOutput::Effect(SideEffect::Alert(kind)) => {
                    println!("[ALERT] {kind:?}");
                    // CPU warnings stay unanswered and repeat; drop spikes get "don't show again".
                    if kind == AlertKind::DropFrameSpike {
                        let _ = ui_handle.acknowledge(kind).await;
                    }
                }
                MonitorOutput::Effect(SideEffect::Notify { notice, level }) => {
                    println!("[NOTIFY {level:?}] {notice}");
                }
                MonitorOutput::Effect(SideEffect::BandwidthUpdated(kbps)) => {
                    println!("[BANDWIDTH] {kbps:.0} kb/s");
                }
            }
        }
    });

    // Output side: a stream that drops and recovers, with an encoder stall.
    handle.stream_started(output.handle()).await?;
    let mut cadence = tokio::time::interval(config.tick_interval());
    let mut frames: u32 = 0;
    let mut dropped: u32 = 0;

    for second in 0..DEMO_SECONDS {
        tokio::select! {
            _ = cadence.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }

        frames += 30;
        if (6..9).contains(&second) {
            dropped += 20;
            output.set_congestion(0.8);
        } else {
            output.set_congestion(0.0);
        }
        output.add_bytes_sent(312_500);
        output.set_frames(dropped, frames);
        pipeline.advance(if (14..17).contains(&second) { 15 } else { 0 }, 30);
        cpu.set_usage(if (14..17).contains(&second) { 93.0 } else { 18.5 });

        match second {
            9 => handle.reconnect(3).await?,
            13 => {
                output.set_bytes_sent(0);
                handle.reconnect_success().await?;
            }
            24 => handle.stream_stopped().await?,
            _ => {}
        }
    }

    cancel.cancel();
    let monitor = reactor_task.await.context("reactor task panicked")?;
    printer.await.context("printer task panicked")?;

    tracing::info!(telemetry = ?monitor.telemetry().snapshot(), "sessionmon demo finished");
    Ok(())
}

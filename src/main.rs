//! NetraIO daemon - keeps the glasses telemetry and video streams alive
//!
//! Connects to both device services, logs sample rates and connection
//! health, and shuts down cleanly on Ctrl-C. Host, ports, and framing
//! constants come from the TOML config; defaults match the current firmware.

use netra_io::client::{Handlers, StreamClient};
use netra_io::config::Config;
use netra_io::error::Result;
use netra_io::types::{MotionSample, VideoFrame};
use std::env;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `netra-io <path>` (positional)
/// - `netra-io --config <path>` (flag-based)
/// - `netra-io -c <path>` (short flag)
///
/// Falls back to built-in defaults if no config is given.
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

/// RUST_LOG still wins; the config level is only the default filter
fn init_logging(config: &Config) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    );
    if config.logging.output == "stdout" {
        builder.target(env_logger::Target::Stdout);
    }
    builder.init();
}

fn main() -> Result<()> {
    let config_path = parse_config_path();
    let config = match &config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::glasses_defaults(),
    };
    init_logging(&config);

    log::info!("NetraIO v0.2.0 starting...");
    match &config_path {
        Some(path) => log::info!("Using config: {}", path),
        None => log::info!("No config given, using glasses defaults"),
    }

    log::info!(
        "Device: {} (motion :{}, video :{})",
        config.network.host,
        config.network.motion_port,
        config.network.video_port
    );

    // Sample counters updated from the worker callbacks
    let motion_count = Arc::new(AtomicU64::new(0));
    let video_count = Arc::new(AtomicU64::new(0));

    let mc = Arc::clone(&motion_count);
    let mut motion = StreamClient::motion(
        &config,
        Handlers {
            on_sample: Some(Box::new(move |_: &MotionSample| {
                mc.fetch_add(1, Ordering::Relaxed);
            })),
            on_state_change: Some(Box::new(|state| {
                log::info!("motion stream: {}", state);
            })),
        },
    )?;

    let vc = Arc::clone(&video_count);
    let mut video = StreamClient::video(
        &config,
        Handlers {
            on_sample: Some(Box::new(move |_: &VideoFrame| {
                vc.fetch_add(1, Ordering::Relaxed);
            })),
            on_state_change: Some(Box::new(|state| {
                log::info!("video stream: {}", state);
            })),
        },
    )?;

    motion.start()?;
    video.start()?;

    // Shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| netra_io::Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    // Periodic rate report. Everything interesting happens on the worker
    // threads; this loop only observes.
    let mut last_motion = 0u64;
    let mut last_video = 0u64;
    let mut last_report = std::time::Instant::now();
    while running.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(100));
        if last_report.elapsed() < Duration::from_secs(5) {
            continue;
        }
        last_report = std::time::Instant::now();

        let m = motion_count.load(Ordering::Relaxed);
        let v = video_count.load(Ordering::Relaxed);
        log::info!(
            "motion: {:.1} Hz ({} total, {} resyncs) | video: {:.1} fps ({} total)",
            (m - last_motion) as f64 / 5.0,
            m,
            motion.stats().resyncs,
            (v - last_video) as f64 / 5.0,
            v
        );
        if let Some(frame) = video.get_latest() {
            log::debug!("latest frame mean luma: {:.1}", frame.mean_luma());
        }
        last_motion = m;
        last_video = v;
    }

    log::info!("Stopping stream clients...");
    motion.stop();
    video.stop();
    log::info!("NetraIO shutdown complete");

    Ok(())
}

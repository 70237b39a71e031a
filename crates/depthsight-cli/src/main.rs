//! `depthsight-cli` – depthsight command line entry point.
//!
//! This binary is the ignition switch for the obstacle-detection pipeline.
//! It:
//!
//! 1. Initialises structured logging (and OTLP export when configured).
//! 2. Loads `~/.depthsight/config.toml`, writing the defaults on first run.
//! 3. Opens the configured frame source; a missing device is fatal and the
//!    process exits non-zero before the frame loop starts.
//! 4. Intercepts **Ctrl-C** to raise the shutdown flag and fault event, then
//!    lets the loop finish its current frame and exit cleanly.

mod config;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use uuid::Uuid;

use depthsight_hal::{BlobSegmenter, DepthSensor, RasterOps, SimDepthSensor};
use depthsight_middleware::{BusPublisher, EventBus, Topic};
use depthsight_runtime::{telemetry, FrameLoop, FrameLoopConfig};
use depthsight_types::{Event, EventPayload, SightError};

use crate::config::SensorMode;

#[tokio::main]
async fn main() {
    // Held for the process lifetime; dropping it flushes pending spans.
    let _telemetry_guard = telemetry::init_tracing("depthsight");

    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  No config found – defaults written to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => warn!(error = %e, "could not write default config"),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    let model = match cfg.camera_model() {
        Ok(model) => model,
        Err(e) => {
            error!(error = %e, "invalid camera configuration");
            println!("{}: {}", "Fatal".red().bold(), e);
            std::process::exit(1);
        }
    };

    // ── Frame source ──────────────────────────────────────────────────────
    let sensor: Box<dyn DepthSensor> = match open_sensor(&cfg) {
        Ok(sensor) => sensor,
        Err(e) => {
            // Acquisition failure is fatal at startup, before the loop runs.
            error!(error = %e, "no frame source available");
            println!("{}: {}", "Fatal".red().bold(), e);
            std::process::exit(1);
        }
    };
    println!("  Frame source: {}\n", sensor.id().bold());

    // ── Pipeline assembly ─────────────────────────────────────────────────
    let bus = EventBus::default();
    let publisher = BusPublisher::new(bus.clone(), "depthsight-cli::publisher");
    let mut frame_loop = FrameLoop::new(
        FrameLoopConfig {
            model,
            extractor: cfg.extractor_config(),
            frame_interval: cfg.frame_interval(),
        },
        sensor,
        Box::new(BlobSegmenter::new()),
        Box::new(RasterOps::new()),
        Box::new(publisher),
        bus.clone(),
    );

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    let bus_for_ctrlc = bus.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!(
            "{}",
            "⚠  Ctrl-C received – finishing current frame …".yellow().bold()
        );
        let stop_event = Event {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            source: "depthsight-cli".to_string(),
            payload: EventPayload::Fault {
                component: "cli".to_string(),
                message: "operator requested shutdown".to_string(),
            },
        };
        let _ = bus_for_ctrlc.publish_to(Topic::SystemAlerts, stop_event);
        shutdown_flag.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; graceful shutdown unavailable");
    }

    // ── Detection observer ────────────────────────────────────────────────
    // Log every published detection so a headless run is visible.
    let mut detections_rx = bus.subscribe_to(Topic::Detections);
    tokio::spawn(async move {
        while let Ok(event) = detections_rx.recv().await {
            if let EventPayload::ObstacleWire { payload, .. } = event.payload
                && let Ok(msg) = depthsight_middleware::wire::decode(&payload)
            {
                info!(
                    x = msg.x_position,
                    y = msg.y_position,
                    z = msg.z_position,
                    diameter = msg.diameter,
                    "obstacle detected"
                );
            }
        }
    });

    // ── Frame loop ────────────────────────────────────────────────────────
    frame_loop.run(shutdown).await;
    println!("{}", "  ✓ Exiting depthsight.".green());
}

/// Open the configured frame source.
///
/// `device` mode requires a physical depth-camera driver, which this build
/// does not link; it reports [`SightError::DeviceNotFound`] so the process
/// exits non-zero before the frame loop starts.
fn open_sensor(cfg: &config::Config) -> Result<Box<dyn DepthSensor>, SightError> {
    match cfg.sensor {
        SensorMode::Sim => Ok(Box::new(SimDepthSensor::new(
            "sim0",
            cfg.sim_scene.clone(),
        ))),
        SensorMode::Device => Err(SightError::DeviceNotFound),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"     __         __  __       _      __   __ "#.bold().cyan());
    println!("{}", r#" ___/ /__ ___  / /_/ /    __(_)__ _/ /  / /_"#.bold().cyan());
    println!("{}", r#"/ _  / -_) _ \/ __/ _ \  (_-< / _ `/ _ \/ __/"#.bold().cyan());
    println!("{}", r#"\_,_/\__/ .__/\__/_//_/ /___/_/\_, /_//_/\__/"#.bold().cyan());
    println!("{}", r#"       /_/                    /___/          "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "depthsight".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Depth-camera obstacle detection");
    println!();
}

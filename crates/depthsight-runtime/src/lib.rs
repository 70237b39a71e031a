//! `depthsight-runtime` – the frame-loop engine.
//!
//! Wires the sensor, segmentation, extraction, and publishing stages into a
//! single synchronous per-frame pipeline and keeps it running until told to
//! stop.
//!
//! # Modules
//!
//! - [`frame_loop`] – [`FrameLoop`][frame_loop::FrameLoop]: drives one
//!   acquire → segment → extract → publish iteration per
//!   [`tick`][frame_loop::FrameLoop::tick] and loops it in
//!   [`run`][frame_loop::FrameLoop::run] until the shutdown flag is raised.
//!   Iterations are stateless with respect to each other: every frame is
//!   processed from scratch and fully published before the next is acquired.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber with an optional OTLP span exporter. Set
//!   `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export to Jaeger,
//!   Grafana Tempo, or any OTLP-compatible collector.

pub mod frame_loop;
pub mod telemetry;

pub use frame_loop::{FrameLoop, FrameLoopConfig, FrameReport};
pub use telemetry::{init_tracing, TracerProviderGuard};

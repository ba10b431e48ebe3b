// THEORY:
// This file is the main entry point for the `verdict_vision` library crate. It defines
// the public API that consumers (the bundled CLI, a message-queue adapter, tests) build on.
//
// The primary goal is to export the `ClassificationEngine` and its result types as the
// high-level interface: bytes in, one `ClassificationResult` out. The analytical layers
// live under `core_modules`:
//   pixel / smart_pixel  -> per-pixel and pairwise heuristics
//   raster / histogram   -> decoded image container and luminance histogram
//   features             -> the Feature Extraction Layer (two profiles)
//   sentiment / team     -> the Decision Layers
//   verdict              -> labels and results
// The remaining modules are the surrounding plumbing: payloads, configuration, the
// tokio worker pools, a payload producer and a synthetic image generator.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod latency;
pub mod parallel_pipeline;
pub mod payload;
pub mod pipeline;
pub mod producer;
pub mod synthetic;
pub mod telemetry;

pub use config::EngineConfig;
pub use error::{Result, VisionError};
pub use payload::{Category, ImagePayload};
pub use pipeline::{ClassificationEngine, ClassificationResult, Club, Label, classify_sentiment, classify_team};

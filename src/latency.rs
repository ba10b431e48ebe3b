// THEORY:
// Real models are slow; this engine is not. To make the worker pool behave like a
// fleet of slow consumers, each task can wait for a simulated processing delay before
// the engine runs. The delay is a hook chosen at construction time, never a sleep
// buried inside the classifiers, so library callers and tests pay nothing by default.

use crate::config::{LatencyConfig, LatencyMode};
use crate::payload::Category;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Decides how long a worker waits before classifying a payload.
pub trait LatencyHook: Send + Sync {
    fn delay(&self, category: Category) -> Duration;
}

/// Classify immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLatency;

impl LatencyHook for NoLatency {
    fn delay(&self, _category: Category) -> Duration {
        Duration::ZERO
    }
}

/// `min` plus a uniformly random extra in `0..jitter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyWindow {
    pub min: Duration,
    pub jitter: Duration,
}

impl LatencyWindow {
    pub fn from_millis(min_ms: u64, jitter_ms: u64) -> Self {
        Self {
            min: Duration::from_millis(min_ms),
            jitter: Duration::from_millis(jitter_ms),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.min;
        }
        self.min + Duration::from_millis(rng.gen_range(0..jitter_ms))
    }
}

/// Per-stream random delays imitating a slow model.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedLatency {
    pub face: LatencyWindow,
    pub team: LatencyWindow,
}

impl SimulatedLatency {
    pub fn new(face: LatencyWindow, team: LatencyWindow) -> Self {
        Self { face, team }
    }

    pub fn window(&self, category: Category) -> LatencyWindow {
        match category {
            Category::Face => self.face,
            Category::Team => self.team,
        }
    }
}

impl LatencyHook for SimulatedLatency {
    fn delay(&self, category: Category) -> Duration {
        self.window(category).sample(&mut rand::thread_rng())
    }
}

/// Builds the hook described by the `[latency]` config section.
pub fn from_config(config: &LatencyConfig) -> Arc<dyn LatencyHook> {
    match config.mode {
        LatencyMode::None => Arc::new(NoLatency),
        LatencyMode::Simulated => Arc::new(SimulatedLatency::new(
            LatencyWindow::from_millis(config.face_min_ms, config.face_jitter_ms),
            LatencyWindow::from_millis(config.team_min_ms, config.team_jitter_ms),
        )),
    }
}

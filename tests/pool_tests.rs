//! Worker pool and simulation behaviour under a Tokio runtime.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use verdict_vision::config::{LatencyMode, WorkerConfig};
use verdict_vision::core_modules::features::FeatureExtractor;
use verdict_vision::core_modules::raster::raster::{Raster, RasterDecoder};
use verdict_vision::core_modules::sentiment::SentimentClassifier;
use verdict_vision::core_modules::team::TeamClassifier;
use verdict_vision::latency::{LatencyWindow, NoLatency, SimulatedLatency};
use verdict_vision::parallel_pipeline::{ParallelPipeline, WorkerPool};
use verdict_vision::producer::{self, PayloadSource};
use verdict_vision::{Category, ClassificationEngine, EngineConfig, ImagePayload, Label, VisionError};

struct PanickingDecoder;

impl RasterDecoder for PanickingDecoder {
    fn decode(&self, bytes: &[u8]) -> verdict_vision::Result<Raster> {
        if bytes == b"boom" {
            panic!("decoder exploded");
        }
        Err(VisionError::Decode {
            message: "not an image".into(),
            source: None,
        })
    }
}

fn workers(per_stream: usize) -> WorkerConfig {
    WorkerConfig {
        per_stream,
        log_every: 5,
    }
}

#[tokio::test]
async fn panicking_classification_yields_error_and_pool_survives() {
    let engine = ClassificationEngine::new(
        FeatureExtractor::new(PanickingDecoder),
        SentimentClassifier::deterministic(),
        TeamClassifier::new(),
    );
    let pool = WorkerPool::new(Category::Team, 1, Arc::new(engine), Arc::new(NoLatency), 10);

    let exploded = pool
        .process(ImagePayload::new("boom-1", Category::Team, "logo.png", b"boom".to_vec()))
        .await
        .unwrap();
    assert_eq!(exploded.label, Label::Error);
    assert_eq!(exploded.correlation_id, "boom-1");

    let next = pool
        .process(ImagePayload::new("ok-1", Category::Team, "logo.png", b"fine".to_vec()))
        .await
        .unwrap();
    assert_eq!(next.correlation_id, "ok-1");
    assert!(!next.is_error());
    assert_eq!(pool.processed(), 2);

    pool.shutdown().await;
}

#[tokio::test]
async fn simulated_latency_delays_each_payload() {
    let latency = SimulatedLatency::new(LatencyWindow::from_millis(20, 0), LatencyWindow::from_millis(20, 0));
    let pipeline = ParallelPipeline::with_engine(
        Arc::new(ClassificationEngine::deterministic()),
        Arc::new(latency),
        &workers(2),
    );

    let started = Instant::now();
    let result = pipeline
        .submit(ImagePayload::new("slow", Category::Face, "x.png", vec![0]))
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(result.correlation_id, "slow");

    pipeline.shutdown().await;
}

#[tokio::test]
async fn pipeline_builds_from_config() {
    let mut config = EngineConfig::default();
    config.latency.mode = LatencyMode::Simulated;
    config.latency.face_min_ms = 1;
    config.latency.face_jitter_ms = 2;
    config.latency.team_min_ms = 1;
    config.latency.team_jitter_ms = 0;
    config.workers = workers(2);

    let pipeline = ParallelPipeline::new(&config).unwrap();
    assert_eq!(pipeline.pool(Category::Face).worker_count(), 2);

    let results = pipeline
        .submit_batch(vec![
            ImagePayload::new("a", Category::Face, "feliz.png", vec![9]),
            ImagePayload::new("b", Category::Team, "logo.png", vec![9]),
        ])
        .await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_ok()));

    pipeline.shutdown().await;
}

#[tokio::test]
async fn simulation_accounts_for_every_payload() {
    let mut rng = StdRng::seed_from_u64(77);
    let source = PayloadSource::synthetic(&mut rng).unwrap();
    let pipeline = Arc::new(ParallelPipeline::with_engine(
        Arc::new(ClassificationEngine::deterministic()),
        Arc::new(NoLatency),
        &workers(3),
    ));

    let summary = producer::run_simulation(&source, Arc::clone(&pipeline), 30, 0.0, &mut rng)
        .await
        .unwrap();

    assert_eq!(summary.published, 30);
    assert_eq!(summary.faces + summary.teams, 30);
    assert_eq!(summary.lost, 0);
    assert_eq!(summary.labels.values().sum::<usize>(), 30);
    assert!(!summary.labels.contains_key("ERROR"));
    assert_eq!(
        pipeline.processed(Category::Face) + pipeline.processed(Category::Team),
        30
    );
}

#[tokio::test]
async fn simulation_rejects_a_negative_rate() {
    let mut rng = StdRng::seed_from_u64(1);
    let source = PayloadSource::synthetic(&mut rng).unwrap();
    let pipeline = Arc::new(ParallelPipeline::with_engine(
        Arc::new(ClassificationEngine::deterministic()),
        Arc::new(NoLatency),
        &workers(1),
    ));

    assert!(producer::run_simulation(&source, pipeline, 1, -1.0, &mut rng).await.is_err());
}

#[tokio::test]
async fn simulation_rejects_rates_without_a_usable_period() {
    let mut rng = StdRng::seed_from_u64(2);
    let source = PayloadSource::synthetic(&mut rng).unwrap();
    let pipeline = Arc::new(ParallelPipeline::with_engine(
        Arc::new(ClassificationEngine::deterministic()),
        Arc::new(NoLatency),
        &workers(1),
    ));

    for rate in [1e12, 1e-300] {
        let outcome = producer::run_simulation(&source, Arc::clone(&pipeline), 2, rate, &mut rng).await;
        assert!(matches!(outcome, Err(VisionError::Config(_))), "rate {rate}");
    }
    assert_eq!(pipeline.processed(Category::Face) + pipeline.processed(Category::Team), 0);
}


// THEORY:
// The `pipeline` module is the top-level API for the classification engine. It wires
// the Feature Extraction Layer to the two Decision Layers and owns the error boundary:
// whatever goes wrong inside, a caller always receives one `ClassificationResult`.
//
// Key architectural principles:
// 1.  **One Boundary**: `VisionError`s raised below this module are converted into
//     `ERROR` results here and nowhere else. Decode failures never reach this point;
//     the extractor has already turned them into neutral features.
// 2.  **Shared, Read-Only Engine**: The engine holds no per-image state. A single
//     instance (wrapped in an `Arc`) serves every worker of the parallel pipeline.
// 3.  **Routing by Category**: `process` picks the profile and classifier from the
//     payload's category, so consumers only ever need one entry point.

use crate::config::EngineConfig;
use crate::core_modules::features::{FeatureExtractor, FeatureProfile, VisualFeatures};
use crate::core_modules::sentiment::SentimentClassifier;
use crate::core_modules::team::TeamClassifier;
use crate::error::Result;
use crate::payload::{Category, ImagePayload};
use std::sync::OnceLock;

// Re-export key data structures for the public API.
pub use crate::core_modules::features::{SentimentFeatures, TeamFeatures};
pub use crate::core_modules::team::Club;
pub use crate::core_modules::verdict::{ClassificationResult, Label};

/// Extractor plus both classifiers.
pub struct ClassificationEngine {
    extractor: FeatureExtractor,
    sentiment: SentimentClassifier,
    team: TeamClassifier,
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new(
            FeatureExtractor::default(),
            SentimentClassifier::default(),
            TeamClassifier::new(),
        )
    }
}

impl ClassificationEngine {
    pub fn new(extractor: FeatureExtractor, sentiment: SentimentClassifier, team: TeamClassifier) -> Self {
        Self {
            extractor,
            sentiment,
            team,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            FeatureExtractor::default(),
            SentimentClassifier::with_std_dev(config.sentiment.noise_std_dev)?,
            TeamClassifier::new(),
        ))
    }

    /// An engine without sentiment noise; identical inputs give identical results.
    pub fn deterministic() -> Self {
        Self::new(
            FeatureExtractor::default(),
            SentimentClassifier::deterministic(),
            TeamClassifier::new(),
        )
    }

    /// The raw feature vector, for diagnostics.
    pub fn features(&self, bytes: &[u8], profile: FeatureProfile) -> Result<VisualFeatures> {
        self.extractor.extract(bytes, profile)
    }

    /// HAPPY/SAD for a face image; ERROR only when the image decodes to nothing.
    pub fn classify_sentiment(&self, correlation_id: &str, filename: &str, bytes: &[u8]) -> ClassificationResult {
        let _span = tracing::info_span!("classify", id = correlation_id, category = "face").entered();

        match self.extractor.extract_sentiment(bytes) {
            Ok(features) => {
                tracing::debug!(?features, "sentiment features");
                self.sentiment.classify(correlation_id, filename, &features)
            }
            Err(err) => {
                tracing::warn!(error = %err, "sentiment extraction failed");
                ClassificationResult::error(correlation_id, &err)
            }
        }
    }

    /// A club code or UNKNOWN for a crest image; the filename is never consulted.
    pub fn classify_team(&self, correlation_id: &str, bytes: &[u8]) -> ClassificationResult {
        let _span = tracing::info_span!("classify", id = correlation_id, category = "team").entered();

        match self.extractor.extract_team(bytes) {
            Ok(features) => {
                tracing::debug!(?features, "team features");
                self.team.classify(correlation_id, &features)
            }
            Err(err) => {
                tracing::warn!(error = %err, "team extraction failed");
                ClassificationResult::error(correlation_id, &err)
            }
        }
    }

    /// Validates the payload, then routes it to the classifier for its category.
    pub fn process(&self, payload: &ImagePayload) -> ClassificationResult {
        if let Err(err) = payload.validate() {
            tracing::warn!(id = %payload.id, error = %err, "rejecting payload");
            return ClassificationResult::error(payload.id.clone(), &err);
        }

        match payload.category {
            Category::Face => self.classify_sentiment(&payload.id, &payload.filename, &payload.bytes),
            Category::Team => self.classify_team(&payload.id, &payload.bytes),
        }
    }
}

static DEFAULT_ENGINE: OnceLock<ClassificationEngine> = OnceLock::new();

/// The process-wide engine with default settings, built on first use.
pub fn default_engine() -> &'static ClassificationEngine {
    DEFAULT_ENGINE.get_or_init(ClassificationEngine::default)
}

/// Classifies a face image with the default engine under a fresh correlation id.
pub fn classify_sentiment(filename: &str, bytes: &[u8]) -> ClassificationResult {
    let id = uuid::Uuid::new_v4().to_string();
    default_engine().classify_sentiment(&id, filename, bytes)
}

/// Classifies a crest image with the default engine under a fresh correlation id.
pub fn classify_team(bytes: &[u8]) -> ClassificationResult {
    let id = uuid::Uuid::new_v4().to_string();
    default_engine().classify_team(&id, bytes)
}

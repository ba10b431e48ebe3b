// THEORY:
// The `sentiment` module is the happy/sad half of the Decision Layer. It combines the
// sentiment-profile features of a face image (weighted heavily) with emotion keywords
// found in the filename (weighted lightly) into a happiness probability.
//
// Key architectural principles:
// 1.  **Signed Votes**: Each of the four features casts a fixed positive vote when it
//     clears its threshold and a fixed negative vote when it does not. The sum is the
//     visual score; there is no interpolation between thresholds.
// 2.  **First Keyword Wins**: The keyword table is scanned in declaration order and only
//     the first substring match counts. Declaration order is the tie-breaker for
//     filenames that contain several emotion words.
// 3.  **Injected Uncertainty**: The base probability is deterministic. A `NoiseSource`
//     then perturbs it to simulate model uncertainty; production uses Gaussian noise,
//     tests plug in `NoNoise` or a seeded source and assert exact values.
// 4.  **Stateless Scoring**: Apart from the noise source's RNG, nothing is written
//     during a classification, so one classifier serves every worker.

use crate::core_modules::features::SentimentFeatures;
use crate::core_modules::verdict::{ClassificationResult, Label};
use crate::error::{Result, VisionError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::sync::Mutex;

/// Emotion words and the happiness probability each implies.
///
/// Order matters: the first entry contained in the filename is the one used.
pub const EMOTION_KEYWORDS: [(&str, f64); 18] = [
    ("feliz", 0.9),
    ("alegre", 0.85),
    ("sorrindo", 0.95),
    ("radiante", 0.9),
    ("contente", 0.8),
    ("happy", 0.9),
    ("smile", 0.85),
    ("joy", 0.88),
    ("triste", 0.1),
    ("chorando", 0.05),
    ("melancolia", 0.15),
    ("deprimido", 0.08),
    ("sad", 0.1),
    ("cry", 0.05),
    ("upset", 0.12),
    ("neutra", 0.5),
    ("neutral", 0.5),
    ("normal", 0.5),
];

pub const DEFAULT_NOISE_STD_DEV: f64 = 0.05;

const VISUAL_WEIGHT: f64 = 0.8;
const NAME_WEIGHT: f64 = 0.2;
const NAME_DAMPING: f64 = 0.3;

/// A zero-mean perturbation applied to the happiness probability.
pub trait NoiseSource: Send + Sync {
    fn sample(&self) -> f64;
}

/// Adds nothing; makes the classifier fully deterministic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn sample(&self) -> f64 {
        0.0
    }
}

/// Gaussian noise drawn from the calling thread's RNG.
#[derive(Debug, Clone, Copy)]
pub struct GaussianNoise {
    distribution: Normal<f64>,
}

impl GaussianNoise {
    pub fn new(std_dev: f64) -> Result<Self> {
        Ok(Self {
            distribution: normal(std_dev)?,
        })
    }
}

impl NoiseSource for GaussianNoise {
    fn sample(&self) -> f64 {
        self.distribution.sample(&mut rand::thread_rng())
    }
}

/// Gaussian noise from a seeded RNG, for reproducible runs.
#[derive(Debug)]
pub struct SeededGaussianNoise {
    distribution: Normal<f64>,
    rng: Mutex<StdRng>,
}

impl SeededGaussianNoise {
    pub fn new(std_dev: f64, seed: u64) -> Result<Self> {
        Ok(Self {
            distribution: normal(std_dev)?,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        })
    }
}

impl NoiseSource for SeededGaussianNoise {
    fn sample(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.distribution.sample(&mut *rng)
    }
}

fn normal(std_dev: f64) -> Result<Normal<f64>> {
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(VisionError::Noise { std_dev });
    }
    Normal::new(0.0, std_dev).map_err(|_| VisionError::Noise { std_dev })
}

/// Every intermediate value of the deterministic part of the decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentBreakdown {
    pub brightness: f64,
    pub saturation: f64,
    pub contrast: f64,
    pub warm_color: f64,
    pub visual_score: f64,
    pub matched_keyword: Option<&'static str>,
    pub name_score: f64,
    /// Happiness probability before noise, clamped to 0..1.
    pub base_probability: f64,
}

/// First keyword (in table order) contained in the lowercased filename.
pub fn keyword_probability(filename: &str) -> Option<(&'static str, f64)> {
    let filename = filename.to_lowercase();
    EMOTION_KEYWORDS
        .iter()
        .copied()
        .find(|(keyword, _)| filename.contains(keyword))
}

/// The deterministic score for `features` and `filename`.
pub fn score(filename: &str, features: &SentimentFeatures) -> SentimentBreakdown {
    let brightness = if features.mean_luminance > 0.6 { 0.3 } else { -0.2 };
    let saturation = if features.mean_saturation > 0.5 { 0.25 } else { -0.15 };
    let contrast = if features.contrast > 0.3 { 0.15 } else { -0.1 };
    let warm_color = if features.warm_color_ratio > 0.3 { 0.3 } else { -0.2 };
    let visual_score = brightness + saturation + contrast + warm_color;

    let matched = keyword_probability(filename);
    let name_score = matched.map_or(0.0, |(_, probability)| (probability - 0.5) * NAME_DAMPING);

    let base_probability =
        (0.5 + visual_score * VISUAL_WEIGHT + name_score * NAME_WEIGHT).clamp(0.0, 1.0);

    SentimentBreakdown {
        brightness,
        saturation,
        contrast,
        warm_color,
        visual_score,
        matched_keyword: matched.map(|(keyword, _)| keyword),
        name_score,
        base_probability,
    }
}

/// Turns sentiment-profile features and a filename into a HAPPY/SAD label.
pub struct SentimentClassifier {
    noise: Box<dyn NoiseSource>,
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        match GaussianNoise::new(DEFAULT_NOISE_STD_DEV) {
            Ok(noise) => Self::new(noise),
            Err(_) => Self::deterministic(),
        }
    }
}

impl SentimentClassifier {
    pub fn new(noise: impl NoiseSource + 'static) -> Self {
        Self {
            noise: Box::new(noise),
        }
    }

    /// A classifier that never perturbs the base probability.
    pub fn deterministic() -> Self {
        Self::new(NoNoise)
    }

    /// Gaussian noise with the given standard deviation; zero disables noise.
    pub fn with_std_dev(std_dev: f64) -> Result<Self> {
        if std_dev == 0.0 {
            return Ok(Self::deterministic());
        }
        Ok(Self::new(GaussianNoise::new(std_dev)?))
    }

    pub fn classify(
        &self,
        correlation_id: impl Into<String>,
        filename: &str,
        features: &SentimentFeatures,
    ) -> ClassificationResult {
        let breakdown = score(filename, features);
        let happy_probability = (breakdown.base_probability + self.noise.sample()).clamp(0.0, 1.0);

        let label = if happy_probability > 0.5 { Label::Happy } else { Label::Sad };
        let confidence = (happy_probability - 0.5).abs() * 2.0;

        tracing::debug!(
            filename,
            base = breakdown.base_probability,
            keyword = breakdown.matched_keyword,
            happy_probability,
            "sentiment scored"
        );

        ClassificationResult {
            correlation_id: correlation_id.into(),
            label,
            score: happy_probability,
            confidence,
            rationale: format!(
                "Visual analysis - brightness: {:.2}, saturation: {:.2}, contrast: {:.2}, warm colors: {:.2}%",
                features.mean_luminance,
                features.mean_saturation,
                features.contrast,
                features.warm_color_ratio * 100.0
            ),
        }
    }
}

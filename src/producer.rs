// THEORY:
// The `producer` module plays the publishing side of the system. It holds a library
// of encoded images for each stream and emits payloads at a steady rate, roughly three
// faces for every two crests, each with a fresh correlation id.
//
// Key principles:
// 1) Images are read once, when the source is built. Publishing never touches the disk.
// 2) A stream with no images on disk is filled with synthetic ones, so a simulation
//    always has something to send.
// 3) Randomness comes from the caller's RNG, which makes a seeded run reproducible.

use crate::error::{Result, VisionError};
use crate::parallel_pipeline::ParallelPipeline;
use crate::payload::{Category, ImagePayload, NamedImage};
use crate::pipeline::ClassificationResult;
use crate::synthetic;
use futures::future::join_all;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Probability that the next payload goes to the face stream.
pub const FACE_PROBABILITY: f64 = 0.6;
/// Extensions (lowercase) picked up from image directories.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const LOG_EVERY: usize = 10;

/// In-memory image library for both streams.
#[derive(Debug, Clone)]
pub struct PayloadSource {
    faces: Vec<NamedImage>,
    teams: Vec<NamedImage>,
}

impl PayloadSource {
    pub fn new(faces: Vec<NamedImage>, teams: Vec<NamedImage>) -> Result<Self> {
        if faces.is_empty() || teams.is_empty() {
            return Err(VisionError::InputMalformed {
                reason: format!(
                    "payload source needs images on both streams (faces={}, teams={})",
                    faces.len(),
                    teams.len()
                ),
            });
        }
        Ok(Self { faces, teams })
    }

    /// Only generated images.
    pub fn synthetic<R: Rng + ?Sized>(rng: &mut R) -> Result<Self> {
        Self::new(
            synthetic::face_set(synthetic::DEFAULT_SIZE, synthetic::DEFAULT_SIZE, rng)?,
            synthetic::crest_set(synthetic::DEFAULT_SIZE, synthetic::DEFAULT_SIZE)?,
        )
    }

    /// Loads both directories, generating images for whichever comes up empty.
    pub fn from_directories<R: Rng + ?Sized>(faces_dir: &Path, teams_dir: &Path, rng: &mut R) -> Result<Self> {
        let mut faces = load_images(faces_dir)?;
        if faces.is_empty() {
            tracing::warn!(dir = %faces_dir.display(), "no face images found, using synthetic faces");
            faces = synthetic::face_set(synthetic::DEFAULT_SIZE, synthetic::DEFAULT_SIZE, rng)?;
        } else {
            tracing::info!(dir = %faces_dir.display(), count = faces.len(), "loaded face images");
        }

        let mut teams = load_images(teams_dir)?;
        if teams.is_empty() {
            tracing::warn!(dir = %teams_dir.display(), "no team images found, using synthetic crests");
            teams = synthetic::crest_set(synthetic::DEFAULT_SIZE, synthetic::DEFAULT_SIZE)?;
        } else {
            tracing::info!(dir = %teams_dir.display(), count = teams.len(), "loaded team images");
        }

        Self::new(faces, teams)
    }

    pub fn images(&self, category: Category) -> &[NamedImage] {
        match category {
            Category::Face => &self.faces,
            Category::Team => &self.teams,
        }
    }

    /// A random payload from a randomly chosen stream.
    pub fn next_payload<R: Rng + ?Sized>(&self, rng: &mut R) -> ImagePayload {
        let category = if rng.gen_bool(FACE_PROBABILITY) {
            Category::Face
        } else {
            Category::Team
        };
        self.payload_for(category, rng)
    }

    /// A random image of `category`, wrapped in a fresh payload.
    pub fn payload_for<R: Rng + ?Sized>(&self, category: Category, rng: &mut R) -> ImagePayload {
        let images = self.images(category);
        let image = &images[rng.gen_range(0..images.len())];
        ImagePayload::with_fresh_id(category, image.filename.clone(), image.bytes.clone())
    }
}

/// Every file in `dir` with an image extension, sorted by name.
///
/// A missing directory yields an empty list.
pub fn load_images(dir: &Path) -> Result<Vec<NamedImage>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| VisionError::io(format!("listing {}", dir.display()), e))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| VisionError::io(format!("listing {}", dir.display()), e))?
            .path();
        if !path.is_file() || !has_image_extension(&path) {
            continue;
        }
        let bytes = std::fs::read(&path).map_err(|e| VisionError::io(format!("reading {}", path.display()), e))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        images.push(NamedImage { filename, bytes });
    }

    images.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Outcome counts of a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub published: usize,
    pub faces: usize,
    pub teams: usize,
    /// Results per label (`HAPPY`, club codes, `ERROR`, ...).
    pub labels: BTreeMap<String, usize>,
    /// Payloads whose result never came back from a pool.
    pub lost: usize,
}

impl SimulationSummary {
    fn record(&mut self, result: &ClassificationResult) {
        *self.labels.entry(result.label.to_string()).or_default() += 1;
    }
}

/// Interval between two publications, `None` when the rate is unthrottled.
fn publish_period(rate: f64) -> Result<Option<Duration>> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(VisionError::Config(format!("rate must be a finite, non-negative number (got {rate})")));
    }
    if rate == 0.0 {
        return Ok(None);
    }
    match Duration::try_from_secs_f64(1.0 / rate) {
        Ok(period) if !period.is_zero() => Ok(Some(period)),
        _ => Err(VisionError::Config(format!("rate {rate} has no representable publish interval"))),
    }
}

/// Publishes `count` payloads at `rate` per second (0 = as fast as possible) and
/// waits for every result.
pub async fn run_simulation<R: Rng + Send>(
    source: &PayloadSource,
    pipeline: Arc<ParallelPipeline>,
    count: usize,
    rate: f64,
    rng: &mut R,
) -> Result<SimulationSummary> {
    let mut ticker = match publish_period(rate)? {
        Some(period) => Some(tokio::time::interval(period)),
        None => None,
    };

    let mut summary = SimulationSummary::default();
    let mut in_flight = Vec::with_capacity(count);

    for _ in 0..count {
        if let Some(ticker) = ticker.as_mut() {
            ticker.tick().await;
        }

        let payload = source.next_payload(rng);
        summary.published += 1;
        match payload.category {
            Category::Face => summary.faces += 1,
            Category::Team => summary.teams += 1,
        }
        if summary.published % LOG_EVERY == 0 {
            tracing::info!(
                published = summary.published,
                category = %payload.category,
                filename = %payload.filename,
                size_kb = payload.size_kb(),
                "payloads published"
            );
        }

        let pipeline = Arc::clone(&pipeline);
        in_flight.push(tokio::spawn(async move { pipeline.submit(payload).await }));
    }

    for outcome in join_all(in_flight).await {
        match outcome {
            Ok(Ok(result)) => summary.record(&result),
            Ok(Err(err)) => {
                tracing::error!(error = %err, "payload lost");
                summary.lost += 1;
            }
            Err(join_error) => {
                tracing::error!(error = %join_error, "submit task failed");
                summary.lost += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(has_image_extension(Path::new("a/FACE.JPG")));
        assert!(has_image_extension(Path::new("logo.jpeg")));
        assert!(has_image_extension(Path::new("logo.Png")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("README")));
    }

    #[test]
    fn missing_directory_is_empty() {
        assert!(load_images(Path::new("/definitely/not/here")).unwrap().is_empty());
    }

    #[test]
    fn source_needs_both_streams() {
        let image = NamedImage {
            filename: "a.png".into(),
            bytes: vec![1],
        };
        assert!(PayloadSource::new(vec![image.clone()], Vec::new()).is_err());
        assert!(PayloadSource::new(vec![image.clone()], vec![image]).is_ok());
    }

    #[test]
    fn mix_favours_faces() {
        let mut rng = StdRng::seed_from_u64(11);
        let source = PayloadSource::synthetic(&mut rng).unwrap();

        let faces = (0..2000)
            .filter(|_| source.next_payload(&mut rng).category == Category::Face)
            .count();
        let share = faces as f64 / 2000.0;
        assert!((0.55..0.65).contains(&share), "face share {share}");
    }

    #[test]
    fn payloads_carry_source_images() {
        let mut rng = StdRng::seed_from_u64(5);
        let source = PayloadSource::synthetic(&mut rng).unwrap();
        let payload = source.payload_for(Category::Team, &mut rng);

        assert_eq!(payload.category, Category::Team);
        assert!(payload.filename.starts_with("logo_"));
        assert!(!payload.bytes.is_empty());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn publish_period_follows_the_rate() {
        assert_eq!(publish_period(0.0).unwrap(), None);
        assert_eq!(publish_period(4.0).unwrap(), Some(Duration::from_millis(250)));
        assert_eq!(publish_period(0.5).unwrap(), Some(Duration::from_secs(2)));
        assert!(publish_period(1e8).unwrap().is_some_and(|period| !period.is_zero()));
    }

    #[test]
    fn unrepresentable_periods_are_config_errors() {
        for rate in [1e12, 1e-300, f64::INFINITY, f64::NAN, -2.0] {
            assert!(matches!(publish_period(rate), Err(VisionError::Config(_))), "rate {rate}");
        }
    }
}

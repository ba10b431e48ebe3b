// THEORY:
// The `features` module is the Feature Extraction Layer. It turns one encoded image
// into one immutable vector of aggregate statistics, which is all the classifiers ever
// see. Nothing here remembers anything between images.
//
// Key architectural principles:
// 1.  **Profiles, One Scan**: Both profiles walk the same decoded raster in row-major
//     order exactly once. They differ only in what each pixel is asked:
//     - `Sentiment`: luminance (summed and bucketed), saturation, the warm test.
//     - `Team`: the five-way channel class and the left-neighbour difference.
// 2.  **One Denominator**: Every ratio and mean is divided by `width * height`, even
//     local complexity, whose first row and first column never contribute a
//     difference.
// 3.  **Degrade, Don't Fail**: A buffer the decoder cannot read yields the profile's
//     fixed neutral vector. Only a raster that decodes to zero pixels is reported as
//     an error, because there is nothing to divide by.

use crate::core_modules::histogram::LuminanceHistogram;
use crate::core_modules::pixel::pixel::ChannelClass;
use crate::core_modules::raster::raster::{ImageCrateDecoder, Raster, RasterDecoder};
use crate::core_modules::smart_pixel::smart_pixel::SmartPixel;
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects which statistics the extractor accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureProfile {
    Sentiment,
    Team,
}

impl fmt::Display for FeatureProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureProfile::Sentiment => f.write_str("sentiment"),
            FeatureProfile::Team => f.write_str("team"),
        }
    }
}

/// Statistics behind the happy/sad decision. Every field lies in 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentFeatures {
    /// Average BT.601 luminance.
    pub mean_luminance: f64,
    /// Average HSV saturation.
    pub mean_saturation: f64,
    /// Standard deviation of the luminance histogram, divided by 255.
    pub contrast: f64,
    /// Fraction of reddish or yellowish pixels.
    pub warm_color_ratio: f64,
}

impl SentimentFeatures {
    /// Returned when the image cannot be decoded.
    pub const NEUTRAL: SentimentFeatures = SentimentFeatures {
        mean_luminance: 0.5,
        mean_saturation: 0.5,
        contrast: 0.5,
        warm_color_ratio: 0.5,
    };
}

/// Statistics behind the club decision. Every field lies in 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamFeatures {
    pub red_ratio: f64,
    pub green_ratio: f64,
    pub blue_ratio: f64,
    pub black_ratio: f64,
    pub white_ratio: f64,
    /// Mean normalized RGB difference between each pixel and its left neighbour.
    pub local_complexity: f64,
}

impl TeamFeatures {
    /// Returned when the image cannot be decoded.
    pub const NEUTRAL: TeamFeatures = TeamFeatures {
        red_ratio: 0.33,
        green_ratio: 0.33,
        blue_ratio: 0.33,
        black_ratio: 0.5,
        white_ratio: 0.5,
        local_complexity: 0.5,
    };

    /// Share of the image that is either black or white.
    pub fn monochrome_ratio(&self) -> f64 {
        self.black_ratio + self.white_ratio
    }
}

/// The output of one extraction, tagged with the profile that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "profile", rename_all = "lowercase")]
pub enum VisualFeatures {
    Sentiment(SentimentFeatures),
    Team(TeamFeatures),
}

impl VisualFeatures {
    pub fn profile(&self) -> FeatureProfile {
        match self {
            VisualFeatures::Sentiment(_) => FeatureProfile::Sentiment,
            VisualFeatures::Team(_) => FeatureProfile::Team,
        }
    }

    pub fn neutral(profile: FeatureProfile) -> Self {
        match profile {
            FeatureProfile::Sentiment => VisualFeatures::Sentiment(SentimentFeatures::NEUTRAL),
            FeatureProfile::Team => VisualFeatures::Team(TeamFeatures::NEUTRAL),
        }
    }
}

/// Computes the sentiment statistics of a decoded raster in a single pass.
pub fn sentiment_features(raster: &Raster) -> Result<SentimentFeatures> {
    let total_pixels = checked_total(raster)?;

    let mut luminance_sum = 0.0;
    let mut saturation_sum = 0.0;
    let mut warm_pixels = 0u64;
    let mut histogram = LuminanceHistogram::new();

    for pixel in &raster.pixels {
        luminance_sum += pixel.luminance();
        histogram.record(pixel);
        saturation_sum += pixel.saturation();
        if pixel.is_warm() {
            warm_pixels += 1;
        }
    }

    Ok(SentimentFeatures {
        mean_luminance: luminance_sum / total_pixels,
        mean_saturation: saturation_sum / total_pixels,
        contrast: histogram.contrast(),
        warm_color_ratio: warm_pixels as f64 / total_pixels,
    })
}

/// Computes the team statistics of a decoded raster in a single pass.
pub fn team_features(raster: &Raster) -> Result<TeamFeatures> {
    let total_pixels = checked_total(raster)?;

    let mut counts = ChannelCounts::default();
    let mut complexity_sum = 0.0;

    for (y, row) in raster.rows().enumerate() {
        let mut left: Option<SmartPixel> = None;
        for pixel in row {
            if let Some(class) = pixel.channel_class() {
                counts.record(class);
            }

            let current = SmartPixel::new(*pixel);
            // First row and first column add nothing but still count in the denominator.
            if y > 0 {
                if let Some(previous) = &left {
                    complexity_sum += current.delta_rgb(previous);
                }
            }
            left = Some(current);
        }
    }

    Ok(TeamFeatures {
        red_ratio: counts.red as f64 / total_pixels,
        green_ratio: counts.green as f64 / total_pixels,
        blue_ratio: counts.blue as f64 / total_pixels,
        black_ratio: counts.black as f64 / total_pixels,
        white_ratio: counts.white as f64 / total_pixels,
        local_complexity: complexity_sum / total_pixels,
    })
}

fn checked_total(raster: &Raster) -> Result<f64> {
    if raster.is_empty() {
        return Err(VisionError::EmptyRaster {
            width: raster.width,
            height: raster.height,
        });
    }
    Ok(raster.total_pixels() as f64)
}

#[derive(Debug, Default)]
struct ChannelCounts {
    red: u64,
    green: u64,
    blue: u64,
    black: u64,
    white: u64,
}

impl ChannelCounts {
    fn record(&mut self, class: ChannelClass) {
        match class {
            ChannelClass::Red => self.red += 1,
            ChannelClass::Green => self.green += 1,
            ChannelClass::Blue => self.blue += 1,
            ChannelClass::Black => self.black += 1,
            ChannelClass::White => self.white += 1,
        }
    }
}

/// Decodes image bytes and reduces them to a feature vector.
pub struct FeatureExtractor {
    decoder: Box<dyn RasterDecoder>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(ImageCrateDecoder)
    }
}

impl FeatureExtractor {
    pub fn new(decoder: impl RasterDecoder + 'static) -> Self {
        Self {
            decoder: Box::new(decoder),
        }
    }

    /// Extracts the statistics selected by `profile`.
    ///
    /// Undecodable buffers produce the neutral vector for the profile. The only
    /// error is `VisionError::EmptyRaster`, when decoding succeeds but yields no pixels.
    pub fn extract(&self, bytes: &[u8], profile: FeatureProfile) -> Result<VisualFeatures> {
        match profile {
            FeatureProfile::Sentiment => self.extract_sentiment(bytes).map(VisualFeatures::Sentiment),
            FeatureProfile::Team => self.extract_team(bytes).map(VisualFeatures::Team),
        }
    }

    pub fn extract_sentiment(&self, bytes: &[u8]) -> Result<SentimentFeatures> {
        match self.decode(bytes, FeatureProfile::Sentiment)? {
            Some(raster) => sentiment_features(&raster),
            None => Ok(SentimentFeatures::NEUTRAL),
        }
    }

    pub fn extract_team(&self, bytes: &[u8]) -> Result<TeamFeatures> {
        match self.decode(bytes, FeatureProfile::Team)? {
            Some(raster) => team_features(&raster),
            None => Ok(TeamFeatures::NEUTRAL),
        }
    }

    /// `None` means the caller should fall back to neutral features.
    fn decode(&self, bytes: &[u8], profile: FeatureProfile) -> Result<Option<Raster>> {
        match self.decoder.decode(bytes) {
            Ok(raster) => {
                tracing::debug!(%profile, width = raster.width, height = raster.height, "decoded raster");
                Ok(Some(raster))
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(%profile, error = %err, "decode failed, using neutral features");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

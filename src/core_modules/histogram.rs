// THEORY:
// The `histogram` module turns the luminance of every pixel into a single contrast
// figure. Instead of keeping a per-pixel history and computing its spread, the scan
// drops each pixel into one of 256 buckets and the spread is computed over the buckets
// afterwards, weighted by how many pixels each holds.
//
// Key architectural principles:
// 1.  **Constant Memory**: 256 counters regardless of image size; the extractor makes
//     a single pass and never stores pixels for later.
// 2.  **Two-Pass Statistics**: Mean first, then the variance around that mean, both
//     over bucket indices. This matches how contrast was historically measured, and it
//     quantizes luminance to whole buckets on purpose.
// 3.  **Normalized Output**: The standard deviation is divided by 255 so contrast is
//     comparable with the other 0..1 features.

use crate::core_modules::pixel::pixel::Pixel;

pub const LUMINANCE_BUCKETS: usize = 256;
const BUCKET_SCALE: f64 = 255.0;

/// Pixel counts per `floor(luminance · 255)` bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuminanceHistogram {
    buckets: [u64; LUMINANCE_BUCKETS],
    total: u64,
}

impl Default for LuminanceHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl LuminanceHistogram {
    pub fn new() -> Self {
        Self {
            buckets: [0; LUMINANCE_BUCKETS],
            total: 0,
        }
    }

    pub fn record(&mut self, pixel: &Pixel) {
        self.buckets[pixel.luminance_bucket()] += 1;
        self.total += 1;
    }

    /// Number of pixels recorded so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, bucket: usize) -> u64 {
        self.buckets[bucket]
    }

    /// Weighted mean and standard deviation of the bucket index.
    pub fn mean_and_std_dev(&self) -> (f64, f64) {
        if self.total == 0 {
            return (0.0, 0.0);
        }
        let count = self.total as f64;

        let mean = self
            .buckets
            .iter()
            .enumerate()
            .map(|(index, &hits)| index as f64 * hits as f64)
            .sum::<f64>()
            / count;

        let variance = self
            .buckets
            .iter()
            .enumerate()
            .map(|(index, &hits)| (index as f64 - mean).powi(2) * hits as f64)
            .sum::<f64>()
            / count;

        (mean, variance.sqrt())
    }

    /// Standard deviation of the histogram normalized to 0..1.
    pub fn contrast(&self) -> f64 {
        let (_, std_dev) = self.mean_and_std_dev();
        std_dev / BUCKET_SCALE
    }
}

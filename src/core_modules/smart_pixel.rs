// THEORY:
// The `SmartPixel` module provides the pairwise analytical capabilities of the engine.
// It follows the "separation of concerns" principle by acting as a "smart" wrapper
// around a "dumb" `Pixel` data object. Its entire purpose is to compare two pixels
// and quantify the difference between them.
//
// Key architectural principles:
// 1.  **Comparative Analysis**: Every method takes another pixel as input. A
//     `SmartPixel` is meaningless on its own; its value is in the relationship.
// 2.  **Normalized Output**: `delta_rgb` is scaled to 0..1 by dividing the summed
//     absolute channel differences by 3·255, so it can be averaged straight into
//     the team profile's `local_complexity` feature.
// 3.  **Row-local**: The scan only ever compares a pixel with its left neighbour in
//     the same row, so a `SmartPixel` never needs to know where it sits in the image.

pub mod smart_pixel {
    use crate::core_modules::pixel::pixel::Pixel;

    pub type RgbDelta = f64;

    const MAX_RGB_DISTANCE: f64 = 3.0 * 255.0;

    /// An analytical tool that wraps a `Pixel` to provide comparison methods.
    #[derive(Debug, Clone, Copy)]
    pub struct SmartPixel {
        /// The raw `Pixel` data this `SmartPixel` is analyzing.
        pub pixel: Pixel,
    }

    impl SmartPixel {
        pub fn new(pixel: Pixel) -> Self {
            Self { pixel }
        }

        /// Sum of per-channel absolute differences, normalized to 0..1.
        pub fn delta_rgb(&self, other: &SmartPixel) -> RgbDelta {
            let diff = self.pixel.red.abs_diff(other.pixel.red) as u32
                + self.pixel.green.abs_diff(other.pixel.green) as u32
                + self.pixel.blue.abs_diff(other.pixel.blue) as u32;

            diff as f64 / MAX_RGB_DISTANCE
        }
    }
}

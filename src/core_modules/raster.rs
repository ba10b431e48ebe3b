// THEORY:
// The `Raster` module is the bridge between encoded image bytes and the per-pixel
// heuristics. It owns two things: the decoded image itself, and the seam to whatever
// library turns bytes into pixels.
//
// Key architectural principles:
// 1.  **Data Container**: Like `Pixel`, a `Raster` is a "dumb" data container. It holds
//     a row-major `Vec<Pixel>` plus its dimensions and knows how to hand out rows. It
//     does not know how to compute features from itself.
// 2.  **Decoding is a Collaborator**: The engine never talks to a codec directly. It
//     asks a `RasterDecoder`, so the `image` crate can be swapped for a stub in tests
//     (e.g. one that yields a zero-sized raster) without touching the extractor.
// 3.  **Opaque Failures**: A decoder reports failure as a `VisionError::Decode`. What
//     to do about it (fall back to neutral features) is the extractor's decision.

pub mod raster {
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::{Result, VisionError};

    const RGB_CHANNELS: usize = 3;

    /// A decoded width × height RGB image stored row-major.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Raster {
        /// The width of the image in pixels.
        pub width: u32,
        /// The height of the image in pixels.
        pub height: u32,
        /// A flattened, row-major vector of every `Pixel` in the image.
        pub pixels: Vec<Pixel>,
    }

    impl Raster {
        pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Self {
            debug_assert_eq!(pixels.len(), width as usize * height as usize);
            Self {
                width,
                height,
                pixels,
            }
        }

        /// A raster where every pixel has the same colour.
        pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
            Self::new(width, height, vec![pixel; width as usize * height as usize])
        }

        /// `width * height`, the denominator of every ratio feature.
        pub fn total_pixels(&self) -> usize {
            self.width as usize * self.height as usize
        }

        pub fn is_empty(&self) -> bool {
            self.total_pixels() == 0
        }

        pub fn pixel_at(&self, x: u32, y: u32) -> Pixel {
            self.pixels[(y as usize * self.width as usize) + x as usize]
        }

        pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
            let index = (y as usize * self.width as usize) + x as usize;
            self.pixels[index] = pixel;
        }

        /// Rows in scan order (top to bottom).
        pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
            // A zero-width raster has no pixels, so the `max(1)` only guards `chunks`.
            self.pixels.chunks(self.width.max(1) as usize)
        }

        /// Packed RGB8 bytes, the layout encoders expect.
        pub fn to_rgb_bytes(&self) -> Vec<u8> {
            let mut bytes = Vec::with_capacity(self.pixels.len() * RGB_CHANNELS);
            for pixel in &self.pixels {
                bytes.extend_from_slice(&<[u8; RGB_CHANNELS]>::from(*pixel));
            }
            bytes
        }
    }

    /// The image-decode collaborator: encoded bytes in, RGB raster out.
    pub trait RasterDecoder: Send + Sync {
        fn decode(&self, bytes: &[u8]) -> Result<Raster>;
    }

    /// Decodes any format the `image` crate was built with (JPEG and PNG by default).
    #[derive(Debug, Default, Clone, Copy)]
    pub struct ImageCrateDecoder;

    impl RasterDecoder for ImageCrateDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<Raster> {
            let decoded = image::load_from_memory(bytes)
                .map_err(|e| VisionError::decode("unreadable or unsupported image buffer", e))?;
            let rgb = decoded.to_rgb8();
            let (width, height) = rgb.dimensions();

            let pixels = rgb
                .as_raw()
                .chunks_exact(RGB_CHANNELS)
                .map(Pixel::from)
                .collect();

            Ok(Raster::new(width, height, pixels))
        }
    }
}

// THEORY (1D Pixel Heuristics):
// The `Pixel` module is the most fundamental unit of the classification engine. It is a
// "dumb" data container for a single decoded RGB sample plus the 1-dimensional
// heuristics both feature profiles need: metrics computed from this pixel alone, with
// no knowledge of its neighbours. Anything that needs another pixel (the left-neighbour
// difference behind local complexity) belongs in `SmartPixel`.
//
// Heuristic families (all single-pixel):
// - Brightness:      luminance (Rec. 601 / BT.601), normalized to 0..1
// - Color strength:  HSV saturation = (max − min) / max
// - Temperature:     the "warm" test (reddish or yellowish) used by the sentiment profile
// - Channel class:   the bucket (red, green, blue, black, white) used by the team profile
//
// Key principles:
// 1) Single-pixel scope: heuristics never read neighbours or image-level state.
// 2) Fixed thresholds: every cut-off below is a constant, so two decodes of the same
//    raster always produce the same classification.
// 3) Raw channels stay u8; all derived math is done in f64 so the aggregates
//    accumulated over millions of pixels do not drift.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Luminance = f64;
    pub type Saturation = f64;

    const CHANNELS: usize = 3;
    const CHANNEL_MAX: f64 = 255.0;

    // BT.601 luma weights.
    const LUMA_RED: f64 = 0.299;
    const LUMA_GREEN: f64 = 0.587;
    const LUMA_BLUE: f64 = 0.114;

    /// The five disjoint colour buckets the team profile counts.
    ///
    /// A pixel lands in at most one bucket; rules are tested in declaration order and
    /// the first match wins, because the thresholds overlap near saturated reds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ChannelClass {
        /// R > G + 50, R > B + 50, R > 100.
        Red,
        /// G > R + 30, G > B + 30, G > 80.
        Green,
        /// B > R + 30, B > G + 30, B > 100.
        Blue,
        /// Every channel below 50.
        Black,
        /// Every channel above 200.
        White,
    }

    /// A "dumb" data container representing a single decoded RGB pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        /// =================================Heuristics==================================

        /// Perceived brightness (BT.601 luma) normalized to 0..1.
        ///
        /// - 0.299·R + 0.587·G + 0.114·B, divided by 255.
        /// - Drives both the mean-luminance feature and the contrast histogram.
        pub fn luminance(&self) -> Luminance {
            (LUMA_RED * self.red as f64 + LUMA_GREEN * self.green as f64 + LUMA_BLUE * self.blue as f64)
                / CHANNEL_MAX
        }

        /// Histogram bucket for this pixel's luminance, `floor(luminance · 255)` in 0..=255.
        pub fn luminance_bucket(&self) -> usize {
            // `as` saturates, so the float never indexes past the last bucket.
            ((self.luminance() * CHANNEL_MAX) as usize).min(255)
        }

        /// HSV saturation: (max − min) / max on normalized channels, 0 for pure black.
        pub fn saturation(&self) -> Saturation {
            let maximum_channel = self.max_channel() as f64 / CHANNEL_MAX;
            let minimum_channel = self.min_channel() as f64 / CHANNEL_MAX;
            if maximum_channel == 0.0 {
                return 0.0;
            }
            (maximum_channel - minimum_channel) / maximum_channel
        }

        /// Warm-colour test used by the sentiment profile.
        ///
        /// - Reddish: R dominates both other channels and R > 100.
        /// - Yellowish: R and G above 150 with B below 100.
        pub fn is_warm(&self) -> bool {
            let (red, green, blue) = (self.red, self.green, self.blue);
            if red > green && red > blue && red > 100 {
                return true;
            }
            red > 150 && green > 150 && blue < 100
        }

        /// Colour bucket used by the team profile, `None` when no rule matches.
        pub fn channel_class(&self) -> Option<ChannelClass> {
            // Widen before adding offsets so 255 + 50 does not wrap.
            let (red, green, blue) = (self.red as i16, self.green as i16, self.blue as i16);

            if red > green + 50 && red > blue + 50 && red > 100 {
                Some(ChannelClass::Red)
            } else if green > red + 30 && green > blue + 30 && green > 80 {
                Some(ChannelClass::Green)
            } else if blue > red + 30 && blue > green + 30 && blue > 100 {
                Some(ChannelClass::Blue)
            } else if red < 50 && green < 50 && blue < 50 {
                Some(ChannelClass::Black)
            } else if red > 200 && green > 200 && blue > 200 {
                Some(ChannelClass::White)
            } else {
                None
            }
        }

        pub fn max_channel(&self) -> Channel {
            self.red.max(self.green.max(self.blue))
        }

        pub fn min_channel(&self) -> Channel {
            self.red.min(self.green.min(self.blue))
        }
    }

    impl From<&[Byte]> for Pixel {
        fn from(bytes: &[Byte]) -> Self {
            if bytes.len() != CHANNELS {
                panic!("Cannot convert {} bytes into pixel.", bytes.len());
            }
            Pixel::new(bytes[0], bytes[1], bytes[2])
        }
    }

    impl From<[Byte; CHANNELS]> for Pixel {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2])
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn luminance_uses_bt601_weights() {
        assert_eq!(Pixel::new(0, 0, 0).luminance(), 0.0);
        assert!((Pixel::new(255, 255, 255).luminance() - 1.0).abs() < 1e-12);
        assert!((Pixel::new(255, 0, 0).luminance() - 0.299).abs() < 1e-12);
        assert!((Pixel::new(0, 255, 0).luminance() - 0.587).abs() < 1e-12);
    }

    #[test]
    fn luminance_bucket_stays_in_range() {
        assert_eq!(Pixel::new(0, 0, 0).luminance_bucket(), 0);
        assert!(Pixel::new(255, 255, 255).luminance_bucket() >= 254);
        assert!(Pixel::new(255, 255, 255).luminance_bucket() <= 255);
    }

    #[test]
    fn saturation_is_zero_for_black_and_gray() {
        assert_eq!(Pixel::new(0, 0, 0).saturation(), 0.0);
        assert_eq!(Pixel::new(128, 128, 128).saturation(), 0.0);
        assert!((Pixel::new(255, 0, 0).saturation() - 1.0).abs() < 1e-12);
        assert!((Pixel::new(200, 100, 100).saturation() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn warm_pixels_are_reddish_or_yellowish() {
        assert!(Pixel::new(200, 50, 50).is_warm());
        assert!(Pixel::new(200, 200, 50).is_warm());
        assert!(!Pixel::new(90, 20, 20).is_warm());
        assert!(!Pixel::new(50, 50, 200).is_warm());
        assert!(!Pixel::new(160, 160, 160).is_warm());
    }

    #[test]
    fn channel_class_follows_rule_order() {
        assert_eq!(Pixel::new(255, 0, 0).channel_class(), Some(ChannelClass::Red));
        assert_eq!(Pixel::new(0, 128, 0).channel_class(), Some(ChannelClass::Green));
        assert_eq!(Pixel::new(0, 0, 255).channel_class(), Some(ChannelClass::Blue));
        assert_eq!(Pixel::new(10, 10, 10).channel_class(), Some(ChannelClass::Black));
        assert_eq!(Pixel::new(230, 230, 230).channel_class(), Some(ChannelClass::White));
        assert_eq!(Pixel::new(128, 128, 128).channel_class(), None);
        // Satisfies both the red and the white rule; red is tested first.
        assert_eq!(Pixel::new(255, 201, 201).channel_class(), Some(ChannelClass::Red));
    }

    #[test]
    fn channel_class_does_not_overflow_on_bright_channels() {
        assert_eq!(Pixel::new(255, 255, 0).channel_class(), None);
    }
}

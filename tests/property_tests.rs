//! Range and determinism properties of feature extraction and classification.

use proptest::prelude::*;
use verdict_vision::core_modules::features::{
    FeatureExtractor, SentimentFeatures, TeamFeatures, sentiment_features, team_features,
};
use verdict_vision::core_modules::pixel::pixel::Pixel;
use verdict_vision::core_modules::raster::raster::Raster;
use verdict_vision::core_modules::sentiment::{self, SentimentClassifier};
use verdict_vision::core_modules::team::{ACCEPTANCE_THRESHOLD, TeamClassifier};
use verdict_vision::synthetic;
use verdict_vision::{ClassificationResult, Label};

fn raster_strategy() -> impl Strategy<Value = Raster> {
    (1u32..12, 1u32..12).prop_flat_map(|(width, height)| {
        prop::collection::vec(any::<[u8; 3]>(), (width * height) as usize).prop_map(move |pixels| {
            Raster::new(width, height, pixels.into_iter().map(Pixel::from).collect())
        })
    })
}

fn unit() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

fn team_strategy() -> impl Strategy<Value = TeamFeatures> {
    (unit(), unit(), unit(), unit(), unit(), unit()).prop_map(|(r, g, b, k, w, c)| TeamFeatures {
        red_ratio: r,
        green_ratio: g,
        blue_ratio: b,
        black_ratio: k,
        white_ratio: w,
        local_complexity: c,
    })
}

fn in_unit(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    #[test]
    fn feature_values_stay_in_unit_range(raster in raster_strategy()) {
        let s = sentiment_features(&raster).unwrap();
        prop_assert!(in_unit(s.mean_luminance));
        prop_assert!(in_unit(s.mean_saturation));
        prop_assert!(in_unit(s.contrast));
        prop_assert!(in_unit(s.warm_color_ratio));

        let t = team_features(&raster).unwrap();
        for value in [t.red_ratio, t.green_ratio, t.blue_ratio, t.black_ratio, t.white_ratio, t.local_complexity] {
            prop_assert!(in_unit(value));
        }
        // Buckets are disjoint, so together they never exceed the whole image.
        let classified = t.red_ratio + t.green_ratio + t.blue_ratio + t.black_ratio + t.white_ratio;
        prop_assert!(classified <= 1.0 + 1e-9);
    }

    #[test]
    fn encoded_extraction_matches_direct_scan(raster in raster_strategy()) {
        let bytes = synthetic::encode_png(&raster).unwrap();
        let extractor = FeatureExtractor::default();

        prop_assert_eq!(extractor.extract_team(&bytes).unwrap(), team_features(&raster).unwrap());
        prop_assert_eq!(extractor.extract_team(&bytes).unwrap(), extractor.extract_team(&bytes).unwrap());
        prop_assert_eq!(extractor.extract_sentiment(&bytes).unwrap(), sentiment_features(&raster).unwrap());
    }

    #[test]
    fn team_classification_is_deterministic_and_consistent(features in team_strategy()) {
        let classifier = TeamClassifier::new();
        let first = classifier.classify("p", &features);
        let second = classifier.classify("p", &features);
        prop_assert_eq!(&first, &second);

        match first.label {
            Label::Club(_) => {
                prop_assert!(first.score > ACCEPTANCE_THRESHOLD);
                prop_assert!((first.confidence - first.score * 0.8).abs() < 1e-9);
            }
            Label::Unknown => {
                prop_assert!(first.score <= ACCEPTANCE_THRESHOLD);
                prop_assert_eq!(first.confidence, 0.0);
            }
            other => prop_assert!(false, "unexpected label {}", other),
        }
    }

    #[test]
    fn noiseless_sentiment_follows_the_base_probability(
        luminance in unit(),
        saturation in unit(),
        contrast in unit(),
        warm in unit(),
        name in "[a-z_]{0,16}\\.(jpg|png)",
    ) {
        let features = SentimentFeatures {
            mean_luminance: luminance,
            mean_saturation: saturation,
            contrast,
            warm_color_ratio: warm,
        };
        let base = sentiment::score(&name, &features).base_probability;
        let result: ClassificationResult = SentimentClassifier::deterministic().classify("p", &name, &features);

        prop_assert!(in_unit(base));
        prop_assert_eq!(result.score, base);
        prop_assert!(in_unit(result.confidence));
        prop_assert_eq!(result.label == Label::Happy, base > 0.5);
    }
}

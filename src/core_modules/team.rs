// THEORY:
// The `team` module is the club-identity half of the Decision Layer. It receives the
// team-profile feature vector of a crest image and names the club it most resembles,
// or admits it does not know.
//
// Key architectural principles:
// 1.  **Visual Only**: The filename is never consulted. A crest saved as
//     `logo_flamengo.png` that is mostly blue is classified as blue.
// 2.  **Ordered Decision Tree**: Candidate selection is a fixed sequence of rules and the
//     first rule that fires wins. The order is part of the contract: a red-and-black
//     crest that is also very green is still Flamengo, because the red rule runs first.
// 3.  **Confirm, Then Commit**: A candidate is only accepted if its own scoring formula
//     clears `ACCEPTANCE_THRESHOLD`. Otherwise the result is `UNKNOWN`, carrying the
//     sub-threshold score so the near-miss stays visible.
// 4.  **Deterministic**: No randomness and no state; identical features always give an
//     identical result, so the classifier is freely shareable across workers.

use crate::core_modules::features::TeamFeatures;
use crate::core_modules::verdict::{ClassificationResult, Label};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum club score required to accept a candidate.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.3;
/// Confidence is the accepted score scaled by this factor.
pub const CONFIDENCE_SCALE: f64 = 0.8;

/// The clubs the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Club {
    Flamengo,
    Corinthians,
    Palmeiras,
    Santos,
    #[serde(rename = "saopaulo")]
    SaoPaulo,
    Vasco,
    Botafogo,
    Fluminense,
    Gremio,
    Internacional,
}

impl Club {
    pub const ALL: [Club; 10] = [
        Club::Flamengo,
        Club::Corinthians,
        Club::Palmeiras,
        Club::Santos,
        Club::SaoPaulo,
        Club::Vasco,
        Club::Botafogo,
        Club::Fluminense,
        Club::Gremio,
        Club::Internacional,
    ];

    /// Short identifier used as the result label.
    pub fn code(&self) -> &'static str {
        match self {
            Club::Flamengo => "flamengo",
            Club::Corinthians => "corinthians",
            Club::Palmeiras => "palmeiras",
            Club::Santos => "santos",
            Club::SaoPaulo => "saopaulo",
            Club::Vasco => "vasco",
            Club::Botafogo => "botafogo",
            Club::Fluminense => "fluminense",
            Club::Gremio => "gremio",
            Club::Internacional => "internacional",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Club::Flamengo => "Flamengo - RJ",
            Club::Corinthians => "Corinthians - SP",
            Club::Palmeiras => "Palmeiras - SP",
            Club::Santos => "Santos - SP",
            Club::SaoPaulo => "São Paulo - SP",
            Club::Vasco => "Vasco da Gama - RJ",
            Club::Botafogo => "Botafogo - RJ",
            Club::Fluminense => "Fluminense - RJ",
            Club::Gremio => "Grêmio - RS",
            Club::Internacional => "Internacional - RS",
        }
    }

    /// How well `features` match this club's colours.
    ///
    /// Each club has its own weighting; clubs the decision tree can never select
    /// (Vasco, Botafogo, Fluminense) score 0.
    pub fn score(&self, features: &TeamFeatures) -> f64 {
        let f = features;
        match self {
            Club::Flamengo => f.red_ratio * 0.7 + f.black_ratio * 0.3,
            Club::Palmeiras => f.green_ratio * 0.9 + (1.0 - f.red_ratio - f.blue_ratio) * 0.1,
            Club::Corinthians => f.monochrome_ratio() * 0.5 + f.local_complexity * 0.4,
            Club::Santos => f.monochrome_ratio() * 0.6 + (1.0 - f.local_complexity) * 0.2,
            Club::Gremio => f.blue_ratio * 0.8 + f.white_ratio * 0.2,
            Club::Internacional => f.red_ratio * 0.8 + f.white_ratio * 0.2,
            Club::SaoPaulo => (f.red_ratio + f.black_ratio + f.white_ratio) * 0.4,
            Club::Vasco | Club::Botafogo | Club::Fluminense => 0.0,
        }
    }
}

impl fmt::Display for Club {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Club {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Club::ALL
            .into_iter()
            .find(|club| club.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown club code: {s}"))
    }
}

/// Runs the ordered colour rules and returns the first club that fires.
pub fn select_candidate(features: &TeamFeatures) -> Option<Club> {
    if features.red_ratio > 0.5 {
        if features.black_ratio > 0.25 {
            return Some(Club::Flamengo);
        }
        // Red with white, and plain red, both read as Internacional.
        return Some(Club::Internacional);
    }

    if features.green_ratio > 0.4 {
        return Some(Club::Palmeiras);
    }

    if features.blue_ratio > 0.45 {
        return Some(Club::Gremio);
    }

    if features.monochrome_ratio() > 0.6 {
        if features.local_complexity > 0.4 {
            return Some(Club::Corinthians);
        }
        return Some(Club::Santos);
    }

    if features.red_ratio > 0.3 && features.black_ratio > 0.2 && features.white_ratio > 0.2 {
        return Some(Club::SaoPaulo);
    }

    None
}

/// Turns team-profile features into a club label.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamClassifier;

impl TeamClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, correlation_id: impl Into<String>, features: &TeamFeatures) -> ClassificationResult {
        let correlation_id = correlation_id.into();
        let candidate = select_candidate(features);
        let best_score = candidate.map_or(0.0, |club| club.score(features));

        match candidate {
            Some(club) if best_score > ACCEPTANCE_THRESHOLD => ClassificationResult {
                correlation_id,
                label: Label::Club(club),
                score: best_score,
                confidence: best_score * CONFIDENCE_SCALE,
                rationale: format!(
                    "{}: visual color match - score: {:.2} (R:{:.1}%, G:{:.1}%, B:{:.1}%)",
                    club.display_name(),
                    best_score,
                    features.red_ratio * 100.0,
                    features.green_ratio * 100.0,
                    features.blue_ratio * 100.0
                ),
            },
            _ => ClassificationResult {
                correlation_id,
                label: Label::Unknown,
                score: best_score,
                confidence: 0.0,
                rationale: format!(
                    "No club matched the visual features (best score={:.2}, R:{:.1}%, G:{:.1}%, B:{:.1}%)",
                    best_score,
                    features.red_ratio * 100.0,
                    features.green_ratio * 100.0,
                    features.blue_ratio * 100.0
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(red: f64, green: f64, blue: f64, black: f64, white: f64, complexity: f64) -> TeamFeatures {
        TeamFeatures {
            red_ratio: red,
            green_ratio: green,
            blue_ratio: blue,
            black_ratio: black,
            white_ratio: white,
            local_complexity: complexity,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn red_and_black_is_flamengo() {
        let f = features(0.6, 0.05, 0.05, 0.3, 0.1, 0.2);
        let result = TeamClassifier::new().classify("m-1", &f);

        assert_eq!(result.label, Label::Club(Club::Flamengo));
        assert!(close(result.score, 0.51));
        assert!(close(result.confidence, 0.408));
        assert_eq!(result.correlation_id, "m-1");
        assert!(result.rationale.contains("Flamengo - RJ"));
        assert!(result.rationale.contains("R:60.0%"));
    }

    #[test]
    fn red_rule_precedes_green_rule() {
        let f = features(0.55, 0.45, 0.0, 0.3, 0.0, 0.0);
        assert_eq!(select_candidate(&f), Some(Club::Flamengo));
    }

    #[test]
    fn red_without_black_is_internacional() {
        assert_eq!(
            select_candidate(&features(0.7, 0.0, 0.0, 0.1, 0.25, 0.0)),
            Some(Club::Internacional)
        );
        assert_eq!(
            select_candidate(&features(0.7, 0.0, 0.0, 0.1, 0.0, 0.0)),
            Some(Club::Internacional)
        );
    }

    #[test]
    fn single_colour_rules() {
        assert_eq!(select_candidate(&features(0.0, 0.5, 0.0, 0.0, 0.0, 0.0)), Some(Club::Palmeiras));
        assert_eq!(select_candidate(&features(0.0, 0.0, 0.5, 0.0, 0.0, 0.0)), Some(Club::Gremio));
    }

    #[test]
    fn monochrome_splits_on_complexity() {
        assert_eq!(
            select_candidate(&features(0.0, 0.0, 0.0, 0.4, 0.4, 0.5)),
            Some(Club::Corinthians)
        );
        assert_eq!(
            select_candidate(&features(0.0, 0.0, 0.0, 0.4, 0.4, 0.1)),
            Some(Club::Santos)
        );
    }

    #[test]
    fn tricolour_is_sao_paulo() {
        let f = features(0.35, 0.0, 0.0, 0.22, 0.22, 0.1);
        assert_eq!(select_candidate(&f), Some(Club::SaoPaulo));
        let result = TeamClassifier::new().classify("m", &f);
        assert_eq!(result.label, Label::Club(Club::SaoPaulo));
        assert!(close(result.score, 0.4 * 0.79));
    }

    #[test]
    fn tree_miss_is_unknown_with_zero_score() {
        let f = features(0.1, 0.1, 0.1, 0.1, 0.1, 0.1);
        let result = TeamClassifier::new().classify("m", &f);
        assert_eq!(result.label, Label::Unknown);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn sub_threshold_candidate_is_unknown_with_its_score() {
        // Barely tricolour: the rule fires but 0.4 * 0.73 = 0.292 misses the bar.
        let f = features(0.31, 0.0, 0.0, 0.21, 0.21, 0.0);
        assert_eq!(select_candidate(&f), Some(Club::SaoPaulo));

        let result = TeamClassifier::new().classify("m", &f);
        assert_eq!(result.label, Label::Unknown);
        assert!(close(result.score, 0.292));
        assert_eq!(result.confidence, 0.0);
        assert!(result.rationale.contains("best score=0.29"));
    }

    #[test]
    fn neutral_features_resolve_to_corinthians() {
        let result = TeamClassifier::new().classify("m", &TeamFeatures::NEUTRAL);
        assert_eq!(result.label, Label::Club(Club::Corinthians));
        assert!(close(result.score, 0.5 * 1.0 + 0.4 * 0.5));
    }

    #[test]
    fn club_codes_round_trip_through_from_str() {
        for club in Club::ALL {
            assert_eq!(club.code().parse::<Club>(), Ok(club));
        }
        assert_eq!("GREMIO".parse::<Club>(), Ok(Club::Gremio));
        assert!("atletico".parse::<Club>().is_err());
    }

    #[test]
    fn unselectable_clubs_score_zero() {
        let f = features(0.9, 0.9, 0.9, 0.9, 0.9, 0.9);
        assert_eq!(Club::Vasco.score(&f), 0.0);
        assert_eq!(Club::Botafogo.score(&f), 0.0);
        assert_eq!(Club::Fluminense.score(&f), 0.0);
    }
}

// THEORY:
// The `verdict` module defines what leaves the engine. Whatever happened inside (a clean
// decode, a neutral fallback, a decision-tree miss, an unreadable payload), the caller
// always receives exactly one `ClassificationResult` per image.
//
// Key architectural principles:
// 1.  **Failures Are Values**: `ERROR` and `UNKNOWN` are ordinary labels, not panics or
//     `Err`s. A consumer can log, acknowledge or republish every result the same way.
// 2.  **Self-Describing**: The rationale string embeds the numbers that drove the
//     decision, so a result can be diagnosed without re-running the image.
// 3.  **Stable Wire Names**: Labels serialize as the short strings downstream
//     consumers match on (`HAPPY`, `SAD`, a club code, `UNKNOWN`, `ERROR`).

use crate::core_modules::team::Club;
use crate::error::VisionError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The decision a classifier reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Happy,
    Sad,
    Club(Club),
    /// The team decision tree found no club, or the club scored too low.
    Unknown,
    /// The image could not be analyzed at all.
    Error,
}

impl Label {
    pub fn is_error(&self) -> bool {
        matches!(self, Label::Error)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Happy => f.write_str("HAPPY"),
            Label::Sad => f.write_str("SAD"),
            Label::Club(club) => f.write_str(club.code()),
            Label::Unknown => f.write_str("UNKNOWN"),
            Label::Error => f.write_str("ERROR"),
        }
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HAPPY" => Ok(Label::Happy),
            "SAD" => Ok(Label::Sad),
            "UNKNOWN" => Ok(Label::Unknown),
            "ERROR" => Ok(Label::Error),
            other => other
                .parse::<Club>()
                .map(Label::Club)
                .map_err(|_| format!("unknown label: {other}")),
        }
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One classification outcome, created fresh per image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Id of the payload this result answers.
    pub correlation_id: String,
    pub label: Label,
    /// Sentiment: happiness probability. Team: best club score.
    pub score: f64,
    /// How decisively the thresholds favoured the label (0..1).
    pub confidence: f64,
    /// Human-readable explanation carrying the driving feature values.
    pub rationale: String,
}

impl ClassificationResult {
    /// The `ERROR` result for a failure that stopped the analysis.
    pub fn error(correlation_id: impl Into<String>, err: &VisionError) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            label: Label::Error,
            score: 0.0,
            confidence: 0.0,
            rationale: format!("Processing error: {err}"),
        }
    }

    pub fn is_error(&self) -> bool {
        self.label.is_error()
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Result{{id={}, label={}, score={:.2}, confidence={:.2}, rationale='{}'}}",
            self.correlation_id, self.label, self.score, self.confidence, self.rationale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_use_wire_names() {
        assert_eq!(Label::Happy.to_string(), "HAPPY");
        assert_eq!(Label::Club(Club::Flamengo).to_string(), "flamengo");
        assert_eq!("saopaulo".parse::<Label>(), Ok(Label::Club(Club::SaoPaulo)));
        assert_eq!("UNKNOWN".parse::<Label>(), Ok(Label::Unknown));
        assert!("maybe".parse::<Label>().is_err());
    }

    #[test]
    fn result_serializes_label_as_string() {
        let result = ClassificationResult {
            correlation_id: "abc".into(),
            label: Label::Club(Club::Gremio),
            score: 0.61,
            confidence: 0.488,
            rationale: "blue".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["label"], "gremio");
        assert_eq!(json["correlation_id"], "abc");
    }

    #[test]
    fn error_result_is_zeroed() {
        let result = ClassificationResult::error(
            "id-1",
            &VisionError::EmptyRaster {
                width: 0,
                height: 0,
            },
        );
        assert!(result.is_error());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert!(result.rationale.contains("empty"));
    }
}

//! Image payloads as they travel from the producer to the classifiers.

use crate::core_modules::features::FeatureProfile;
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// The logical stream a payload is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Face,
    #[serde(alias = "football", alias = "times")]
    Team,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Face, Category::Team];

    /// Name of the stream this category is routed to.
    pub fn routing_key(&self) -> &'static str {
        match self {
            Category::Face => "face",
            Category::Team => "team",
        }
    }

    /// Which statistics the extractor computes for this stream.
    pub fn profile(&self) -> FeatureProfile {
        match self {
            Category::Face => FeatureProfile::Sentiment,
            Category::Team => FeatureProfile::Team,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.routing_key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "face" => Ok(Category::Face),
            "team" | "football" | "times" => Ok(Category::Team),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// One encoded image plus the metadata the consumers need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Correlation id echoed back on the result.
    pub id: String,
    pub category: Category,
    /// Only the sentiment path reads this, as a keyword hint.
    pub filename: String,
    /// Milliseconds since the Unix epoch at creation time.
    pub timestamp_ms: u64,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            filename: filename.into(),
            timestamp_ms: now_millis(),
            bytes,
        }
    }

    /// A payload with a fresh random id.
    pub fn with_fresh_id(category: Category, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), category, filename, bytes)
    }

    /// Rejects payloads the engine cannot analyze at all.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(VisionError::InputMalformed {
                reason: "payload id is empty".to_string(),
            });
        }
        if self.bytes.is_empty() {
            return Err(VisionError::InputMalformed {
                reason: format!("payload '{}' carries no image bytes", self.filename),
            });
        }
        Ok(())
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

/// An encoded image with the filename it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_aliases() {
        assert_eq!("face".parse::<Category>(), Ok(Category::Face));
        assert_eq!("Football".parse::<Category>(), Ok(Category::Team));
        assert_eq!("times".parse::<Category>(), Ok(Category::Team));
        assert!("car".parse::<Category>().is_err());
        assert_eq!(Category::Team.to_string(), "team");
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = ImagePayload::with_fresh_id(Category::Face, "a.png", vec![1]);
        let b = ImagePayload::with_fresh_id(Category::Face, "a.png", vec![1]);
        assert_ne!(a.id, b.id);
        assert!(a.timestamp_ms > 0);
    }

    #[test]
    fn empty_id_or_bytes_are_malformed() {
        let no_id = ImagePayload::new("  ", Category::Team, "x.png", vec![1, 2]);
        assert!(matches!(no_id.validate(), Err(VisionError::InputMalformed { .. })));

        let no_bytes = ImagePayload::new("id", Category::Face, "x.png", Vec::new());
        assert!(matches!(no_bytes.validate(), Err(VisionError::InputMalformed { .. })));

        assert!(ImagePayload::new("id", Category::Face, "x.png", vec![0]).validate().is_ok());
    }

    #[test]
    fn payload_survives_json() {
        let payload = ImagePayload::new("p-1", Category::Team, "logo.png", vec![1, 2, 3]);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"category\":\"team\""));
        let back: ImagePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);

        let aliased: ImagePayload = serde_json::from_str(
            r#"{"id":"p-2","category":"football","filename":"logo.png","timestamp_ms":1,"bytes":[7]}"#,
        )
        .unwrap();
        assert_eq!(aliased.category, Category::Team);
        let aliased: Category = serde_json::from_str(r#""times""#).unwrap();
        assert_eq!(aliased, Category::Team);
    }
}

//! Emotional significance scoring.
//!
//! Significance estimates how emotionally and contextually important a
//! record is, independent of extraction trustworthiness. It drives review
//! prioritization and can escalate scrutiny in the confidence scorer, but
//! never relaxes it.

mod weighter;

pub use weighter::SignificanceWeighter;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Fixed factor weights for the overall significance score.
pub const INTENSITY_WEIGHT: f32 = 0.30;
pub const RELATIONSHIP_WEIGHT: f32 = 0.25;
pub const LIFE_EVENT_WEIGHT: f32 = 0.20;
pub const VULNERABILITY_WEIGHT: f32 = 0.15;
pub const TEMPORAL_WEIGHT: f32 = 0.10;

/// Band boundaries for the significance distribution.
pub const HIGH_SIGNIFICANCE: f32 = 0.7;
pub const MEDIUM_SIGNIFICANCE: f32 = 0.4;

/// Overall score assigned when significance computation fails.
pub const FALLBACK_SIGNIFICANCE: f32 = 0.3;

/// The five significance factors, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceFactors {
    /// Emotional intensity of the record.
    pub intensity: f32,
    /// Impact on the relationships involved.
    pub relationship_impact: f32,
    /// Presence of rare life events.
    pub life_event_significance: f32,
    /// Vulnerability of the participants.
    pub vulnerability: f32,
    /// Temporal importance (recency, special dates).
    pub temporal_importance: f32,
}

impl SignificanceFactors {
    /// All five factors set to the same value.
    pub fn uniform(value: f32) -> Self {
        Self {
            intensity: value,
            relationship_impact: value,
            life_event_significance: value,
            vulnerability: value,
            temporal_importance: value,
        }
    }

    /// The fixed-weight combination of the five factors, in [0, 1].
    pub fn weighted_overall(&self) -> f32 {
        let overall = self.intensity * INTENSITY_WEIGHT
            + self.relationship_impact * RELATIONSHIP_WEIGHT
            + self.life_event_significance * LIFE_EVENT_WEIGHT
            + self.vulnerability * VULNERABILITY_WEIGHT
            + self.temporal_importance * TEMPORAL_WEIGHT;
        overall.clamp(0.0, 1.0)
    }

    /// Factors as (name, value) pairs, in weight order.
    pub fn named(&self) -> [(&'static str, f32); 5] {
        [
            ("emotional_intensity", self.intensity),
            ("relationship_impact", self.relationship_impact),
            ("life_event_significance", self.life_event_significance),
            ("participant_vulnerability", self.vulnerability),
            ("temporal_importance", self.temporal_importance),
        ]
    }
}

/// Significance band used for queue distribution summaries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SignificanceBand {
    High,
    Medium,
    Low,
}

impl SignificanceBand {
    /// Band for an overall significance score.
    pub fn from_overall(overall: f32) -> Self {
        if overall >= HIGH_SIGNIFICANCE {
            SignificanceBand::High
        } else if overall >= MEDIUM_SIGNIFICANCE {
            SignificanceBand::Medium
        } else {
            SignificanceBand::Low
        }
    }
}

/// Emotional significance of a single record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalSignificanceScore {
    /// Fixed-weight combination of the five factors, in [0, 1].
    pub overall: f32,
    /// The individual factor scores.
    pub factors: SignificanceFactors,
    /// Prose explanation of the dominant contributing factors.
    pub narrative: String,
}

impl EmotionalSignificanceScore {
    /// Band this score falls into.
    pub fn band(&self) -> SignificanceBand {
        SignificanceBand::from_overall(self.overall)
    }

    /// Low default score used when computation fails.
    ///
    /// Significance scoring must never halt a batch; the failure is
    /// explained in the narrative instead of propagating.
    pub fn fallback(reason: &str) -> Self {
        Self {
            overall: FALLBACK_SIGNIFICANCE,
            factors: SignificanceFactors::uniform(FALLBACK_SIGNIFICANCE),
            narrative: format!(
                "Significance could not be fully computed ({}); assigned a low default score",
                reason
            ),
        }
    }
}

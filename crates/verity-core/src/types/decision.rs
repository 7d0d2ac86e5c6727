//! Decision and feedback types.
//!
//! The three-way decision is a tagged enum so exhaustiveness is enforced at
//! compile time. Results are value objects: created per evaluation and
//! immutable once produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Disposition of a memory record after confidence evaluation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Decision {
    /// Confidence cleared the approve threshold; no human review needed.
    AutoApprove,
    /// Confidence fell between the thresholds, or scrutiny was escalated.
    NeedsReview,
    /// Confidence fell at or below the reject threshold.
    AutoReject,
}

impl Decision {
    /// Whether this decision disposes of the record without human input.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Decision::AutoApprove | Decision::AutoReject)
    }

    /// Human-readable description of the decision.
    pub fn description(&self) -> &'static str {
        match self {
            Decision::AutoApprove => "Extraction is trustworthy; approved without review",
            Decision::NeedsReview => "Extraction is ambiguous; queued for human review",
            Decision::AutoReject => "Extraction is unreliable; rejected without review",
        }
    }
}

/// The five confidence factors, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    /// Extraction confidence reported by the pipeline (pass-through).
    pub extraction_confidence: f32,
    /// Internal consistency of the emotional annotations.
    pub emotional_coherence: f32,
    /// Plausibility of the relationship assessment.
    pub relationship_accuracy: f32,
    /// Plausibility of the record's timestamp.
    pub temporal_consistency: f32,
    /// Quality of the record's content and tagging.
    pub content_quality: f32,
}

impl ConfidenceFactors {
    /// A fully neutral factor set (every factor at the 0.5 midpoint).
    pub fn neutral() -> Self {
        Self::uniform(0.5)
    }

    /// All five factors set to the same value.
    pub fn uniform(value: f32) -> Self {
        Self {
            extraction_confidence: value,
            emotional_coherence: value,
            relationship_accuracy: value,
            temporal_consistency: value,
            content_quality: value,
        }
    }

    /// Factor values in [`ConfidenceFactor::ALL`] order.
    pub fn as_array(&self) -> [f32; 5] {
        [
            self.extraction_confidence,
            self.emotional_coherence,
            self.relationship_accuracy,
            self.temporal_consistency,
            self.content_quality,
        ]
    }

    /// Read a single factor by name.
    pub fn get(&self, factor: ConfidenceFactor) -> f32 {
        match factor {
            ConfidenceFactor::ExtractionConfidence => self.extraction_confidence,
            ConfidenceFactor::EmotionalCoherence => self.emotional_coherence,
            ConfidenceFactor::RelationshipAccuracy => self.relationship_accuracy,
            ConfidenceFactor::TemporalConsistency => self.temporal_consistency,
            ConfidenceFactor::ContentQuality => self.content_quality,
        }
    }
}

/// Names of the five confidence factors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConfidenceFactor {
    ExtractionConfidence,
    EmotionalCoherence,
    RelationshipAccuracy,
    TemporalConsistency,
    ContentQuality,
}

impl ConfidenceFactor {
    /// All five factors in canonical order.
    pub const ALL: [ConfidenceFactor; 5] = [
        ConfidenceFactor::ExtractionConfidence,
        ConfidenceFactor::EmotionalCoherence,
        ConfidenceFactor::RelationshipAccuracy,
        ConfidenceFactor::TemporalConsistency,
        ConfidenceFactor::ContentQuality,
    ];
}

/// Result of evaluating one memory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoConfirmationResult {
    /// Identifier of the evaluated record.
    pub memory_id: String,
    /// Three-way disposition.
    pub decision: Decision,
    /// Weighted combination of the five factors, in [0, 1].
    pub confidence: f32,
    /// The individual factor scores.
    pub factors: ConfidenceFactors,
    /// Human-readable reasons: notable factors, fallbacks, escalations.
    pub reasons: Vec<String>,
    /// Suggested next steps for a reviewer, when the record is not approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<String>>,
}

/// Aggregate result of processing a batch of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchValidationResult {
    /// Per-record results, in input order.
    pub results: Vec<AutoConfirmationResult>,
    /// Count of auto-approved records.
    pub auto_approved: usize,
    /// Count of records routed to human review.
    pub needs_review: usize,
    /// Count of auto-rejected records.
    pub auto_rejected: usize,
    /// Count of records whose evaluation failed and fell back to review.
    pub fallbacks: usize,
    /// Number of records actually evaluated (may be limited by the caller).
    pub evaluated: usize,
    /// Size of the input batch.
    pub population: usize,
    /// Wall-clock processing time in milliseconds.
    pub elapsed_ms: u64,
}

impl BatchValidationResult {
    /// Fraction of evaluated records disposed of without human review.
    pub fn automation_rate(&self) -> f32 {
        if self.evaluated == 0 {
            return 0.0;
        }
        (self.auto_approved + self.auto_rejected) as f32 / self.evaluated as f32
    }
}

/// What the human reviewer decided about a record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HumanDecision {
    /// Reviewer confirmed the record as extracted.
    Validated,
    /// Reviewer kept the record after editing it.
    Modified,
    /// Reviewer discarded the record.
    Rejected,
}

impl HumanDecision {
    /// Whether the reviewer kept the record (with or without edits).
    pub fn is_kept(&self) -> bool {
        matches!(self, HumanDecision::Validated | HumanDecision::Modified)
    }
}

/// A human decision flowing back from the review UI.
///
/// Consumed exactly once by a threshold update cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFeedback {
    /// Identifier of the reviewed record.
    pub memory_id: String,
    /// The engine's original result for the record.
    pub original: AutoConfirmationResult,
    /// The reviewer's decision.
    pub human_decision: HumanDecision,
    /// Optional free-text notes from the reviewer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the feedback was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl ValidationFeedback {
    /// Whether the engine's original decision agreed with the human.
    ///
    /// NeedsReview is always correct: it deferred to the human.
    pub fn was_correct(&self) -> bool {
        match self.original.decision {
            Decision::AutoApprove => self.human_decision.is_kept(),
            Decision::AutoReject => self.human_decision == HumanDecision::Rejected,
            Decision::NeedsReview => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result_with(decision: Decision) -> AutoConfirmationResult {
        AutoConfirmationResult {
            memory_id: "mem-1".to_string(),
            decision,
            confidence: 0.8,
            factors: ConfidenceFactors::uniform(0.8),
            reasons: vec![],
            suggested_actions: None,
        }
    }

    fn feedback(decision: Decision, human: HumanDecision) -> ValidationFeedback {
        ValidationFeedback {
            memory_id: "mem-1".to_string(),
            original: result_with(decision),
            human_decision: human,
            notes: None,
            submitted_at: Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(format!("{}", Decision::AutoApprove), "auto_approve");
        assert_eq!(format!("{}", Decision::NeedsReview), "needs_review");
        assert_eq!(format!("{}", Decision::AutoReject), "auto_reject");
    }

    #[test]
    fn test_decision_terminal() {
        assert!(Decision::AutoApprove.is_terminal());
        assert!(Decision::AutoReject.is_terminal());
        assert!(!Decision::NeedsReview.is_terminal());
    }

    #[test]
    fn test_factors_as_array_order() {
        let factors = ConfidenceFactors {
            extraction_confidence: 0.1,
            emotional_coherence: 0.2,
            relationship_accuracy: 0.3,
            temporal_consistency: 0.4,
            content_quality: 0.5,
        };
        assert_eq!(factors.as_array(), [0.1, 0.2, 0.3, 0.4, 0.5]);
        for (i, factor) in ConfidenceFactor::ALL.iter().enumerate() {
            assert_eq!(factors.get(*factor), factors.as_array()[i]);
        }
    }

    #[test]
    fn test_approve_correct_iff_kept() {
        assert!(feedback(Decision::AutoApprove, HumanDecision::Validated).was_correct());
        assert!(feedback(Decision::AutoApprove, HumanDecision::Modified).was_correct());
        assert!(!feedback(Decision::AutoApprove, HumanDecision::Rejected).was_correct());
    }

    #[test]
    fn test_reject_correct_iff_rejected() {
        assert!(feedback(Decision::AutoReject, HumanDecision::Rejected).was_correct());
        assert!(!feedback(Decision::AutoReject, HumanDecision::Validated).was_correct());
    }

    #[test]
    fn test_needs_review_always_correct() {
        assert!(feedback(Decision::NeedsReview, HumanDecision::Validated).was_correct());
        assert!(feedback(Decision::NeedsReview, HumanDecision::Rejected).was_correct());
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_string(&Decision::NeedsReview).unwrap();
        assert_eq!(json, "\"needs_review\"");
        let restored: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Decision::NeedsReview);
    }

    #[test]
    fn test_automation_rate() {
        let batch = BatchValidationResult {
            results: vec![],
            auto_approved: 6,
            needs_review: 2,
            auto_rejected: 2,
            fallbacks: 0,
            evaluated: 10,
            population: 10,
            elapsed_ms: 1,
        };
        assert!((batch.automation_rate() - 0.8).abs() < 1e-6);
    }
}

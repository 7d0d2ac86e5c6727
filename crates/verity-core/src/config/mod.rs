//! Threshold configuration for the confidence scorer.
//!
//! A [`ThresholdConfig`] partitions the confidence range [0, 1] into three
//! decision zones and carries the weights used to combine the five
//! confidence factors. Invalid configurations are rejected synchronously at
//! the point they are constructed or validated; scoring never clamps them.
//!
//! The config is read-mostly: a batch reads one snapshot at batch start, and
//! the threshold manager is the sole producer of replacements, applied only
//! between batches.

use serde::{Deserialize, Serialize};

use crate::error::{VerityError, VerityResult};
use crate::types::{ConfidenceFactor, ConfidenceFactors, Decision};

/// Default auto-approve threshold.
pub const DEFAULT_AUTO_APPROVE_THRESHOLD: f32 = 0.75;
/// Default auto-reject threshold.
pub const DEFAULT_AUTO_REJECT_THRESHOLD: f32 = 0.50;
/// Tolerance for the weights-sum-to-one invariant.
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-6;

/// Weights for combining the five confidence factors.
///
/// Invariant: non-negative, summing to 1.0 within [`WEIGHT_SUM_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub extraction_confidence: f32,
    pub emotional_coherence: f32,
    pub relationship_accuracy: f32,
    pub temporal_consistency: f32,
    pub content_quality: f32,
}

impl Default for FactorWeights {
    fn default() -> Self {
        // Equal weighting until feedback-driven calibration says otherwise.
        Self {
            extraction_confidence: 0.20,
            emotional_coherence: 0.20,
            relationship_accuracy: 0.20,
            temporal_consistency: 0.20,
            content_quality: 0.20,
        }
    }
}

impl FactorWeights {
    /// Read a single weight by factor name.
    pub fn get(&self, factor: ConfidenceFactor) -> f32 {
        match factor {
            ConfidenceFactor::ExtractionConfidence => self.extraction_confidence,
            ConfidenceFactor::EmotionalCoherence => self.emotional_coherence,
            ConfidenceFactor::RelationshipAccuracy => self.relationship_accuracy,
            ConfidenceFactor::TemporalConsistency => self.temporal_consistency,
            ConfidenceFactor::ContentQuality => self.content_quality,
        }
    }

    /// Write a single weight by factor name.
    pub fn set(&mut self, factor: ConfidenceFactor, value: f32) {
        match factor {
            ConfidenceFactor::ExtractionConfidence => self.extraction_confidence = value,
            ConfidenceFactor::EmotionalCoherence => self.emotional_coherence = value,
            ConfidenceFactor::RelationshipAccuracy => self.relationship_accuracy = value,
            ConfidenceFactor::TemporalConsistency => self.temporal_consistency = value,
            ConfidenceFactor::ContentQuality => self.content_quality = value,
        }
    }

    /// Sum of all five weights.
    pub fn sum(&self) -> f32 {
        self.extraction_confidence
            + self.emotional_coherence
            + self.relationship_accuracy
            + self.temporal_consistency
            + self.content_quality
    }

    /// Rescale all weights so they sum to 1.0.
    ///
    /// Used by calibration after multiplicative adjustments; a zero sum
    /// resets to the default equal weighting.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum <= 0.0 {
            *self = Self::default();
            return;
        }
        for factor in ConfidenceFactor::ALL {
            self.set(factor, self.get(factor) / sum);
        }
    }

    /// Calculate the weighted confidence from factor scores.
    ///
    /// Factor scores are expected in [0, 1]; the result is clamped to [0, 1].
    pub fn combine(&self, factors: &ConfidenceFactors) -> f32 {
        let score = factors.extraction_confidence * self.extraction_confidence
            + factors.emotional_coherence * self.emotional_coherence
            + factors.relationship_accuracy * self.relationship_accuracy
            + factors.temporal_consistency * self.temporal_consistency
            + factors.content_quality * self.content_quality;
        score.clamp(0.0, 1.0)
    }

    /// Validate the weight invariants.
    pub fn validate(&self) -> VerityResult<()> {
        for factor in ConfidenceFactor::ALL {
            let weight = self.get(factor);
            if !weight.is_finite() || weight < 0.0 {
                return Err(VerityError::invalid_weights(format!(
                    "Weight for '{}' is {}; weights must be finite and non-negative",
                    factor, weight
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(VerityError::invalid_weights(format!(
                "Factor weights sum to {} instead of 1.0",
                sum
            )));
        }
        Ok(())
    }
}

/// Thresholds and factor weights for the three-way decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Confidence at or above this is auto-approved.
    pub auto_approve_threshold: f32,
    /// Confidence at or below this is auto-rejected.
    pub auto_reject_threshold: f32,
    /// Weights for combining the five confidence factors.
    pub weights: FactorWeights,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            auto_approve_threshold: DEFAULT_AUTO_APPROVE_THRESHOLD,
            auto_reject_threshold: DEFAULT_AUTO_REJECT_THRESHOLD,
            weights: FactorWeights::default(),
        }
    }
}

impl ThresholdConfig {
    /// Create a validated config.
    pub fn new(
        auto_approve_threshold: f32,
        auto_reject_threshold: f32,
        weights: FactorWeights,
    ) -> VerityResult<Self> {
        let config = Self {
            auto_approve_threshold,
            auto_reject_threshold,
            weights,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate thresholds and weights.
    pub fn validate(&self) -> VerityResult<()> {
        for (name, value) in [
            ("auto_approve_threshold", self.auto_approve_threshold),
            ("auto_reject_threshold", self.auto_reject_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(VerityError::invalid_thresholds(format!(
                    "{} is {}; thresholds must lie in [0, 1]",
                    name, value
                )));
            }
        }
        if self.auto_approve_threshold <= self.auto_reject_threshold {
            return Err(VerityError::invalid_thresholds(format!(
                "auto_approve_threshold ({}) must be above auto_reject_threshold ({})",
                self.auto_approve_threshold, self.auto_reject_threshold
            )));
        }
        self.weights.validate()
    }

    /// Map a confidence value to its decision zone.
    ///
    /// The two thresholds partition [0, 1] into exactly three
    /// non-overlapping zones because approve > reject is an invariant.
    pub fn decide(&self, confidence: f32) -> Decision {
        if confidence >= self.auto_approve_threshold {
            Decision::AutoApprove
        } else if confidence <= self.auto_reject_threshold {
            Decision::AutoReject
        } else {
            Decision::NeedsReview
        }
    }
}

//! Threshold calibration from human feedback.
//!
//! The threshold manager is a pure function of feedback history and the
//! current config: it analyzes accumulated review decisions and recommends
//! a replacement config, but never mutates the live one. Applying the
//! recommendation is a separate, explicit caller step, taken only between
//! batches.
//!
//! The clamping in this module is deliberate bounded adjustment arithmetic,
//! not error recovery; invalid configs are still rejected outright.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ThresholdConfig;
use crate::error::VerityResult;
use crate::types::{ConfidenceFactor, Decision, ValidationFeedback};

/// Upper clamp for the auto-approve threshold.
pub const AUTO_APPROVE_MAX: f32 = 0.95;
/// Lower clamp for the auto-approve threshold.
pub const AUTO_APPROVE_MIN: f32 = 0.65;
/// Lower clamp for the auto-reject threshold.
pub const AUTO_REJECT_MIN: f32 = 0.30;
/// Cap on the reported expected accuracy improvement.
pub const MAX_EXPECTED_IMPROVEMENT: f32 = 0.10;

const APPROVE_RAISE_STEP: f32 = 0.05;
const APPROVE_LOWER_STEP: f32 = 0.02;
const REJECT_LOWER_STEP: f32 = 0.05;

const FP_RAISE_RATE: f32 = 0.05;
const FP_LOWER_RATE: f32 = 0.02;
const ACCURACY_LOWER_MIN: f32 = 0.90;
const FN_LOWER_RATE: f32 = 0.05;

const FACTOR_SIGNAL_MIN: f32 = 0.7;
const CORRELATION_BOOST_MIN: f32 = 0.8;
const CORRELATION_CUT_MAX: f32 = 0.5;
const WEIGHT_BOOST: f32 = 1.1;
const WEIGHT_CUT: f32 = 0.9;

/// Aggregate accuracy statistics over a feedback set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedbackStats {
    /// Number of feedback items.
    pub total: usize,
    /// Items where the engine's decision agreed with the human.
    pub correct: usize,
    /// Auto-approved items the human did not keep.
    pub false_positives: usize,
    /// Auto-rejected items the human kept.
    pub false_negatives: usize,
}

impl FeedbackStats {
    /// False-positive rate over the feedback set.
    pub fn fp_rate(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.false_positives as f32 / self.total as f32
    }

    /// False-negative rate over the feedback set.
    pub fn fn_rate(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.false_negatives as f32 / self.total as f32
    }

    /// Overall decision accuracy.
    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f32 / self.total as f32
    }
}

/// A recommended threshold/weight replacement.
///
/// Produced by analysis; applying it is the caller's explicit step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdUpdate {
    /// The config the analysis was run against.
    pub previous: ThresholdConfig,
    /// The recommended replacement config.
    pub recommended: ThresholdConfig,
    /// One human-readable entry per triggered rule.
    pub reasons: Vec<String>,
    /// Bounded heuristic estimate of the accuracy gain, at most 0.10.
    pub expected_accuracy_improvement: f32,
}

impl ThresholdUpdate {
    /// Whether the recommendation leaves the config unchanged.
    pub fn is_noop(&self) -> bool {
        self.previous == self.recommended
    }

    /// Validate and return the recommended config for installation.
    ///
    /// The explicit second step of the two-step update protocol; callers
    /// install the returned config only between batches.
    pub fn apply(&self) -> VerityResult<ThresholdConfig> {
        self.recommended.validate()?;
        Ok(self.recommended)
    }
}

/// Recalibrates thresholds and factor weights from review feedback.
#[derive(Debug, Clone, Default)]
pub struct ThresholdManager;

impl ThresholdManager {
    /// Create a new manager.
    pub fn new() -> Self {
        Self
    }

    /// Classify a feedback set into aggregate accuracy statistics.
    pub fn feedback_stats(&self, feedback: &[ValidationFeedback]) -> FeedbackStats {
        let mut stats = FeedbackStats {
            total: feedback.len(),
            correct: 0,
            false_positives: 0,
            false_negatives: 0,
        };
        for item in feedback {
            if item.was_correct() {
                stats.correct += 1;
            }
            match item.original.decision {
                Decision::AutoApprove if !item.human_decision.is_kept() => {
                    stats.false_positives += 1;
                }
                Decision::AutoReject if item.human_decision.is_kept() => {
                    stats.false_negatives += 1;
                }
                _ => {}
            }
        }
        stats
    }

    /// Analyze feedback and recommend a threshold/weight update.
    ///
    /// Pure: neither the feedback nor the passed config is mutated. With no
    /// feedback the config is returned unchanged with an explicit reason,
    /// never a fabricated recommendation.
    pub fn calculate_threshold_update(
        &self,
        feedback: &[ValidationFeedback],
        config: &ThresholdConfig,
    ) -> VerityResult<ThresholdUpdate> {
        config.validate()?;

        if feedback.is_empty() {
            return Ok(ThresholdUpdate {
                previous: *config,
                recommended: *config,
                reasons: vec!["No feedback provided".to_string()],
                expected_accuracy_improvement: 0.0,
            });
        }

        let stats = self.feedback_stats(feedback);
        let mut recommended = *config;
        let mut reasons = Vec::new();
        let mut improvement: f32 = 0.0;

        self.adjust_thresholds(&stats, &mut recommended, &mut reasons, &mut improvement);
        self.adjust_weights(feedback, &mut recommended, &mut reasons, &mut improvement);

        let update = ThresholdUpdate {
            previous: *config,
            recommended,
            reasons,
            expected_accuracy_improvement: improvement.min(MAX_EXPECTED_IMPROVEMENT),
        };
        update.recommended.validate()?;

        debug!(
            total = stats.total,
            fp_rate = stats.fp_rate(),
            fn_rate = stats.fn_rate(),
            accuracy = stats.accuracy(),
            noop = update.is_noop(),
            "calculated threshold update"
        );
        Ok(update)
    }

    fn adjust_thresholds(
        &self,
        stats: &FeedbackStats,
        recommended: &mut ThresholdConfig,
        reasons: &mut Vec<String>,
        improvement: &mut f32,
    ) {
        if stats.fp_rate() > FP_RAISE_RATE {
            let raised =
                (recommended.auto_approve_threshold + APPROVE_RAISE_STEP).min(AUTO_APPROVE_MAX);
            if raised > recommended.auto_approve_threshold {
                reasons.push(format!(
                    "False-positive rate {:.1}% above {:.0}%; raising auto-approve threshold from {:.2} to {:.2}",
                    stats.fp_rate() * 100.0,
                    FP_RAISE_RATE * 100.0,
                    recommended.auto_approve_threshold,
                    raised
                ));
                recommended.auto_approve_threshold = raised;
                *improvement += stats.fp_rate() * 0.4;
            } else {
                reasons.push(format!(
                    "False-positive rate {:.1}% above {:.0}% but auto-approve threshold already at maximum {:.2}",
                    stats.fp_rate() * 100.0,
                    FP_RAISE_RATE * 100.0,
                    AUTO_APPROVE_MAX
                ));
            }
        } else if stats.fp_rate() < FP_LOWER_RATE && stats.accuracy() > ACCURACY_LOWER_MIN {
            // Keep the lowered threshold above the reject threshold so the
            // three decision zones stay well-formed.
            let floor = AUTO_APPROVE_MIN.max(recommended.auto_reject_threshold + 0.01);
            let lowered = (recommended.auto_approve_threshold - APPROVE_LOWER_STEP).max(floor);
            if lowered < recommended.auto_approve_threshold {
                reasons.push(format!(
                    "False-positive rate {:.1}% below {:.0}% with accuracy {:.1}%; lowering auto-approve threshold from {:.2} to {:.2}",
                    stats.fp_rate() * 100.0,
                    FP_LOWER_RATE * 100.0,
                    stats.accuracy() * 100.0,
                    recommended.auto_approve_threshold,
                    lowered
                ));
                recommended.auto_approve_threshold = lowered;
                *improvement += 0.01;
            }
        }

        if stats.fn_rate() > FN_LOWER_RATE {
            let lowered =
                (recommended.auto_reject_threshold - REJECT_LOWER_STEP).max(AUTO_REJECT_MIN);
            if lowered < recommended.auto_reject_threshold {
                reasons.push(format!(
                    "False-negative rate {:.1}% above {:.0}%; lowering auto-reject threshold from {:.2} to {:.2}",
                    stats.fn_rate() * 100.0,
                    FN_LOWER_RATE * 100.0,
                    recommended.auto_reject_threshold,
                    lowered
                ));
                recommended.auto_reject_threshold = lowered;
                *improvement += stats.fn_rate() * 0.3;
            } else {
                reasons.push(format!(
                    "False-negative rate {:.1}% above {:.0}% but auto-reject threshold already at minimum {:.2}",
                    stats.fn_rate() * 100.0,
                    FN_LOWER_RATE * 100.0,
                    AUTO_REJECT_MIN
                ));
            }
        }
    }

    /// Scale each factor's weight by its correlation with correct decisions
    /// among feedback where the factor gave a strong signal, then
    /// renormalize so the weights sum to 1.0 again.
    fn adjust_weights(
        &self,
        feedback: &[ValidationFeedback],
        recommended: &mut ThresholdConfig,
        reasons: &mut Vec<String>,
        improvement: &mut f32,
    ) {
        let mut adjusted = 0;

        for factor in ConfidenceFactor::ALL {
            let relevant: Vec<&ValidationFeedback> = feedback
                .iter()
                .filter(|item| item.original.factors.get(factor) > FACTOR_SIGNAL_MIN)
                .collect();
            if relevant.is_empty() {
                continue;
            }

            let correct = relevant.iter().filter(|item| item.was_correct()).count();
            let correlation = correct as f32 / relevant.len() as f32;

            if correlation > CORRELATION_BOOST_MIN {
                recommended
                    .weights
                    .set(factor, recommended.weights.get(factor) * WEIGHT_BOOST);
                reasons.push(format!(
                    "Factor '{}' correlates with correct decisions ({:.0}% over {} items); weight increased",
                    factor,
                    correlation * 100.0,
                    relevant.len()
                ));
                adjusted += 1;
            } else if correlation < CORRELATION_CUT_MAX {
                recommended
                    .weights
                    .set(factor, recommended.weights.get(factor) * WEIGHT_CUT);
                reasons.push(format!(
                    "Factor '{}' correlates poorly with correct decisions ({:.0}% over {} items); weight decreased",
                    factor,
                    correlation * 100.0,
                    relevant.len()
                ));
                adjusted += 1;
            }
        }

        if adjusted > 0 {
            recommended.weights.normalize();
            *improvement += 0.005 * adjusted as f32;
        }
    }
}

//! Auto-confirmation engine.
//!
//! Evaluates one record at a time against a threshold config snapshot, and
//! processes batches with per-record failure isolation: a record whose
//! evaluation fails falls back to a needs-review result instead of aborting
//! the batch.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::factors;
use crate::config::ThresholdConfig;
use crate::error::{VerityError, VerityResult};
use crate::significance::SignificanceWeighter;
use crate::types::{
    AutoConfirmationResult, BatchValidationResult, ConfidenceFactor, ConfidenceFactors, Decision,
    MemoryRecord,
};

/// Significance at or above this forces human review regardless of
/// confidence. Significance can only escalate scrutiny, never bypass it.
pub const HIGH_CRITICALITY_SIGNIFICANCE: f32 = 0.9;

/// Options for batch processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Evaluate at most this many records, then stop cooperatively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl BatchOptions {
    /// Evaluate at most `max_items` records.
    pub fn with_max_items(max_items: usize) -> Self {
        Self {
            max_items: Some(max_items),
        }
    }
}

/// The confidence scorer.
///
/// Stateless apart from the owned significance weighter; evaluation is a
/// pure function of (record, config snapshot, reference time), so records
/// in a batch can be scored in any order or in parallel.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceEngine {
    weighter: SignificanceWeighter,
}

impl ConfidenceEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self {
            weighter: SignificanceWeighter::new(),
        }
    }

    /// Evaluate a single record against the given config.
    ///
    /// Fails only on an invalid config or a malformed record (empty id,
    /// non-finite extraction confidence); missing optional sub-structures
    /// fall back to neutral factor scores with recorded reasons.
    pub fn evaluate_memory(
        &self,
        memory: &MemoryRecord,
        config: &ThresholdConfig,
        now: DateTime<Utc>,
    ) -> VerityResult<AutoConfirmationResult> {
        config.validate()?;
        if memory.id.trim().is_empty() {
            return Err(VerityError::validation_with_suggestion(
                "Memory id must not be empty",
                "Assign an id before submitting the record for validation",
            ));
        }

        let mut reasons = Vec::new();

        let extraction = factors::extraction_confidence(memory)?;
        let coherence = factors::emotional_coherence(memory);
        let relationship = factors::relationship_accuracy(memory);
        let temporal = factors::temporal_consistency(memory, now);
        let content = factors::content_quality(memory);

        for note in [
            &extraction.note,
            &coherence.note,
            &relationship.note,
            &temporal.note,
            &content.note,
        ]
        .into_iter()
        .flatten()
        {
            reasons.push(note.clone());
        }

        let factors = ConfidenceFactors {
            extraction_confidence: extraction.value,
            emotional_coherence: coherence.value,
            relationship_accuracy: relationship.value,
            temporal_consistency: temporal.value,
            content_quality: content.value,
        };

        let confidence = config.weights.combine(&factors);
        let mut decision = config.decide(confidence);
        reasons.push(threshold_reason(confidence, decision, config));

        // Escalation point for high-significance records: an approval is
        // downgraded to review, a rejection stands.
        let significance = self.weighter.calculate_significance(memory, now);
        if significance.overall >= HIGH_CRITICALITY_SIGNIFICANCE
            && decision == Decision::AutoApprove
        {
            decision = Decision::NeedsReview;
            reasons.push(format!(
                "High emotional significance ({:.2}) requires human review despite confidence {:.2}",
                significance.overall, confidence
            ));
        }

        debug!(
            memory_id = %memory.id,
            confidence,
            decision = %decision,
            significance = significance.overall,
            "evaluated memory"
        );

        Ok(AutoConfirmationResult {
            memory_id: memory.id.clone(),
            decision,
            confidence,
            factors,
            reasons,
            suggested_actions: suggested_actions(decision, &factors),
        })
    }

    /// Process a batch of records against one config snapshot.
    ///
    /// The config is validated once and the reference time captured once at
    /// batch start, so every record in the batch sees consistent decision
    /// rules. One record's failure never aborts the batch: the record falls
    /// back to a needs-review result with the failure recorded in its
    /// reasons.
    pub fn process_batch(
        &self,
        memories: &[MemoryRecord],
        config: &ThresholdConfig,
        options: &BatchOptions,
    ) -> VerityResult<BatchValidationResult> {
        config.validate()?;

        let now = Utc::now();
        let started = Instant::now();
        let limit = options
            .max_items
            .map(|max| max.min(memories.len()))
            .unwrap_or(memories.len());

        let mut results = Vec::with_capacity(limit);
        let mut auto_approved = 0;
        let mut needs_review = 0;
        let mut auto_rejected = 0;
        let mut fallbacks = 0;

        for memory in memories.iter().take(limit) {
            let result = match self.evaluate_memory(memory, config, now) {
                Ok(result) => result,
                Err(err) => {
                    warn!(
                        memory_id = %memory.id,
                        error = %err,
                        "evaluation failed; falling back to needs_review"
                    );
                    fallbacks += 1;
                    fallback_result(memory, &err)
                }
            };

            match result.decision {
                Decision::AutoApprove => auto_approved += 1,
                Decision::NeedsReview => needs_review += 1,
                Decision::AutoReject => auto_rejected += 1,
            }
            results.push(result);
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            evaluated = results.len(),
            population = memories.len(),
            auto_approved,
            needs_review,
            auto_rejected,
            fallbacks,
            elapsed_ms,
            "processed validation batch"
        );

        Ok(BatchValidationResult {
            evaluated: results.len(),
            population: memories.len(),
            results,
            auto_approved,
            needs_review,
            auto_rejected,
            fallbacks,
            elapsed_ms,
        })
    }
}

fn threshold_reason(confidence: f32, decision: Decision, config: &ThresholdConfig) -> String {
    match decision {
        Decision::AutoApprove => format!(
            "Confidence {:.2} at or above approve threshold {:.2}",
            confidence, config.auto_approve_threshold
        ),
        Decision::AutoReject => format!(
            "Confidence {:.2} at or below reject threshold {:.2}",
            confidence, config.auto_reject_threshold
        ),
        Decision::NeedsReview => format!(
            "Confidence {:.2} between reject threshold {:.2} and approve threshold {:.2}",
            confidence, config.auto_reject_threshold, config.auto_approve_threshold
        ),
    }
}

fn suggested_actions(decision: Decision, factors: &ConfidenceFactors) -> Option<Vec<String>> {
    if decision == Decision::AutoApprove {
        return None;
    }

    let mut actions = Vec::new();
    for factor in ConfidenceFactor::ALL {
        if factors.get(factor) < 0.5 {
            actions.push(format!("Re-check {}", factor.to_string().replace('_', " ")));
        }
    }
    match decision {
        Decision::NeedsReview => {
            actions.push("Review the record against its source conversation".to_string());
        }
        Decision::AutoReject => {
            actions.push("Discard the record or re-run extraction".to_string());
        }
        Decision::AutoApprove => {}
    }
    Some(actions)
}

/// Needs-review fallback for a record whose evaluation failed.
fn fallback_result(memory: &MemoryRecord, err: &VerityError) -> AutoConfirmationResult {
    AutoConfirmationResult {
        memory_id: memory.id.clone(),
        decision: Decision::NeedsReview,
        confidence: 0.5,
        factors: ConfidenceFactors::neutral(),
        reasons: vec![format!(
            "Evaluation failed ({}); defaulted to needs_review",
            err
        )],
        suggested_actions: Some(vec![
            "Inspect the record for malformed fields".to_string(),
            "Review the record manually".to_string(),
        ]),
    }
}

//! Integration tests for the full validation loop.
//!
//! Exercises batch evaluation, queue prioritization and optimization,
//! feedback-driven recalibration, and re-evaluation under the updated
//! config.

use chrono::{DateTime, Duration, TimeZone, Utc};
use verity_core::{
    BatchOptions, ConfidenceEngine, CoverageRequirements, Decision, EmotionalContext,
    HumanDecision, InteractionQuality, IntelligentSampler, MemoryRecord, Participant,
    PriorityManager, RelationshipDynamics, ResourceAllocation, ThresholdConfig,
    ThresholdManager, ValidationFeedback, ValidatorExpertise,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("verity_core=debug")
        .with_test_writer()
        .try_init();
}

fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 17, 12, 0, 0).unwrap()
}

/// A population mixing trustworthy, borderline, and weak extractions.
fn build_population() -> Vec<MemoryRecord> {
    let now = reference_time();
    let emotions = ["joy", "sadness", "anger", "fear"];
    let names = ["Ana", "Ben", "Cleo", "Dan", "Eve"];

    (0..20)
        .map(|i| {
            let confidence = match i % 3 {
                0 => 0.92,
                1 => 0.62,
                _ => 0.25,
            };
            let mut record = MemoryRecord::new(
                format!("mem-{:02}", i),
                "A conversation covering plans, feelings, and a fair amount of detail",
                now - Duration::days(i as i64 * 4),
            )
            .with_extraction_confidence(confidence)
            .with_emotional_context(
                EmotionalContext::new()
                    .with_primary_emotion(emotions[i % emotions.len()])
                    .with_mood_intensity(0.3 + 0.03 * i as f32),
            )
            .with_participant(Participant::new(names[i % names.len()]));
            if i % 5 == 0 {
                record = record.with_relationship_dynamics(
                    RelationshipDynamics::new()
                        .with_interaction_quality(InteractionQuality::Positive)
                        .with_communication_pattern("support")
                        .with_participant_count(1),
                );
            }
            record
        })
        .collect()
}

#[test]
fn test_batch_then_prioritize_then_recalibrate() {
    init_tracing();
    let engine = ConfidenceEngine::new();
    let manager = PriorityManager::new();
    let threshold_manager = ThresholdManager::new();
    let config = ThresholdConfig::default();
    let now = reference_time();
    let memories = build_population();

    // Evaluate the batch: every record gets exactly one disposition.
    let batch = engine
        .process_batch(&memories, &config, &BatchOptions::default())
        .unwrap();
    assert_eq!(batch.evaluated, memories.len());
    assert_eq!(batch.fallbacks, 0);
    assert_eq!(
        batch.auto_approved + batch.needs_review + batch.auto_rejected,
        batch.evaluated
    );

    // Queue the needs-review records.
    let review_ids: Vec<&str> = batch
        .results
        .iter()
        .filter(|r| r.decision == Decision::NeedsReview)
        .map(|r| r.memory_id.as_str())
        .collect();
    let review_records: Vec<MemoryRecord> = memories
        .iter()
        .filter(|m| review_ids.contains(&m.id.as_str()))
        .cloned()
        .collect();
    assert!(!review_records.is_empty());

    let list = manager.create_prioritized_list(&review_records, now);
    let mut ranks: Vec<usize> = list.items.iter().map(|m| m.priority_rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=review_records.len()).collect::<Vec<_>>());
    for pair in list.items.windows(2) {
        assert!(pair[0].significance.overall >= pair[1].significance.overall);
    }

    // Optimize the queue under tight expert time.
    let allocation = ResourceAllocation {
        available_minutes: 6,
        target_date: None,
        validator_expertise: ValidatorExpertise::Expert,
    };
    let optimized = manager.optimize_review_queue(&list, &allocation);
    assert!(optimized.items.len() <= 2);
    assert!(optimized.strategy.expected_outcomes.estimated_minutes <= 6);

    // Reviewers reject a third of the auto-approvals: the feedback loop
    // should raise the approve threshold.
    let feedback: Vec<ValidationFeedback> = batch
        .results
        .iter()
        .filter(|r| r.decision == Decision::AutoApprove)
        .enumerate()
        .map(|(i, result)| ValidationFeedback {
            memory_id: result.memory_id.clone(),
            original: result.clone(),
            human_decision: if i % 3 == 0 {
                HumanDecision::Rejected
            } else {
                HumanDecision::Validated
            },
            notes: None,
            submitted_at: now,
        })
        .collect();
    assert!(!feedback.is_empty());

    let update = threshold_manager
        .calculate_threshold_update(&feedback, &config)
        .unwrap();
    assert!(
        update.recommended.auto_approve_threshold > config.auto_approve_threshold,
        "a high false-positive rate should raise the approve threshold"
    );
    assert!(!update.reasons.is_empty());
    assert!(update.expected_accuracy_improvement <= 0.10);

    // Applying the recommendation is an explicit step producing a valid
    // config; the original config snapshot is untouched.
    let new_config = update.apply().unwrap();
    assert_eq!(config, ThresholdConfig::default());
    new_config.validate().unwrap();

    // Under the stricter config, nothing that was rejected before gets
    // approved now, and some former approvals drop to review.
    let recheck = engine
        .process_batch(&memories, &new_config, &BatchOptions::default())
        .unwrap();
    assert!(recheck.auto_approved <= batch.auto_approved);
    assert!(recheck.needs_review >= batch.needs_review);
}

#[test]
fn test_decisions_stable_across_runs() {
    init_tracing();
    let engine = ConfidenceEngine::new();
    let config = ThresholdConfig::default();
    let now = reference_time();
    let memories = build_population();

    for memory in &memories {
        let first = engine.evaluate_memory(memory, &config, now).unwrap();
        let second = engine.evaluate_memory(memory, &config, now).unwrap();
        assert_eq!(first.decision, second.decision);
        assert_eq!(first.confidence, second.confidence);
    }
}

#[test]
fn test_sampling_covers_review_overflow() {
    init_tracing();
    let sampler = IntelligentSampler::new();
    let memories = build_population();

    let requirements = CoverageRequirements {
        target_sample_size: 8,
        min_emotional_diversity: 3,
        min_temporal_span_days: 60,
        min_participant_coverage: 4,
        seed: Some(11),
        ..Default::default()
    };
    let sample = sampler.sample_for_validation(&memories, &requirements).unwrap();
    assert_eq!(sample.sample_size, 8);
    assert!(sample.sample_profile.emotions.len() >= 3);

    let analysis = sampler.ensure_representative_coverage(&sample);
    assert!(analysis.overall > 0.0 && analysis.overall <= 1.0);

    // The recommendation step runs before any sampling and names a strategy.
    let strategy = sampler.optimize_validation_efficiency(&memories);
    assert_eq!(strategy.name, "exhaustive");
}

#[test]
fn test_no_feedback_leaves_config_unchanged() {
    init_tracing();
    let threshold_manager = ThresholdManager::new();
    let config = ThresholdConfig::default();

    let update = threshold_manager
        .calculate_threshold_update(&[], &config)
        .unwrap();
    assert!(update.is_noop());
    assert_eq!(update.reasons.len(), 1);
    assert!(update.reasons[0].contains("No feedback provided"));
}

//! Priority manager.
//!
//! Scores records for significance, orders them into an annotated review
//! queue, and optimizes the queue under resource constraints.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use tracing::{debug, info};

use super::strategy::choose_strategy;
use super::{
    CoverageMetrics, ExpectedOutcomes, OptimizedQueue, PrioritizedMemory, PrioritizedMemoryList,
    ResourceAllocation, ReviewContext, SignificanceDistribution, StrategyReport,
};
use crate::significance::{EmotionalSignificanceScore, SignificanceBand, SignificanceWeighter};
use crate::types::MemoryRecord;

/// Factors at or above this value become reviewer focus areas.
const FOCUS_AREA_MIN: f32 = 0.5;
/// Cap on related-record references per queue entry.
const RELATED_LIMIT: usize = 5;

/// Builds and optimizes review queues.
#[derive(Debug, Clone, Default)]
pub struct PriorityManager {
    weighter: SignificanceWeighter,
}

impl PriorityManager {
    /// Create a new manager.
    pub fn new() -> Self {
        Self {
            weighter: SignificanceWeighter::new(),
        }
    }

    /// Build the annotated review queue for a set of records.
    ///
    /// Records are ordered by descending significance; ranks are contiguous
    /// from 1, so the ranks always form a permutation of 1..=N.
    pub fn create_prioritized_list(
        &self,
        memories: &[MemoryRecord],
        now: DateTime<Utc>,
    ) -> PrioritizedMemoryList {
        let mut scored: Vec<(&MemoryRecord, EmotionalSignificanceScore)> = memories
            .iter()
            .map(|memory| (memory, self.weighter.calculate_significance(memory, now)))
            .collect();
        scored.sort_by(|a, b| OrderedFloat(b.1.overall).cmp(&OrderedFloat(a.1.overall)));

        let mut distribution = SignificanceDistribution::default();
        let items: Vec<PrioritizedMemory> = scored
            .into_iter()
            .enumerate()
            .map(|(index, (memory, significance))| {
                distribution.record(significance.band());
                PrioritizedMemory {
                    memory_id: memory.id.clone(),
                    review_context: self.review_context(memory, &significance, memories),
                    priority_rank: index + 1,
                    occurred_at: memory.occurred_at,
                    participants: memory
                        .participants
                        .iter()
                        .map(|p| p.name.clone())
                        .collect(),
                    primary_emotion: memory
                        .emotional_context
                        .as_ref()
                        .and_then(|c| c.primary_emotion.clone()),
                    significance,
                }
            })
            .collect();

        debug!(
            queued = items.len(),
            high = distribution.high,
            medium = distribution.medium,
            low = distribution.low,
            "built prioritized review queue"
        );

        PrioritizedMemoryList {
            items,
            significance_distribution: distribution,
            generated_at: now,
        }
    }

    /// Optimize a review queue under the given resource allocation.
    ///
    /// The strategy is chosen by queue shape and available time; the report
    /// carries expected time, quality, and coverage so the caller can judge
    /// whether the constrained schedule is acceptable.
    pub fn optimize_review_queue(
        &self,
        list: &PrioritizedMemoryList,
        allocation: &ResourceAllocation,
    ) -> OptimizedQueue {
        let strategy = choose_strategy(list, allocation);
        let items = strategy.select(&list.items, allocation);
        let expected_outcomes = expected_outcomes(&items, &list.items, allocation);

        info!(
            strategy = strategy.name(),
            selected = items.len(),
            queued = list.items.len(),
            estimated_minutes = expected_outcomes.estimated_minutes,
            "optimized review queue"
        );

        OptimizedQueue {
            items,
            strategy: StrategyReport {
                name: strategy.name().to_string(),
                parameters: strategy.parameters(allocation),
                expected_outcomes,
            },
        }
    }

    fn review_context(
        &self,
        memory: &MemoryRecord,
        significance: &EmotionalSignificanceScore,
        all: &[MemoryRecord],
    ) -> ReviewContext {
        let mut ranked = significance.factors.named();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let (dominant_name, _) = ranked[0];
        let dominant_label = dominant_name.replace('_', " ");

        let review_reason = match significance.band() {
            SignificanceBand::High => format!(
                "High significance ({:.2}); {} dominates and warrants careful review",
                significance.overall, dominant_label
            ),
            SignificanceBand::Medium => format!(
                "Moderate significance ({:.2}); driven mainly by {}",
                significance.overall, dominant_label
            ),
            SignificanceBand::Low => format!(
                "Low significance ({:.2}); routine check",
                significance.overall
            ),
        };

        let focus_areas: Vec<String> = ranked
            .iter()
            .filter(|(_, value)| *value >= FOCUS_AREA_MIN)
            .map(|(name, _)| name.to_string())
            .collect();

        let related_memory_ids: Vec<String> = all
            .iter()
            .filter(|other| {
                other.id != memory.id
                    && other.participants.iter().any(|p| {
                        memory
                            .participants
                            .iter()
                            .any(|mine| mine.name == p.name)
                    })
            })
            .take(RELATED_LIMIT)
            .map(|other| other.id.clone())
            .collect();

        let mut validation_hints: Vec<String> = focus_areas
            .iter()
            .filter_map(|area| hint_for(area))
            .map(str::to_string)
            .collect();
        if validation_hints.is_empty() {
            validation_hints
                .push("Confirm the record matches its source conversation".to_string());
        }

        ReviewContext {
            review_reason,
            focus_areas,
            related_memory_ids,
            validation_hints,
        }
    }
}

fn hint_for(focus_area: &str) -> Option<&'static str> {
    match focus_area {
        "emotional_intensity" => {
            Some("Verify the recorded mood intensity matches the content's tone")
        }
        "relationship_impact" => {
            Some("Check the participant list and the assessed interaction quality")
        }
        "life_event_significance" => {
            Some("Confirm the life event is described accurately and tagged correctly")
        }
        "participant_vulnerability" => {
            Some("Handle with care: a vulnerable participant is involved")
        }
        "temporal_importance" => Some("Confirm the timestamp and any special-date tags"),
        _ => None,
    }
}

fn expected_outcomes(
    selected: &[PrioritizedMemory],
    full_queue: &[PrioritizedMemory],
    allocation: &ResourceAllocation,
) -> ExpectedOutcomes {
    let estimated_minutes =
        selected.len() as u32 * allocation.validator_expertise.minutes_per_item();

    let total_significance: f32 = full_queue.iter().map(|m| m.significance.overall).sum();
    let selected_significance: f32 = selected.iter().map(|m| m.significance.overall).sum();
    let expected_quality = if total_significance > 0.0 {
        (selected_significance / total_significance).clamp(0.0, 1.0)
    } else {
        1.0
    };

    ExpectedOutcomes {
        estimated_minutes,
        expected_quality,
        coverage: coverage_metrics(selected, full_queue),
    }
}

fn coverage_metrics(
    selected: &[PrioritizedMemory],
    full_queue: &[PrioritizedMemory],
) -> CoverageMetrics {
    let distinct = |items: &[PrioritizedMemory],
                    extract: &dyn Fn(&PrioritizedMemory) -> Vec<String>| {
        let mut values: Vec<String> = items.iter().flat_map(|m| extract(m)).collect();
        values.sort_unstable();
        values.dedup();
        values.len()
    };

    let emotions =
        |m: &PrioritizedMemory| m.primary_emotion.clone().into_iter().collect::<Vec<_>>();
    let participants = |m: &PrioritizedMemory| m.participants.clone();

    let queue_emotions = distinct(full_queue, &emotions);
    let queue_participants = distinct(full_queue, &participants);

    let emotional_range = if queue_emotions == 0 {
        1.0
    } else {
        distinct(selected, &emotions) as f32 / queue_emotions as f32
    };
    let participant_diversity = if queue_participants == 0 {
        1.0
    } else {
        distinct(selected, &participants) as f32 / queue_participants as f32
    };

    let temporal_span_days = match (
        selected.iter().map(|m| m.occurred_at).min(),
        selected.iter().map(|m| m.occurred_at).max(),
    ) {
        (Some(oldest), Some(newest)) => newest.signed_duration_since(oldest).num_days(),
        _ => 0,
    };

    CoverageMetrics {
        emotional_range,
        temporal_span_days,
        participant_diversity,
    }
}

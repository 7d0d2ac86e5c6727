//! Queue-optimization strategies.
//!
//! Three concrete strategies behind a common trait, selected by a policy
//! function, so the priority manager carries no scattered branching logic.

use std::collections::HashMap;

use super::{PrioritizedMemory, PrioritizedMemoryList, ResourceAllocation};
use crate::significance::SignificanceBand;

/// A queue-selection strategy.
///
/// Candidates arrive ordered by priority rank (rank 1 first); the returned
/// selection preserves that order.
pub trait QueueStrategy {
    /// Wire-stable strategy name.
    fn name(&self) -> &'static str;

    /// Select the records to review within the allocation.
    fn select(
        &self,
        candidates: &[PrioritizedMemory],
        allocation: &ResourceAllocation,
    ) -> Vec<PrioritizedMemory>;

    /// Strategy-specific parameters, for the audit report.
    fn parameters(&self, allocation: &ResourceAllocation) -> HashMap<String, String>;
}

/// Pick the strategy fitting the queue shape and available resources.
///
/// Insufficient time with a top-heavy queue focuses on the highest
/// significance; insufficient time with a broad queue samples for
/// representativeness; with enough time for everything, the default
/// significance-weighted strategy applies.
pub fn choose_strategy(
    list: &PrioritizedMemoryList,
    allocation: &ResourceAllocation,
) -> Box<dyn QueueStrategy> {
    let capacity = allocation.capacity();
    if capacity < list.items.len() {
        let distribution = &list.significance_distribution;
        if distribution.high >= distribution.medium.max(distribution.low) {
            Box::new(HighSignificanceFocus)
        } else {
            Box::new(BalancedSampling)
        }
    } else {
        Box::new(SignificanceWeighted)
    }
}

fn band_index(memory: &PrioritizedMemory) -> usize {
    match memory.significance.band() {
        SignificanceBand::High => 0,
        SignificanceBand::Medium => 1,
        SignificanceBand::Low => 2,
    }
}

/// Round-robin split of `capacity` across three groups, capped by group size.
fn spread_quotas(capacity: usize, lens: [usize; 3]) -> [usize; 3] {
    let mut quotas = [0usize; 3];
    let mut remaining = capacity;
    while remaining > 0 {
        let mut progressed = false;
        for i in 0..3 {
            if remaining > 0 && quotas[i] < lens[i] {
                quotas[i] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    quotas
}

/// Evenly spaced picks over a slice, keeping its order.
fn stride_sample<'a>(
    items: &[&'a PrioritizedMemory],
    quota: usize,
) -> Vec<&'a PrioritizedMemory> {
    if quota == 0 {
        return Vec::new();
    }
    if quota >= items.len() {
        return items.to_vec();
    }
    let step = items.len() as f32 / quota as f32;
    (0..quota).map(|i| items[(i as f32 * step) as usize]).collect()
}

/// Process the highest-significance items first; when time is insufficient
/// the lowest-significance items are truncated first.
pub struct HighSignificanceFocus;

impl QueueStrategy for HighSignificanceFocus {
    fn name(&self) -> &'static str {
        "high_significance_focus"
    }

    fn select(
        &self,
        candidates: &[PrioritizedMemory],
        allocation: &ResourceAllocation,
    ) -> Vec<PrioritizedMemory> {
        let capacity = allocation.capacity().min(candidates.len());
        candidates[..capacity].to_vec()
    }

    fn parameters(&self, allocation: &ResourceAllocation) -> HashMap<String, String> {
        HashMap::from([
            ("order".to_string(), "significance_desc".to_string()),
            (
                "truncation".to_string(),
                "lowest_significance_first".to_string(),
            ),
            ("capacity".to_string(), allocation.capacity().to_string()),
        ])
    }
}

/// Spread the selection across significance tiers, time periods, and
/// participants for representativeness.
pub struct BalancedSampling;

impl QueueStrategy for BalancedSampling {
    fn name(&self) -> &'static str {
        "balanced_sampling"
    }

    fn select(
        &self,
        candidates: &[PrioritizedMemory],
        allocation: &ResourceAllocation,
    ) -> Vec<PrioritizedMemory> {
        let capacity = allocation.capacity().min(candidates.len());

        let mut bands: [Vec<&PrioritizedMemory>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for memory in candidates {
            bands[band_index(memory)].push(memory);
        }
        // Stratify each band over time so the selection spans the queue's
        // temporal range, not just its most significant cluster.
        for band in bands.iter_mut() {
            band.sort_by_key(|m| m.occurred_at);
        }

        let quotas = spread_quotas(capacity, [bands[0].len(), bands[1].len(), bands[2].len()]);
        let mut selected: Vec<PrioritizedMemory> = bands
            .iter()
            .zip(quotas)
            .flat_map(|(band, quota)| stride_sample(band, quota))
            .cloned()
            .collect();
        selected.sort_by_key(|m| m.priority_rank);
        selected
    }

    fn parameters(&self, allocation: &ResourceAllocation) -> HashMap<String, String> {
        HashMap::from([
            ("tiers".to_string(), "high,medium,low".to_string()),
            ("time_stratified".to_string(), "true".to_string()),
            ("capacity".to_string(), allocation.capacity().to_string()),
        ])
    }
}

/// Default strategy: allocate review slots across significance bands in
/// proportion to each band's share of total significance, filling each
/// band's slots in priority order.
pub struct SignificanceWeighted;

impl QueueStrategy for SignificanceWeighted {
    fn name(&self) -> &'static str {
        "significance_weighted"
    }

    fn select(
        &self,
        candidates: &[PrioritizedMemory],
        allocation: &ResourceAllocation,
    ) -> Vec<PrioritizedMemory> {
        let capacity = allocation.capacity().min(candidates.len());
        if capacity == candidates.len() {
            return candidates.to_vec();
        }

        let mut bands: [Vec<&PrioritizedMemory>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for memory in candidates {
            bands[band_index(memory)].push(memory);
        }

        let weights: Vec<f32> = bands
            .iter()
            .map(|band| band.iter().map(|m| m.significance.overall).sum())
            .collect();
        let total: f32 = weights.iter().sum();

        let mut quotas = [0usize; 3];
        if total > 0.0 {
            for i in 0..3 {
                quotas[i] = ((capacity as f32 * weights[i] / total) as usize).min(bands[i].len());
            }
        }
        // Fill any remainder left by rounding, highest band first.
        let mut assigned: usize = quotas.iter().sum();
        while assigned < capacity {
            let mut progressed = false;
            for i in 0..3 {
                if assigned < capacity && quotas[i] < bands[i].len() {
                    quotas[i] += 1;
                    assigned += 1;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        let mut selected: Vec<PrioritizedMemory> = bands
            .iter()
            .zip(quotas)
            .flat_map(|(band, quota)| band.iter().take(quota))
            .map(|m| (*m).clone())
            .collect();
        selected.sort_by_key(|m| m.priority_rank);
        selected
    }

    fn parameters(&self, allocation: &ResourceAllocation) -> HashMap<String, String> {
        HashMap::from([
            (
                "allocation".to_string(),
                "proportional_to_significance".to_string(),
            ),
            ("capacity".to_string(), allocation.capacity().to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::{ReviewContext, SignificanceDistribution, ValidatorExpertise};
    use crate::significance::{EmotionalSignificanceScore, SignificanceFactors};
    use chrono::{Duration, TimeZone, Utc};

    fn entry(rank: usize, overall: f32, days_ago: i64) -> PrioritizedMemory {
        let now = Utc.with_ymd_and_hms(2025, 6, 17, 12, 0, 0).unwrap();
        PrioritizedMemory {
            memory_id: format!("mem-{}", rank),
            significance: EmotionalSignificanceScore {
                overall,
                factors: SignificanceFactors::uniform(overall),
                narrative: String::new(),
            },
            priority_rank: rank,
            review_context: ReviewContext {
                review_reason: String::new(),
                focus_areas: vec![],
                related_memory_ids: vec![],
                validation_hints: vec![],
            },
            occurred_at: now - Duration::days(days_ago),
            participants: vec![],
            primary_emotion: None,
        }
    }

    fn allocation(minutes: u32) -> ResourceAllocation {
        ResourceAllocation {
            available_minutes: minutes,
            target_date: None,
            validator_expertise: ValidatorExpertise::Expert,
        }
    }

    fn queue(items: Vec<PrioritizedMemory>) -> PrioritizedMemoryList {
        let mut distribution = SignificanceDistribution::default();
        for item in &items {
            distribution.record(item.significance.band());
        }
        PrioritizedMemoryList {
            items,
            significance_distribution: distribution,
            generated_at: Utc.with_ymd_and_hms(2025, 6, 17, 12, 0, 0).unwrap(),
        }
    }

    fn ranked(overalls: &[f32]) -> Vec<PrioritizedMemory> {
        overalls
            .iter()
            .enumerate()
            .map(|(i, overall)| entry(i + 1, *overall, i as i64))
            .collect()
    }

    #[test]
    fn test_high_focus_truncates_lowest_first() {
        let candidates = ranked(&[0.9, 0.85, 0.8, 0.75, 0.3, 0.2]);
        // 12 minutes at expert pace: room for 4 of 6.
        let selected = HighSignificanceFocus.select(&candidates, &allocation(12));

        assert_eq!(selected.len(), 4);
        let ranks: Vec<usize> = selected.iter().map(|m| m.priority_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_balanced_covers_all_tiers() {
        let candidates = ranked(&[0.9, 0.8, 0.6, 0.55, 0.5, 0.3, 0.2, 0.1]);
        // Room for 6 of 8.
        let selected = BalancedSampling.select(&candidates, &allocation(18));

        assert_eq!(selected.len(), 6);
        let has_band = |band: SignificanceBand| {
            selected.iter().any(|m| m.significance.band() == band)
        };
        assert!(has_band(SignificanceBand::High));
        assert!(has_band(SignificanceBand::Medium));
        assert!(has_band(SignificanceBand::Low));
        // Review order is preserved.
        let ranks: Vec<usize> = selected.iter().map(|m| m.priority_rank).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_weighted_favors_heavier_bands() {
        // Heavy high band, light low band.
        let candidates = ranked(&[0.95, 0.9, 0.85, 0.8, 0.75, 0.3, 0.25, 0.2]);
        // Room for 5 of 8.
        let selected = SignificanceWeighted.select(&candidates, &allocation(15));

        assert_eq!(selected.len(), 5);
        let high = selected
            .iter()
            .filter(|m| m.significance.band() == SignificanceBand::High)
            .count();
        let low = selected
            .iter()
            .filter(|m| m.significance.band() == SignificanceBand::Low)
            .count();
        assert!(high > low);
    }

    #[test]
    fn test_weighted_selects_everything_when_time_allows() {
        let candidates = ranked(&[0.9, 0.5, 0.2]);
        let selected = SignificanceWeighted.select(&candidates, &allocation(60));
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_policy_picks_high_focus_for_top_heavy_shortfall() {
        let list = queue(ranked(&[0.9, 0.85, 0.8, 0.75, 0.5, 0.2]));
        let strategy = choose_strategy(&list, &allocation(9));
        assert_eq!(strategy.name(), "high_significance_focus");
    }

    #[test]
    fn test_policy_picks_balanced_for_broad_shortfall() {
        let list = queue(ranked(&[0.8, 0.6, 0.55, 0.5, 0.3, 0.25, 0.2, 0.1]));
        let strategy = choose_strategy(&list, &allocation(9));
        assert_eq!(strategy.name(), "balanced_sampling");
    }

    #[test]
    fn test_policy_defaults_to_weighted_with_enough_time() {
        let list = queue(ranked(&[0.9, 0.5, 0.2]));
        let strategy = choose_strategy(&list, &allocation(240));
        assert_eq!(strategy.name(), "significance_weighted");
    }

    #[test]
    fn test_spread_quotas_caps_at_band_sizes() {
        assert_eq!(spread_quotas(6, [4, 1, 1]), [4, 1, 1]);
        assert_eq!(spread_quotas(3, [4, 4, 4]), [1, 1, 1]);
        assert_eq!(spread_quotas(5, [1, 10, 10]), [1, 2, 2]);
    }

    #[test]
    fn test_stride_sample_spans_range() {
        let items: Vec<PrioritizedMemory> =
            (0..10).map(|i| entry(i + 1, 0.5, i as i64)).collect();
        let refs: Vec<&PrioritizedMemory> = items.iter().collect();
        let sampled = stride_sample(&refs, 3);

        assert_eq!(sampled.len(), 3);
        // First element included, and picks are spread rather than clustered.
        assert_eq!(sampled[0].priority_rank, 1);
        assert!(sampled[2].priority_rank >= 7);
    }
}

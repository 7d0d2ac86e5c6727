//! Coverage-constrained sampling.
//!
//! When the needs-review population exceeds review capacity, the sampler
//! selects a subset that satisfies stated diversity quotas, captures a
//! population profile for later coverage analysis, and recommends a
//! sampling strategy before execution. Selection is seeded so a sample can
//! be reproduced exactly.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

use crate::error::{VerityError, VerityResult};
use crate::types::MemoryRecord;

/// Seed used when the requirements don't specify one.
pub const DEFAULT_SAMPLING_SEED: u64 = 42;

/// Populations below this size are reviewed exhaustively.
pub const SMALL_POPULATION: usize = 50;

/// Extraction-quality tier of a record.
///
/// Tier boundaries mirror the default decision thresholds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

impl QualityTier {
    /// Tier for an extraction confidence; missing values land in Medium.
    pub fn from_confidence(confidence: Option<f32>) -> Self {
        let confidence = confidence.unwrap_or(0.5);
        if confidence >= 0.75 {
            QualityTier::High
        } else if confidence >= 0.5 {
            QualityTier::Medium
        } else {
            QualityTier::Low
        }
    }
}

/// Per-tier share of a sample, as fractions of the target size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierQuotas {
    pub high: f32,
    pub medium: f32,
    pub low: f32,
}

impl Default for TierQuotas {
    fn default() -> Self {
        // Borderline extractions are where review effort pays off most.
        Self {
            high: 0.3,
            medium: 0.4,
            low: 0.3,
        }
    }
}

/// Per-tier record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierCounts {
    fn record(&mut self, tier: QualityTier) {
        match tier {
            QualityTier::High => self.high += 1,
            QualityTier::Medium => self.medium += 1,
            QualityTier::Low => self.low += 1,
        }
    }
}

/// Diversity quotas a validation sample must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageRequirements {
    /// Desired sample size (capped at the population size).
    pub target_sample_size: usize,
    /// Minimum number of distinct primary emotions in the sample.
    pub min_emotional_diversity: usize,
    /// Minimum days between the sample's oldest and newest records.
    pub min_temporal_span_days: i64,
    /// Minimum number of distinct participants in the sample.
    pub min_participant_coverage: usize,
    /// Communication patterns that must each appear in the sample.
    pub required_relationship_patterns: Vec<String>,
    /// Per-tier share of the sample.
    pub tier_quotas: TierQuotas,
    /// Reproducibility seed; defaults to [`DEFAULT_SAMPLING_SEED`].
    pub seed: Option<u64>,
}

impl Default for CoverageRequirements {
    fn default() -> Self {
        Self {
            target_sample_size: 25,
            min_emotional_diversity: 3,
            min_temporal_span_days: 30,
            min_participant_coverage: 5,
            required_relationship_patterns: Vec::new(),
            tier_quotas: TierQuotas::default(),
            seed: None,
        }
    }
}

/// Diversity profile of a set of records.
///
/// Captured for both the population and the sample at sampling time, so
/// coverage analysis is a function of the sample alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationProfile {
    /// Number of records.
    pub size: usize,
    /// Distinct primary emotions, sorted.
    pub emotions: Vec<String>,
    /// Distinct participant names, sorted.
    pub participants: Vec<String>,
    /// Distinct communication patterns, sorted.
    pub relationship_patterns: Vec<String>,
    /// Oldest record timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest: Option<DateTime<Utc>>,
    /// Newest record timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<DateTime<Utc>>,
    /// Records per quality tier.
    pub tier_counts: TierCounts,
}

impl PopulationProfile {
    /// Profile a set of records.
    pub fn of(memories: &[MemoryRecord]) -> Self {
        let mut emotions = BTreeSet::new();
        let mut participants = BTreeSet::new();
        let mut patterns = BTreeSet::new();
        let mut tier_counts = TierCounts::default();

        for memory in memories {
            if let Some(emotion) = memory
                .emotional_context
                .as_ref()
                .and_then(|c| c.primary_emotion.as_ref())
            {
                emotions.insert(emotion.clone());
            }
            for participant in &memory.participants {
                participants.insert(participant.name.clone());
            }
            if let Some(dynamics) = memory.relationship_dynamics.as_ref() {
                for pattern in &dynamics.communication_patterns {
                    patterns.insert(pattern.clone());
                }
            }
            tier_counts.record(QualityTier::from_confidence(memory.extraction_confidence));
        }

        Self {
            size: memories.len(),
            emotions: emotions.into_iter().collect(),
            participants: participants.into_iter().collect(),
            relationship_patterns: patterns.into_iter().collect(),
            earliest: memories.iter().map(|m| m.occurred_at).min(),
            latest: memories.iter().map(|m| m.occurred_at).max(),
            tier_counts,
        }
    }

    /// Days between the oldest and newest record, 0 when under two records.
    pub fn span_days(&self) -> i64 {
        match (self.earliest, self.latest) {
            (Some(earliest), Some(latest)) => latest.signed_duration_since(earliest).num_days(),
            _ => 0,
        }
    }

    /// Per-tier fractions of the profiled set.
    fn tier_fractions(&self) -> (f32, f32, f32) {
        if self.size == 0 {
            return (0.0, 0.0, 0.0);
        }
        let size = self.size as f32;
        (
            self.tier_counts.high as f32 / size,
            self.tier_counts.medium as f32 / size,
            self.tier_counts.low as f32 / size,
        )
    }
}

/// The result of a sampling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampledMemories {
    /// Ids of the selected records, in population order.
    pub memory_ids: Vec<String>,
    /// Population size at sampling time.
    pub population_size: usize,
    /// Number of selected records.
    pub sample_size: usize,
    /// sample_size / population_size.
    pub sampling_rate: f32,
    /// Strategy that produced the sample.
    pub strategy: String,
    /// Seed the selection ran with; replaying it reproduces the sample.
    pub seed: u64,
    /// Profile of the full population.
    pub population_profile: PopulationProfile,
    /// Profile of the selected records.
    pub sample_profile: PopulationProfile,
}

/// Coverage dimensions reported by the gap analysis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CoverageDimension {
    Emotional,
    Temporal,
    Participant,
    RelationshipPattern,
    QualityTier,
}

/// An explicit coverage gap in a sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageGap {
    /// Which dimension is short.
    pub dimension: CoverageDimension,
    /// What is missing, in prose.
    pub description: String,
}

/// Per-dimension coverage of a sample against its population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageAnalysis {
    /// Share of the population's emotions represented, in [0, 1].
    pub emotional_coverage: f32,
    /// Sample temporal span relative to the population's, in [0, 1].
    pub temporal_coverage: f32,
    /// Share of the population's participants represented, in [0, 1].
    pub participant_coverage: f32,
    /// Share of the population's communication patterns represented.
    pub relationship_coverage: f32,
    /// Agreement of the sample's tier mix with the population's, in [0, 1].
    pub tier_coverage: f32,
    /// Mean of the five dimension scores.
    pub overall: f32,
    /// Explicit gaps, empty when the sample is representative.
    pub gaps: Vec<CoverageGap>,
}

/// Axes a stratified sampling run can split on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StratificationAxis {
    Emotion,
    TimePeriod,
    Participant,
    QualityTier,
}

/// Per-tier fractions, used for importance weights and expected mixes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub high: f32,
    pub medium: f32,
    pub low: f32,
}

/// A recommended sampling approach, reported before execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingStrategy {
    /// Strategy name.
    pub name: String,
    /// Axes the selection should stratify on.
    pub stratification_axes: Vec<StratificationAxis>,
    /// Importance weights over quality tiers.
    pub importance_weights: TierDistribution,
    /// Expected overall coverage score for this strategy.
    pub expected_coverage: f32,
    /// Expected quality-tier mix of the resulting sample.
    pub expected_tier_distribution: TierDistribution,
}

/// Selects coverage-constrained validation samples.
#[derive(Debug, Clone, Default)]
pub struct IntelligentSampler;

impl IntelligentSampler {
    /// Create a new sampler.
    pub fn new() -> Self {
        Self
    }

    /// Select a subset satisfying the stated diversity quotas.
    ///
    /// Quota passes run in priority order (required patterns, emotional
    /// diversity, temporal span, participant coverage, tier quotas), then
    /// seeded random fill brings the sample up to the target size.
    pub fn sample_for_validation(
        &self,
        memories: &[MemoryRecord],
        requirements: &CoverageRequirements,
    ) -> VerityResult<SampledMemories> {
        if memories.is_empty() {
            return Err(VerityError::empty_population());
        }
        if requirements.target_sample_size == 0 {
            return Err(VerityError::sampling("Target sample size must be at least 1"));
        }

        let target = requirements.target_sample_size.min(memories.len());
        let seed = requirements.seed.unwrap_or(DEFAULT_SAMPLING_SEED);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut selected: BTreeSet<usize> = BTreeSet::new();

        self.select_required_patterns(memories, requirements, target, &mut rng, &mut selected);
        self.select_for_emotions(memories, requirements, target, &mut rng, &mut selected);
        self.select_for_temporal_span(memories, requirements, target, &mut selected);
        self.select_for_participants(memories, requirements, target, &mut rng, &mut selected);
        self.select_for_tier_quotas(memories, requirements, target, &mut rng, &mut selected);

        // Seeded random fill up to the target.
        let mut rest: Vec<usize> =
            (0..memories.len()).filter(|i| !selected.contains(i)).collect();
        rest.shuffle(&mut rng);
        for index in rest {
            if selected.len() >= target {
                break;
            }
            selected.insert(index);
        }

        let sample: Vec<&MemoryRecord> = selected.iter().map(|&i| &memories[i]).collect();
        let sample_owned: Vec<MemoryRecord> = sample.iter().map(|m| (*m).clone()).collect();
        let result = SampledMemories {
            memory_ids: sample.iter().map(|m| m.id.clone()).collect(),
            population_size: memories.len(),
            sample_size: selected.len(),
            sampling_rate: selected.len() as f32 / memories.len() as f32,
            strategy: "stratified_coverage".to_string(),
            seed,
            population_profile: PopulationProfile::of(memories),
            sample_profile: PopulationProfile::of(&sample_owned),
        };

        info!(
            population = result.population_size,
            sample = result.sample_size,
            rate = result.sampling_rate,
            seed,
            "sampled validation subset"
        );
        Ok(result)
    }

    /// Report per-dimension coverage of a sample and its explicit gaps.
    pub fn ensure_representative_coverage(&self, sample: &SampledMemories) -> CoverageAnalysis {
        let population = &sample.population_profile;
        let selected = &sample.sample_profile;

        let ratio = |have: usize, want: usize| {
            if want == 0 {
                1.0
            } else {
                (have as f32 / want as f32).clamp(0.0, 1.0)
            }
        };

        let emotional_coverage = ratio(selected.emotions.len(), population.emotions.len());
        let participant_coverage =
            ratio(selected.participants.len(), population.participants.len());
        let relationship_coverage = ratio(
            selected.relationship_patterns.len(),
            population.relationship_patterns.len(),
        );
        let temporal_coverage = if population.span_days() == 0 {
            1.0
        } else {
            (selected.span_days() as f32 / population.span_days() as f32).clamp(0.0, 1.0)
        };

        // Complement of the total variation distance between tier mixes.
        let (ph, pm, pl) = population.tier_fractions();
        let (sh, sm, sl) = selected.tier_fractions();
        let tier_coverage =
            1.0 - 0.5 * ((sh - ph).abs() + (sm - pm).abs() + (sl - pl).abs());

        let overall = (emotional_coverage
            + temporal_coverage
            + participant_coverage
            + relationship_coverage
            + tier_coverage)
            / 5.0;

        let mut gaps = Vec::new();
        let missing = |have: &[String], want: &[String]| -> Vec<String> {
            want.iter().filter(|v| !have.contains(v)).cloned().collect()
        };

        let missing_emotions = missing(&selected.emotions, &population.emotions);
        if !missing_emotions.is_empty() {
            gaps.push(CoverageGap {
                dimension: CoverageDimension::Emotional,
                description: format!(
                    "Emotions underrepresented in the sample: {}",
                    missing_emotions
                        .iter()
                        .take(5)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }
        if temporal_coverage < 0.6 {
            gaps.push(CoverageGap {
                dimension: CoverageDimension::Temporal,
                description: format!(
                    "Sample spans {} days of the population's {}",
                    selected.span_days(),
                    population.span_days()
                ),
            });
        }
        let absent_participants =
            population.participants.len() - selected.participants.len().min(population.participants.len());
        if absent_participants > 0 {
            gaps.push(CoverageGap {
                dimension: CoverageDimension::Participant,
                description: format!(
                    "{} of {} participants absent from the sample",
                    absent_participants,
                    population.participants.len()
                ),
            });
        }
        let missing_patterns =
            missing(&selected.relationship_patterns, &population.relationship_patterns);
        if !missing_patterns.is_empty() {
            gaps.push(CoverageGap {
                dimension: CoverageDimension::RelationshipPattern,
                description: format!(
                    "Communication patterns missing from the sample: {}",
                    missing_patterns.join(", ")
                ),
            });
        }
        if tier_coverage < 0.8 {
            gaps.push(CoverageGap {
                dimension: CoverageDimension::QualityTier,
                description: "Quality-tier mix diverges from the population".to_string(),
            });
        }

        CoverageAnalysis {
            emotional_coverage,
            temporal_coverage,
            participant_coverage,
            relationship_coverage,
            tier_coverage,
            overall,
            gaps,
        }
    }

    /// Recommend a sampling strategy for a dataset before executing it.
    pub fn optimize_validation_efficiency(&self, memories: &[MemoryRecord]) -> SamplingStrategy {
        let profile = PopulationProfile::of(memories);
        let (high, medium, low) = profile.tier_fractions();
        let population_mix = TierDistribution { high, medium, low };

        if profile.size < SMALL_POPULATION {
            return SamplingStrategy {
                name: "exhaustive".to_string(),
                stratification_axes: Vec::new(),
                importance_weights: TierDistribution {
                    high: 1.0 / 3.0,
                    medium: 1.0 / 3.0,
                    low: 1.0 / 3.0,
                },
                expected_coverage: 1.0,
                expected_tier_distribution: population_mix,
            };
        }

        let diverse = profile.emotions.len() >= 5 || profile.participants.len() >= 10;
        if diverse {
            SamplingStrategy {
                name: "multi_axis_stratified".to_string(),
                stratification_axes: vec![
                    StratificationAxis::Emotion,
                    StratificationAxis::TimePeriod,
                    StratificationAxis::Participant,
                    StratificationAxis::QualityTier,
                ],
                importance_weights: TierDistribution {
                    high: 1.0 / 3.0,
                    medium: 1.0 / 3.0,
                    low: 1.0 / 3.0,
                },
                expected_coverage: 0.85,
                expected_tier_distribution: population_mix,
            }
        } else {
            // Homogeneous data: stratify on quality alone and spend review
            // effort where extraction confidence is weakest.
            let weights = TierDistribution {
                high: 0.2,
                medium: 0.3,
                low: 0.5,
            };
            SamplingStrategy {
                name: "importance_weighted".to_string(),
                stratification_axes: vec![StratificationAxis::QualityTier],
                importance_weights: weights,
                expected_coverage: 0.7,
                expected_tier_distribution: weights,
            }
        }
    }

    fn select_required_patterns(
        &self,
        memories: &[MemoryRecord],
        requirements: &CoverageRequirements,
        target: usize,
        rng: &mut StdRng,
        selected: &mut BTreeSet<usize>,
    ) {
        for pattern in &requirements.required_relationship_patterns {
            if selected.len() >= target {
                break;
            }
            if selected.iter().any(|&i| has_pattern(&memories[i], pattern)) {
                continue;
            }
            let candidates: Vec<usize> = (0..memories.len())
                .filter(|i| !selected.contains(i) && has_pattern(&memories[*i], pattern))
                .collect();
            if let Some(&index) = candidates.choose(rng) {
                selected.insert(index);
            }
        }
    }

    fn select_for_emotions(
        &self,
        memories: &[MemoryRecord],
        requirements: &CoverageRequirements,
        target: usize,
        rng: &mut StdRng,
        selected: &mut BTreeSet<usize>,
    ) {
        let mut covered: BTreeSet<String> = selected
            .iter()
            .filter_map(|&i| primary_emotion(&memories[i]))
            .collect();

        // Walk the population's emotions in sorted order for determinism.
        let population_emotions: BTreeSet<String> =
            memories.iter().filter_map(|m| primary_emotion(m)).collect();

        for emotion in population_emotions {
            if selected.len() >= target || covered.len() >= requirements.min_emotional_diversity
            {
                break;
            }
            if covered.contains(&emotion) {
                continue;
            }
            let candidates: Vec<usize> = (0..memories.len())
                .filter(|i| {
                    !selected.contains(i)
                        && primary_emotion(&memories[*i]).as_deref() == Some(emotion.as_str())
                })
                .collect();
            if let Some(&index) = candidates.choose(rng) {
                selected.insert(index);
                covered.insert(emotion);
            }
        }
    }

    fn select_for_temporal_span(
        &self,
        memories: &[MemoryRecord],
        requirements: &CoverageRequirements,
        target: usize,
        selected: &mut BTreeSet<usize>,
    ) {
        if requirements.min_temporal_span_days == 0 {
            return;
        }
        let span = |indices: &BTreeSet<usize>| -> i64 {
            let times: Vec<DateTime<Utc>> =
                indices.iter().map(|&i| memories[i].occurred_at).collect();
            match (times.iter().min(), times.iter().max()) {
                (Some(min), Some(max)) => max.signed_duration_since(*min).num_days(),
                _ => 0,
            }
        };
        if span(selected) >= requirements.min_temporal_span_days {
            return;
        }

        let earliest = (0..memories.len()).min_by_key(|&i| memories[i].occurred_at);
        let latest = (0..memories.len()).max_by_key(|&i| memories[i].occurred_at);
        for anchor in [earliest, latest].into_iter().flatten() {
            if selected.len() >= target {
                break;
            }
            selected.insert(anchor);
        }
    }

    fn select_for_participants(
        &self,
        memories: &[MemoryRecord],
        requirements: &CoverageRequirements,
        target: usize,
        rng: &mut StdRng,
        selected: &mut BTreeSet<usize>,
    ) {
        let mut covered: BTreeSet<String> = selected
            .iter()
            .flat_map(|&i| memories[i].participants.iter().map(|p| p.name.clone()))
            .collect();

        let mut order: Vec<usize> = (0..memories.len()).collect();
        order.shuffle(rng);
        for index in order {
            if covered.len() >= requirements.min_participant_coverage
                || selected.len() >= target
            {
                break;
            }
            if selected.contains(&index) {
                continue;
            }
            let adds_new = memories[index]
                .participants
                .iter()
                .any(|p| !covered.contains(&p.name));
            if adds_new {
                selected.insert(index);
                for participant in &memories[index].participants {
                    covered.insert(participant.name.clone());
                }
            }
        }
    }

    fn select_for_tier_quotas(
        &self,
        memories: &[MemoryRecord],
        requirements: &CoverageRequirements,
        target: usize,
        rng: &mut StdRng,
        selected: &mut BTreeSet<usize>,
    ) {
        let quotas = [
            (QualityTier::High, requirements.tier_quotas.high),
            (QualityTier::Medium, requirements.tier_quotas.medium),
            (QualityTier::Low, requirements.tier_quotas.low),
        ];
        for (tier, fraction) in quotas {
            let desired = (fraction * target as f32).round() as usize;
            let mut current = selected
                .iter()
                .filter(|&&i| {
                    QualityTier::from_confidence(memories[i].extraction_confidence) == tier
                })
                .count();
            let mut candidates: Vec<usize> = (0..memories.len())
                .filter(|i| {
                    !selected.contains(i)
                        && QualityTier::from_confidence(memories[*i].extraction_confidence)
                            == tier
                })
                .collect();
            candidates.shuffle(rng);
            for index in candidates {
                if current >= desired || selected.len() >= target {
                    break;
                }
                selected.insert(index);
                current += 1;
            }
        }
    }
}

fn has_pattern(memory: &MemoryRecord, pattern: &str) -> bool {
    memory
        .relationship_dynamics
        .as_ref()
        .map(|d| {
            d.communication_patterns
                .iter()
                .any(|p| p.eq_ignore_ascii_case(pattern))
        })
        .unwrap_or(false)
}

fn primary_emotion(memory: &MemoryRecord) -> Option<String> {
    memory
        .emotional_context
        .as_ref()
        .and_then(|c| c.primary_emotion.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmotionalContext, Participant, RelationshipDynamics};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 17, 12, 0, 0).unwrap()
    }

    /// A varied population: five emotions, eight participants, three
    /// quality tiers, ~90 days of history, occasional patterns.
    fn population(size: usize) -> Vec<MemoryRecord> {
        let emotions = ["joy", "sadness", "anger", "fear", "surprise"];
        let names = ["Ana", "Ben", "Cleo", "Dan", "Eve", "Finn", "Gus", "Hana"];
        let confidences = [0.9, 0.6, 0.3];

        (0..size)
            .map(|i| {
                let mut record = MemoryRecord::new(
                    format!("mem-{}", i),
                    "A conversation worth remembering for a while",
                    now() - Duration::days((i as i64 * 90) / size.max(1) as i64),
                )
                .with_extraction_confidence(confidences[i % confidences.len()])
                .with_emotional_context(
                    EmotionalContext::new().with_primary_emotion(emotions[i % emotions.len()]),
                )
                .with_participant(Participant::new(names[i % names.len()]));
                if i % 4 == 0 {
                    record = record.with_relationship_dynamics(
                        RelationshipDynamics::new().with_communication_pattern("support"),
                    );
                }
                if i % 7 == 0 {
                    record = record.with_relationship_dynamics(
                        RelationshipDynamics::new().with_communication_pattern("conflict"),
                    );
                }
                record
            })
            .collect()
    }

    #[test]
    fn test_empty_population_rejected() {
        let sampler = IntelligentSampler::new();
        let result = sampler.sample_for_validation(&[], &CoverageRequirements::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_target_rejected() {
        let sampler = IntelligentSampler::new();
        let requirements = CoverageRequirements {
            target_sample_size: 0,
            ..Default::default()
        };
        assert!(sampler
            .sample_for_validation(&population(10), &requirements)
            .is_err());
    }

    #[test]
    fn test_sample_records_sizes_and_rate() {
        let sampler = IntelligentSampler::new();
        let memories = population(40);
        let requirements = CoverageRequirements {
            target_sample_size: 10,
            ..Default::default()
        };

        let sample = sampler.sample_for_validation(&memories, &requirements).unwrap();
        assert_eq!(sample.population_size, 40);
        assert_eq!(sample.sample_size, 10);
        assert_eq!(sample.memory_ids.len(), 10);
        assert!((sample.sampling_rate - 0.25).abs() < 1e-6);
        assert_eq!(sample.seed, DEFAULT_SAMPLING_SEED);
    }

    #[test]
    fn test_same_seed_reproduces_sample() {
        let sampler = IntelligentSampler::new();
        let memories = population(40);
        let requirements = CoverageRequirements {
            target_sample_size: 8,
            seed: Some(7),
            ..Default::default()
        };

        let first = sampler.sample_for_validation(&memories, &requirements).unwrap();
        let second = sampler.sample_for_validation(&memories, &requirements).unwrap();
        assert_eq!(first.memory_ids, second.memory_ids);
        assert_eq!(first.seed, 7);
    }

    #[test]
    fn test_emotional_diversity_quota_met() {
        let sampler = IntelligentSampler::new();
        let memories = population(40);
        let requirements = CoverageRequirements {
            target_sample_size: 6,
            min_emotional_diversity: 4,
            ..Default::default()
        };

        let sample = sampler.sample_for_validation(&memories, &requirements).unwrap();
        assert!(sample.sample_profile.emotions.len() >= 4);
    }

    #[test]
    fn test_required_pattern_included() {
        let sampler = IntelligentSampler::new();
        let memories = population(40);
        let requirements = CoverageRequirements {
            target_sample_size: 5,
            required_relationship_patterns: vec!["conflict".to_string()],
            ..Default::default()
        };

        let sample = sampler.sample_for_validation(&memories, &requirements).unwrap();
        assert!(sample
            .sample_profile
            .relationship_patterns
            .iter()
            .any(|p| p == "conflict"));
    }

    #[test]
    fn test_temporal_anchors_included() {
        let sampler = IntelligentSampler::new();
        let memories = population(40);
        let requirements = CoverageRequirements {
            target_sample_size: 10,
            min_temporal_span_days: 87,
            ..Default::default()
        };

        let sample = sampler.sample_for_validation(&memories, &requirements).unwrap();
        let population_profile = &sample.population_profile;
        assert_eq!(sample.sample_profile.earliest, population_profile.earliest);
        assert_eq!(sample.sample_profile.latest, population_profile.latest);
    }

    #[test]
    fn test_full_sample_has_full_coverage() {
        let sampler = IntelligentSampler::new();
        let memories = population(20);
        let requirements = CoverageRequirements {
            target_sample_size: 20,
            ..Default::default()
        };

        let sample = sampler.sample_for_validation(&memories, &requirements).unwrap();
        let analysis = sampler.ensure_representative_coverage(&sample);

        assert!((analysis.overall - 1.0).abs() < 1e-6);
        assert!(analysis.gaps.is_empty());
    }

    #[test]
    fn test_narrow_sample_reports_gaps() {
        let sampler = IntelligentSampler::new();
        let memories = population(40);
        // A tiny sample with no diversity requirements at all.
        let requirements = CoverageRequirements {
            target_sample_size: 2,
            min_emotional_diversity: 0,
            min_temporal_span_days: 0,
            min_participant_coverage: 0,
            ..Default::default()
        };

        let sample = sampler.sample_for_validation(&memories, &requirements).unwrap();
        let analysis = sampler.ensure_representative_coverage(&sample);

        assert!(analysis.overall < 1.0);
        assert!(!analysis.gaps.is_empty());
        assert!(analysis
            .gaps
            .iter()
            .any(|gap| gap.dimension == CoverageDimension::Participant));
    }

    #[test]
    fn test_small_dataset_reviewed_exhaustively() {
        let sampler = IntelligentSampler::new();
        let strategy = sampler.optimize_validation_efficiency(&population(20));

        assert_eq!(strategy.name, "exhaustive");
        assert!(strategy.stratification_axes.is_empty());
        assert!((strategy.expected_coverage - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_large_diverse_dataset_stratifies_multi_axis() {
        let sampler = IntelligentSampler::new();
        let strategy = sampler.optimize_validation_efficiency(&population(120));

        assert_eq!(strategy.name, "multi_axis_stratified");
        assert!(strategy
            .stratification_axes
            .contains(&StratificationAxis::Emotion));
        assert!(strategy
            .stratification_axes
            .contains(&StratificationAxis::QualityTier));
    }

    #[test]
    fn test_large_homogeneous_dataset_weights_by_importance() {
        let sampler = IntelligentSampler::new();
        // One emotion, one participant, one tier.
        let memories: Vec<MemoryRecord> = (0..80)
            .map(|i| {
                MemoryRecord::new(
                    format!("mem-{}", i),
                    "Routine check-in call",
                    now() - Duration::days(i),
                )
                .with_extraction_confidence(0.9)
                .with_emotional_context(
                    EmotionalContext::new().with_primary_emotion("contentment"),
                )
                .with_participant(Participant::new("Ana"))
            })
            .collect();

        let strategy = sampler.optimize_validation_efficiency(&memories);
        assert_eq!(strategy.name, "importance_weighted");
        assert_eq!(
            strategy.stratification_axes,
            vec![StratificationAxis::QualityTier]
        );
        // Review effort skews toward the weakest extractions.
        assert!(strategy.importance_weights.low > strategy.importance_weights.high);
    }
}

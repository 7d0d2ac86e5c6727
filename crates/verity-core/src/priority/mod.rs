//! Review-queue prioritization.
//!
//! Builds an ordered, annotated review queue from significance scores and
//! optimizes it under time and expertise constraints via one of three
//! selection strategies.

mod manager;
mod strategy;

pub use manager::PriorityManager;
pub use strategy::{
    choose_strategy, BalancedSampling, HighSignificanceFocus, QueueStrategy, SignificanceWeighted,
};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::significance::{EmotionalSignificanceScore, SignificanceBand};

/// Context handed to the reviewer alongside a queued record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewContext {
    /// Why this record needs review, in prose.
    pub review_reason: String,
    /// Significance factors the reviewer should focus on, strongest first.
    pub focus_areas: Vec<String>,
    /// Other queued records sharing participants with this one.
    pub related_memory_ids: Vec<String>,
    /// Concrete checks suggested for the reviewer.
    pub validation_hints: Vec<String>,
}

/// A record annotated for review, with its position in the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizedMemory {
    /// Identifier of the underlying record.
    pub memory_id: String,
    /// Significance score driving the ordering.
    pub significance: EmotionalSignificanceScore,
    /// Queue position; 1 is reviewed first.
    pub priority_rank: usize,
    /// Reviewer-facing context.
    pub review_context: ReviewContext,
    /// When the remembered interaction occurred (for coverage metrics).
    pub occurred_at: DateTime<Utc>,
    /// Participant names (for coverage metrics and related-record lookup).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
    /// Primary emotion of the record, if annotated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_emotion: Option<String>,
}

/// Counts of queued records per significance band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignificanceDistribution {
    /// Records with significance >= 0.7.
    pub high: usize,
    /// Records with significance in [0.4, 0.7).
    pub medium: usize,
    /// Records with significance < 0.4.
    pub low: usize,
}

impl SignificanceDistribution {
    /// Count one record in its band.
    pub fn record(&mut self, band: SignificanceBand) {
        match band {
            SignificanceBand::High => self.high += 1,
            SignificanceBand::Medium => self.medium += 1,
            SignificanceBand::Low => self.low += 1,
        }
    }

    /// Total records counted.
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// An ordered review queue with its band distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizedMemoryList {
    /// Queue entries ordered by descending significance (rank 1 first).
    pub items: Vec<PrioritizedMemory>,
    /// How the queue splits across significance bands.
    pub significance_distribution: SignificanceDistribution,
    /// When the queue was built.
    pub generated_at: DateTime<Utc>,
}

/// Reviewer expertise level; drives the per-item time estimate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidatorExpertise {
    Expert,
    Intermediate,
    Beginner,
}

impl ValidatorExpertise {
    /// Estimated review minutes per record.
    pub fn minutes_per_item(&self) -> u32 {
        match self {
            ValidatorExpertise::Expert => 3,
            ValidatorExpertise::Intermediate => 5,
            ValidatorExpertise::Beginner => 8,
        }
    }
}

/// Resources available for working through a review queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAllocation {
    /// Review time available, in minutes.
    pub available_minutes: u32,
    /// Optional deadline for finishing the queue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    /// Expertise of the assigned reviewer.
    pub validator_expertise: ValidatorExpertise,
}

impl ResourceAllocation {
    /// How many records fit into the available time.
    pub fn capacity(&self) -> usize {
        (self.available_minutes / self.validator_expertise.minutes_per_item()) as usize
    }
}

/// Coverage achieved by a queue selection, relative to the full queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageMetrics {
    /// Share of the queue's distinct primary emotions represented, in [0, 1].
    pub emotional_range: f32,
    /// Days between the oldest and newest selected record.
    pub temporal_span_days: i64,
    /// Share of the queue's distinct participants represented, in [0, 1].
    pub participant_diversity: f32,
}

/// What a caller can expect from reviewing the optimized queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedOutcomes {
    /// Estimated time to work through the selection, in minutes.
    pub estimated_minutes: u32,
    /// Share of the queue's total significance covered, in [0, 1].
    pub expected_quality: f32,
    /// Diversity of the selection.
    pub coverage: CoverageMetrics,
}

/// The chosen strategy and its expected outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyReport {
    /// Strategy name.
    pub name: String,
    /// Strategy-specific parameters, for audit.
    pub parameters: HashMap<String, String>,
    /// Expected outcomes of reviewing the selection.
    pub expected_outcomes: ExpectedOutcomes,
}

/// A review queue optimized under resource constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedQueue {
    /// Selected queue entries, in review order.
    pub items: Vec<PrioritizedMemory>,
    /// The strategy that produced the selection.
    pub strategy: StrategyReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expertise_minutes() {
        assert_eq!(ValidatorExpertise::Expert.minutes_per_item(), 3);
        assert_eq!(ValidatorExpertise::Intermediate.minutes_per_item(), 5);
        assert_eq!(ValidatorExpertise::Beginner.minutes_per_item(), 8);
    }

    #[test]
    fn test_allocation_capacity() {
        let allocation = ResourceAllocation {
            available_minutes: 25,
            target_date: None,
            validator_expertise: ValidatorExpertise::Expert,
        };
        assert_eq!(allocation.capacity(), 8);
    }

    #[test]
    fn test_distribution_totals() {
        let mut distribution = SignificanceDistribution::default();
        distribution.record(SignificanceBand::High);
        distribution.record(SignificanceBand::Medium);
        distribution.record(SignificanceBand::Medium);
        distribution.record(SignificanceBand::Low);
        assert_eq!(distribution.high, 1);
        assert_eq!(distribution.medium, 2);
        assert_eq!(distribution.low, 1);
        assert_eq!(distribution.total(), 4);
    }
}

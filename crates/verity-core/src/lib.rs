//! verity-core - Validation decision engine for emotionally-annotated
//! memory records.
//!
//! For each candidate record produced by an upstream extraction pipeline,
//! the engine decides whether it can be auto-approved, must be
//! auto-rejected, or needs human review; orders records needing review into
//! a resource-aware queue; and samples coverage-constrained subsets when
//! the review population exceeds capacity. Human decisions flow back as
//! feedback that recalibrates thresholds and factor weights between
//! batches.
//!
//! # Example
//!
//! ```ignore
//! use verity_core::{BatchOptions, ConfidenceEngine, ThresholdConfig};
//!
//! let engine = ConfidenceEngine::new();
//! let config = ThresholdConfig::default();
//!
//! let batch = engine.process_batch(&memories, &config, &BatchOptions::default())?;
//! for result in &batch.results {
//!     println!("{} -> {}", result.memory_id, result.decision);
//! }
//! ```

pub mod calibration;
pub mod config;
pub mod confidence;
pub mod error;
pub mod priority;
pub mod sampling;
pub mod significance;
pub mod types;

// Re-export commonly used types
pub use calibration::{FeedbackStats, ThresholdManager, ThresholdUpdate};
pub use confidence::{BatchOptions, ConfidenceEngine, HIGH_CRITICALITY_SIGNIFICANCE};
pub use config::{FactorWeights, ThresholdConfig};
pub use error::{ErrorCode, VerityError, VerityResult};
pub use priority::{
    OptimizedQueue, PrioritizedMemory, PrioritizedMemoryList, PriorityManager,
    ResourceAllocation, ValidatorExpertise,
};
pub use sampling::{
    CoverageAnalysis, CoverageRequirements, IntelligentSampler, SampledMemories,
    SamplingStrategy,
};
pub use significance::{EmotionalSignificanceScore, SignificanceBand, SignificanceWeighter};
pub use types::{
    AutoConfirmationResult, BatchValidationResult, ConfidenceFactor, ConfidenceFactors,
    Decision, EmotionalContext, HumanDecision, InteractionQuality, MemoryRecord, Participant,
    RelationshipDynamics, ValidationFeedback,
};

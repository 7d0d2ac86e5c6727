//! Core types for verity.

mod decision;
mod memory;

pub use decision::{
    AutoConfirmationResult, BatchValidationResult, ConfidenceFactor, ConfidenceFactors, Decision,
    HumanDecision, ValidationFeedback,
};
pub use memory::{
    EmotionalContext, InteractionQuality, MemoryRecord, Participant, RelationshipDynamics,
};

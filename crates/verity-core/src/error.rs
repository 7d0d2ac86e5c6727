//! Error types for verity operations.
//!
//! This module provides a structured error hierarchy with error codes,
//! suggestions for resolution, and contextual details.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for verity operations.
pub type VerityResult<T> = Result<T, VerityError>;

/// Main error type for all verity operations.
#[derive(Error, Debug)]
pub enum VerityError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// Configuration error (invalid thresholds or weights).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A scoring computation failed for a specific record.
    #[error("Scoring error: {message}")]
    Scoring {
        message: String,
        code: ErrorCode,
        memory_id: Option<String>,
    },

    /// Sampling could not be performed.
    #[error("Sampling error: {message}")]
    Sampling {
        message: String,
        code: ErrorCode,
    },

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,
    ValInvalidFormat,

    // Configuration (CFG_xxx)
    CfgInvalidWeights,
    CfgInvalidThresholds,

    // Scoring (SCORE_xxx)
    ScoreFactorFailed,
    ScoreNonFiniteInput,

    // Sampling (SMP_xxx)
    SmpEmptyPopulation,
    SmpInvalidRequirements,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::ValInvalidFormat => "VAL_003",
            ErrorCode::CfgInvalidWeights => "CFG_001",
            ErrorCode::CfgInvalidThresholds => "CFG_002",
            ErrorCode::ScoreFactorFailed => "SCORE_001",
            ErrorCode::ScoreNonFiniteInput => "SCORE_002",
            ErrorCode::SmpEmptyPopulation => "SMP_001",
            ErrorCode::SmpInvalidRequirements => "SMP_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl VerityError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a configuration error for invalid factor weights.
    pub fn invalid_weights(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::CfgInvalidWeights,
            details: HashMap::new(),
            suggestion: Some("Factor weights must be non-negative and sum to 1.0".to_string()),
        }
    }

    /// Create a configuration error for invalid thresholds.
    pub fn invalid_thresholds(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::CfgInvalidThresholds,
            details: HashMap::new(),
            suggestion: Some(
                "Thresholds must lie in [0, 1] with auto-approve above auto-reject".to_string(),
            ),
        }
    }

    /// Create a scoring error tied to a specific record.
    pub fn scoring(memory_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scoring {
            message: message.into(),
            code: ErrorCode::ScoreFactorFailed,
            memory_id: Some(memory_id.into()),
        }
    }

    /// Create a scoring error for a non-finite numeric input.
    pub fn non_finite(memory_id: impl Into<String>, field: &str) -> Self {
        let id = memory_id.into();
        Self::Scoring {
            message: format!("Field '{}' on memory '{}' is not a finite number", field, id),
            code: ErrorCode::ScoreNonFiniteInput,
            memory_id: Some(id),
        }
    }

    /// Create a sampling error.
    pub fn sampling(message: impl Into<String>) -> Self {
        Self::Sampling {
            message: message.into(),
            code: ErrorCode::SmpInvalidRequirements,
        }
    }

    /// Create a sampling error for an empty population.
    pub fn empty_population() -> Self {
        Self::Sampling {
            message: "Cannot sample from an empty population".to_string(),
            code: ErrorCode::SmpEmptyPopulation,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::Scoring { code, .. } => *code,
            Self::Sampling { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::Configuration(_) => {
                Some("Please check the threshold configuration before setting it")
            }
            Self::Scoring { .. } => {
                Some("Please check the record for missing or malformed sub-structures")
            }
            Self::Sampling { .. } => Some("Please check the coverage requirements"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = VerityError::validation("Invalid input");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert!(err.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_invalid_weights_error() {
        let err = VerityError::invalid_weights("weights sum to 1.2");
        assert_eq!(err.code(), ErrorCode::CfgInvalidWeights);
        assert!(err.suggestion().unwrap().contains("sum to 1.0"));
    }

    #[test]
    fn test_scoring_error_carries_memory_id() {
        let err = VerityError::scoring("mem-42", "factor computation failed");
        match err {
            VerityError::Scoring { memory_id, .. } => {
                assert_eq!(memory_id.as_deref(), Some("mem-42"));
            }
            _ => panic!("expected scoring error"),
        }
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::CfgInvalidWeights.as_str(), "CFG_001");
        assert_eq!(ErrorCode::SmpEmptyPopulation.as_str(), "SMP_001");
    }
}

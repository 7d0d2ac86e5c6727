//! The five confidence factor computations.
//!
//! Each factor is a pure function of the record (and the reference time for
//! temporal consistency) returning a score in [0, 1]. Missing optional
//! sub-structures default to the neutral 0.5 midpoint; the fallback is
//! reported through the score's note so it ends up in the result's reasons.

use chrono::{DateTime, Duration, Utc};

use crate::error::{VerityError, VerityResult};
use crate::types::MemoryRecord;

/// Records older than this are flagged as implausibly old.
const MAX_PLAUSIBLE_AGE_DAYS: i64 = 3650;
/// Clock-skew allowance before a timestamp counts as "in the future".
const FUTURE_SLACK_HOURS: i64 = 1;

/// A factor score plus an optional note for the result's reasons.
#[derive(Debug, Clone)]
pub(crate) struct FactorScore {
    pub value: f32,
    pub note: Option<String>,
}

impl FactorScore {
    fn plain(value: f32) -> Self {
        Self { value, note: None }
    }

    fn with_note(value: f32, note: impl Into<String>) -> Self {
        Self {
            value,
            note: Some(note.into()),
        }
    }
}

/// Extraction confidence: pass-through from the record.
///
/// A non-finite value is a malformed record and surfaces as an error (the
/// batch loop converts it into a needs-review fallback); a missing value
/// defaults to the neutral midpoint.
pub(crate) fn extraction_confidence(memory: &MemoryRecord) -> VerityResult<FactorScore> {
    match memory.extraction_confidence {
        Some(value) if !value.is_finite() => {
            Err(VerityError::non_finite(&memory.id, "extraction_confidence"))
        }
        Some(value) if !(0.0..=1.0).contains(&value) => Ok(FactorScore::with_note(
            value.clamp(0.0, 1.0),
            format!(
                "extraction confidence {} outside [0, 1]; clamped",
                value
            ),
        )),
        Some(value) => Ok(FactorScore::plain(value)),
        None => Ok(FactorScore::with_note(
            0.5,
            "extraction confidence missing; defaulted to neutral midpoint",
        )),
    }
}

/// Emotional coherence: internal consistency of the emotional annotations.
pub(crate) fn emotional_coherence(memory: &MemoryRecord) -> FactorScore {
    let Some(context) = memory.emotional_context.as_ref() else {
        return FactorScore::with_note(
            0.5,
            "emotional context missing; defaulted to neutral midpoint",
        );
    };

    let mut score: f32 = 0.5;
    let mut note = None;

    match context.mood_intensity {
        Some(mood) if mood.is_finite() && (0.0..=1.0).contains(&mood) => score += 0.2,
        Some(mood) => {
            score -= 0.2;
            note = Some(format!("mood intensity {} outside [0, 1]", mood));
        }
        None => {}
    }
    if context.primary_emotion.is_some() {
        score += 0.15;
    }
    if !context.themes.is_empty() {
        score += 0.15;
    }
    // A rich secondary-emotion list alongside near-zero intensity is
    // internally inconsistent.
    if context.secondary_emotions.len() >= 3
        && context.mood_intensity.map(|m| m < 0.2).unwrap_or(false)
    {
        score -= 0.25;
        note = Some(
            "secondary emotions inconsistent with near-zero mood intensity".to_string(),
        );
    }

    FactorScore {
        value: score.clamp(0.0, 1.0),
        note,
    }
}

/// Relationship-assessment accuracy: plausibility of the dynamics data.
pub(crate) fn relationship_accuracy(memory: &MemoryRecord) -> FactorScore {
    let Some(dynamics) = memory.relationship_dynamics.as_ref() else {
        return FactorScore::with_note(
            0.5,
            "relationship dynamics missing; defaulted to neutral midpoint",
        );
    };

    let mut score: f32 = 0.4;
    let mut note = None;

    if dynamics.interaction_quality.is_some() {
        score += 0.25;
    }
    if !dynamics.communication_patterns.is_empty() {
        score += 0.15;
    }
    match dynamics.participant_count {
        Some(count) if !memory.participants.is_empty() => {
            if count as usize == memory.participants.len() {
                score += 0.2;
            } else {
                score -= 0.1;
                note = Some(format!(
                    "assessed participant count {} disagrees with {} listed participants",
                    count,
                    memory.participants.len()
                ));
            }
        }
        // Count reported but no participant list to cross-check.
        Some(_) => score += 0.1,
        None => {}
    }

    FactorScore {
        value: score.clamp(0.0, 1.0),
        note,
    }
}

/// Temporal consistency: plausibility of the record's timestamp.
pub(crate) fn temporal_consistency(memory: &MemoryRecord, now: DateTime<Utc>) -> FactorScore {
    let age = now.signed_duration_since(memory.occurred_at);

    if age < -Duration::hours(FUTURE_SLACK_HOURS) {
        FactorScore::with_note(0.1, "timestamp is in the future")
    } else if age > Duration::days(MAX_PLAUSIBLE_AGE_DAYS) {
        FactorScore::with_note(0.4, "timestamp is more than ten years old")
    } else {
        FactorScore::plain(0.9)
    }
}

/// Content quality: length band, tagging, and annotation presence.
pub(crate) fn content_quality(memory: &MemoryRecord) -> FactorScore {
    let length = memory.content.trim().chars().count();

    let (mut score, mut note): (f32, Option<String>) = if length < 10 {
        (0.2, Some("content is too short to assess".to_string()))
    } else if length < 40 {
        (0.5, None)
    } else if length <= 2000 {
        (0.8, None)
    } else {
        (0.6, Some("content is unusually long".to_string()))
    };

    if !memory.tags.is_empty() {
        score += 0.1;
    }
    if memory.emotional_context.is_some() {
        score += 0.1;
    }
    if memory.content.trim().is_empty() {
        note = Some("content is empty".to_string());
    }

    FactorScore {
        value: score.clamp(0.0, 1.0),
        note,
    }
}

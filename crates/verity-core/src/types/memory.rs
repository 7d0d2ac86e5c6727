//! Memory record input types.
//!
//! A [`MemoryRecord`] is a candidate emotionally-annotated record produced by
//! an upstream extraction pipeline. The engine treats it as read-only input;
//! it is owned and mutated only by the external pipeline and store. Any
//! optional sub-structure may be absent, and scoring must tolerate that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A candidate record under validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier, minted by the extraction pipeline.
    pub id: String,
    /// Free-text content of the record.
    pub content: String,
    /// Extraction confidence reported by the pipeline, in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_confidence: Option<f32>,
    /// Emotional context extracted for this record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_context: Option<EmotionalContext>,
    /// Relationship dynamics extracted for this record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_dynamics: Option<RelationshipDynamics>,
    /// Free-form tags (life events, special dates, context markers).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// People involved in the remembered interaction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Participant>,
    /// When the remembered interaction occurred.
    pub occurred_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Create a new memory record.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            extraction_confidence: None,
            emotional_context: None,
            relationship_dynamics: None,
            tags: Vec::new(),
            participants: Vec::new(),
            occurred_at,
        }
    }

    /// Set the extraction confidence.
    pub fn with_extraction_confidence(mut self, confidence: f32) -> Self {
        self.extraction_confidence = Some(confidence);
        self
    }

    /// Set the emotional context.
    pub fn with_emotional_context(mut self, context: EmotionalContext) -> Self {
        self.emotional_context = Some(context);
        self
    }

    /// Set the relationship dynamics.
    pub fn with_relationship_dynamics(mut self, dynamics: RelationshipDynamics) -> Self {
        self.relationship_dynamics = Some(dynamics);
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set all tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Add a participant.
    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }

    /// Check whether any tag matches (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Emotional context sub-structure of a memory record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmotionalContext {
    /// Dominant emotion for the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_emotion: Option<String>,
    /// Mood intensity in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_intensity: Option<f32>,
    /// Secondary emotions present alongside the primary one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_emotions: Vec<String>,
    /// Emotional theme tags (e.g. "loss", "family", "identity").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<String>,
}

impl EmotionalContext {
    /// Create an empty emotional context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary emotion.
    pub fn with_primary_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.primary_emotion = Some(emotion.into());
        self
    }

    /// Set the mood intensity.
    pub fn with_mood_intensity(mut self, intensity: f32) -> Self {
        self.mood_intensity = Some(intensity);
        self
    }

    /// Add a secondary emotion.
    pub fn with_secondary_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.secondary_emotions.push(emotion.into());
        self
    }

    /// Add a theme.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.themes.push(theme.into());
        self
    }
}

/// Relationship dynamics sub-structure of a memory record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipDynamics {
    /// Overall quality of the interaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_quality: Option<InteractionQuality>,
    /// Communication pattern tags (e.g. "conflict", "support").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub communication_patterns: Vec<String>,
    /// Number of participants as assessed by the pipeline. May disagree
    /// with the record's participant list; scoring checks consistency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_count: Option<u32>,
}

impl RelationshipDynamics {
    /// Create empty relationship dynamics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interaction quality.
    pub fn with_interaction_quality(mut self, quality: InteractionQuality) -> Self {
        self.interaction_quality = Some(quality);
        self
    }

    /// Add a communication pattern.
    pub fn with_communication_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.communication_patterns.push(pattern.into());
        self
    }

    /// Set the participant count.
    pub fn with_participant_count(mut self, count: u32) -> Self {
        self.participant_count = Some(count);
        self
    }
}

/// Interaction quality level assessed by the extraction pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InteractionQuality {
    /// Deeply connected, meaningful exchange.
    Deep,
    /// Warm, positive exchange.
    Positive,
    /// Routine, unremarkable exchange.
    Neutral,
    /// Strained or tense exchange.
    Tense,
    /// Openly hostile exchange.
    Hostile,
}

impl InteractionQuality {
    /// Numeric level in [0, 1] used by significance scoring.
    ///
    /// Both ends of the scale matter emotionally: deep connection scores
    /// highest, hostility scores above routine neutrality.
    pub fn level(&self) -> f32 {
        match self {
            InteractionQuality::Deep => 1.0,
            InteractionQuality::Positive => 0.75,
            InteractionQuality::Hostile => 0.65,
            InteractionQuality::Tense => 0.55,
            InteractionQuality::Neutral => 0.35,
        }
    }
}

/// A participant in a remembered interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Display name.
    pub name: String,
    /// Role relative to the record's subject (e.g. "spouse", "child").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Participant {
    /// Create a participant with no role.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
        }
    }

    /// Create a participant with a role.
    pub fn with_role(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Some(role.into()),
        }
    }
}

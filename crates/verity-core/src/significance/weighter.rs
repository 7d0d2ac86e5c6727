//! Significance weighter.
//!
//! Computes the five significance factors from a record's emotional context,
//! relationship dynamics, tags, content, and timestamp. Every rule is
//! explicit and deterministic; there is no learned component.

use chrono::{DateTime, Datelike, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::{EmotionalSignificanceScore, SignificanceBand, SignificanceFactors};
use crate::error::{VerityError, VerityResult};
use crate::types::MemoryRecord;

/// Recency window for temporal importance.
pub const RECENCY_WINDOW_DAYS: i64 = 30;

/// Themes that mark an emotionally significant record.
const SIGNIFICANT_THEMES: &[&str] = &[
    "loss",
    "love",
    "betrayal",
    "forgiveness",
    "identity",
    "health",
    "family",
    "belonging",
];

/// Communication patterns that signal relationship impact.
const NOTABLE_PATTERNS: &[&str] = &[
    "conflict",
    "reconciliation",
    "confession",
    "support",
    "withdrawal",
    "breakthrough",
];

/// Tags marking rare life events.
const RARE_EVENT_TAGS: &[&str] = &[
    "wedding",
    "engagement",
    "funeral",
    "birth",
    "graduation",
    "diagnosis",
    "divorce",
    "relocation",
    "retirement",
];

/// Tags marking proximity to a special date.
const SPECIAL_DATE_TAGS: &[&str] = &["anniversary", "birthday", "holiday"];

/// Participant roles treated as vulnerable.
const VULNERABLE_ROLES: &[&str] = &["child", "minor", "patient", "elder", "dependent"];

/// Themes and tags that indicate a vulnerability context.
const VULNERABILITY_THEMES: &[&str] = &[
    "grief",
    "illness",
    "crisis",
    "abuse",
    "conflict",
    "loneliness",
];

/// Roles counting as family context for the temporal boost.
const FAMILY_ROLES: &[&str] = &["spouse", "partner", "parent", "child", "sibling", "family"];

/// Significant life-event keywords matched against record content.
static LIFE_EVENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(married|engaged|pregnant|pregnancy|born|birth|died|passed away|funeral|divorced?|graduated|graduation|diagnosed|diagnosis|new job|retired|hospital)\b",
    )
    .expect("life-event pattern is valid")
});

fn contains_ci(list: &[&str], value: &str) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(value))
}

/// Scores the emotional and contextual significance of single records.
#[derive(Debug, Clone, Default)]
pub struct SignificanceWeighter;

impl SignificanceWeighter {
    /// Create a new weighter.
    pub fn new() -> Self {
        Self
    }

    /// Calculate the significance of a record at the given reference time.
    ///
    /// Never fails: an internal computation error yields a low default score
    /// with an explanatory narrative instead of propagating.
    pub fn calculate_significance(
        &self,
        memory: &MemoryRecord,
        now: DateTime<Utc>,
    ) -> EmotionalSignificanceScore {
        match self.compute(memory, now) {
            Ok(score) => score,
            Err(err) => {
                warn!(
                    memory_id = %memory.id,
                    error = %err,
                    "significance computation failed; using low default score"
                );
                EmotionalSignificanceScore::fallback(&err.to_string())
            }
        }
    }

    fn compute(
        &self,
        memory: &MemoryRecord,
        now: DateTime<Utc>,
    ) -> VerityResult<EmotionalSignificanceScore> {
        let factors = SignificanceFactors {
            intensity: self.emotional_intensity(memory)?,
            relationship_impact: self.relationship_impact(memory),
            life_event_significance: self.life_event_significance(memory),
            vulnerability: self.participant_vulnerability(memory),
            temporal_importance: self.temporal_importance(memory, now),
        };
        let overall = factors.weighted_overall();
        let narrative = self.narrative(&factors, overall);

        Ok(EmotionalSignificanceScore {
            overall,
            factors,
            narrative,
        })
    }

    /// Emotional intensity: mood intensity, secondary-emotion count, and
    /// significant-theme presence.
    fn emotional_intensity(&self, memory: &MemoryRecord) -> VerityResult<f32> {
        let context = memory.emotional_context.as_ref();

        let mood = match context.and_then(|c| c.mood_intensity) {
            Some(value) if !value.is_finite() => {
                return Err(VerityError::non_finite(&memory.id, "mood_intensity"));
            }
            Some(value) => value.clamp(0.0, 1.0),
            // Neutral midpoint when the pipeline reported no intensity.
            None => 0.5,
        };

        let secondary = context
            .map(|c| c.secondary_emotions.len())
            .unwrap_or(0)
            .min(4);
        let has_significant_theme = context
            .map(|c| c.themes.iter().any(|t| contains_ci(SIGNIFICANT_THEMES, t)))
            .unwrap_or(false);

        let score = mood * 0.7
            + 0.05 * secondary as f32
            + if has_significant_theme { 0.2 } else { 0.0 };
        Ok(score.clamp(0.0, 1.0))
    }

    /// Relationship impact: interaction-quality level, notable communication
    /// patterns, and group size.
    fn relationship_impact(&self, memory: &MemoryRecord) -> f32 {
        let dynamics = memory.relationship_dynamics.as_ref();

        let quality = dynamics
            .and_then(|d| d.interaction_quality)
            .map(|q| q.level())
            // Neutral midpoint when the interaction was not assessed.
            .unwrap_or(0.5);

        let notable = dynamics
            .map(|d| {
                d.communication_patterns
                    .iter()
                    .filter(|p| contains_ci(NOTABLE_PATTERNS, p))
                    .count()
            })
            .unwrap_or(0)
            .min(2);

        let group_size = dynamics
            .and_then(|d| d.participant_count)
            .map(|c| c as usize)
            .unwrap_or(memory.participants.len());

        let score = quality * 0.6
            + 0.125 * notable as f32
            + if group_size > 2 { 0.15 } else { 0.0 };
        score.clamp(0.0, 1.0)
    }

    /// Life-event significance: rare-event tags and keyword matches in the
    /// content, cumulative across indicators.
    fn life_event_significance(&self, memory: &MemoryRecord) -> f32 {
        let tag_hits = memory
            .tags
            .iter()
            .filter(|t| contains_ci(RARE_EVENT_TAGS, t))
            .count()
            .min(3);
        let content_hits = LIFE_EVENT_PATTERN.find_iter(&memory.content).count().min(2);

        let indicators = tag_hits + content_hits;
        if indicators == 0 {
            return 0.05;
        }
        (0.45 * indicators as f32).min(1.0)
    }

    /// Participant vulnerability: vulnerable roles and vulnerability context.
    fn participant_vulnerability(&self, memory: &MemoryRecord) -> f32 {
        let mut score: f32 = 0.1;

        let has_vulnerable_role = memory
            .participants
            .iter()
            .filter_map(|p| p.role.as_deref())
            .any(|role| contains_ci(VULNERABLE_ROLES, role));
        if has_vulnerable_role {
            score += 0.45;
        }

        let themes = memory
            .emotional_context
            .as_ref()
            .map(|c| c.themes.as_slice())
            .unwrap_or(&[]);
        let has_vulnerability_context = themes
            .iter()
            .chain(memory.tags.iter())
            .any(|t| contains_ci(VULNERABILITY_THEMES, t));
        if has_vulnerability_context {
            score += 0.3;
        }

        score.clamp(0.0, 1.0)
    }

    /// Temporal importance: recency within the window, special-date tags,
    /// and the weekend family-context boost.
    fn temporal_importance(&self, memory: &MemoryRecord, now: DateTime<Utc>) -> f32 {
        let mut score = 0.0;

        let age_days = now.signed_duration_since(memory.occurred_at).num_days();
        // Future timestamps get no recency credit; temporal consistency
        // scoring in the confidence engine penalizes them separately.
        if (0..=RECENCY_WINDOW_DAYS).contains(&age_days) {
            score += 0.6 * (1.0 - age_days as f32 / RECENCY_WINDOW_DAYS as f32);
        }

        if memory.tags.iter().any(|t| contains_ci(SPECIAL_DATE_TAGS, t)) {
            score += 0.25;
        }

        let weekend = matches!(memory.occurred_at.weekday(), Weekday::Sat | Weekday::Sun);
        let family_context = memory
            .participants
            .iter()
            .filter_map(|p| p.role.as_deref())
            .any(|role| contains_ci(FAMILY_ROLES, role))
            || memory
                .emotional_context
                .as_ref()
                .map(|c| c.themes.iter().any(|t| t.eq_ignore_ascii_case("family")))
                .unwrap_or(false);
        if weekend && family_context {
            score += 0.15;
        }

        score.clamp(0.0, 1.0)
    }

    fn narrative(&self, factors: &SignificanceFactors, overall: f32) -> String {
        let mut ranked = factors.named();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let (first_name, first_value) = ranked[0];
        let (second_name, second_value) = ranked[1];

        let band_word = match SignificanceBand::from_overall(overall) {
            SignificanceBand::High => "High",
            SignificanceBand::Medium => "Moderate",
            SignificanceBand::Low => "Low",
        };

        format!(
            "{} significance ({:.2}): {} is {} ({:.2}), {} is {} ({:.2})",
            band_word,
            overall,
            first_name.replace('_', " "),
            level_word(first_value),
            first_value,
            second_name.replace('_', " "),
            level_word(second_value),
            second_value,
        )
    }
}

fn level_word(value: f32) -> &'static str {
    if value >= 0.8 {
        "very high"
    } else if value >= 0.6 {
        "high"
    } else if value >= 0.4 {
        "moderate"
    } else if value >= 0.2 {
        "low"
    } else {
        "minimal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        EmotionalContext, InteractionQuality, Participant, RelationshipDynamics,
    };
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 17, 12, 0, 0).unwrap()
    }

    fn days_before(reference: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        reference - chrono::Duration::days(days)
    }

    #[test]
    fn test_overall_is_exact_weighted_sum() {
        let weighter = SignificanceWeighter::new();
        let memory = MemoryRecord::new("mem-1", "A quiet afternoon", days_before(now(), 5))
            .with_emotional_context(EmotionalContext::new().with_mood_intensity(0.6));

        let score = weighter.calculate_significance(&memory, now());
        let expected = score.factors.weighted_overall();
        assert!((score.overall - expected).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&score.overall));
    }

    #[test]
    fn test_wedding_memory_scores_high() {
        let weighter = SignificanceWeighter::new();
        // Saturday, three days before the reference time.
        let occurred = Utc.with_ymd_and_hms(2025, 6, 14, 16, 0, 0).unwrap();
        let memory = MemoryRecord::new(
            "mem-wedding",
            "We got married in the garden and everyone cried",
            occurred,
        )
        .with_tag("wedding")
        .with_emotional_context(
            EmotionalContext::new()
                .with_primary_emotion("joy")
                .with_mood_intensity(0.9)
                .with_secondary_emotion("gratitude")
                .with_secondary_emotion("excitement")
                .with_secondary_emotion("relief")
                .with_theme("love"),
        )
        .with_relationship_dynamics(
            RelationshipDynamics::new()
                .with_interaction_quality(InteractionQuality::Deep)
                .with_communication_pattern("support"),
        )
        .with_participant(Participant::with_role("Ana", "spouse"));

        let score = weighter.calculate_significance(&memory, now());

        assert!(score.overall > 0.7, "overall was {}", score.overall);
        assert_eq!(score.band(), SignificanceBand::High);
        // Intensity and life-event factors dominate.
        assert!(score.factors.intensity > 0.85);
        assert!(score.factors.life_event_significance > 0.85);
    }

    #[test]
    fn test_mundane_memory_scores_low() {
        let weighter = SignificanceWeighter::new();
        let memory = MemoryRecord::new(
            "mem-lunch",
            "Had a sandwich at the desk",
            days_before(now(), 200),
        );

        let score = weighter.calculate_significance(&memory, now());
        assert!(score.overall < 0.4, "overall was {}", score.overall);
        assert_eq!(score.band(), SignificanceBand::Low);
    }

    #[test]
    fn test_life_event_indicators_accumulate() {
        let weighter = SignificanceWeighter::new();
        let single = MemoryRecord::new("m1", "We talked for a while", now())
            .with_tag("funeral");
        let double = MemoryRecord::new("m2", "Grandpa passed away last week", now())
            .with_tag("funeral");

        let single_score = weighter.calculate_significance(&single, now());
        let double_score = weighter.calculate_significance(&double, now());
        assert!(
            double_score.factors.life_event_significance
                > single_score.factors.life_event_significance
        );
    }

    #[test]
    fn test_vulnerable_participant_raises_vulnerability() {
        let weighter = SignificanceWeighter::new();
        let plain = MemoryRecord::new("m1", "Coffee with a colleague", now())
            .with_participant(Participant::with_role("Sam", "colleague"));
        let vulnerable = MemoryRecord::new("m2", "Visit at the ward", now())
            .with_participant(Participant::with_role("Lea", "patient"));

        let plain_score = weighter.calculate_significance(&plain, now());
        let vulnerable_score = weighter.calculate_significance(&vulnerable, now());
        assert!(vulnerable_score.factors.vulnerability > plain_score.factors.vulnerability);
    }

    #[test]
    fn test_recency_decays_over_window() {
        let weighter = SignificanceWeighter::new();
        let fresh = MemoryRecord::new("m1", "text", days_before(now(), 1));
        let stale = MemoryRecord::new("m2", "text", days_before(now(), 29));
        let old = MemoryRecord::new("m3", "text", days_before(now(), 90));

        let fresh_t = weighter
            .calculate_significance(&fresh, now())
            .factors
            .temporal_importance;
        let stale_t = weighter
            .calculate_significance(&stale, now())
            .factors
            .temporal_importance;
        let old_t = weighter
            .calculate_significance(&old, now())
            .factors
            .temporal_importance;

        assert!(fresh_t > stale_t);
        assert!(stale_t > old_t);
        assert!((old_t - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_mood_falls_back() {
        let weighter = SignificanceWeighter::new();
        let memory = MemoryRecord::new("m1", "text", now()).with_emotional_context(
            EmotionalContext::new().with_mood_intensity(f32::NAN),
        );

        let score = weighter.calculate_significance(&memory, now());
        assert!((score.overall - super::super::FALLBACK_SIGNIFICANCE).abs() < 1e-6);
        assert!(score.narrative.contains("low default"));
    }

    #[test]
    fn test_missing_substructures_use_neutral_defaults() {
        let weighter = SignificanceWeighter::new();
        let memory = MemoryRecord::new("m1", "Some plain text", now());

        let score = weighter.calculate_significance(&memory, now());
        // Mood defaults to the 0.5 midpoint: 0.5 * 0.7 = 0.35.
        assert!((score.factors.intensity - 0.35).abs() < 1e-6);
        // Unassessed interaction defaults to the 0.5 midpoint: 0.5 * 0.6 = 0.30.
        assert!((score.factors.relationship_impact - 0.30).abs() < 1e-6);
    }

    #[test]
    fn test_determinism() {
        let weighter = SignificanceWeighter::new();
        let memory = MemoryRecord::new("m1", "We got married!", days_before(now(), 2))
            .with_tag("wedding")
            .with_emotional_context(EmotionalContext::new().with_mood_intensity(0.8));

        let a = weighter.calculate_significance(&memory, now());
        let b = weighter.calculate_significance(&memory, now());
        assert_eq!(a.overall, b.overall);
        assert_eq!(a.factors, b.factors);
        assert_eq!(a.narrative, b.narrative);
    }
}

//! Per-round batch transforms over the roster.

use stormclock_types::{EncounterSettings, EncounterState, Entity, Segment, StatusEffect};

use crate::game_data::sample_roster;

/// A status effect whose duration ran out at a round boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredEffect {
    pub entity_id: String,
    pub effect: StatusEffect,
}

/// An entity moved back to its default segment at a round boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReset {
    pub entity_id: String,
    pub from: Segment,
    pub to: Segment,
}

/// Everything a round boundary changed besides reactions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundBoundary {
    pub expired: Vec<ExpiredEffect>,
    pub segment_resets: Vec<SegmentReset>,
}

/// Apply the start-of-round transform to every entity.
///
/// Called once when the cycle moves forward into a new round, never when
/// moving back. Clears reactions, ticks effect durations down by one and
/// prunes those at or below zero, and restores default segments if
/// `reset_segments_each_round` is set. No entity is added or removed.
pub fn on_round_boundary_crossed(entities: &mut [Entity], settings: &EncounterSettings) -> RoundBoundary {
    let mut boundary = RoundBoundary::default();

    for entity in entities.iter_mut() {
        entity.reaction_used = false;

        let effects = std::mem::take(&mut entity.status_effects);
        for mut effect in effects {
            match effect.duration {
                Some(remaining) => {
                    let remaining = remaining - 1;
                    effect.duration = Some(remaining);
                    if remaining > 0 {
                        entity.status_effects.push(effect);
                    } else {
                        boundary.expired.push(ExpiredEffect {
                            entity_id: entity.id.clone(),
                            effect,
                        });
                    }
                }
                None => entity.status_effects.push(effect),
            }
        }

        if settings.reset_segments_each_round && entity.current_segment != entity.default_segment {
            boundary.segment_resets.push(SegmentReset {
                entity_id: entity.id.clone(),
                from: entity.current_segment,
                to: entity.default_segment,
            });
            entity.current_segment = entity.default_segment;
        }
    }

    boundary
}

/// Clear every reaction flag. Returns how many were set.
pub fn reset_reactions(entities: &mut [Entity]) -> usize {
    let mut cleared = 0;
    for entity in entities.iter_mut().filter(|e| e.reaction_used) {
        entity.reaction_used = false;
        cleared += 1;
    }
    cleared
}

/// What a hard reset starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    /// No entities
    #[default]
    Empty,
    /// The seeded sample roster
    Sample,
}

/// Fresh encounter at round 1, Fast Players. Replaces everything but `settings`.
pub fn reset_encounter(mode: ResetMode, settings: EncounterSettings) -> EncounterState {
    let mut state = EncounterState::new(settings);
    if mode == ResetMode::Sample {
        state.entities = sample_roster();
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormclock_types::{EntityKind, StatusCategory};

    fn effect(id: &str, duration: Option<i32>) -> StatusEffect {
        StatusEffect {
            id: id.to_string(),
            category: StatusCategory::Investiture,
            name: "Stormlight".to_string(),
            duration,
        }
    }

    fn entity(current: Segment, default: Segment, effects: Vec<StatusEffect>) -> Entity {
        Entity {
            id: "e1".to_string(),
            name: "Kaladin".to_string(),
            kind: EntityKind::Player,
            current_segment: current,
            default_segment: default,
            reaction_used: true,
            status_effects: effects,
            notes: None,
        }
    }

    #[test]
    fn durations_tick_and_expire() {
        let mut entities = vec![entity(
            Segment::Fast,
            Segment::Fast,
            vec![effect("a", Some(1)), effect("b", Some(2)), effect("c", None)],
        )];

        let boundary = on_round_boundary_crossed(&mut entities, &EncounterSettings::default());

        let remaining: Vec<_> = entities[0]
            .status_effects
            .iter()
            .map(|s| (s.id.as_str(), s.duration))
            .collect();
        assert_eq!(remaining, vec![("b", Some(1)), ("c", None)]);
        assert_eq!(boundary.expired.len(), 1);
        assert_eq!(boundary.expired[0].effect.id, "a");
        assert!(!entities[0].reaction_used);
    }

    #[test]
    fn segments_reset_only_when_enabled() {
        let mut settings = EncounterSettings::default();
        let mut entities = vec![entity(Segment::Slow, Segment::Fast, Vec::new())];

        let boundary = on_round_boundary_crossed(&mut entities, &settings);
        assert_eq!(entities[0].current_segment, Segment::Slow);
        assert!(boundary.segment_resets.is_empty());

        settings.reset_segments_each_round = true;
        let boundary = on_round_boundary_crossed(&mut entities, &settings);
        assert_eq!(entities[0].current_segment, Segment::Fast);
        assert_eq!(
            boundary.segment_resets,
            vec![SegmentReset {
                entity_id: "e1".into(),
                from: Segment::Slow,
                to: Segment::Fast,
            }]
        );
    }

    #[test]
    fn reset_reactions_counts_cleared() {
        let mut entities = vec![entity(Segment::Fast, Segment::Fast, Vec::new())];
        assert_eq!(reset_reactions(&mut entities), 1);
        assert_eq!(reset_reactions(&mut entities), 0);
    }

    #[test]
    fn reset_encounter_keeps_settings_only() {
        let settings = EncounterSettings {
            storage_key: "custom".into(),
            ..Default::default()
        };
        let state = reset_encounter(ResetMode::Empty, settings.clone());
        assert_eq!(state.round, 1);
        assert_eq!(state.phase_index(), 0);
        assert!(state.entities.is_empty());
        assert_eq!(state.settings, settings);

        let sample = reset_encounter(ResetMode::Sample, settings);
        assert!(!sample.entities.is_empty());
    }
}

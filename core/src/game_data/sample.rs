//! Seeded sample encounter shown on first launch.

use stormclock_types::{EncounterSettings, EncounterState, Entity, EntityKind, Segment};

use crate::encounter::roster::new_id;

fn sample_entity(name: &str, kind: EntityKind, segment: Segment) -> Entity {
    Entity {
        id: new_id(),
        name: name.to_string(),
        kind,
        current_segment: segment,
        default_segment: segment,
        reaction_used: false,
        status_effects: Vec::new(),
        notes: None,
    }
}

/// Two players and two enemies, one of each per segment. Ids are fresh on every call.
pub fn sample_roster() -> Vec<Entity> {
    vec![
        sample_entity("Kalak", EntityKind::Player, Segment::Fast),
        sample_entity("Lopen", EntityKind::Player, Segment::Slow),
        sample_entity("Fused Spear", EntityKind::Enemy, Segment::Fast),
        sample_entity("Voidspren Host", EntityKind::Enemy, Segment::Slow),
    ]
}

/// Round 1, Fast Players, with the sample roster
pub fn sample_state(settings: EncounterSettings) -> EncounterState {
    EncounterState {
        entities: sample_roster(),
        ..EncounterState::new(settings)
    }
}

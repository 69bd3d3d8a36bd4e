//! Entity store operations.
//!
//! Every mutator looks its target up by id. An unknown id is not an error:
//! the call does nothing and reports `None`/`false`, since a UI action can
//! race with a removal.

use stormclock_types::{Entity, EntityKind, Segment, StatusCategory, StatusEffect, UNCONSCIOUS};
use uuid::Uuid;

use super::ValidationError;

/// Fresh opaque identifier for entities and status effects
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ═══════════════════════════════════════════════════════════════════════════
// Inputs
// ═══════════════════════════════════════════════════════════════════════════

/// Fields supplied when adding an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
    pub name: String,
    pub kind: EntityKind,
    /// Defaults to `Fast`
    pub default_segment: Option<Segment>,
    /// Defaults to the default segment
    pub current_segment: Option<Segment>,
    pub unconscious: bool,
    pub notes: Option<String>,
}

impl NewEntity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default_segment: None,
            current_segment: None,
            unconscious: false,
            notes: None,
        }
    }

    pub fn default_segment(mut self, segment: Segment) -> Self {
        self.default_segment = Some(segment);
        self
    }

    pub fn current_segment(mut self, segment: Segment) -> Self {
        self.current_segment = Some(segment);
        self
    }

    pub fn unconscious(mut self, unconscious: bool) -> Self {
        self.unconscious = unconscious;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update merged into an existing entity. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityPatch {
    pub name: Option<String>,
    pub kind: Option<EntityKind>,
    pub current_segment: Option<Segment>,
    pub default_segment: Option<Segment>,
    pub reaction_used: Option<bool>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
}

impl EntityPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Status effect to attach to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatus {
    pub category: StatusCategory,
    pub name: String,
    pub duration: Option<i32>,
}

impl NewStatus {
    pub fn condition(name: impl Into<String>) -> Self {
        Self {
            category: StatusCategory::Condition,
            name: name.into(),
            duration: None,
        }
    }

    pub fn investiture(name: impl Into<String>, duration: Option<i32>) -> Self {
        Self {
            category: StatusCategory::Investiture,
            name: name.into(),
            duration,
        }
    }
}

fn unconscious_marker() -> StatusEffect {
    StatusEffect {
        id: new_id(),
        category: StatusCategory::Condition,
        name: UNCONSCIOUS.to_string(),
        duration: None,
    }
}

fn find_mut<'a>(entities: &'a mut [Entity], id: &str) -> Option<&'a mut Entity> {
    entities.iter_mut().find(|e| e.id == id)
}

// ═══════════════════════════════════════════════════════════════════════════
// CRUD
// ═══════════════════════════════════════════════════════════════════════════

/// Append a new entity with a generated id.
pub fn add(entities: &mut Vec<Entity>, new: NewEntity) -> Result<&Entity, ValidationError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let default_segment = new.default_segment.unwrap_or(Segment::Fast);
    let status_effects = if new.unconscious {
        vec![unconscious_marker()]
    } else {
        Vec::new()
    };

    entities.push(Entity {
        id: new_id(),
        name: name.to_string(),
        kind: new.kind,
        current_segment: new.current_segment.unwrap_or(default_segment),
        default_segment,
        reaction_used: false,
        status_effects,
        notes: new.notes.filter(|n| !n.trim().is_empty()),
    });

    // Just pushed, so the roster is non-empty
    Ok(&entities[entities.len() - 1])
}

/// Merge `patch` into the entity. Returns false if the id is unknown.
pub fn update(entities: &mut [Entity], id: &str, patch: EntityPatch) -> Result<bool, ValidationError> {
    let name = match patch.name {
        Some(ref name) if name.trim().is_empty() => return Err(ValidationError::EmptyName),
        Some(ref name) => Some(name.trim().to_string()),
        None => None,
    };

    let Some(entity) = find_mut(entities, id) else {
        return Ok(false);
    };

    if let Some(name) = name {
        entity.name = name;
    }
    if let Some(kind) = patch.kind {
        entity.kind = kind;
    }
    if let Some(segment) = patch.current_segment {
        entity.current_segment = segment;
    }
    if let Some(segment) = patch.default_segment {
        entity.default_segment = segment;
    }
    if let Some(used) = patch.reaction_used {
        entity.reaction_used = used;
    }
    if let Some(notes) = patch.notes {
        entity.notes = notes.filter(|n| !n.trim().is_empty());
    }
    Ok(true)
}

/// Remove the entity, returning it if it was present.
pub fn remove(entities: &mut Vec<Entity>, id: &str) -> Option<Entity> {
    let pos = entities.iter().position(|e| e.id == id)?;
    Some(entities.remove(pos))
}

// ═══════════════════════════════════════════════════════════════════════════
// Toggles
// ═══════════════════════════════════════════════════════════════════════════

/// Flip between fast and slow. Returns the new segment.
pub fn toggle_segment(entities: &mut [Entity], id: &str) -> Option<Segment> {
    let entity = find_mut(entities, id)?;
    entity.current_segment = entity.current_segment.toggled();
    Some(entity.current_segment)
}

/// Put the entity in `segment` (lane drop). Returns the previous segment.
pub fn move_to_segment(entities: &mut [Entity], id: &str, segment: Segment) -> Option<Segment> {
    let entity = find_mut(entities, id)?;
    let previous = entity.current_segment;
    entity.current_segment = segment;
    Some(previous)
}

/// Change the baseline segment restored at round boundaries
pub fn set_default_segment(entities: &mut [Entity], id: &str, segment: Segment) -> bool {
    match find_mut(entities, id) {
        Some(entity) => {
            entity.default_segment = segment;
            true
        }
        None => false,
    }
}

/// Flip the reaction flag. Returns the new value.
pub fn toggle_reaction(entities: &mut [Entity], id: &str) -> Option<bool> {
    let entity = find_mut(entities, id)?;
    entity.reaction_used = !entity.reaction_used;
    Some(entity.reaction_used)
}

/// Flip unconsciousness. Returns the new value.
///
/// Becoming unconscious adds the `Unconscious` condition if absent. Waking
/// removes condition-category `Unconscious` entries only.
pub fn toggle_unconscious(entities: &mut [Entity], id: &str) -> Option<bool> {
    let entity = find_mut(entities, id)?;
    if entity.is_unconscious() {
        entity.status_effects.retain(|s| !s.is_unconscious_marker());
        Some(false)
    } else {
        entity.status_effects.push(unconscious_marker());
        Some(true)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Status Effects
// ═══════════════════════════════════════════════════════════════════════════

/// Append a status effect. Identical effects stack; nothing is merged.
///
/// A non-positive duration is treated as "no duration".
pub fn add_status_effect(
    entities: &mut [Entity],
    id: &str,
    status: NewStatus,
) -> Result<Option<StatusEffect>, ValidationError> {
    let name = status.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyStatusName);
    }

    let Some(entity) = find_mut(entities, id) else {
        return Ok(None);
    };

    let effect = StatusEffect {
        id: new_id(),
        category: status.category,
        name: name.to_string(),
        duration: status.duration.filter(|d| *d > 0),
    };
    entity.status_effects.push(effect.clone());
    Ok(Some(effect))
}

/// Remove one status effect by its own id.
pub fn remove_status_effect(entities: &mut [Entity], id: &str, status_id: &str) -> Option<StatusEffect> {
    let entity = find_mut(entities, id)?;
    let pos = entity.status_effects.iter().position(|s| s.id == status_id)?;
    Some(entity.status_effects.remove(pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_with(name: &str, kind: EntityKind) -> (Vec<Entity>, String) {
        let mut entities = Vec::new();
        let id = add(&mut entities, NewEntity::new(name, kind)).unwrap().id.clone();
        (entities, id)
    }

    #[test]
    fn add_applies_defaults() {
        let (entities, _) = roster_with("  Kaladin ", EntityKind::Player);
        let e = &entities[0];
        assert_eq!(e.name, "Kaladin");
        assert_eq!(e.current_segment, Segment::Fast);
        assert_eq!(e.default_segment, Segment::Fast);
        assert!(!e.reaction_used);
        assert!(!e.is_unconscious());
        assert!(e.status_effects.is_empty());
    }

    #[test]
    fn add_current_segment_follows_default() {
        let mut entities = Vec::new();
        add(
            &mut entities,
            NewEntity::new("Fused", EntityKind::Enemy).default_segment(Segment::Slow),
        )
        .unwrap();
        assert_eq!(entities[0].current_segment, Segment::Slow);
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut entities = Vec::new();
        let err = add(&mut entities, NewEntity::new("   ", EntityKind::Player)).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
        assert!(entities.is_empty());
    }

    #[test]
    fn add_generates_unique_ids() {
        let mut entities = Vec::new();
        add(&mut entities, NewEntity::new("A", EntityKind::Player)).unwrap();
        add(&mut entities, NewEntity::new("A", EntityKind::Player)).unwrap();
        assert_ne!(entities[0].id, entities[1].id);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let (mut entities, _) = roster_with("Shallan", EntityKind::Player);
        let before = entities.clone();
        let patch = EntityPatch {
            reaction_used: Some(true),
            ..Default::default()
        };
        assert_eq!(update(&mut entities, "missing", patch), Ok(false));
        assert_eq!(entities, before);
    }

    #[test]
    fn update_merges_fields() {
        let (mut entities, id) = roster_with("Shallan", EntityKind::Player);
        let patch = EntityPatch {
            name: Some("Veil".into()),
            default_segment: Some(Segment::Slow),
            notes: Some(Some("lightweaver".into())),
            ..Default::default()
        };
        assert_eq!(update(&mut entities, &id, patch), Ok(true));
        assert_eq!(entities[0].name, "Veil");
        assert_eq!(entities[0].default_segment, Segment::Slow);
        assert_eq!(entities[0].current_segment, Segment::Fast);
        assert_eq!(entities[0].notes.as_deref(), Some("lightweaver"));
    }

    #[test]
    fn update_rejects_blank_rename() {
        let (mut entities, id) = roster_with("Adolin", EntityKind::Player);
        let patch = EntityPatch {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(update(&mut entities, &id, patch), Err(ValidationError::EmptyName));
        assert_eq!(entities[0].name, "Adolin");
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let (mut entities, id) = roster_with("Szeth", EntityKind::Enemy);
        assert!(remove(&mut entities, "missing").is_none());
        assert_eq!(entities.len(), 1);
        assert_eq!(remove(&mut entities, &id).map(|e| e.name), Some("Szeth".into()));
        assert!(entities.is_empty());
    }

    #[test]
    fn toggles_flip_fields() {
        let (mut entities, id) = roster_with("Lopen", EntityKind::Player);
        assert_eq!(toggle_segment(&mut entities, &id), Some(Segment::Slow));
        assert_eq!(toggle_segment(&mut entities, &id), Some(Segment::Fast));
        assert_eq!(toggle_reaction(&mut entities, &id), Some(true));
        assert_eq!(toggle_reaction(&mut entities, "missing"), None);
        assert_eq!(move_to_segment(&mut entities, &id, Segment::Slow), Some(Segment::Fast));
        assert_eq!(entities[0].current_segment, Segment::Slow);
    }

    #[test]
    fn toggle_unconscious_twice_restores_statuses() {
        let (mut entities, id) = roster_with("Teft", EntityKind::Player);
        add_status_effect(&mut entities, &id, NewStatus::condition("Prone")).unwrap();
        let before = entities[0].clone();

        assert_eq!(toggle_unconscious(&mut entities, &id), Some(true));
        assert!(entities[0].is_unconscious());
        assert_eq!(entities[0].status_effects.len(), 2);

        assert_eq!(toggle_unconscious(&mut entities, &id), Some(false));
        assert_eq!(entities[0], before);

        // repeated toggles never stack markers
        for _ in 0..5 {
            toggle_unconscious(&mut entities, &id);
        }
        let markers = entities[0]
            .status_effects
            .iter()
            .filter(|s| s.is_unconscious_marker())
            .count();
        assert_eq!(markers, 1);
    }

    #[test]
    fn waking_leaves_same_named_investiture() {
        let (mut entities, id) = roster_with("Rock", EntityKind::Player);
        add_status_effect(&mut entities, &id, NewStatus::investiture(UNCONSCIOUS, None)).unwrap();
        toggle_unconscious(&mut entities, &id);
        toggle_unconscious(&mut entities, &id);
        assert_eq!(entities[0].status_effects.len(), 1);
        assert_eq!(entities[0].status_effects[0].category, StatusCategory::Investiture);
    }

    #[test]
    fn identical_statuses_stack_and_remove_independently() {
        let (mut entities, id) = roster_with("Moash", EntityKind::Enemy);
        let first = add_status_effect(&mut entities, &id, NewStatus::condition("Slowed"))
            .unwrap()
            .unwrap();
        add_status_effect(&mut entities, &id, NewStatus::condition("Slowed")).unwrap();
        assert_eq!(entities[0].status_effects.len(), 2);

        let removed = remove_status_effect(&mut entities, &id, &first.id).unwrap();
        assert_eq!(removed.id, first.id);
        assert_eq!(entities[0].status_effects.len(), 1);
        assert_ne!(entities[0].status_effects[0].id, first.id);
    }

    #[test]
    fn status_duration_normalised() {
        let (mut entities, id) = roster_with("Jasnah", EntityKind::Ally);
        let fx = add_status_effect(&mut entities, &id, NewStatus::investiture("Stormlight", Some(0)))
            .unwrap()
            .unwrap();
        assert_eq!(fx.duration, None);

        let err = add_status_effect(&mut entities, &id, NewStatus::condition(" ")).unwrap_err();
        assert_eq!(err, ValidationError::EmptyStatusName);
    }
}

//! Flat entity schema used by older saves and hand-written content files.
//!
//! ```json
//! { "name": "Fused Spear", "type": "enemy", "speed": "slow",
//!   "defaultSpeed": "slow", "statuses": ["Prone"], "isUnconscious": false,
//!   "hp": 12, "maxHp": 12 }
//! ```
//!
//! Hit points and the scratch `statusInput` field are ignored. Flat statuses
//! become condition entries without a duration.

use serde::Deserialize;
use serde_json::Value;
use stormclock_types::{
    EncounterSettings, EncounterState, Entity, EntityKind, Phase, Segment, StatusCategory, StatusEffect,
    UNCONSCIOUS,
};

use super::ParseError;
use crate::encounter::roster::new_id;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LegacyEntity {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(rename = "type", default)]
    kind: EntityKind,
    #[serde(default, alias = "currentSegment")]
    speed: Option<Segment>,
    #[serde(default, alias = "defaultSegment")]
    default_speed: Option<Segment>,
    #[serde(default)]
    statuses: Vec<String>,
    #[serde(default)]
    status_effects: Vec<StatusEffect>,
    #[serde(default)]
    reaction_used: bool,
    #[serde(default, alias = "isUnconscious")]
    unconscious: bool,
    #[serde(default)]
    notes: Option<String>,
}

impl LegacyEntity {
    pub(crate) fn into_entity(self) -> Entity {
        let current_segment = self.speed.or(self.default_speed).unwrap_or_default();
        let default_segment = self.default_speed.unwrap_or(current_segment);

        let mut status_effects: Vec<StatusEffect> = self
            .statuses
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|name| StatusEffect {
                id: new_id(),
                category: StatusCategory::Condition,
                name: name.to_string(),
                duration: None,
            })
            .collect();
        status_effects.extend(self.status_effects);

        if self.unconscious && !status_effects.iter().any(StatusEffect::is_unconscious_marker) {
            status_effects.push(StatusEffect {
                id: new_id(),
                category: StatusCategory::Condition,
                name: UNCONSCIOUS.to_string(),
                duration: None,
            });
        }

        Entity {
            id: self.id.filter(|id| !id.trim().is_empty()).unwrap_or_else(new_id),
            name: self.name.trim().to_string(),
            kind: self.kind,
            current_segment,
            default_segment,
            reaction_used: self.reaction_used,
            status_effects,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LegacySnapshot {
    #[serde(default = "first_round")]
    round: i64,
    #[serde(default)]
    phase_index: i64,
    #[serde(default)]
    entities: Vec<LegacyEntity>,
    #[serde(default)]
    settings: Option<EncounterSettings>,
}

fn first_round() -> i64 {
    1
}

impl LegacySnapshot {
    pub(crate) fn into_state(self) -> Result<EncounterState, ParseError> {
        let round = u32::try_from(self.round)
            .ok()
            .filter(|r| *r >= 1)
            .ok_or(ParseError::InvalidRound)?;
        let phase = usize::try_from(self.phase_index)
            .ok()
            .and_then(Phase::from_index)
            .ok_or(ParseError::InvalidPhaseIndex(self.phase_index))?;

        Ok(EncounterState {
            round,
            phase,
            entities: self.entities.into_iter().map(LegacyEntity::into_entity).collect(),
            settings: self.settings.unwrap_or_default(),
        })
    }
}

/// Read one entity in either schema
pub(crate) fn parse_entity(value: &Value) -> Result<Entity, ParseError> {
    match Entity::deserialize(value) {
        Ok(entity) => Ok(entity),
        Err(_) => Ok(LegacyEntity::deserialize(value)?.into_entity()),
    }
}

/// Read a roster document: either a bare array or `{ "entities": [...] }`.
pub fn parse_entity_list(value: &Value) -> Result<Vec<Entity>, ParseError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("entities") {
            Some(Value::Array(items)) => items,
            _ => return Err(ParseError::NotAnEntityList),
        },
        _ => return Err(ParseError::NotAnEntityList),
    };
    items.iter().map(parse_entity).collect()
}

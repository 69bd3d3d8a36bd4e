//! Snapshot import/export.
//!
//! Export always writes the canonical camelCase schema. Import reads the
//! canonical schema first and falls back to the flat legacy schema (see
//! [`legacy`]). Either way the result is checked against the state
//! invariants before it is handed back.

mod error;
mod legacy;

pub use error::ParseError;
pub use legacy::parse_entity_list;

use serde::Deserialize;
use serde_json::Value;
use stormclock_types::EncounterState;
use tracing::debug;

use legacy::LegacySnapshot;

/// Serialize the whole state as pretty-printed JSON
pub fn export_snapshot(state: &EncounterState) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(state)
}

/// Parse an exported document back into a state.
pub fn import_snapshot(bytes: &[u8]) -> Result<EncounterState, ParseError> {
    let value: Value = serde_json::from_slice(bytes)?;
    import_value(&value)
}

pub fn import_value(value: &Value) -> Result<EncounterState, ParseError> {
    let state = match EncounterState::deserialize(value) {
        Ok(state) => state,
        Err(canonical) => {
            debug!(error = %canonical, "Snapshot is not canonical, trying legacy schema");
            match LegacySnapshot::deserialize(value) {
                Ok(legacy) => legacy.into_state()?,
                Err(_) => return Err(ParseError::Malformed(canonical)),
            }
        }
    };

    if state.round < 1 {
        return Err(ParseError::InvalidRound);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormclock_types::{EntityKind, Phase, Segment, StatusCategory, StatusEffect};

    use crate::game_data::sample_state;

    #[test]
    fn export_then_import_is_lossless() {
        let mut state = sample_state(Default::default());
        state.round = 7;
        state.phase = Phase::SlowPlayers;
        state.entities[0].reaction_used = true;
        state.entities[1].notes = Some("windrunner squire".into());
        state.entities[2].status_effects.push(StatusEffect {
            id: "fx".into(),
            category: StatusCategory::Investiture,
            name: "Voidlight".into(),
            duration: Some(2),
        });

        let bytes = export_snapshot(&state).unwrap();
        let restored = import_snapshot(&bytes).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn export_uses_wire_names() {
        let state = sample_state(Default::default());
        let value: Value = serde_json::from_slice(&export_snapshot(&state).unwrap()).unwrap();
        assert_eq!(value["phaseIndex"], 0);
        assert_eq!(value["round"], 1);
        assert!(value["entities"][0]["currentSegment"].is_string());
        assert!(value["settings"]["storageKey"].is_string());
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = import_snapshot(b"{ not json").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn round_zero_is_rejected() {
        let err = import_snapshot(br#"{"round":0,"phaseIndex":0,"entities":[]}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidRound));
    }

    #[test]
    fn phase_out_of_range_is_rejected() {
        let err = import_snapshot(br#"{"round":2,"phaseIndex":9,"entities":[]}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidPhaseIndex(9)));
    }

    #[test]
    fn legacy_flat_schema_is_adapted() {
        let doc = br#"{
            "round": 3,
            "phaseIndex": 1,
            "entities": [{
                "id": "p1", "name": "Kaladin", "type": "player", "hp": 10, "maxHp": 10,
                "speed": "slow", "defaultSpeed": "fast", "statuses": ["Prone", " "],
                "statusInput": "", "reactionUsed": true, "unconscious": true, "notes": ""
            }]
        }"#;
        let state = import_snapshot(doc).unwrap();
        assert_eq!(state.round, 3);
        assert_eq!(state.phase, Phase::FastEnemies);

        let kaladin = &state.entities[0];
        assert_eq!(kaladin.id, "p1");
        assert_eq!(kaladin.current_segment, Segment::Slow);
        assert_eq!(kaladin.default_segment, Segment::Fast);
        assert!(kaladin.reaction_used);
        assert!(kaladin.is_unconscious());
        assert!(kaladin.has_status(StatusCategory::Condition, "Prone"));
        assert_eq!(kaladin.status_effects.len(), 2);
        assert_eq!(kaladin.notes, None);
    }

    #[test]
    fn legacy_missing_fields_get_defaults() {
        let doc = br#"{"entities":[{"name":"Szeth","type":"boss","isUnconscious":false}]}"#;
        let state = import_snapshot(doc).unwrap();
        assert_eq!(state.round, 1);
        assert_eq!(state.phase, Phase::FastPlayers);
        let szeth = &state.entities[0];
        assert!(!szeth.id.is_empty());
        assert_eq!(szeth.kind, EntityKind::Boss);
        assert_eq!(szeth.current_segment, Segment::Fast);
    }

    #[test]
    fn entity_list_accepts_both_schemas() {
        let value: Value = serde_json::from_str(
            r#"[
                {"id":"a","name":"Lopen","type":"player","currentSegment":"slow"},
                {"name":"Fused","type":"enemy","speed":"slow"}
            ]"#,
        )
        .unwrap();
        let entities = parse_entity_list(&value).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].id, "a");
        assert_eq!(entities[1].current_segment, Segment::Slow);

        let wrapped = serde_json::json!({ "entities": [{"name": "Teft", "type": "player"}] });
        assert_eq!(parse_entity_list(&wrapped).unwrap().len(), 1);

        let err = parse_entity_list(&serde_json::json!("players")).unwrap_err();
        assert!(matches!(err, ParseError::NotAnEntityList));
    }
}

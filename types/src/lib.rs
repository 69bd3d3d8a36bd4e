//! Shared encounter types for Stormclock
//!
//! This crate contains the serializable data model shared between the
//! encounter engine (stormclock-core) and its front-ends. The JSON shape of
//! these types is the persisted snapshot format, so field names are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Storage key used when neither the snapshot nor the config names one.
pub const DEFAULT_STORAGE_KEY: &str = "stormclock-encounter:v1";

/// Name of the condition that marks an entity as unconscious.
pub const UNCONSCIOUS: &str = "Unconscious";

// ─────────────────────────────────────────────────────────────────────────────
// Segments, Sides & Phases
// ─────────────────────────────────────────────────────────────────────────────

/// Which half of the round an entity acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    #[default]
    Fast,
    Slow,
}

impl Segment {
    pub fn toggled(self) -> Self {
        match self {
            Segment::Fast => Segment::Slow,
            Segment::Slow => Segment::Fast,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Fast => "Fast",
            Segment::Slow => "Slow",
        }
    }
}

/// Which side of the table acts in a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Players,
    Enemies,
}

/// One of the four (segment × side) steps of a round, in turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    FastPlayers,
    FastEnemies,
    SlowPlayers,
    SlowEnemies,
}

impl Phase {
    /// Number of phases in one round
    pub const COUNT: usize = 4;

    /// All phases in turn order
    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::FastPlayers,
        Phase::FastEnemies,
        Phase::SlowPlayers,
        Phase::SlowEnemies,
    ];

    /// Position of this phase in the cycle (0..=3)
    pub fn index(self) -> usize {
        match self {
            Phase::FastPlayers => 0,
            Phase::FastEnemies => 1,
            Phase::SlowPlayers => 2,
            Phase::SlowEnemies => 3,
        }
    }

    /// Resolve a cycle position. Returns None outside 0..=3.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn segment(self) -> Segment {
        match self {
            Phase::FastPlayers | Phase::FastEnemies => Segment::Fast,
            Phase::SlowPlayers | Phase::SlowEnemies => Segment::Slow,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Phase::FastPlayers | Phase::SlowPlayers => Side::Players,
            Phase::FastEnemies | Phase::SlowEnemies => Side::Enemies,
        }
    }

    /// Stable identifier, matches the labels used by saved encounters
    pub fn key(&self) -> &'static str {
        match self {
            Phase::FastPlayers => "FAST_PLAYERS",
            Phase::FastEnemies => "FAST_ENEMIES",
            Phase::SlowPlayers => "SLOW_PLAYERS",
            Phase::SlowEnemies => "SLOW_ENEMIES",
        }
    }

    /// Human-readable label (e.g. "Fast • Players")
    pub fn label(&self) -> &'static str {
        match self {
            Phase::FastPlayers => "Fast • Players",
            Phase::FastEnemies => "Fast • Enemies",
            Phase::SlowPlayers => "Slow • Players",
            Phase::SlowEnemies => "Slow • Enemies",
        }
    }
}

/// Serde adapter storing a [`Phase`] as its integer cycle position.
///
/// Out-of-range indices fail deserialization, so a snapshot can never hold a
/// phase that does not resolve to one of the four labels.
pub mod phase_index {
    use super::Phase;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(phase: &Phase, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(phase.index() as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Phase, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        usize::try_from(raw)
            .ok()
            .and_then(Phase::from_index)
            .ok_or_else(|| D::Error::custom(format!("phaseIndex {raw} is outside 0..=3")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

/// What kind of participant an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Player,
    Enemy,
    Ally,
    Boss,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Player,
        EntityKind::Enemy,
        EntityKind::Ally,
        EntityKind::Boss,
    ];

    /// Side whose phases this kind acts in. Allies are GM-run and act
    /// alongside the enemies.
    pub fn side(self) -> Side {
        match self {
            EntityKind::Player => Side::Players,
            EntityKind::Enemy | EntityKind::Ally | EntityKind::Boss => Side::Enemies,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Enemy => "enemy",
            EntityKind::Ally => "ally",
            EntityKind::Boss => "boss",
        }
    }
}

/// Status effect category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    /// Standard condition from the common checklist
    #[default]
    Condition,
    /// Named magical effect, optionally time-limited
    Investiture,
}

/// A status effect applied to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub id: String,
    pub category: StatusCategory,
    pub name: String,
    /// Rounds remaining. None = permanent until removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
}

impl StatusEffect {
    /// Returns true for the condition that encodes unconsciousness
    pub fn is_unconscious_marker(&self) -> bool {
        self.category == StatusCategory::Condition && self.name == UNCONSCIOUS
    }
}

/// A combat participant.
///
/// Unconsciousness is stored only as the `Unconscious` condition in
/// `status_effects`; [`Entity::is_unconscious`] derives the flag. The wire
/// form still carries an `unconscious` boolean (see [`EntityRecord`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntityRecord", into = "EntityRecord")]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    pub current_segment: Segment,
    pub default_segment: Segment,
    pub reaction_used: bool,
    pub status_effects: Vec<StatusEffect>,
    pub notes: Option<String>,
}

impl Entity {
    pub fn is_unconscious(&self) -> bool {
        self.status_effects.iter().any(StatusEffect::is_unconscious_marker)
    }

    pub fn status(&self, status_id: &str) -> Option<&StatusEffect> {
        self.status_effects.iter().find(|s| s.id == status_id)
    }

    /// True if the entity carries a status with this category and name
    pub fn has_status(&self, category: StatusCategory, name: &str) -> bool {
        self.status_effects
            .iter()
            .any(|s| s.category == category && s.name == name)
    }
}

/// JSON form of an [`Entity`].
///
/// `unconscious` is written from the condition list. On read, a `true` flag
/// without a matching condition adds one; a `false` flag never removes a
/// condition that is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub current_segment: Segment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_segment: Option<Segment>,
    #[serde(default)]
    pub reaction_used: bool,
    #[serde(default)]
    pub unconscious: bool,
    #[serde(default)]
    pub status_effects: Vec<StatusEffect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Id given to an `Unconscious` condition restored from a bare flag.
fn restored_marker_id(entity_id: &str) -> String {
    format!("{entity_id}-unconscious")
}

impl From<EntityRecord> for Entity {
    fn from(record: EntityRecord) -> Self {
        let mut status_effects = record.status_effects;
        if record.unconscious && !status_effects.iter().any(StatusEffect::is_unconscious_marker) {
            status_effects.push(StatusEffect {
                id: restored_marker_id(&record.id),
                category: StatusCategory::Condition,
                name: UNCONSCIOUS.to_string(),
                duration: None,
            });
        }
        Entity {
            default_segment: record.default_segment.unwrap_or(record.current_segment),
            id: record.id,
            name: record.name,
            kind: record.kind,
            current_segment: record.current_segment,
            reaction_used: record.reaction_used,
            status_effects,
            notes: record.notes,
        }
    }
}

impl From<Entity> for EntityRecord {
    fn from(entity: Entity) -> Self {
        let unconscious = entity.is_unconscious();
        EntityRecord {
            id: entity.id,
            name: entity.name,
            kind: entity.kind,
            current_segment: entity.current_segment,
            default_segment: Some(entity.default_segment),
            reaction_used: entity.reaction_used,
            unconscious,
            status_effects: entity.status_effects,
            notes: entity.notes,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings & Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Which key-value backend the encounter is persisted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    /// Survives process restart
    #[default]
    #[serde(alias = "local")]
    Durable,
    /// Cleared when the session ends
    #[serde(alias = "session", alias = "none")]
    Volatile,
}

impl PersistenceMode {
    pub fn label(&self) -> &'static str {
        match self {
            PersistenceMode::Durable => "durable",
            PersistenceMode::Volatile => "volatile",
        }
    }
}

/// Per-encounter settings, persisted with the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterSettings {
    #[serde(default, alias = "storageType")]
    pub persistence_mode: PersistenceMode,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Restore every entity's default segment at each new round
    #[serde(default)]
    pub reset_segments_each_round: bool,
    /// Skip phases whose lane is empty (Fast Players is never skipped)
    #[serde(default)]
    pub skip_empty_phases: bool,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for EncounterSettings {
    fn default() -> Self {
        Self {
            persistence_mode: PersistenceMode::default(),
            storage_key: default_storage_key(),
            reset_segments_each_round: false,
            skip_empty_phases: false,
        }
    }
}

/// The aggregate encounter state. This is the whole persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterState {
    pub round: u32,
    #[serde(rename = "phaseIndex", with = "phase_index")]
    pub phase: Phase,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub settings: EncounterSettings,
}

impl EncounterState {
    /// Round 1, Fast Players, no entities
    pub fn new(settings: EncounterSettings) -> Self {
        Self {
            round: 1,
            phase: Phase::FastPlayers,
            entities: Vec::new(),
            settings,
        }
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn phase_index(&self) -> usize {
        self.phase.index()
    }
}

impl Default for EncounterState {
    fn default() -> Self {
        Self::new(EncounterSettings::default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Config
// ─────────────────────────────────────────────────────────────────────────────

/// User configuration, stored on disk by stormclock-core.
///
/// Seeds the settings of a fresh encounter and controls session plumbing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub persistence_mode: PersistenceMode,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub reset_segments_each_round: bool,
    #[serde(default)]
    pub skip_empty_phases: bool,
    /// Quiet period before a pending snapshot is written
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,
    /// Root folder for encounter and roster documents
    #[serde(default)]
    pub content_directory: String,
    /// Seed the sample roster when no snapshot is stored
    #[serde(default = "default_true")]
    pub start_with_sample: bool,
}

fn default_autosave_debounce_ms() -> u64 {
    350
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_content_directory(String::new())
    }
}

impl AppConfig {
    /// Create a config with the given content directory.
    /// Other fields use their default values.
    pub fn with_content_directory(content_directory: String) -> Self {
        Self {
            persistence_mode: PersistenceMode::default(),
            storage_key: default_storage_key(),
            reset_segments_each_round: false,
            skip_empty_phases: false,
            autosave_debounce_ms: default_autosave_debounce_ms(),
            content_directory,
            start_with_sample: true,
        }
    }

    /// Encounter settings for a session started from this config
    pub fn encounter_settings(&self) -> EncounterSettings {
        EncounterSettings {
            persistence_mode: self.persistence_mode,
            storage_key: self.storage_key.clone(),
            reset_segments_each_round: self.reset_segments_each_round,
            skip_empty_phases: self.skip_empty_phases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_json(extra: &str) -> String {
        format!(
            r#"{{"id":"e1","name":"Kaladin","type":"player","currentSegment":"slow"{extra}}}"#
        )
    }

    #[test]
    fn missing_default_segment_falls_back_to_current() {
        let entity: Entity = serde_json::from_str(&entity_json("")).unwrap();
        assert_eq!(entity.default_segment, Segment::Slow);
        assert!(!entity.reaction_used);
        assert!(entity.status_effects.is_empty());
    }

    #[test]
    fn unconscious_flag_restores_condition() {
        let entity: Entity =
            serde_json::from_str(&entity_json(r#","unconscious":true"#)).unwrap();
        assert!(entity.is_unconscious());
        assert_eq!(entity.status_effects.len(), 1);
        assert_eq!(entity.status_effects[0].id, "e1-unconscious");
    }

    #[test]
    fn unconscious_flag_is_written_from_conditions() {
        let json = entity_json(
            r#","statusEffects":[{"id":"s1","category":"condition","name":"Unconscious"}]"#,
        );
        let entity: Entity = serde_json::from_str(&json).unwrap();
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["unconscious"], true);
        assert_eq!(value["type"], "player");
        assert_eq!(value["defaultSegment"], "slow");
    }

    #[test]
    fn investiture_named_unconscious_is_not_a_marker() {
        let json = entity_json(
            r#","statusEffects":[{"id":"s1","category":"investiture","name":"Unconscious"}]"#,
        );
        let entity: Entity = serde_json::from_str(&json).unwrap();
        assert!(!entity.is_unconscious());
    }

    #[test]
    fn phase_index_out_of_range_is_rejected() {
        let json = r#"{"round":1,"phaseIndex":4,"entities":[]}"#;
        assert!(serde_json::from_str::<EncounterState>(json).is_err());

        let json = r#"{"round":1,"phaseIndex":-1,"entities":[]}"#;
        assert!(serde_json::from_str::<EncounterState>(json).is_err());
    }

    #[test]
    fn settings_accept_storage_type_alias() {
        let json = r#"{"storageType":"none","storageKey":"k","resetSegmentsEachRound":true}"#;
        let settings: EncounterSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.persistence_mode, PersistenceMode::Volatile);
        assert!(settings.reset_segments_each_round);
        assert!(!settings.skip_empty_phases);
    }

    #[test]
    fn phase_helpers() {
        assert_eq!(Phase::from_index(2), Some(Phase::SlowPlayers));
        assert_eq!(Phase::SlowEnemies.segment(), Segment::Slow);
        assert_eq!(Phase::FastEnemies.side(), Side::Enemies);
        assert_eq!(EntityKind::Ally.side(), Side::Enemies);
    }
}

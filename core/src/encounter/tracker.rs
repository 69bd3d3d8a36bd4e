//! Encounter tracker: the single owner of encounter state.
//!
//! Each user action maps to one method. Methods apply the change
//! synchronously and return the resulting [`TrackerSignal`]s, which are also
//! passed to every subscribed [`SignalHandler`]. Persistence is not done
//! here: callers hand `state()` to an autosaver after each mutation.

use stormclock_types::{EncounterSettings, EncounterState, Entity, Phase, Segment};
use tracing::{debug, info};

use super::lanes::{self, SegmentGroups};
use super::phase::{self, PhaseStep};
use super::roster::{self, EntityPatch, NewEntity, NewStatus};
use super::round::{self, ResetMode};
use super::signal::{ReplaceReason, SignalHandler, TrackerSignal};
use super::ValidationError;
use crate::codec::{self, ParseError};

type BoxedHandler = Box<dyn SignalHandler + Send + Sync>;

pub struct EncounterTracker {
    state: EncounterState,
    handlers: Vec<BoxedHandler>,
}

impl Default for EncounterTracker {
    fn default() -> Self {
        Self::new(EncounterState::default())
    }
}

impl EncounterTracker {
    pub fn new(state: EncounterState) -> Self {
        Self {
            state,
            handlers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, handler: impl SignalHandler + Send + Sync + 'static) {
        self.handlers.push(Box::new(handler));
    }

    // --- Accessors ---

    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    pub fn into_state(self) -> EncounterState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn settings(&self) -> &EncounterSettings {
        &self.state.settings
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.state.entity(id)
    }

    /// Entities acting in `phase`
    pub fn lane(&self, phase: Phase) -> Vec<&Entity> {
        lanes::phase_lane(&self.state.entities, phase)
    }

    pub fn groups(&self) -> SegmentGroups<'_> {
        lanes::group_by_segment_and_kind(&self.state.entities)
    }

    // --- Turn order ---

    /// Move to the next phase, starting a new round on wraparound.
    pub fn next_phase(&mut self) -> Vec<TrackerSignal> {
        let from = self.state.phase;
        let step = if self.state.settings.skip_empty_phases {
            let entities = &self.state.entities;
            phase::advance_skipping(from, |p| lanes::lane_is_occupied(entities, p))
        } else {
            phase::advance(from)
        };

        let mut signals = Vec::new();
        if step.starts_new_round() {
            self.state.round = step.apply_to(self.state.round);
            signals.extend(self.start_round());
        }
        self.state.phase = step.phase;
        signals.push(TrackerSignal::PhaseChanged {
            from,
            to: step.phase,
            round: self.state.round,
        });

        debug!(round = self.state.round, phase = step.phase.key(), "Advanced phase");
        self.emit(signals)
    }

    /// Move to the previous phase. Never runs the round-start transform.
    pub fn previous_phase(&mut self) -> Vec<TrackerSignal> {
        let from = self.state.phase;
        let step: PhaseStep = if self.state.settings.skip_empty_phases {
            let entities = &self.state.entities;
            phase::retreat_skipping(from, |p| lanes::lane_is_occupied(entities, p))
        } else {
            phase::retreat(from)
        };

        let mut signals = Vec::new();
        let round = step.apply_to(self.state.round);
        if round != self.state.round {
            self.state.round = round;
            signals.push(TrackerSignal::RoundRewound { round });
        }
        self.state.phase = step.phase;
        signals.push(TrackerSignal::PhaseChanged {
            from,
            to: step.phase,
            round: self.state.round,
        });

        debug!(round = self.state.round, phase = step.phase.key(), "Rewound phase");
        self.emit(signals)
    }

    fn start_round(&mut self) -> Vec<TrackerSignal> {
        let cleared = self.state.entities.iter().filter(|e| e.reaction_used).count();
        let boundary = round::on_round_boundary_crossed(&mut self.state.entities, &self.state.settings);

        info!(
            round = self.state.round,
            expired = boundary.expired.len(),
            segment_resets = boundary.segment_resets.len(),
            "New round"
        );

        let mut signals = vec![
            TrackerSignal::RoundAdvanced {
                round: self.state.round,
            },
            TrackerSignal::ReactionsReset { cleared },
        ];
        signals.extend(boundary.expired.into_iter().map(|e| TrackerSignal::EffectExpired {
            entity_id: e.entity_id,
            effect: e.effect,
        }));
        signals.extend(boundary.segment_resets.into_iter().map(|r| TrackerSignal::SegmentChanged {
            entity_id: r.entity_id,
            from: r.from,
            to: r.to,
        }));
        signals
    }

    /// Back to round 1, Fast Players, keeping the roster
    pub fn reset_round(&mut self) -> Vec<TrackerSignal> {
        let from = self.state.phase;
        self.state.round = 1;
        self.state.phase = Phase::FastPlayers;
        self.emit(vec![TrackerSignal::PhaseChanged {
            from,
            to: Phase::FastPlayers,
            round: 1,
        }])
    }

    /// Manual override: clear every reaction without changing the round
    pub fn reset_reactions(&mut self) -> Vec<TrackerSignal> {
        let cleared = round::reset_reactions(&mut self.state.entities);
        self.emit(vec![TrackerSignal::ReactionsReset { cleared }])
    }

    /// Hard reset to an empty or sample encounter. Settings are kept.
    pub fn reset_encounter(&mut self, mode: ResetMode) -> Vec<TrackerSignal> {
        let settings = self.state.settings.clone();
        self.state = round::reset_encounter(mode, settings);
        info!(?mode, "Encounter reset");
        self.emit(vec![TrackerSignal::StateReplaced {
            reason: ReplaceReason::Reset,
        }])
    }

    // --- Roster ---

    pub fn add_entity(&mut self, new: NewEntity) -> Result<Vec<TrackerSignal>, ValidationError> {
        let entity = roster::add(&mut self.state.entities, new)?;
        let signal = TrackerSignal::EntityAdded {
            entity_id: entity.id.clone(),
            name: entity.name.clone(),
        };
        info!(entity_id = %entity.id, name = %entity.name, kind = entity.kind.label(), "Entity added");
        Ok(self.emit(vec![signal]))
    }

    pub fn update_entity(&mut self, id: &str, patch: EntityPatch) -> Result<Vec<TrackerSignal>, ValidationError> {
        let segment_change = patch
            .current_segment
            .zip(self.entity(id).map(|e| e.current_segment))
            .filter(|(to, from)| to != from);

        if !roster::update(&mut self.state.entities, id, patch)? {
            debug!(entity_id = id, "Update target not found");
            return Ok(Vec::new());
        }

        let mut signals = vec![TrackerSignal::EntityUpdated {
            entity_id: id.to_string(),
        }];
        if let Some((to, from)) = segment_change {
            signals.push(TrackerSignal::SegmentChanged {
                entity_id: id.to_string(),
                from,
                to,
            });
        }
        Ok(self.emit(signals))
    }

    pub fn remove_entity(&mut self, id: &str) -> Vec<TrackerSignal> {
        match roster::remove(&mut self.state.entities, id) {
            Some(entity) => {
                info!(entity_id = id, name = %entity.name, "Entity removed");
                self.emit(vec![TrackerSignal::EntityRemoved {
                    entity_id: entity.id,
                    name: entity.name,
                }])
            }
            None => Vec::new(),
        }
    }

    pub fn toggle_segment(&mut self, id: &str) -> Vec<TrackerSignal> {
        match roster::toggle_segment(&mut self.state.entities, id) {
            Some(to) => self.emit(vec![TrackerSignal::SegmentChanged {
                entity_id: id.to_string(),
                from: to.toggled(),
                to,
            }]),
            None => Vec::new(),
        }
    }

    /// Drop an entity into the lane for `segment`
    pub fn move_to_segment(&mut self, id: &str, segment: Segment) -> Vec<TrackerSignal> {
        match roster::move_to_segment(&mut self.state.entities, id, segment) {
            Some(from) if from != segment => self.emit(vec![TrackerSignal::SegmentChanged {
                entity_id: id.to_string(),
                from,
                to: segment,
            }]),
            _ => Vec::new(),
        }
    }

    pub fn set_default_segment(&mut self, id: &str, segment: Segment) -> Vec<TrackerSignal> {
        if roster::set_default_segment(&mut self.state.entities, id, segment) {
            self.emit(vec![TrackerSignal::EntityUpdated {
                entity_id: id.to_string(),
            }])
        } else {
            Vec::new()
        }
    }

    pub fn toggle_reaction(&mut self, id: &str) -> Vec<TrackerSignal> {
        match roster::toggle_reaction(&mut self.state.entities, id) {
            Some(used) => self.emit(vec![TrackerSignal::ReactionToggled {
                entity_id: id.to_string(),
                used,
            }]),
            None => Vec::new(),
        }
    }

    pub fn toggle_unconscious(&mut self, id: &str) -> Vec<TrackerSignal> {
        match roster::toggle_unconscious(&mut self.state.entities, id) {
            Some(unconscious) => self.emit(vec![TrackerSignal::UnconsciousChanged {
                entity_id: id.to_string(),
                unconscious,
            }]),
            None => Vec::new(),
        }
    }

    pub fn add_status_effect(&mut self, id: &str, status: NewStatus) -> Result<Vec<TrackerSignal>, ValidationError> {
        match roster::add_status_effect(&mut self.state.entities, id, status)? {
            Some(status) => Ok(self.emit(vec![TrackerSignal::StatusAdded {
                entity_id: id.to_string(),
                status,
            }])),
            None => Ok(Vec::new()),
        }
    }

    pub fn remove_status_effect(&mut self, id: &str, status_id: &str) -> Vec<TrackerSignal> {
        match roster::remove_status_effect(&mut self.state.entities, id, status_id) {
            Some(status) => self.emit(vec![TrackerSignal::StatusRemoved {
                entity_id: id.to_string(),
                status,
            }]),
            None => Vec::new(),
        }
    }

    // --- Whole state ---

    pub fn update_settings(&mut self, f: impl FnOnce(&mut EncounterSettings)) -> Vec<TrackerSignal> {
        let before = self.state.settings.clone();
        f(&mut self.state.settings);
        if self.state.settings == before {
            return Vec::new();
        }
        info!(
            mode = self.state.settings.persistence_mode.label(),
            key = %self.state.settings.storage_key,
            reset_segments = self.state.settings.reset_segments_each_round,
            skip_empty = self.state.settings.skip_empty_phases,
            "Encounter settings changed"
        );
        self.emit(vec![TrackerSignal::SettingsChanged])
    }

    /// Replace the roster, keeping round, phase and settings
    pub fn load_roster(&mut self, entities: Vec<Entity>) -> Vec<TrackerSignal> {
        info!(count = entities.len(), "Roster loaded");
        self.state.entities = entities;
        self.emit(vec![TrackerSignal::StateReplaced {
            reason: ReplaceReason::RosterLoaded,
        }])
    }

    pub fn replace_state(&mut self, state: EncounterState, reason: ReplaceReason) -> Vec<TrackerSignal> {
        self.state = state;
        self.emit(vec![TrackerSignal::StateReplaced { reason }])
    }

    /// Replace the whole state from an exported document.
    /// On error the current state is left untouched.
    pub fn import_snapshot(&mut self, bytes: &[u8]) -> Result<Vec<TrackerSignal>, ParseError> {
        let state = codec::import_snapshot(bytes)?;
        info!(
            round = state.round,
            entities = state.entities.len(),
            "Snapshot imported"
        );
        Ok(self.replace_state(state, ReplaceReason::Import))
    }

    pub fn export_snapshot(&self) -> serde_json::Result<Vec<u8>> {
        codec::export_snapshot(&self.state)
    }

    fn emit(&mut self, signals: Vec<TrackerSignal>) -> Vec<TrackerSignal> {
        for handler in &mut self.handlers {
            handler.handle_signals(&signals, &self.state);
        }
        signals
    }
}

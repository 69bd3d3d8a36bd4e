use stormclock_types::{EncounterState, Phase, Segment, StatusEffect};

/// Why the whole encounter state was swapped out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceReason {
    Import,
    Reset,
    Reload,
    RosterLoaded,
}

/// Signals returned by every tracker mutation.
/// Front-ends use these for feedback and animation instead of diffing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerSignal {
    // Turn order
    PhaseChanged {
        from: Phase,
        to: Phase,
        round: u32,
    },
    RoundAdvanced {
        round: u32,
    },
    RoundRewound {
        round: u32,
    },
    ReactionsReset {
        cleared: usize,
    },
    EffectExpired {
        entity_id: String,
        effect: StatusEffect,
    },

    // Roster
    EntityAdded {
        entity_id: String,
        name: String,
    },
    EntityUpdated {
        entity_id: String,
    },
    EntityRemoved {
        entity_id: String,
        name: String,
    },
    /// Entity changed lanes (toggle, drop, or round reset)
    SegmentChanged {
        entity_id: String,
        from: Segment,
        to: Segment,
    },
    ReactionToggled {
        entity_id: String,
        used: bool,
    },
    UnconsciousChanged {
        entity_id: String,
        unconscious: bool,
    },
    StatusAdded {
        entity_id: String,
        status: StatusEffect,
    },
    StatusRemoved {
        entity_id: String,
        status: StatusEffect,
    },

    // Whole state
    SettingsChanged,
    StateReplaced {
        reason: ReplaceReason,
    },
}

/// Trait for components that react to tracker signals.
/// Register with `EncounterTracker::subscribe`.
pub trait SignalHandler {
    /// Handle a single signal. `state` is the encounter after the mutation.
    fn handle_signal(&mut self, signal: &TrackerSignal, state: &EncounterState);

    /// Handle multiple signals (default implementation calls handle_signal for each)
    fn handle_signals(&mut self, signals: &[TrackerSignal], state: &EncounterState) {
        for signal in signals {
            self.handle_signal(signal, state);
        }
    }
}

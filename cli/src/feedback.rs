//! One-line feedback for tracker signals.

use stormclock_core::encounter::{ReplaceReason, SignalHandler, TrackerSignal};
use stormclock_types::EncounterState;

/// Prints a short line for signals worth calling out between redraws.
pub struct Feedback;

fn name_of<'a>(state: &'a EncounterState, id: &str) -> &'a str {
    state.entity(id).map(|e| e.name.as_str()).unwrap_or("(removed)")
}

impl SignalHandler for Feedback {
    fn handle_signal(&mut self, signal: &TrackerSignal, state: &EncounterState) {
        match signal {
            TrackerSignal::RoundAdvanced { round } => println!("── Round {round} ──"),
            TrackerSignal::RoundRewound { round } => println!("Back to round {round}"),
            TrackerSignal::ReactionsReset { cleared } if *cleared > 0 => {
                println!("{cleared} reaction(s) restored")
            }
            TrackerSignal::EffectExpired { entity_id, effect } => {
                println!("{} wore off {}", effect.name, name_of(state, entity_id))
            }
            TrackerSignal::SegmentChanged { entity_id, to, .. } => {
                println!("{} dashes to {}", name_of(state, entity_id), to.label())
            }
            TrackerSignal::EntityAdded { name, entity_id } => {
                println!("Added {name} [{}]", crate::view::short_id(entity_id))
            }
            TrackerSignal::EntityRemoved { name, .. } => println!("Removed {name}"),
            TrackerSignal::ReactionToggled { entity_id, used } => {
                let verb = if *used { "used" } else { "regained" };
                println!("{} {verb} their reaction", name_of(state, entity_id))
            }
            TrackerSignal::UnconsciousChanged { entity_id, unconscious } => {
                let what = if *unconscious { "falls unconscious" } else { "comes to" };
                println!("{} {what}", name_of(state, entity_id))
            }
            TrackerSignal::StatusAdded { entity_id, status } => {
                println!("{} gains {}", name_of(state, entity_id), status.name)
            }
            TrackerSignal::StatusRemoved { entity_id, status } => {
                println!("{} loses {}", name_of(state, entity_id), status.name)
            }
            TrackerSignal::StateReplaced { reason } => {
                let what = match reason {
                    ReplaceReason::Import => "imported",
                    ReplaceReason::Reset => "reset",
                    ReplaceReason::Reload => "reloaded",
                    ReplaceReason::RosterLoaded => "roster loaded",
                };
                println!("Encounter {what}")
            }
            _ => {}
        }
    }
}

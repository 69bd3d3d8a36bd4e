//! Encounter engine: phase cycle, roster store, round transforms and the
//! tracker that ties them together.

mod error;
pub mod lanes;
pub mod phase;
pub mod roster;
pub mod round;
mod signal;
mod tracker;


pub use error::ValidationError;
pub use lanes::{KindGroups, SegmentGroups, acts_in, group_by_segment_and_kind, lane_is_occupied, phase_lane};
pub use phase::PhaseStep;
pub use roster::{EntityPatch, NewEntity, NewStatus};
pub use round::{ExpiredEffect, ResetMode, RoundBoundary, SegmentReset};
pub use signal::{ReplaceReason, SignalHandler, TrackerSignal};
pub use tracker::EncounterTracker;

//! Phase cycle for encounter rounds.
//!
//! A round walks the fixed cycle Fast Players → Fast Enemies → Slow Players →
//! Slow Enemies. Moving forward past Slow Enemies starts the next round;
//! moving back past Fast Players returns to the previous one.
//!
//! The skipping variants pass over phases whose lane is empty. Fast Players
//! is the anchor and is never skipped, so every round visits at least one
//! phase.

use stormclock_types::Phase;

/// Outcome of a single phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStep {
    /// Phase landed on
    pub phase: Phase,
    /// Change to the round counter (+1 when wrapping forward, -1 when wrapping back)
    pub round_delta: i32,
}

impl PhaseStep {
    /// Apply the round delta, never going below round 1
    pub fn apply_to(&self, round: u32) -> u32 {
        let next = i64::from(round) + i64::from(self.round_delta);
        next.clamp(1, i64::from(u32::MAX)) as u32
    }

    /// True when this step moved forward into a new round
    pub fn starts_new_round(&self) -> bool {
        self.round_delta > 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Plain Cycle
// ═══════════════════════════════════════════════════════════════════════════

/// Next phase in turn order. Wrapping onto Fast Players starts a new round.
pub fn advance(phase: Phase) -> PhaseStep {
    let next = (phase.index() + 1) % Phase::COUNT;
    PhaseStep {
        phase: Phase::ALL[next],
        round_delta: if next == 0 { 1 } else { 0 },
    }
}

/// Previous phase in turn order. Leaving Fast Players goes back one round.
pub fn retreat(phase: Phase) -> PhaseStep {
    let prev = (phase.index() + Phase::COUNT - 1) % Phase::COUNT;
    PhaseStep {
        phase: Phase::ALL[prev],
        round_delta: if phase.index() == 0 { -1 } else { 0 },
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Skip-Empty Cycle
// ═══════════════════════════════════════════════════════════════════════════

/// Advance, passing over phases for which `is_occupied` is false.
pub fn advance_skipping(phase: Phase, is_occupied: impl Fn(Phase) -> bool) -> PhaseStep {
    walk(phase, advance, is_occupied)
}

/// Retreat, passing over phases for which `is_occupied` is false.
pub fn retreat_skipping(phase: Phase, is_occupied: impl Fn(Phase) -> bool) -> PhaseStep {
    walk(phase, retreat, is_occupied)
}

/// Repeatedly apply `step` until an occupied phase or the anchor is reached.
///
/// Bounded to one full cycle. If the walk comes back around to `start`, the
/// plain single step is returned instead. The round delta sums the wraps
/// actually crossed, not the number of phases skipped.
fn walk(start: Phase, step: fn(Phase) -> PhaseStep, is_occupied: impl Fn(Phase) -> bool) -> PhaseStep {
    let first = step(start);
    let mut current = first;

    for _ in 0..Phase::COUNT {
        if current.phase == Phase::FastPlayers || is_occupied(current.phase) {
            return current;
        }
        if current.phase == start {
            break;
        }
        let next = step(current.phase);
        current = PhaseStep {
            phase: next.phase,
            round_delta: current.round_delta + next.round_delta,
        };
    }

    first
}

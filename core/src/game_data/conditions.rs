//! Condition catalogue.
//!
//! The standard conditions offered when adding a condition-category status,
//! plus the suggested investiture names. Polarity drives how a front-end
//! tints the badge.

use phf::phf_map;
use stormclock_types::UNCONSCIOUS;

/// Whether a condition helps or hinders the entity carrying it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

// ═══════════════════════════════════════════════════════════════════════════
// Conditions
// ═══════════════════════════════════════════════════════════════════════════

static CONDITION_POLARITY: phf::Map<&'static str, Polarity> = phf_map! {
    "Afflicted" => Polarity::Negative,
    "Determined" => Polarity::Positive,
    "Disoriented" => Polarity::Negative,
    "Empowered" => Polarity::Positive,
    "Exhausted" => Polarity::Negative,
    "Focused" => Polarity::Positive,
    "Invested" => Polarity::Positive,
    "Immobilized" => Polarity::Negative,
    "Prone" => Polarity::Negative,
    "Slowed" => Polarity::Negative,
    "Stunned" => Polarity::Negative,
    "Surprised" => Polarity::Negative,
};

/// Conditions in menu order. `Unconscious` is toggled separately and is not listed.
pub const DEFAULT_CONDITIONS: [&str; 12] = [
    "Afflicted",
    "Determined",
    "Disoriented",
    "Empowered",
    "Exhausted",
    "Focused",
    "Invested",
    "Immobilized",
    "Prone",
    "Slowed",
    "Stunned",
    "Surprised",
];

/// Investiture names offered as suggestions. Any name is accepted.
pub const INVESTITURE_SUGGESTIONS: [&str; 3] = ["Stormlight", "Lifelight", "Warlight"];

/// Polarity of a standard condition, None for custom names
pub fn condition_polarity(name: &str) -> Option<Polarity> {
    if name == UNCONSCIOUS {
        return Some(Polarity::Negative);
    }
    CONDITION_POLARITY.get(name).copied()
}

pub fn is_standard_condition(name: &str) -> bool {
    CONDITION_POLARITY.contains_key(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_condition_has_a_polarity() {
        for name in DEFAULT_CONDITIONS {
            assert!(is_standard_condition(name), "{name} missing from polarity map");
        }
        assert_eq!(CONDITION_POLARITY.len(), DEFAULT_CONDITIONS.len());
    }

    #[test]
    fn polarity_lookup() {
        assert_eq!(condition_polarity("Empowered"), Some(Polarity::Positive));
        assert_eq!(condition_polarity("Stunned"), Some(Polarity::Negative));
        assert_eq!(condition_polarity(UNCONSCIOUS), Some(Polarity::Negative));
        assert_eq!(condition_polarity("Drunk"), None);
        assert!(!is_standard_condition(UNCONSCIOUS));
    }
}

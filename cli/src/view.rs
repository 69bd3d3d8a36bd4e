//! Text view of the four lanes.

use stormclock_core::encounter::EncounterTracker;
use stormclock_core::{Polarity, condition_polarity};
use stormclock_types::{Entity, Phase, StatusCategory, StatusEffect};

/// First eight characters of an id, enough to address it from the prompt
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn status_label(status: &StatusEffect) -> String {
    let mark = match status.category {
        StatusCategory::Investiture => "✦",
        StatusCategory::Condition => match condition_polarity(&status.name) {
            Some(Polarity::Positive) => "+",
            Some(Polarity::Negative) => "-",
            None => "•",
        },
    };
    match status.duration {
        Some(rounds) => format!("{mark}{} ({rounds}r) [{}]", status.name, short_id(&status.id)),
        None => format!("{mark}{} [{}]", status.name, short_id(&status.id)),
    }
}

pub fn entity_line(entity: &Entity) -> String {
    let mut line = format!("[{}] {} ({})", short_id(&entity.id), entity.name, entity.kind.label());
    if entity.default_segment != entity.current_segment {
        line.push_str(&format!(" ↺{}", entity.default_segment.label()));
    }
    if entity.reaction_used {
        line.push_str(" ⟲used");
    }
    if entity.is_unconscious() {
        line.push_str(" ✖KO");
    }

    let statuses: Vec<String> = entity
        .status_effects
        .iter()
        .filter(|s| !s.is_unconscious_marker())
        .map(status_label)
        .collect();
    if !statuses.is_empty() {
        line.push_str(" | ");
        line.push_str(&statuses.join(", "));
    }
    if let Some(notes) = &entity.notes {
        line.push_str(&format!(" # {notes}"));
    }
    line
}

pub fn render(tracker: &EncounterTracker) -> String {
    let mut lines = vec![format!("Round {} • {}", tracker.round(), tracker.phase().label())];

    for phase in Phase::ALL {
        let marker = if phase == tracker.phase() { "▶" } else { " " };
        lines.push(format!("{marker} {}", phase.label()));

        let lane = tracker.lane(phase);
        if lane.is_empty() {
            lines.push("    (empty)".to_string());
        }
        lines.extend(lane.into_iter().map(|e| format!("    {}", entity_line(e))));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormclock_core::encounter::{NewEntity, NewStatus};
    use stormclock_types::EntityKind;

    #[test]
    fn short_id_handles_short_and_long_ids() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("0123456789abcdef"), "01234567");
    }

    #[test]
    fn render_marks_current_phase_and_empty_lanes() {
        let mut tracker = EncounterTracker::default();
        tracker
            .add_entity(NewEntity::new("Kaladin", EntityKind::Player))
            .unwrap();
        let text = render(&tracker);
        assert!(text.starts_with("Round 1 • Fast • Players"));
        assert!(text.contains("▶ Fast • Players"));
        assert!(text.contains("Kaladin (player)"));
        assert_eq!(text.matches("(empty)").count(), 3);
    }

    #[test]
    fn entity_line_shows_flags_and_statuses() {
        let mut tracker = EncounterTracker::default();
        let id = match &tracker
            .add_entity(NewEntity::new("Teft", EntityKind::Player))
            .unwrap()[0]
        {
            stormclock_core::TrackerSignal::EntityAdded { entity_id, .. } => entity_id.clone(),
            _ => unreachable!(),
        };
        tracker.toggle_unconscious(&id);
        tracker
            .add_status_effect(&id, NewStatus::investiture("Stormlight", Some(2)))
            .unwrap();

        let line = entity_line(tracker.entity(&id).unwrap());
        assert!(line.contains("✖KO"));
        assert!(line.contains("✦Stormlight (2r)"));
        assert!(!line.contains("Unconscious"));
    }
}

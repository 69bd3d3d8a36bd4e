//! Lane projections over the roster.
//!
//! Grouping is by `(current_segment, kind)`. The phase lanes add one rule on
//! top: bosses act in both segments, so they appear in both enemy lanes.

use stormclock_types::{Entity, EntityKind, Phase, Segment, Side};

/// Entities of one segment, split by kind. Roster order is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KindGroups<'a> {
    pub player: Vec<&'a Entity>,
    pub enemy: Vec<&'a Entity>,
    pub ally: Vec<&'a Entity>,
    pub boss: Vec<&'a Entity>,
}

impl<'a> KindGroups<'a> {
    pub fn of_kind(&self, kind: EntityKind) -> &[&'a Entity] {
        match kind {
            EntityKind::Player => &self.player,
            EntityKind::Enemy => &self.enemy,
            EntityKind::Ally => &self.ally,
            EntityKind::Boss => &self.boss,
        }
    }

    fn push(&mut self, entity: &'a Entity) {
        match entity.kind {
            EntityKind::Player => self.player.push(entity),
            EntityKind::Enemy => self.enemy.push(entity),
            EntityKind::Ally => self.ally.push(entity),
            EntityKind::Boss => self.boss.push(entity),
        }
    }

    pub fn len(&self) -> usize {
        self.player.len() + self.enemy.len() + self.ally.len() + self.boss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Roster split by current segment, then kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentGroups<'a> {
    pub fast: KindGroups<'a>,
    pub slow: KindGroups<'a>,
}

impl<'a> SegmentGroups<'a> {
    pub fn segment(&self, segment: Segment) -> &KindGroups<'a> {
        match segment {
            Segment::Fast => &self.fast,
            Segment::Slow => &self.slow,
        }
    }
}

/// Group entities by the segment they currently act in and their kind.
pub fn group_by_segment_and_kind(entities: &[Entity]) -> SegmentGroups<'_> {
    let mut groups = SegmentGroups::default();
    for entity in entities {
        match entity.current_segment {
            Segment::Fast => groups.fast.push(entity),
            Segment::Slow => groups.slow.push(entity),
        }
    }
    groups
}

/// True if `entity` acts in `phase`. Bosses act in both enemy lanes.
pub fn acts_in(entity: &Entity, phase: Phase) -> bool {
    match phase.side() {
        Side::Players => entity.kind == EntityKind::Player && entity.current_segment == phase.segment(),
        Side::Enemies => {
            entity.kind == EntityKind::Boss
                || (entity.kind.side() == Side::Enemies && entity.current_segment == phase.segment())
        }
    }
}

/// Entities that act in `phase`.
///
/// Enemy lanes list bosses first, then enemies and allies in roster order.
pub fn phase_lane(entities: &[Entity], phase: Phase) -> Vec<&Entity> {
    let bosses = entities
        .iter()
        .filter(|e| e.kind == EntityKind::Boss && acts_in(e, phase));
    let others = entities
        .iter()
        .filter(|e| e.kind != EntityKind::Boss && acts_in(e, phase));
    bosses.chain(others).collect()
}

/// True if at least one entity acts in `phase`
pub fn lane_is_occupied(entities: &[Entity], phase: Phase) -> bool {
    entities.iter().any(|e| acts_in(e, phase))
}

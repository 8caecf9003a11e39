#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pixel-precise collision queries over a [`Level`]: point standability,
//! solid-body collision against the level and against other entities, and
//! named-area "user" collision detection with its per-step notice table.
//!
//! Solid data and collision areas are authored facing right; every query
//! here applies facing correction so callers reason in world space only.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use ridgeline_core::{
    AllowPlatform, CollisionArea, CollisionInfo, Dimensions, EntityId, MoveDirection, Point, Rect,
};
use ridgeline_world::{Entity, Level};

/// Upper bound on contacts reported for a single entity pair per step.
pub const MAX_CONTACTS_PER_PAIR: usize = 16;

/// Tests whether a world point offers support to stand on.
///
/// Checks level solidity first (including platform tops when `allow` permits
/// them), then the platforms and solid bodies of every other entity. The
/// querying entity itself is skipped so it cannot stand on its own body.
pub fn point_standable(
    level: &Level,
    entity: &Entity,
    x: i32,
    y: i32,
    mut info: Option<&mut CollisionInfo>,
    allow: AllowPlatform,
) -> bool {
    let surface = match allow {
        AllowPlatform::SolidAndPlatforms => level.standable_surface(x, y),
        AllowPlatform::SolidOnly => level.solid_surface(x, y),
    };
    if let Some(surface) = surface {
        if let Some(info) = info.as_deref_mut() {
            info.read_surface(surface);
            // Standable but not solid means the hit came from a platform top.
            info.platform = level.solid_surface(x, y).is_none();
        }
        return true;
    }

    let pt = Point::new(x, y);
    for other in level.solid_entities() {
        if other.id() == entity.id() {
            continue;
        }

        if allow == AllowPlatform::SolidAndPlatforms || other.solid_platform() {
            if let Some(platform_rect) = other.platform_rect() {
                if platform_rect.contains(pt) {
                    if let Some(info) = info.as_deref_mut() {
                        info.collide_with = Some(other.id());
                        info.friction = other.surface_friction();
                        info.traction = other.surface_traction();
                        info.adjust_y = y - platform_rect.y();
                        info.platform = !other.solid_platform();
                    }
                    return true;
                }
            }
        }

        if !dimensions_match(
            entity.solid_dimensions(),
            entity.weak_solid_dimensions(),
            other.solid_dimensions(),
            other.weak_solid_dimensions(),
        ) {
            continue;
        }
        if !other.solid_rect().contains(pt) {
            continue;
        }
        if let Some(solid) = other.solid() {
            let local_x = if other.face_right() {
                x - other.x()
            } else {
                other.x() + other.frame().width() - 1 - x
            };
            if let Some(area_id) = solid.solid_at(local_x, y - other.y()) {
                if let Some(info) = info.as_deref_mut() {
                    info.collide_with = Some(other.id());
                    info.collide_with_area_id = Some(area_id.to_owned());
                    info.friction = other.surface_friction();
                    info.traction = other.surface_traction();
                }
                return true;
            }
        }
    }

    false
}

/// Tests an entity's solid body against level solidity.
///
/// `dir` selects which edge point set to probe; `MoveDirection::None` probes
/// every solid point. When the entity faces left, `Left` and `Right` are
/// swapped before selecting the point set so callers keep facing-invariant
/// direction semantics.
pub fn entity_collides_with_level(
    level: &Level,
    entity: &Entity,
    dir: MoveDirection,
    mut info: Option<&mut CollisionInfo>,
) -> bool {
    let Some(solid) = entity.solid() else {
        return false;
    };
    let dir = if entity.face_right() { dir } else { dir.mirrored() };

    if !level.may_be_solid_in_rect(entity.solid_rect()) {
        return false;
    }

    for map in solid.maps() {
        if let Some(surface) = level.solid_points(entity, map.dir(dir)) {
            if let Some(info) = info.as_deref_mut() {
                info.read_surface(surface);
                info.area_id = Some(map.id().to_owned());
            }
            return true;
        }
    }

    false
}

/// Counts how many probe points of the entity's solid body lie in solid
/// level space; used by movement code to gauge how deeply it is embedded.
#[must_use]
pub fn entity_collides_with_level_count(level: &Level, entity: &Entity, dir: MoveDirection) -> usize {
    let Some(solid) = entity.solid() else {
        return 0;
    };
    let dir = if entity.face_right() { dir } else { dir.mirrored() };

    let mut count = 0;
    for map in solid.maps() {
        for point in map.dir(dir) {
            let x = if entity.face_right() {
                entity.x() + point.x
            } else {
                entity.x() + entity.frame().width() - 1 - point.x
            };
            if level.solid_at(x, entity.y() + point.y) {
                count += 1;
            }
        }
    }
    count
}

/// Tests an entity against everything solid: the level (unless the entity
/// opts out of level collisions) and every other solid entity whose
/// dimension masks match.
pub fn entity_collides(
    level: &Level,
    entity: &Entity,
    dir: MoveDirection,
    mut info: Option<&mut CollisionInfo>,
) -> bool {
    if entity.solid().is_none() {
        return false;
    }
    if !entity.allow_level_collisions()
        && entity_collides_with_level(level, entity, dir, info.as_deref_mut())
    {
        return true;
    }

    for other in level.solid_entities() {
        if other.id() == entity.id() || other.solid().is_none() {
            continue;
        }
        if entity_collides_with_entity(entity, other, info.as_deref_mut()) {
            if let Some(info) = info.as_deref_mut() {
                info.collide_with = Some(other.id());
            }
            return true;
        }
    }

    false
}

/// Pixel-precise solid-body test between two entities.
///
/// Entities whose solid-dimension masks share no bit never collide. The
/// overlap of the two solid rects is scanned in world space with each point
/// mapped back through both entities' facing correction.
///
/// # Panics
///
/// Panics when the solid rects overlap but one entity carries no solid data;
/// such an entity must report an empty solid rect.
pub fn entity_collides_with_entity(
    entity: &Entity,
    other: &Entity,
    mut info: Option<&mut CollisionInfo>,
) -> bool {
    if !dimensions_match(
        entity.solid_dimensions(),
        entity.weak_solid_dimensions(),
        other.solid_dimensions(),
        other.weak_solid_dimensions(),
    ) {
        return false;
    }
    if other.destroyed() {
        return false;
    }

    let ours = entity.solid_rect();
    let theirs = other.solid_rect();
    if !ours.intersects(theirs) {
        return false;
    }

    let our_solid = match entity.solid() {
        Some(solid) => solid,
        None => panic!(
            "entity {} has a non-empty solid rect but no solid data",
            entity.id().get()
        ),
    };
    let their_solid = match other.solid() {
        Some(solid) => solid,
        None => panic!(
            "entity {} has a non-empty solid rect but no solid data",
            other.id().get()
        ),
    };

    let area = ours.intersection(theirs);
    for y in area.y()..=area.y2() {
        for x in area.x()..area.x2() {
            let our_x = if entity.face_right() {
                x - entity.x()
            } else {
                entity.x() + entity.frame().width() - 1 - x
            };
            let Some(area_id) = our_solid.solid_at(our_x, y - entity.y()) else {
                continue;
            };
            if let Some(info) = info.as_deref_mut() {
                info.area_id = Some(area_id.to_owned());
            }

            let other_x = if other.face_right() {
                x - other.x()
            } else {
                other.x() + other.frame().width() - 1 - x
            };
            if let Some(other_area_id) = their_solid.solid_at(other_x, y - other.y()) {
                if let Some(info) = info.as_deref_mut() {
                    info.collide_with_area_id = Some(other_area_id.to_owned());
                }
                return true;
            }
        }
    }

    false
}

/// Tests a non-solid entity's opaque pixels against level solidity.
///
/// Samples the frame on a stride-2 grid after a coarse tile-level rejection,
/// so the test is cheap for entities far from any solid space.
#[must_use]
pub fn non_solid_entity_collides_with_level(level: &Level, entity: &Entity) -> bool {
    if !level.may_be_solid_in_rect(entity.frame_rect()) {
        return false;
    }

    let frame = entity.frame();
    let mut y = 0;
    while y < frame.height() {
        let mut x = 0;
        while x < frame.width() {
            if !frame.is_alpha(x, y, entity.face_right())
                && level.solid_at(entity.x() + x, entity.y() + y)
            {
                return true;
            }
            x += 2;
        }
        y += 2;
    }

    false
}

/// Asserts that an entity which relies on level collisions is not embedded
/// in solid level space.
///
/// # Panics
///
/// Panics with an ASCII rendering of the overlapping solidity (`L` level,
/// `C` entity, `X` both) when the entity is embedded; intended for debug
/// checks after placement or level transitions.
pub fn debug_check_entity_solidity(level: &Level, entity: &Entity) {
    if entity.allow_level_collisions()
        || !entity_collides_with_level(level, entity, MoveDirection::None, None)
    {
        return;
    }

    let solid = entity
        .solid()
        .expect("entity collides with the level but has no solid data");

    let mut points = std::collections::BTreeSet::new();
    for map in solid.maps() {
        for point in map.dir(MoveDirection::None) {
            let x = if entity.face_right() {
                entity.x() + point.x
            } else {
                entity.x() + entity.frame().width() - 1 - point.x
            };
            let _ = points.insert((x, entity.y() + point.y));
        }
    }

    let min_x = points.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let max_x = points.iter().map(|&(x, _)| x).max().unwrap_or(0);
    let min_y = points.iter().map(|&(_, y)| y).min().unwrap_or(0);
    let max_y = points.iter().map(|&(_, y)| y).max().unwrap_or(0);

    let mut rendering = String::new();
    for y in (min_y - 5)..(max_y + 5) {
        for x in (min_x - 5)..(max_x + 5) {
            let level_solid = level.solid_at(x, y);
            let entity_solid = points.contains(&(x, y));
            rendering.push(match (level_solid, entity_solid) {
                (true, true) => 'X',
                (true, false) => 'L',
                (false, true) => 'C',
                (false, false) => '-',
            });
        }
        rendering.push('\n');
    }

    panic!(
        "entity {} is embedded in solid level space:\n{rendering}",
        entity.id().get()
    );
}

/// One named-area contact between two entities, as reported by
/// [`entity_user_collision`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionPair {
    /// Name of the first entity's collision area.
    pub area: String,
    /// Name of the second entity's collision area.
    pub other_area: String,
}

/// Finds every pair of overlapping named collision areas between two
/// entities.
///
/// Returns the total number of contacts found; only the first `buf.len()`
/// are written to `buf`, matching the caller's fixed-size buffer. Overlaps
/// are confirmed by sampling both frames' opacity on a stride-2 grid, unless
/// an area disables its alpha check.
pub fn entity_user_collision(a: &Entity, b: &Entity, buf: &mut [CollisionPair]) -> usize {
    if a.frame().collision_areas().is_empty() || b.frame().collision_areas().is_empty() {
        return 0;
    }
    // The frame-rect broad phase is only sound when both frames declare
    // their areas inside the frame bounds.
    if a.frame().collision_areas_inside_frame()
        && b.frame().collision_areas_inside_frame()
        && !a.frame_rect().intersects(b.frame_rect())
    {
        return 0;
    }

    let mut result = 0;
    for area_a in a.frame().collision_areas() {
        let rect_a = a.world_area_rect(area_a.area);
        for area_b in b.frame().collision_areas() {
            let rect_b = b.world_area_rect(area_b.area);
            if !rect_a.intersects(rect_b) {
                continue;
            }
            if sample_area_overlap(a, area_a, b, area_b, rect_a.intersection(rect_b)) {
                if result < buf.len() {
                    buf[result] = CollisionPair {
                        area: area_a.name.clone(),
                        other_area: area_b.name.clone(),
                    };
                }
                result += 1;
            }
        }
    }

    result
}

/// Tests one specific named area of each entity for contact.
///
/// Returns false for an entity against itself or when either entity lacks
/// the named area. Unlike the all-pairs scan, the overlap is sampled at full
/// resolution and opacity is always consulted.
#[must_use]
pub fn entity_user_collision_specific_areas(
    a: &Entity,
    area_a: &str,
    b: &Entity,
    area_b: &str,
) -> bool {
    if std::ptr::eq(a, b) {
        return false;
    }
    if a.frame().collision_areas().is_empty() || b.frame().collision_areas().is_empty() {
        return false;
    }
    if !a.frame_rect().intersects(b.frame_rect()) {
        return false;
    }

    let Some(area_a) = a.frame().collision_areas().iter().find(|c| c.name == area_a) else {
        return false;
    };
    let Some(area_b) = b.frame().collision_areas().iter().find(|c| c.name == area_b) else {
        return false;
    };

    let rect_a = a.world_area_rect(area_a.area);
    let rect_b = b.world_area_rect(area_b.area);
    if !rect_a.intersects(rect_b) {
        return false;
    }

    let overlap = rect_a.intersection(rect_b);
    for y in overlap.y()..=overlap.y2() {
        for x in overlap.x()..=overlap.x2() {
            if !a.frame().is_alpha(x - a.x(), y - a.y(), a.face_right())
                && !b.frame().is_alpha(x - b.x(), y - b.y(), b.face_right())
            {
                return true;
            }
        }
    }

    false
}

/// Stride-2 opacity scan over a world-space overlap rectangle. The bounds
/// are closed; out-of-frame samples read as transparent.
fn sample_area_overlap(
    a: &Entity,
    area_a: &CollisionArea,
    b: &Entity,
    area_b: &CollisionArea,
    overlap: Rect,
) -> bool {
    let mut y = overlap.y();
    while y <= overlap.y2() {
        let mut x = overlap.x();
        while x <= overlap.x2() {
            let hit_a =
                area_a.no_alpha_check || !a.frame().is_alpha(x - a.x(), y - a.y(), a.face_right());
            let hit_b =
                area_b.no_alpha_check || !b.frame().is_alpha(x - b.x(), y - b.y(), b.face_right());
            if hit_a && hit_b {
                return true;
            }
            x += 2;
        }
        y += 2;
    }

    false
}

const fn dimensions_match(
    strong_a: Dimensions,
    weak_a: Dimensions,
    strong_b: Dimensions,
    weak_b: Dimensions,
) -> bool {
    strong_a.overlaps(weak_b) || weak_a.overlaps(strong_b)
}

/// Reports whether a rectangular flight path is free of level solidity and
/// of every other entity's solid body.
#[must_use]
pub fn is_flightpath_clear(level: &Level, entity: &Entity, area: Rect) -> bool {
    if level.may_be_solid_in_rect(area) {
        return false;
    }
    for other in level.solid_entities() {
        if other.id() == entity.id() {
            continue;
        }
        if other.solid_rect().intersects(area) {
            return false;
        }
    }
    true
}

/// Interned identifier for a named-area collision event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u32);

impl EventId {
    /// Numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Append-only cache mapping collision area names to event identifiers.
///
/// One context per simulation; identifiers stay valid for its lifetime, so
/// gameplay code can register handlers once and match on [`EventId`] instead
/// of comparing strings every step.
#[derive(Debug)]
pub struct CollisionDispatchContext {
    ids: HashMap<String, EventId>,
    names: Vec<String>,
}

impl Default for CollisionDispatchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionDispatchContext {
    /// Creates a context holding only the generic `collide_object` event.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            names: vec!["collide_object".to_owned()],
        }
    }

    /// Event fired for every named-area collision regardless of area name.
    #[must_use]
    pub const fn collide_object_event(&self) -> EventId {
        EventId(0)
    }

    /// Returns the event identifier for a collision area name, interning it
    /// on first use.
    pub fn event_id(&mut self, area: &str) -> EventId {
        if let Some(&id) = self.ids.get(area) {
            return id;
        }

        let id = EventId(u32::try_from(self.names.len()).expect("event table overflow"));
        let _ = self.ids.insert(area.to_owned(), id);
        self.names.push(format!("collide_object_{area}"));
        id
    }

    /// Event name registered for an identifier, if any.
    #[must_use]
    pub fn event_name(&self, id: EventId) -> Option<&str> {
        self.names.get(usize::try_from(id.0).ok()?).map(String::as_str)
    }
}

/// One collision notification owed to gameplay code.
///
/// Notices reference entities by identifier and their same-step siblings by
/// index range into the step's contact table, so a step holds no owning
/// references back into the entity graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionNotice {
    /// Entity to notify.
    pub entity: EntityId,
    /// Name of the notified entity's collision area that made contact.
    pub area: String,
    /// Interned event for `area`.
    pub event: EventId,
    /// Entity collided with.
    pub other: EntityId,
    /// Name of the other entity's collision area.
    pub other_area: String,
    /// Position of this contact within its sibling group.
    pub index: usize,
    /// Index range into [`CollisionStep`]'s contact table covering every
    /// contact the notified area made this step.
    pub siblings: Range<usize>,
}

/// All named-area collisions detected in one simulation step.
#[derive(Debug, Default)]
pub struct CollisionStep {
    notices: Vec<CollisionNotice>,
    contacts: Vec<(EntityId, String)>,
}

impl CollisionStep {
    /// Notices in deterministic order: by notified entity, then area name.
    #[must_use]
    pub fn notices(&self) -> &[CollisionNotice] {
        &self.notices
    }

    /// Every contact a notice's area made this step, including the notice's
    /// own counterpart.
    #[must_use]
    pub fn contacts(&self, notice: &CollisionNotice) -> &[(EntityId, String)] {
        &self.contacts[notice.siblings.clone()]
    }

    /// Reports whether the step produced no notices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

/// Detects every named-area collision between live entities for one step.
///
/// Entity pairs are filtered by their collide-dimension masks, contacts per
/// pair are capped at [`MAX_CONTACTS_PER_PAIR`], and duplicate contacts for
/// the same area pair are reported once. Results are grouped per notified
/// area so each notice can expose its same-step siblings.
pub fn detect_user_collisions(level: &Level, ctx: &mut CollisionDispatchContext) -> CollisionStep {
    let chars: Vec<&Entity> = level
        .active_entities()
        .filter(|entity| {
            !entity.weak_collide_dimensions().is_empty()
                && !entity.frame().collision_areas().is_empty()
        })
        .collect();

    let mut buf: [CollisionPair; MAX_CONTACTS_PER_PAIR] = Default::default();
    let mut by_area: BTreeMap<(EntityId, String), Vec<(EntityId, String)>> = BTreeMap::new();

    for (i, a) in chars.iter().enumerate() {
        for b in &chars[i + 1..] {
            if !dimensions_match(
                a.collide_dimensions(),
                a.weak_collide_dimensions(),
                b.collide_dimensions(),
                b.weak_collide_dimensions(),
            ) {
                continue;
            }

            let count = entity_user_collision(a, b, &mut buf).min(MAX_CONTACTS_PER_PAIR);
            for pair in &buf[..count] {
                record_contact(&mut by_area, a.id(), &pair.area, b.id(), &pair.other_area);
                record_contact(&mut by_area, b.id(), &pair.other_area, a.id(), &pair.area);
            }
        }
    }

    let mut step = CollisionStep::default();
    for ((entity, area), others) in by_area {
        let event = ctx.event_id(&area);
        let start = step.contacts.len();
        step.contacts.extend(others.iter().cloned());
        let siblings = start..step.contacts.len();
        for (index, (other, other_area)) in others.into_iter().enumerate() {
            step.notices.push(CollisionNotice {
                entity,
                area: area.clone(),
                event,
                other,
                other_area,
                index,
                siblings: siblings.clone(),
            });
        }
    }

    step
}

fn record_contact(
    by_area: &mut BTreeMap<(EntityId, String), Vec<(EntityId, String)>>,
    entity: EntityId,
    area: &str,
    other: EntityId,
    other_area: &str,
) {
    let contacts = by_area.entry((entity, area.to_owned())).or_default();
    let contact = (other, other_area.to_owned());
    if !contacts.contains(&contact) {
        contacts.push(contact);
    }
}

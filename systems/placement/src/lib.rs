#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Heuristic placement solver: nudges a colliding entity to a nearby legal
//! position, escalates to larger displacements when nudging fails, and snaps
//! entities to standing positions.
//!
//! All solving happens on a working copy of the entity; the stored entity's
//! position changes only when a legal position is found, so a failed
//! placement leaves the level untouched.

use ridgeline_core::{AllowPlatform, EntityId, MoveDirection, PlacementError};
use ridgeline_system_collision::{entity_collides, point_standable};
use ridgeline_world::{Entity, Level};

/// How far a standing snap may move an entity, in pixels.
pub const STANDING_SNAP_BOUND: i32 = 128;

/// Default bound on how far a single nudge direction may walk an entity.
pub const DEFAULT_MAX_DISPLACE: i32 = 10_000;

const NUDGE_ORDER: [MoveDirection; 4] = [
    MoveDirection::Up,
    MoveDirection::Down,
    MoveDirection::Left,
    MoveDirection::Right,
];

const DISPLACEMENT_START: i32 = 4;
const DISPLACEMENT_LIMIT: i32 = 256;

/// Outcome of a single-direction nudge attempt.
enum Nudge {
    /// The entity reached a collision-free position.
    Cleared,
    /// The direction was blocked before any movement; the entity is
    /// untouched and another direction may be tried.
    Skipped,
    /// The direction probe became blocked mid-nudge, or the nudge bound ran
    /// out. Continuing would let the entity tunnel through the blocking
    /// surface, so the whole placement attempt is abandoned.
    Jammed,
}

/// Finds a legal position for the entity at or near its current position.
///
/// Entities without solid data are legal anywhere. An entity that requests
/// forced standing is first snapped to the nearest standing position within
/// [`STANDING_SNAP_BOUND`]. A colliding entity is then nudged one pixel at a
/// time up, down, left, and right in turn until one direction frees it; no
/// direction may walk the entity further than `max_displace` pixels.
///
/// # Panics
///
/// Panics when `id` names no entity in the level.
pub fn place_entity_in_level(
    level: &mut Level,
    id: EntityId,
    max_displace: i32,
) -> Result<(), PlacementError> {
    let mut working = level
        .entity(id)
        .expect("placement queried with unknown entity id")
        .clone();

    if working.solid().is_none() {
        return Ok(());
    }

    if working.force_standing() {
        snap_to_standing(level, &mut working, STANDING_SNAP_BOUND)?;
    }

    resolve_collisions(level, &mut working, max_displace)?;
    commit(level, id, &working);
    Ok(())
}

/// Like [`place_entity_in_level`], but when no nearby position works, tries
/// progressively larger displacements left, right, up, and down of the
/// original position, doubling the distance each round.
///
/// On failure the entity is restored to its original position.
///
/// # Panics
///
/// Panics when `id` names no entity in the level.
pub fn place_entity_in_level_with_large_displacement(
    level: &mut Level,
    id: EntityId,
) -> Result<(), PlacementError> {
    if place_entity_in_level(level, id, DEFAULT_MAX_DISPLACE).is_ok() {
        return Ok(());
    }

    let (xpos, ypos) = {
        let entity = level
            .entity(id)
            .expect("placement queried with unknown entity id");
        (entity.x(), entity.y())
    };

    let mut distance = DISPLACEMENT_START;
    while distance < DISPLACEMENT_LIMIT {
        let candidates = [
            (xpos - distance, ypos),
            (xpos + distance, ypos),
            (xpos, ypos - distance),
            (xpos, ypos + distance),
        ];
        for (x, y) in candidates {
            if let Some(entity) = level.entity_mut(id) {
                entity.set_pos(x, y);
            }
            if place_entity_in_level(level, id, DEFAULT_MAX_DISPLACE).is_ok() {
                return Ok(());
            }
        }
        distance *= 2;
    }

    if let Some(entity) = level.entity_mut(id) {
        entity.set_pos(xpos, ypos);
    }
    Err(PlacementError::NoFreePosition)
}

/// Moves the entity vertically to the nearest standing position.
///
/// A floating entity descends until its feet find support; an embedded
/// entity rises until its feet clear the surface, then rests on it. Fails
/// and restores the original position when no standing position exists
/// within `max_displace` pixels.
///
/// # Panics
///
/// Panics when `id` names no entity in the level.
pub fn move_to_standing(
    level: &mut Level,
    id: EntityId,
    max_displace: i32,
) -> Result<(), PlacementError> {
    let mut working = level
        .entity(id)
        .expect("standing snap queried with unknown entity id")
        .clone();
    snap_to_standing(level, &mut working, max_displace)?;
    commit(level, id, &working);
    Ok(())
}

fn snap_to_standing(
    level: &Level,
    entity: &mut Entity,
    max_displace: i32,
) -> Result<(), PlacementError> {
    let start_y = entity.y();

    for step in 0..max_displace {
        let feet = entity.feet();
        if point_standable(
            level,
            entity,
            feet.x,
            feet.y,
            None,
            AllowPlatform::SolidAndPlatforms,
        ) {
            if step > 0 {
                return Ok(());
            }

            // Already standing at the starting position means the feet are
            // inside the surface; rise until they clear, then rest on it.
            for _ in 0..max_displace {
                let feet = entity.feet();
                if !point_standable(
                    level,
                    entity,
                    feet.x,
                    feet.y,
                    None,
                    AllowPlatform::SolidAndPlatforms,
                ) {
                    entity.set_pos(entity.x(), entity.y() + 1);
                    return Ok(());
                }
                entity.set_pos(entity.x(), entity.y() - 1);
            }
            entity.set_pos(entity.x(), start_y);
            return Err(PlacementError::ForcedStandingFailed);
        }
        entity.set_pos(entity.x(), entity.y() + 1);
    }

    entity.set_pos(entity.x(), start_y);
    Err(PlacementError::ForcedStandingFailed)
}

fn resolve_collisions(
    level: &Level,
    entity: &mut Entity,
    max_displace: i32,
) -> Result<(), PlacementError> {
    if !entity_collides(level, entity, MoveDirection::None, None) {
        return Ok(());
    }

    for dir in NUDGE_ORDER {
        match nudge(level, entity, dir, max_displace) {
            Nudge::Cleared => return Ok(()),
            Nudge::Skipped => {}
            Nudge::Jammed => return Err(PlacementError::NoFreePosition),
        }
    }

    Err(PlacementError::NoFreePosition)
}

fn nudge(level: &Level, entity: &mut Entity, dir: MoveDirection, max_displace: i32) -> Nudge {
    if entity_collides(level, entity, dir, None) {
        return Nudge::Skipped;
    }

    let (dx, dy) = dir.step();
    let mut walked = 0;
    while entity_collides(level, entity, MoveDirection::None, None) {
        if walked == max_displace {
            return Nudge::Jammed;
        }
        entity.set_pos(entity.x() + dx, entity.y() + dy);
        walked += 1;
        if entity_collides(level, entity, dir, None) {
            return Nudge::Jammed;
        }
    }

    Nudge::Cleared
}

fn commit(level: &mut Level, id: EntityId, working: &Entity) {
    let (x, y) = (working.x(), working.y());
    if let Some(entity) = level.entity_mut(id) {
        entity.set_pos(x, y);
    }
}

//! Placement solver behavior on small hand-built levels.

use ridgeline_core::{
    Dimensions, EntityId, Frame, MoveDirection, PlacementError, Rect, SolidInfo, SolidMap,
    SurfaceInfo,
};
use ridgeline_system_collision::entity_collides;
use ridgeline_system_placement::{
    move_to_standing, place_entity_in_level, place_entity_in_level_with_large_displacement,
    DEFAULT_MAX_DISPLACE,
};
use ridgeline_world::{Entity, Level};

fn solid_entity(x: i32, y: i32, size: i32) -> Entity {
    let frame = Frame::opaque(size, size);
    let mut entity = Entity::new(x, y, frame);
    let map = SolidMap::from_rect("body", Rect::new(0, 0, size, size));
    entity.set_solid(SolidInfo::from_maps(vec![map]));
    entity
}

fn ground(level: &mut Level) {
    level.add_solid_rect(Rect::new(0, 64, 128, 32), &SurfaceInfo::new(100, 100, 0));
}

fn pos(level: &Level, id: EntityId) -> (i32, i32) {
    let entity = level.entity(id).expect("entity");
    (entity.x(), entity.y())
}

#[test]
fn free_entities_stay_put() {
    let mut level = Level::new();
    ground(&mut level);
    let id = level.insert(solid_entity(8, 10, 16));

    assert!(place_entity_in_level(&mut level, id, DEFAULT_MAX_DISPLACE).is_ok());
    assert_eq!(pos(&level, id), (8, 10));
}

#[test]
fn entities_without_solid_data_are_legal_anywhere() {
    let mut level = Level::new();
    ground(&mut level);
    let id = level.insert(Entity::new(8, 70, Frame::opaque(16, 16)));

    assert!(place_entity_in_level(&mut level, id, DEFAULT_MAX_DISPLACE).is_ok());
    assert_eq!(pos(&level, id), (8, 70));
}

#[test]
fn shallow_ground_overlap_nudges_upward() {
    let mut level = Level::new();
    ground(&mut level);
    // Six pixels embedded in the ground; the upward nudge frees it first.
    let id = level.insert(solid_entity(8, 54, 16));

    assert!(place_entity_in_level(&mut level, id, DEFAULT_MAX_DISPLACE).is_ok());
    assert_eq!(pos(&level, id), (8, 48));
}

#[test]
fn entity_overlap_requires_a_displacement() {
    let mut level = Level::new();
    let mask = Dimensions::from_bits(0b1);

    let mut blocker = solid_entity(0, 0, 16);
    blocker.set_solid_dimensions(mask, mask);
    let _ = level.insert(blocker);

    let mut mover = solid_entity(8, 0, 16);
    mover.set_solid_dimensions(mask, mask);
    let id = level.insert(mover);

    // An entity overlap blocks every directional probe, so plain placement
    // gives up; the displacement ladder finds open space beside the blocker.
    assert_eq!(
        place_entity_in_level(&mut level, id, DEFAULT_MAX_DISPLACE),
        Err(PlacementError::NoFreePosition)
    );
    assert_eq!(pos(&level, id), (8, 0));

    assert!(place_entity_in_level_with_large_displacement(&mut level, id).is_ok());
    assert_eq!(pos(&level, id), (16, 0));

    let placed = level.entity(id).expect("mover").clone();
    assert!(!entity_collides(&level, &placed, MoveDirection::None, None));
}

#[test]
fn blocked_nudge_mid_flight_abandons_placement() {
    let mut level = Level::new();
    level.add_solid_rect(Rect::new(0, 0, 64, 32), &SurfaceInfo::new(100, 100, 0));
    level.add_solid_rect(Rect::new(0, 40, 64, 32), &SurfaceInfo::new(100, 100, 0));

    // The gap between ceiling and floor is too narrow for a 16px body. The
    // upward nudge starts cleanly but its probe hits the ceiling before the
    // body clears the floor, so the whole call fails with the entity left
    // where it started.
    let id = level.insert(solid_entity(8, 34, 16));
    assert_eq!(
        place_entity_in_level(&mut level, id, DEFAULT_MAX_DISPLACE),
        Err(PlacementError::NoFreePosition)
    );
    assert_eq!(pos(&level, id), (8, 34));
}

#[test]
fn nudge_bound_limits_how_far_a_direction_may_walk() {
    let mut level = Level::new();
    ground(&mut level);
    let id = level.insert(solid_entity(8, 54, 16));

    // Six pixels embedded but only three pixels of budget.
    assert_eq!(
        place_entity_in_level(&mut level, id, 3),
        Err(PlacementError::NoFreePosition)
    );
    assert_eq!(pos(&level, id), (8, 54));
}

#[test]
fn large_displacement_escapes_a_deep_embedding() {
    let mut level = Level::new();
    level.add_solid_rect(Rect::new(0, 0, 64, 64), &SurfaceInfo::new(100, 100, 0));

    let id = level.insert(solid_entity(24, 24, 16));
    assert_eq!(
        place_entity_in_level(&mut level, id, DEFAULT_MAX_DISPLACE),
        Err(PlacementError::NoFreePosition)
    );

    assert!(place_entity_in_level_with_large_displacement(&mut level, id).is_ok());
    let placed = level.entity(id).expect("entity").clone();
    assert!(!entity_collides(&level, &placed, MoveDirection::None, None));
    // The first workable candidate is 32px left of the original position,
    // then the leftward nudge walks the body clear of the block.
    assert_eq!(pos(&level, id), (-16, 24));
}

#[test]
fn large_displacement_failure_restores_the_original_position() {
    let mut level = Level::new();
    // Solid everywhere the displacement ladder can reach.
    level.add_solid_rect(Rect::new(-512, -512, 1024, 1024), &SurfaceInfo::new(100, 100, 0));

    let id = level.insert(solid_entity(24, 24, 16));
    assert_eq!(
        place_entity_in_level_with_large_displacement(&mut level, id),
        Err(PlacementError::NoFreePosition)
    );
    assert_eq!(pos(&level, id), (24, 24));
}

#[test]
fn standing_snap_descends_to_the_surface() {
    let mut level = Level::new();
    ground(&mut level);
    let id = level.insert(solid_entity(8, 10, 16));

    assert!(move_to_standing(&mut level, id, 128).is_ok());
    assert_eq!(pos(&level, id), (8, 48));
}

#[test]
fn standing_snap_rises_out_of_an_embedding() {
    let mut level = Level::new();
    ground(&mut level);
    let id = level.insert(solid_entity(8, 60, 16));

    assert!(move_to_standing(&mut level, id, 128).is_ok());
    assert_eq!(pos(&level, id), (8, 48));
}

#[test]
fn standing_snap_fails_and_restores_when_nothing_is_below() {
    let mut level = Level::new();
    let id = level.insert(solid_entity(0, 0, 16));

    assert_eq!(
        move_to_standing(&mut level, id, 16),
        Err(PlacementError::ForcedStandingFailed)
    );
    assert_eq!(pos(&level, id), (0, 0));
}

#[test]
fn forced_standing_snaps_before_placement() {
    let mut level = Level::new();
    ground(&mut level);

    let mut entity = solid_entity(8, 10, 16);
    entity.set_force_standing(true);
    let id = level.insert(entity);

    assert!(place_entity_in_level(&mut level, id, DEFAULT_MAX_DISPLACE).is_ok());
    assert_eq!(pos(&level, id), (8, 48));
}

#[test]
fn forced_standing_failure_propagates() {
    let mut level = Level::new();

    let mut entity = solid_entity(8, 10, 16);
    entity.set_force_standing(true);
    let id = level.insert(entity);

    assert_eq!(
        place_entity_in_level(&mut level, id, DEFAULT_MAX_DISPLACE),
        Err(PlacementError::ForcedStandingFailed)
    );
    assert_eq!(pos(&level, id), (8, 10));
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for the Ridgeline engine: the sparse solidity
//! maps, the entity table, and the tile-level solidity queries the collision
//! systems are built on.

pub mod solidity;

use std::sync::Arc;

use ridgeline_core::{Dimensions, EntityId, Frame, Point, Rect, SolidInfo, SurfaceInfo};

pub use solidity::{SolidityMap, TileBitmap, TilePos, TileSolidInfo, TILE_SIZE};

/// A simulated object occupying the level.
///
/// Entities borrow their per-frame solid data and transparency mask from the
/// shared [`Frame`]/[`SolidInfo`] handles; cloning an entity is cheap and
/// never duplicates frame data. The placement solver works on such clones and
/// commits positions back through [`Level::entity_mut`].
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    x: i32,
    y: i32,
    face_right: bool,
    frame: Arc<Frame>,
    solid: Option<Arc<SolidInfo>>,
    platform: Option<Rect>,
    solid_platform: bool,
    solid_dimensions: Dimensions,
    weak_solid_dimensions: Dimensions,
    collide_dimensions: Dimensions,
    weak_collide_dimensions: Dimensions,
    destroyed: bool,
    allow_level_collisions: bool,
    force_standing: bool,
    surface_friction: i32,
    surface_traction: i32,
}

impl Entity {
    /// Creates an entity at a world position showing the provided frame.
    ///
    /// The identifier is assigned when the entity is inserted into a level.
    #[must_use]
    pub fn new(x: i32, y: i32, frame: Arc<Frame>) -> Self {
        Self {
            id: EntityId::new(0),
            x,
            y,
            face_right: true,
            frame,
            solid: None,
            platform: None,
            solid_platform: false,
            solid_dimensions: Dimensions::none(),
            weak_solid_dimensions: Dimensions::none(),
            collide_dimensions: Dimensions::none(),
            weak_collide_dimensions: Dimensions::none(),
            destroyed: false,
            allow_level_collisions: false,
            force_standing: false,
            surface_friction: 0,
            surface_traction: 0,
        }
    }

    /// Identifier assigned by the owning level.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// World x position of the frame's top-left corner.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// World y position of the frame's top-left corner.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Moves the entity; used by the placement solver and gameplay code.
    pub fn set_pos(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Reports whether the entity faces right (the authored orientation).
    #[must_use]
    pub const fn face_right(&self) -> bool {
        self.face_right
    }

    /// Flips the entity's facing.
    pub fn set_face_right(&mut self, face_right: bool) {
        self.face_right = face_right;
    }

    /// Current animation frame.
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Replaces the current animation frame handle.
    pub fn set_frame(&mut self, frame: Arc<Frame>) {
        self.frame = frame;
    }

    /// Per-frame solid data, shared across entities on the same frame.
    #[must_use]
    pub fn solid(&self) -> Option<&SolidInfo> {
        self.solid.as_deref()
    }

    /// Attaches or removes solid data.
    pub fn set_solid(&mut self, solid: Option<Arc<SolidInfo>>) {
        self.solid = solid;
    }

    /// Frame-local one-way platform strip, if the entity carries one.
    pub fn set_platform(&mut self, platform: Option<Rect>) {
        self.platform = platform;
    }

    /// Marks the platform as solid from every side rather than one-way.
    pub fn set_solid_platform(&mut self, solid_platform: bool) {
        self.solid_platform = solid_platform;
    }

    /// Reports whether the entity's platform blocks from every side.
    #[must_use]
    pub const fn solid_platform(&self) -> bool {
        self.solid_platform
    }

    /// Strong solid-dimension mask.
    #[must_use]
    pub const fn solid_dimensions(&self) -> Dimensions {
        self.solid_dimensions
    }

    /// Weak solid-dimension mask.
    #[must_use]
    pub const fn weak_solid_dimensions(&self) -> Dimensions {
        self.weak_solid_dimensions
    }

    /// Sets the strong and weak solid-dimension masks.
    pub fn set_solid_dimensions(&mut self, strong: Dimensions, weak: Dimensions) {
        self.solid_dimensions = strong;
        self.weak_solid_dimensions = weak;
    }

    /// Strong collide-dimension mask for named-area detection.
    #[must_use]
    pub const fn collide_dimensions(&self) -> Dimensions {
        self.collide_dimensions
    }

    /// Weak collide-dimension mask for named-area detection.
    #[must_use]
    pub const fn weak_collide_dimensions(&self) -> Dimensions {
        self.weak_collide_dimensions
    }

    /// Sets the strong and weak collide-dimension masks.
    pub fn set_collide_dimensions(&mut self, strong: Dimensions, weak: Dimensions) {
        self.collide_dimensions = strong;
        self.weak_collide_dimensions = weak;
    }

    /// Reports whether the entity has been destroyed this step.
    #[must_use]
    pub const fn destroyed(&self) -> bool {
        self.destroyed
    }

    /// Marks the entity destroyed; destroyed entities stop colliding.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// Reports whether the entity opts out of level solidity entirely.
    #[must_use]
    pub const fn allow_level_collisions(&self) -> bool {
        self.allow_level_collisions
    }

    /// Lets the entity pass through level solidity (entity collisions still
    /// apply).
    pub fn set_allow_level_collisions(&mut self, allow: bool) {
        self.allow_level_collisions = allow;
    }

    /// Reports whether placement must snap the entity to standing first.
    #[must_use]
    pub const fn force_standing(&self) -> bool {
        self.force_standing
    }

    /// Requests a snap-to-ground before any placement displacement.
    pub fn set_force_standing(&mut self, force: bool) {
        self.force_standing = force;
    }

    /// Friction reported when something stands on this entity.
    #[must_use]
    pub const fn surface_friction(&self) -> i32 {
        self.surface_friction
    }

    /// Traction reported when something stands on this entity.
    #[must_use]
    pub const fn surface_traction(&self) -> i32 {
        self.surface_traction
    }

    /// Sets the surface attributes reported for platform hits.
    pub fn set_surface(&mut self, friction: i32, traction: i32) {
        self.surface_friction = friction;
        self.surface_traction = traction;
    }

    /// World-space rectangle of the declared solid area, facing-corrected.
    ///
    /// Empty when the entity carries no solid data.
    #[must_use]
    pub fn solid_rect(&self) -> Rect {
        match &self.solid {
            Some(solid) => self.world_area_rect(solid.area()),
            None => Rect::default(),
        }
    }

    /// World-space rectangle of the current frame.
    #[must_use]
    pub fn frame_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.frame.width(), self.frame.height())
    }

    /// World-space platform strip, facing-corrected.
    #[must_use]
    pub fn platform_rect(&self) -> Option<Rect> {
        self.platform.map(|area| self.world_area_rect(area))
    }

    /// World coordinates of the entity's feet, used by snap-to-ground.
    #[must_use]
    pub fn feet(&self) -> Point {
        Point::new(self.x + self.frame.width() / 2, self.y + self.frame.height())
    }

    /// Mirrors a frame-local area into world space for the current facing.
    #[must_use]
    pub fn world_area_rect(&self, area: Rect) -> Rect {
        let x = if self.face_right {
            self.x + area.x()
        } else {
            self.x + self.frame.width() - area.x() - area.w()
        };
        Rect::new(x, self.y + area.y(), area.w(), area.h())
    }
}

/// One level of the game world: two sparse solidity maps (solid space and
/// standable-only platform space) plus the entity table.
///
/// The solidity contents are produced by the external tile-rasterization
/// pipeline and assumed stable for the duration of any query.
#[derive(Debug, Default)]
pub struct Level {
    solid: SolidityMap,
    standable: SolidityMap,
    entities: Vec<Entity>,
}

impl Level {
    /// Creates an empty level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity, assigning its identifier.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId::new(u32::try_from(self.entities.len()).expect("entity table overflow"));
        entity.id = id;
        self.entities.push(entity);
        id
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(usize::try_from(id.get()).ok()?)
    }

    /// Looks up an entity for mutation.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(usize::try_from(id.get()).ok()?)
    }

    /// Iterates over the live entities.
    pub fn active_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|entity| !entity.destroyed())
    }

    /// Iterates over the live entities that carry solid data or a platform.
    pub fn solid_entities(&self) -> impl Iterator<Item = &Entity> {
        self.active_entities()
            .filter(|entity| entity.solid.is_some() || entity.platform.is_some())
    }

    /// Tests whether a world pixel is solid.
    #[must_use]
    pub fn solid_at(&self, x: i32, y: i32) -> bool {
        self.solid_surface(x, y).is_some()
    }

    /// Tests a world pixel for solidity, reporting the surface on a hit.
    #[must_use]
    pub fn solid_surface(&self, x: i32, y: i32) -> Option<&SurfaceInfo> {
        is_solid_in(&self.solid, x, y)
    }

    /// Tests whether a world pixel is standable (solid or platform top).
    #[must_use]
    pub fn standable_at(&self, x: i32, y: i32) -> bool {
        self.standable_surface(x, y).is_some()
    }

    /// Tests a world pixel for standability, reporting the surface on a hit.
    #[must_use]
    pub fn standable_surface(&self, x: i32, y: i32) -> Option<&SurfaceInfo> {
        is_solid_in(&self.solid, x, y).or_else(|| is_solid_in(&self.standable, x, y))
    }

    /// Tests an entity's object-local point list against level solidity.
    ///
    /// Points are facing-corrected into world space. Consecutive points
    /// usually land in the same tile, so the previous cell lookup is reused
    /// when the tile coordinate repeats.
    #[must_use]
    pub fn solid_points(&self, entity: &Entity, points: &[Point]) -> Option<&SurfaceInfo> {
        let mut cached: Option<(TilePos, Option<&TileSolidInfo>)> = None;
        for point in points {
            let world_x = if entity.face_right() {
                entity.x() + point.x
            } else {
                entity.x() + entity.frame().width() - 1 - point.x
            };
            let world_y = entity.y() + point.y;

            let (pos, _, _, index) = tile_lookup(world_x, world_y);
            let cell = match cached {
                Some((cached_pos, cell)) if cached_pos == pos => cell,
                _ => {
                    let cell = self.solid.find(pos);
                    cached = Some((pos, cell));
                    cell
                }
            };

            if let Some(cell) = cell {
                if cell.all_solid || cell.bitmap.test(index) {
                    return Some(&cell.surface);
                }
            }
        }

        None
    }

    /// Coarse accelerator: true when any touched tile overlapping the rect
    /// exists in the solid map, whether or not its pixels are actually set.
    #[must_use]
    pub fn may_be_solid_in_rect(&self, rect: Rect) -> bool {
        let (pos, local_x, local_y, _) = tile_lookup(rect.x(), rect.y());
        let spanned_x = (local_x + rect.w()) / TILE_SIZE
            + i32::from((local_x + rect.w()) % TILE_SIZE != 0);
        let spanned_y = (local_y + rect.h()) / TILE_SIZE
            + i32::from((local_y + rect.h()) % TILE_SIZE != 0);

        for ypos in 0..spanned_y {
            for xpos in 0..spanned_x {
                if self.solid.find(TilePos::new(pos.x + xpos, pos.y + ypos)).is_some() {
                    return true;
                }
            }
        }

        false
    }

    /// Marks one world pixel solid with the provided surface attributes.
    pub fn add_solid(&mut self, x: i32, y: i32, surface: &SurfaceInfo) {
        set_solid(&mut self.solid, x, y, surface, true);
    }

    /// Marks one world pixel standable-only (a platform pixel).
    pub fn add_standable(&mut self, x: i32, y: i32, surface: &SurfaceInfo) {
        set_solid(&mut self.standable, x, y, surface, true);
    }

    /// Sets or clears solidity over a pixel rectangle with default surface
    /// attributes; used by the editor-facing composition paths.
    pub fn set_solid_area(&mut self, rect: Rect, solid: bool) {
        let surface = SurfaceInfo::new(100, 100, 0);
        for y in rect.y()..rect.y2() {
            for x in rect.x()..rect.x2() {
                set_solid(&mut self.solid, x, y, &surface, solid);
            }
        }
    }

    /// Marks a pixel rectangle solid, taking the whole-tile fast path when
    /// the rectangle is tile-aligned.
    pub fn add_solid_rect(&mut self, rect: Rect, surface: &SurfaceInfo) {
        let aligned = rect.x() % TILE_SIZE == 0
            && rect.y() % TILE_SIZE == 0
            && rect.x2() % TILE_SIZE == 0
            && rect.y2() % TILE_SIZE == 0;
        if !aligned {
            for y in rect.y()..rect.y2() {
                for x in rect.x()..rect.x2() {
                    self.add_solid(x, y, surface);
                }
            }
            return;
        }

        let mut y = rect.y();
        while y < rect.y2() {
            let mut x = rect.x();
            while x < rect.x2() {
                let cell = self
                    .solid
                    .insert_or_find(TilePos::new(x / TILE_SIZE, y / TILE_SIZE));
                cell.all_solid = true;
                cell.surface.friction = surface.friction;
                cell.surface.traction = surface.traction;
                cell.surface.damage = if cell.surface.damage >= 0 {
                    cell.surface.damage.min(surface.damage)
                } else {
                    surface.damage
                };
                if surface.tag.is_some() {
                    cell.surface.tag = surface.tag.clone();
                }
                x += TILE_SIZE;
            }
            y += TILE_SIZE;
        }
    }

    /// Folds a sub-level's solidity into this level at a tile offset.
    pub fn merge_solidity(&mut self, map: &SolidityMap, xoffset: i32, yoffset: i32) {
        self.solid.merge(map, xoffset, yoffset);
    }

    /// Read access to the solid map, for composition and tests.
    #[must_use]
    pub fn solid_map(&self) -> &SolidityMap {
        &self.solid
    }
}

/// Splits a world pixel into its tile coordinate, tile-local coordinates,
/// and bitmap index, correcting the truncation of negative division.
fn tile_lookup(x: i32, y: i32) -> (TilePos, i32, i32, usize) {
    let mut pos = TilePos::new(x / TILE_SIZE, y / TILE_SIZE);
    let mut local_x = x % TILE_SIZE;
    let mut local_y = y % TILE_SIZE;
    if local_x < 0 {
        pos.x -= 1;
        local_x += TILE_SIZE;
    }
    if local_y < 0 {
        pos.y -= 1;
        local_y += TILE_SIZE;
    }

    let index = usize::try_from(local_y * TILE_SIZE + local_x).unwrap_or(0);
    (pos, local_x, local_y, index)
}

fn is_solid_in(map: &SolidityMap, x: i32, y: i32) -> Option<&SurfaceInfo> {
    let (pos, _, _, index) = tile_lookup(x, y);
    let cell = map.find(pos)?;
    if cell.all_solid || cell.bitmap.test(index) {
        Some(&cell.surface)
    } else {
        None
    }
}

fn set_solid(map: &mut SolidityMap, x: i32, y: i32, surface: &SurfaceInfo, solid: bool) {
    let (pos, _, _, index) = tile_lookup(x, y);
    let cell = map.insert_or_find(pos);

    cell.surface.damage = if cell.surface.damage >= 0 {
        cell.surface.damage.min(surface.damage)
    } else {
        surface.damage
    };

    if solid {
        cell.surface.friction = surface.friction;
        cell.surface.traction = surface.traction;
        cell.bitmap.set(index);
    } else {
        if cell.all_solid {
            // Demote to an explicit bitmap before clearing single pixels.
            cell.all_solid = false;
            cell.bitmap.set_all();
        }
        cell.bitmap.reset(index);
    }

    if surface.tag.is_some() {
        cell.surface.tag = surface.tag.clone();
    }
}

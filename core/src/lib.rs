#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ridgeline engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the collision systems, and gameplay code: integer pixel geometry, surface
//! attributes with their deterministic merge rule, per-frame solid data
//! shared immutably across entity instances, the animation-frame surface
//! consumed by the pixel tests, and the result structures queries fill in.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A pixel position expressed in signed world or object-local coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal component, growing rightward.
    pub x: i32,
    /// Vertical component, growing downward.
    pub y: i32,
}

impl Point {
    /// Creates a new point from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle measured in pixels.
///
/// `x2`/`y2` are exclusive bounds; a rectangle with zero width or height
/// contains no points and intersects nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Rect {
    /// Creates a rectangle from its origin and dimensions.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle from two inclusive corner coordinates.
    #[must_use]
    pub const fn from_coordinates(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x: x1,
            y: y1,
            w: x2 - x1 + 1,
            h: y2 - y1 + 1,
        }
    }

    /// Left edge of the rectangle.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Top edge of the rectangle.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Width in pixels.
    #[must_use]
    pub const fn w(&self) -> i32 {
        self.w
    }

    /// Height in pixels.
    #[must_use]
    pub const fn h(&self) -> i32 {
        self.h
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn x2(&self) -> i32 {
        self.x + self.w
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn y2(&self) -> i32 {
        self.y + self.h
    }

    /// Reports whether the point lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x2() && p.y >= self.y && p.y < self.y2()
    }

    /// Reports whether two rectangles share at least one pixel.
    #[must_use]
    pub const fn intersects(&self, other: Rect) -> bool {
        self.x < other.x2() && other.x < self.x2() && self.y < other.y2() && other.y < self.y2()
    }

    /// Computes the overlap of two rectangles.
    ///
    /// The result has zero width or height when the rectangles are disjoint.
    #[must_use]
    pub fn intersection(&self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let w = (self.x2().min(other.x2()) - x).max(0);
        let h = (self.y2().min(other.y2()) - y).max(0);
        Rect::new(x, y, w, h)
    }
}

/// Direction of a one-pixel probe used by the edge-point collision tests.
///
/// `None` selects the full solid point set rather than a single edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Probe every solid point.
    None,
    /// Probe the top edge.
    Up,
    /// Probe the bottom edge.
    Down,
    /// Probe the left edge.
    Left,
    /// Probe the right edge.
    Right,
}

impl MoveDirection {
    /// Swaps `Left` and `Right`, leaving the other directions unchanged.
    ///
    /// Applied when an entity faces left so callers keep facing-invariant
    /// direction semantics while the solid data stays authored facing right.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            other => other,
        }
    }

    /// One-pixel step offset for this direction.
    #[must_use]
    pub const fn step(self) -> (i32, i32) {
        match self {
            Self::None => (0, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Unique identifier assigned to an entity by the level that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Bitmask of collision dimensions used as a category filter.
///
/// Two entities may interact only when one side's strong mask shares a bit
/// with the other side's weak mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions(u32);

impl Dimensions {
    /// The empty mask; entities carrying it never match anything.
    #[must_use]
    pub const fn none() -> Self {
        Self(0)
    }

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bit representation of the mask.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns a copy of the mask with the given bit index set.
    #[must_use]
    pub const fn with_bit(self, index: u32) -> Self {
        Self(self.0 | (1 << index))
    }

    /// Reports whether the mask has no bits set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Reports whether two masks share at least one dimension.
    #[must_use]
    pub const fn overlaps(&self, other: Dimensions) -> bool {
        self.0 & other.0 != 0
    }
}

/// Interns dimension names to stable bit indices.
///
/// One registry per simulation; the mapping is append-only so bit indices
/// remain valid for the lifetime of the registry.
#[derive(Debug, Default)]
pub struct DimensionRegistry {
    ids: HashMap<String, u32>,
    keys: Vec<String>,
}

impl DimensionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bit index for a dimension name, interning it on first use.
    pub fn dimension_id(&mut self, key: &str) -> u32 {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }

        let id = u32::try_from(self.keys.len()).expect("dimension registry overflow");
        assert!(id < 32, "at most 32 collision dimensions are supported");
        let _ = self.ids.insert(key.to_owned(), id);
        self.keys.push(key.to_owned());
        id
    }

    /// Builds a mask covering the provided dimension names.
    pub fn mask(&mut self, keys: &[&str]) -> Dimensions {
        let mut mask = Dimensions::none();
        for key in keys {
            mask = mask.with_bit(self.dimension_id(key));
        }
        mask
    }

    /// Returns the name registered for a bit index, if any.
    #[must_use]
    pub fn key(&self, id: u32) -> Option<&str> {
        self.keys.get(usize::try_from(id).ok()?).map(String::as_str)
    }

    /// Number of dimensions registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Reports whether no dimensions have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Gameplay attributes of a solid surface, distinct from its geometry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceInfo {
    /// Resistance applied to entities sliding along the surface.
    pub friction: i32,
    /// Grip available to entities standing on the surface.
    pub traction: i32,
    /// Damage dealt on contact.
    pub damage: i32,
    /// Optional gameplay tag attached by the level author.
    pub tag: Option<Arc<str>>,
}

impl SurfaceInfo {
    /// Creates surface attributes without a tag.
    #[must_use]
    pub const fn new(friction: i32, traction: i32, damage: i32) -> Self {
        Self {
            friction,
            traction,
            damage,
            tag: None,
        }
    }

    /// Returns a copy of the attributes carrying the provided tag.
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(Arc::from(tag));
        self
    }

    /// Folds another surface's attributes into this one.
    ///
    /// Friction, traction, and damage take the component-wise maximum, which
    /// is commutative, associative, and idempotent. The tag is last-writer
    /// wins: merges must be applied in a stable order to keep tags
    /// reproducible.
    pub fn merge(&mut self, other: &SurfaceInfo) {
        self.friction = self.friction.max(other.friction);
        self.traction = self.traction.max(other.traction);
        self.damage = self.damage.max(other.damage);
        if other.tag.is_some() {
            self.tag = other.tag.clone();
        }
    }
}

/// Kind of space a stand/collide point query should accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowPlatform {
    /// Only fully solid space counts.
    SolidOnly,
    /// One-way platform tops count as well as solid space.
    SolidAndPlatforms,
}

/// Named subregion of an object-local solid bitmap.
///
/// Solid maps are authored facing right; facing correction happens in the
/// queries, never in the stored data.
#[derive(Debug)]
pub struct SolidMap {
    id: String,
    area: Rect,
    solid: Vec<bool>,
    top: Vec<Point>,
    bottom: Vec<Point>,
    left: Vec<Point>,
    right: Vec<Point>,
    all: Vec<Point>,
}

impl SolidMap {
    /// Builds a fully solid map covering the provided object-local area.
    #[must_use]
    pub fn from_rect(id: &str, area: Rect) -> Arc<Self> {
        let solid = vec![true; cell_count(area)];
        Arc::new(Self::from_cells(id, area, solid))
    }

    /// Builds a one-pixel-high platform strip along the top of `area`.
    #[must_use]
    pub fn platform(id: &str, area: Rect) -> Arc<Self> {
        let strip = Rect::new(area.x(), area.y(), area.w(), 1);
        let solid = vec![true; cell_count(strip)];
        Arc::new(Self::from_cells(id, strip, solid))
    }

    /// Rasterizes a transparency mask into a solid map.
    ///
    /// `alpha` holds `mask_width * mask_height` entries, `true` meaning
    /// transparent. Fully transparent border rows and columns of `area` are
    /// trimmed before rasterization so the stored bitmap is tight.
    #[must_use]
    pub fn from_alpha_mask(id: &str, alpha: &[bool], mask_width: i32, area: Rect) -> Arc<Self> {
        let sample = |x: i32, y: i32| -> bool {
            let index = usize::try_from(y * mask_width + x).unwrap_or(usize::MAX);
            alpha.get(index).copied().unwrap_or(true)
        };
        let row_opaque =
            |area: Rect, y: i32| (area.x()..area.x2()).any(|x| !sample(x, area.y() + y));
        let col_opaque =
            |area: Rect, x: i32| (area.y()..area.y2()).any(|y| !sample(area.x() + x, y));

        let mut area = area;
        while area.h() > 0 && !row_opaque(area, area.h() - 1) {
            area = Rect::new(area.x(), area.y(), area.w(), area.h() - 1);
        }
        while area.h() > 0 && !row_opaque(area, 0) {
            area = Rect::new(area.x(), area.y() + 1, area.w(), area.h() - 1);
        }
        while area.w() > 0 && !col_opaque(area, 0) {
            area = Rect::new(area.x() + 1, area.y(), area.w() - 1, area.h());
        }
        while area.w() > 0 && !col_opaque(area, area.w() - 1) {
            area = Rect::new(area.x(), area.y(), area.w() - 1, area.h());
        }

        let mut solid = vec![false; cell_count(area)];
        for y in 0..area.h() {
            for x in 0..area.w() {
                if !sample(area.x() + x, area.y() + y) {
                    solid[usize::try_from(y * area.w() + x).unwrap_or(0)] = true;
                }
            }
        }

        Arc::new(Self::from_cells(id, area, solid))
    }

    fn from_cells(id: &str, area: Rect, solid: Vec<bool>) -> Self {
        assert_eq!(solid.len(), cell_count(area), "solid bitmap size mismatch");
        let mut map = Self {
            id: id.to_owned(),
            area,
            solid,
            top: Vec::new(),
            bottom: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
            all: Vec::new(),
        };
        map.top = map.calculate_side(0, -1);
        map.bottom = map.calculate_side(0, 1);
        map.left = map.calculate_side(-1, 0);
        map.right = map.calculate_side(1, 0);
        map.all = map.calculate_side(-100_000, 0);
        map
    }

    /// Identifier reported when a collision lands inside this map.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Object-local area the bitmap covers.
    #[must_use]
    pub const fn area(&self) -> Rect {
        self.area
    }

    /// Tests a point in area-local coordinates; out of range is not solid.
    #[must_use]
    pub fn solid_at(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.area.w() || y >= self.area.h() {
            return false;
        }

        self.solid[usize::try_from(y * self.area.w() + x).unwrap_or(0)]
    }

    /// Edge point list probed when the entity moves in `dir`.
    ///
    /// Points are object-local, offset by the map's area origin.
    #[must_use]
    pub fn dir(&self, dir: MoveDirection) -> &[Point] {
        match dir {
            MoveDirection::Up => &self.top,
            MoveDirection::Down => &self.bottom,
            MoveDirection::Left => &self.left,
            MoveDirection::Right => &self.right,
            MoveDirection::None => &self.all,
        }
    }

    /// A point is on a side when it is solid and its neighbor toward
    /// `(xdir, ydir)` is not.
    fn calculate_side(&self, xdir: i32, ydir: i32) -> Vec<Point> {
        let mut points = Vec::new();
        for y in 0..self.area.h() {
            for x in 0..self.area.w() {
                if self.solid[usize::try_from(y * self.area.w() + x).unwrap_or(0)]
                    && !self.solid_at(x + xdir, y + ydir)
                {
                    points.push(Point::new(self.area.x() + x, self.area.y() + y));
                }
            }
        }
        points
    }
}

fn cell_count(area: Rect) -> usize {
    usize::try_from(area.w().max(0)).unwrap_or(0) * usize::try_from(area.h().max(0)).unwrap_or(0)
}

/// Immutable solid data for one animation frame.
///
/// Shared by every entity instance on the frame via [`Arc`]; never deep-copy
/// per instance.
#[derive(Debug)]
pub struct SolidInfo {
    area: Rect,
    maps: Vec<Arc<SolidMap>>,
}

impl SolidInfo {
    /// Combines solid maps into frame solid data with a union bounding area.
    ///
    /// Returns `None` for an empty map list, meaning the frame has no solid
    /// footprint at all.
    #[must_use]
    pub fn from_maps(maps: Vec<Arc<SolidMap>>) -> Option<Arc<Self>> {
        let first = maps.first()?.area();
        let mut x1 = first.x();
        let mut y1 = first.y();
        let mut x2 = first.x2();
        let mut y2 = first.y2();
        for map in &maps {
            let area = map.area();
            x1 = x1.min(area.x());
            y1 = y1.min(area.y());
            x2 = x2.max(area.x2());
            y2 = y2.max(area.y2());
        }

        Some(Arc::new(Self {
            area: Rect::from_coordinates(x1, y1, x2 - 1, y2 - 1),
            maps,
        }))
    }

    /// Declared bounding area used for broad-phase rejection.
    #[must_use]
    pub const fn area(&self) -> Rect {
        self.area
    }

    /// Member solid maps in declaration order.
    #[must_use]
    pub fn maps(&self) -> &[Arc<SolidMap>] {
        &self.maps
    }

    /// Tests an object-local point, reporting the id of the map hit.
    #[must_use]
    pub fn solid_at(&self, x: i32, y: i32) -> Option<&str> {
        self.maps
            .iter()
            .find(|map| map.solid_at(x - map.area().x(), y - map.area().y()))
            .map(|map| map.id())
    }
}

/// Rectangle tagged with a name in an animation frame, used for
/// gameplay-level interaction detection distinct from solid-body collision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionArea {
    /// Name delivered with collision notifications involving this area.
    pub name: String,
    /// Frame-local rectangle the area covers, authored facing right.
    pub area: Rect,
    /// When set, every pixel of the area counts as opaque and per-pixel
    /// sampling is skipped.
    pub no_alpha_check: bool,
}

/// One animation frame as seen by the collision systems: dimensions, a
/// transparency mask, and named collision areas.
///
/// Frame contents are produced by the external animation pipeline and are
/// read-only here.
#[derive(Debug)]
pub struct Frame {
    width: i32,
    height: i32,
    alpha: Vec<bool>,
    collision_areas: Vec<CollisionArea>,
    areas_inside_frame: bool,
}

impl Frame {
    /// Creates a frame from a transparency mask (`true` = transparent).
    #[must_use]
    pub fn new(
        width: i32,
        height: i32,
        alpha: Vec<bool>,
        collision_areas: Vec<CollisionArea>,
    ) -> Arc<Self> {
        assert!(width > 0 && height > 0, "frame dimensions must be positive");
        assert_eq!(
            alpha.len(),
            usize::try_from(width * height).unwrap_or(0),
            "alpha mask size mismatch"
        );
        let frame_rect = Rect::new(0, 0, width, height);
        let areas_inside_frame = collision_areas
            .iter()
            .all(|area| frame_rect.intersection(area.area) == area.area);
        Arc::new(Self {
            width,
            height,
            alpha,
            collision_areas,
            areas_inside_frame,
        })
    }

    /// Creates a fully opaque frame without collision areas.
    #[must_use]
    pub fn opaque(width: i32, height: i32) -> Arc<Self> {
        let len = usize::try_from(width * height).unwrap_or(0);
        Self::new(width, height, vec![false; len], Vec::new())
    }

    /// Frame width in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Tests transparency at frame-local coordinates with facing correction.
    ///
    /// Out-of-range points are transparent.
    #[must_use]
    pub fn is_alpha(&self, x: i32, y: i32, face_right: bool) -> bool {
        let x = if face_right { x } else { self.width - 1 - x };
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return true;
        }

        self.alpha[usize::try_from(y * self.width + x).unwrap_or(0)]
    }

    /// Named collision areas declared on this frame.
    #[must_use]
    pub fn collision_areas(&self) -> &[CollisionArea] {
        &self.collision_areas
    }

    /// Reports whether every collision area lies within the frame bounds,
    /// enabling the frame-rect broad phase for named-area detection.
    #[must_use]
    pub const fn collision_areas_inside_frame(&self) -> bool {
        self.areas_inside_frame
    }
}

/// Caller-owned result of a collision query.
///
/// Queries accept `Option<&mut CollisionInfo>` so boolean-only callers skip
/// the bookkeeping entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionInfo {
    /// Friction of the surface hit.
    pub friction: i32,
    /// Traction of the surface hit.
    pub traction: i32,
    /// Damage of the surface hit.
    pub damage: i32,
    /// Tag of the surface hit, if any.
    pub surface_tag: Option<Arc<str>>,
    /// Vertical correction to sit the querying entity on top of a platform
    /// that moved during the same step.
    pub adjust_y: i32,
    /// True when the space hit is a one-way platform rather than solid.
    pub platform: bool,
    /// Id of the querying entity's solid map that collided.
    pub area_id: Option<String>,
    /// Entity collided with; `None` for level tiles.
    pub collide_with: Option<EntityId>,
    /// Id of the other entity's solid map that collided.
    pub collide_with_area_id: Option<String>,
}

impl CollisionInfo {
    /// Copies a hit surface's attributes into the flat result fields.
    pub fn read_surface(&mut self, surface: &SurfaceInfo) {
        self.friction = surface.friction;
        self.traction = surface.traction;
        self.damage = surface.damage;
        self.surface_tag = surface.tag.clone();
    }
}

/// Reasons the placement solver can fail to find a legal resting position.
///
/// Placement failure is an ordinary outcome the caller must handle, for
/// example by aborting a spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The entity requested forced standing and no standing position exists
    /// within the snap bound.
    #[error("no standing position within the snap bound")]
    ForcedStandingFailed,
    /// Every displacement candidate left the entity colliding.
    #[error("no collision-free position found")]
    NoFreePosition,
}

#[cfg(test)]
mod tests {
    use super::{
        AllowPlatform, Dimensions, DimensionRegistry, EntityId, MoveDirection, Point, Rect,
        SolidInfo, SolidMap, SurfaceInfo,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn entity_id_round_trips_through_bincode() {
        assert_round_trip(&EntityId::new(42));
    }

    #[test]
    fn rect_round_trips_through_bincode() {
        assert_round_trip(&Rect::new(-3, 7, 20, 11));
    }

    #[test]
    fn move_direction_round_trips_through_bincode() {
        assert_round_trip(&MoveDirection::Left);
    }

    #[test]
    fn dimensions_round_trip_through_bincode() {
        assert_round_trip(&Dimensions::from_bits(0b101));
    }

    #[test]
    fn rect_intersection_clamps_to_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert!(a.intersects(b));
        assert_eq!(a.intersection(b), Rect::new(5, 5, 5, 5));

        let disjoint = Rect::new(20, 20, 4, 4);
        assert!(!a.intersects(disjoint));
        assert_eq!(a.intersection(disjoint).w(), 0);
    }

    #[test]
    fn empty_rect_contains_nothing() {
        let empty = Rect::new(3, 3, 0, 5);
        assert!(!empty.contains(Point::new(3, 4)));
        assert!(!empty.intersects(Rect::new(0, 0, 10, 10)));
    }

    #[test]
    fn surface_merge_takes_component_maximum() {
        let mut a = SurfaceInfo::new(3, 9, 1);
        let b = SurfaceInfo::new(7, 2, 5);
        a.merge(&b);
        assert_eq!(a.friction, 7);
        assert_eq!(a.traction, 9);
        assert_eq!(a.damage, 5);
        assert_eq!(a.tag, None);
    }

    #[test]
    fn surface_merge_tag_is_last_writer_wins() {
        let mut a = SurfaceInfo::new(0, 0, 0).with_tag("grass");
        a.merge(&SurfaceInfo::new(0, 0, 0));
        assert_eq!(a.tag.as_deref(), Some("grass"));

        a.merge(&SurfaceInfo::new(0, 0, 0).with_tag("ice"));
        assert_eq!(a.tag.as_deref(), Some("ice"));
    }

    #[test]
    fn dimension_registry_interns_stable_indices() {
        let mut registry = DimensionRegistry::new();
        let body = registry.dimension_id("body");
        let hazard = registry.dimension_id("hazard");
        assert_ne!(body, hazard);
        assert_eq!(registry.dimension_id("body"), body);
        assert_eq!(registry.key(hazard), Some("hazard"));

        let mask = registry.mask(&["body", "hazard"]);
        assert!(mask.overlaps(Dimensions::none().with_bit(body)));
        assert!(mask.overlaps(Dimensions::none().with_bit(hazard)));
        assert!(!Dimensions::none().overlaps(mask));
    }

    #[test]
    fn solid_map_sides_trace_edges() {
        let map = SolidMap::from_rect("body", Rect::new(2, 3, 4, 2));
        assert_eq!(map.dir(MoveDirection::Up).len(), 4);
        assert_eq!(map.dir(MoveDirection::Down).len(), 4);
        assert_eq!(map.dir(MoveDirection::Left).len(), 2);
        assert_eq!(map.dir(MoveDirection::Right).len(), 2);
        assert_eq!(map.dir(MoveDirection::None).len(), 8);
        assert!(map
            .dir(MoveDirection::Up)
            .contains(&Point::new(2, 3)));
    }

    #[test]
    fn solid_info_reports_map_id_at_point() {
        let body = SolidMap::from_rect("body", Rect::new(0, 0, 4, 4));
        let legs = SolidMap::from_rect("legs", Rect::new(0, 4, 4, 2));
        let info = SolidInfo::from_maps(vec![body, legs]).expect("solid info");
        assert_eq!(info.area(), Rect::new(0, 0, 4, 6));
        assert_eq!(info.solid_at(1, 1), Some("body"));
        assert_eq!(info.solid_at(1, 5), Some("legs"));
        assert_eq!(info.solid_at(5, 5), None);
    }

    #[test]
    fn solid_info_from_empty_maps_is_none() {
        assert!(SolidInfo::from_maps(Vec::new()).is_none());
    }

    #[test]
    fn alpha_mask_map_trims_transparent_border() {
        // 4x4 mask with an opaque 2x2 block in the middle.
        let mut alpha = vec![true; 16];
        alpha[5] = false;
        alpha[6] = false;
        alpha[9] = false;
        alpha[10] = false;
        let map = SolidMap::from_alpha_mask("body", &alpha, 4, Rect::new(0, 0, 4, 4));
        assert_eq!(map.area(), Rect::new(1, 1, 2, 2));
        assert!(map.solid_at(0, 0));
        assert!(map.solid_at(1, 1));
        assert!(!map.solid_at(2, 0));
    }

    #[test]
    fn platform_map_is_one_pixel_high() {
        let map = SolidMap::platform("platform", Rect::new(0, 10, 6, 4));
        assert_eq!(map.area(), Rect::new(0, 10, 6, 1));
        assert_eq!(map.dir(MoveDirection::None).len(), 6);
    }

    #[test]
    fn allow_platform_variants_compare() {
        assert_ne!(AllowPlatform::SolidOnly, AllowPlatform::SolidAndPlatforms);
    }
}

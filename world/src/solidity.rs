//! Sparse per-tile solidity index with unbounded signed coordinates.

use ridgeline_core::SurfaceInfo;

/// Side length of a solidity tile in pixels.
pub const TILE_SIZE: i32 = 32;

const TILE_BITS: usize = (TILE_SIZE * TILE_SIZE) as usize;
const TILE_WORDS: usize = TILE_BITS / 64;

/// Signed tile coordinate addressing one cell of the solidity map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilePos {
    /// Tile column; negative columns extend left of the origin.
    pub x: i32,
    /// Tile row; negative rows extend above the origin.
    pub y: i32,
}

impl TilePos {
    /// Creates a tile coordinate from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Fixed bit set covering one tile's `TILE_SIZE * TILE_SIZE` pixels.
///
/// Bit indices are `local_y * TILE_SIZE + local_x`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileBitmap {
    words: [u64; TILE_WORDS],
}

impl TileBitmap {
    /// Tests the bit at `index`.
    #[must_use]
    pub const fn test(&self, index: usize) -> bool {
        self.words[index / 64] >> (index % 64) & 1 == 1
    }

    /// Sets the bit at `index`.
    pub fn set(&mut self, index: usize) {
        self.words[index / 64] |= 1 << (index % 64);
    }

    /// Clears the bit at `index`.
    pub fn reset(&mut self, index: usize) {
        self.words[index / 64] &= !(1 << (index % 64));
    }

    /// Sets every bit.
    pub fn set_all(&mut self) {
        self.words = [u64::MAX; TILE_WORDS];
    }

    /// ORs another bitmap into this one.
    pub fn union_with(&mut self, other: &TileBitmap) {
        for (word, other_word) in self.words.iter_mut().zip(other.words.iter()) {
            *word |= other_word;
        }
    }

    /// Reports whether any bit is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.words.iter().any(|word| *word != 0)
    }
}

/// Solidity record for one touched tile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileSolidInfo {
    /// Per-pixel solidity; ignored while `all_solid` is set.
    pub bitmap: TileBitmap,
    /// Gameplay attributes of the tile's surface.
    pub surface: SurfaceInfo,
    /// Marks the whole tile solid without consulting the bitmap.
    pub all_solid: bool,
}

#[derive(Debug, Default)]
struct Row {
    positive: Vec<Option<Box<TileSolidInfo>>>,
    negative: Vec<Option<Box<TileSolidInfo>>>,
}

impl Row {
    fn slot_mut(&mut self, x: i32) -> &mut Option<Box<TileSolidInfo>> {
        let (cells, index) = if x >= 0 {
            (&mut self.positive, axis_index(x))
        } else {
            (&mut self.negative, axis_index(-(x + 1)))
        };
        if cells.len() <= index {
            cells.resize_with(index + 1, || None);
        }
        &mut cells[index]
    }

    fn get(&self, x: i32) -> Option<&TileSolidInfo> {
        let (cells, index) = if x >= 0 {
            (&self.positive, axis_index(x))
        } else {
            (&self.negative, axis_index(-(x + 1)))
        };
        cells.get(index)?.as_deref()
    }

    fn slot_existing_mut(&mut self, x: i32) -> Option<&mut Option<Box<TileSolidInfo>>> {
        let (cells, index) = if x >= 0 {
            (&mut self.positive, axis_index(x))
        } else {
            (&mut self.negative, axis_index(-(x + 1)))
        };
        cells.get_mut(index)
    }
}

fn axis_index(value: i32) -> usize {
    usize::try_from(value).expect("non-negative axis index")
}

fn axis_coord(index: usize, negative: bool) -> i32 {
    let value = i32::try_from(index).expect("axis index fits i32");
    if negative {
        -value - 1
    } else {
        value
    }
}

/// Sparse map from signed tile coordinate to [`TileSolidInfo`].
///
/// Rows and cells are growth-on-demand vectors; negative coordinates are
/// mirrored into separate vectors via `-(value + 1)` indexing, so the map
/// grows to exactly the touched index on each axis and lookups outside the
/// touched range report absent without allocating.
#[derive(Debug, Default)]
pub struct SolidityMap {
    positive_rows: Vec<Row>,
    negative_rows: Vec<Row>,
}

impl SolidityMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell at `pos`, lazily allocating a zero-initialized one.
    pub fn insert_or_find(&mut self, pos: TilePos) -> &mut TileSolidInfo {
        self.slot_mut(pos).get_or_insert_with(Box::default)
    }

    /// Looks up the cell at `pos` without allocating.
    #[must_use]
    pub fn find(&self, pos: TilePos) -> Option<&TileSolidInfo> {
        let row = if pos.y >= 0 {
            self.positive_rows.get(axis_index(pos.y))
        } else {
            self.negative_rows.get(axis_index(-(pos.y + 1)))
        }?;
        row.get(pos.x)
    }

    /// Destroys the cell at `pos` if present; no-op otherwise.
    pub fn erase(&mut self, pos: TilePos) {
        let row = if pos.y >= 0 {
            self.positive_rows.get_mut(axis_index(pos.y))
        } else {
            self.negative_rows.get_mut(axis_index(-(pos.y + 1)))
        };
        if let Some(slot) = row.and_then(|row| row.slot_existing_mut(pos.x)) {
            *slot = None;
        }
    }

    /// Releases every owned cell.
    pub fn clear(&mut self) {
        self.positive_rows.clear();
        self.negative_rows.clear();
    }

    /// Folds another map into this one at a tile offset.
    ///
    /// For every occupied source cell the destination cell is fetched or
    /// created, `all_solid` is ORed, the surface merge rule is applied, and
    /// the bitmaps are ORed unless the destination is already fully solid.
    /// Merging identical inputs twice yields the same bitmap and attribute
    /// content as merging once; only the surface tag is order-sensitive.
    pub fn merge(&mut self, other: &SolidityMap, xoffset: i32, yoffset: i32) {
        for (pos, src) in other.cells() {
            let dst = self.insert_or_find(TilePos::new(pos.x + xoffset, pos.y + yoffset));
            dst.all_solid = dst.all_solid || src.all_solid;
            dst.surface.merge(&src.surface);
            if !dst.all_solid {
                dst.bitmap.union_with(&src.bitmap);
            }
        }
    }

    /// Iterates over the occupied cells in row order.
    pub fn cells(&self) -> impl Iterator<Item = (TilePos, &TileSolidInfo)> {
        let rows = self
            .positive_rows
            .iter()
            .enumerate()
            .map(|(index, row)| (axis_coord(index, false), row))
            .chain(
                self.negative_rows
                    .iter()
                    .enumerate()
                    .map(|(index, row)| (axis_coord(index, true), row)),
            );
        rows.flat_map(|(y, row)| {
            let positives = row.positive.iter().enumerate().filter_map(move |(xi, cell)| {
                cell.as_deref()
                    .map(|info| (TilePos::new(axis_coord(xi, false), y), info))
            });
            let negatives = row.negative.iter().enumerate().filter_map(move |(xi, cell)| {
                cell.as_deref()
                    .map(|info| (TilePos::new(axis_coord(xi, true), y), info))
            });
            positives.chain(negatives)
        })
    }

    /// Number of occupied cells; empty slots created by growth do not count.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.cells().count()
    }

    fn slot_mut(&mut self, pos: TilePos) -> &mut Option<Box<TileSolidInfo>> {
        let (rows, index) = if pos.y >= 0 {
            (&mut self.positive_rows, axis_index(pos.y))
        } else {
            (&mut self.negative_rows, axis_index(-(pos.y + 1)))
        };
        if rows.len() <= index {
            rows.resize_with(index + 1, Row::default);
        }
        rows[index].slot_mut(pos.x)
    }
}

#[cfg(test)]
mod tests {
    use super::{SolidityMap, TileBitmap, TilePos, TILE_SIZE};
    use ridgeline_core::SurfaceInfo;

    #[test]
    fn untouched_lookup_reports_absent_without_allocating() {
        let map = SolidityMap::new();
        assert!(map.find(TilePos::new(0, 0)).is_none());
        assert!(map.find(TilePos::new(-17, 512)).is_none());
        assert_eq!(map.occupied(), 0);
    }

    #[test]
    fn insert_or_find_creates_zeroed_cell_once() {
        let mut map = SolidityMap::new();
        let pos = TilePos::new(-3, 2);
        {
            let cell = map.insert_or_find(pos);
            assert!(!cell.all_solid);
            assert!(!cell.bitmap.any());
            cell.all_solid = true;
        }
        assert!(map.insert_or_find(pos).all_solid);
        assert_eq!(map.occupied(), 1);
    }

    #[test]
    fn negative_coordinates_mirror_independently() {
        let mut map = SolidityMap::new();
        for pos in [
            TilePos::new(2, 3),
            TilePos::new(-2, 3),
            TilePos::new(2, -3),
            TilePos::new(-2, -3),
        ] {
            map.insert_or_find(pos).all_solid = true;
        }
        assert_eq!(map.occupied(), 4);
        for pos in [
            TilePos::new(2, 3),
            TilePos::new(-2, 3),
            TilePos::new(2, -3),
            TilePos::new(-2, -3),
        ] {
            assert!(map.find(pos).is_some(), "missing {pos:?}");
        }
        assert!(map.find(TilePos::new(3, 2)).is_none());
    }

    #[test]
    fn erase_is_noop_on_missing_cells() {
        let mut map = SolidityMap::new();
        map.erase(TilePos::new(5, -9));
        assert_eq!(map.occupied(), 0);

        map.insert_or_find(TilePos::new(5, -9)).all_solid = true;
        map.erase(TilePos::new(5, -9));
        assert!(map.find(TilePos::new(5, -9)).is_none());
    }

    #[test]
    fn clear_releases_all_cells() {
        let mut map = SolidityMap::new();
        map.insert_or_find(TilePos::new(0, 0)).all_solid = true;
        map.insert_or_find(TilePos::new(-8, 1)).all_solid = true;
        map.clear();
        assert_eq!(map.occupied(), 0);
    }

    #[test]
    fn merge_of_empty_map_is_identity() {
        let mut level = SolidityMap::new();
        {
            let cell = level.insert_or_find(TilePos::new(1, 1));
            cell.bitmap.set(5);
            cell.surface = SurfaceInfo::new(10, 20, 0);
        }
        let before_bitmap = level.find(TilePos::new(1, 1)).expect("cell").bitmap.clone();

        let empty = SolidityMap::new();
        level.merge(&empty, 0, 0);

        assert_eq!(level.occupied(), 1);
        let cell = level.find(TilePos::new(1, 1)).expect("cell");
        assert_eq!(cell.bitmap, before_bitmap);
        assert_eq!(cell.surface, SurfaceInfo::new(10, 20, 0));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut sub = SolidityMap::new();
        {
            let cell = sub.insert_or_find(TilePos::new(0, 0));
            cell.bitmap.set(7);
            cell.bitmap.set(100);
            cell.surface = SurfaceInfo::new(4, 5, 6).with_tag("mud");
        }
        sub.insert_or_find(TilePos::new(-1, -1)).all_solid = true;

        let mut once = SolidityMap::new();
        once.merge(&sub, 3, -2);

        let mut twice = SolidityMap::new();
        twice.merge(&sub, 3, -2);
        twice.merge(&sub, 3, -2);

        for (pos, cell) in once.cells() {
            let other = twice.find(pos).expect("cell present after double merge");
            assert_eq!(cell, other);
        }
        assert_eq!(once.occupied(), twice.occupied());
    }

    #[test]
    fn merge_applies_tile_offsets() {
        let mut sub = SolidityMap::new();
        sub.insert_or_find(TilePos::new(0, 0)).all_solid = true;
        sub.insert_or_find(TilePos::new(1, 0)).all_solid = true;

        let mut level = SolidityMap::new();
        level.merge(&sub, -4, 6);

        assert!(level.find(TilePos::new(-4, 6)).is_some());
        assert!(level.find(TilePos::new(-3, 6)).is_some());
        assert!(level.find(TilePos::new(0, 0)).is_none());
    }

    #[test]
    fn merge_skips_bitmap_union_on_fully_solid_destination() {
        let mut sub = SolidityMap::new();
        sub.insert_or_find(TilePos::new(0, 0)).bitmap.set(3);

        let mut level = SolidityMap::new();
        level.insert_or_find(TilePos::new(0, 0)).all_solid = true;
        level.merge(&sub, 0, 0);

        let cell = level.find(TilePos::new(0, 0)).expect("cell");
        assert!(cell.all_solid);
        assert!(!cell.bitmap.any());
    }

    #[test]
    fn merge_surfaces_take_maximum() {
        let mut sub = SolidityMap::new();
        sub.insert_or_find(TilePos::new(0, 0)).surface = SurfaceInfo::new(9, 1, 2);

        let mut level = SolidityMap::new();
        level.insert_or_find(TilePos::new(0, 0)).surface = SurfaceInfo::new(3, 8, 0);
        level.merge(&sub, 0, 0);

        let surface = &level.find(TilePos::new(0, 0)).expect("cell").surface;
        assert_eq!(surface.friction, 9);
        assert_eq!(surface.traction, 8);
        assert_eq!(surface.damage, 2);
    }

    #[test]
    fn bitmap_bit_operations() {
        let mut bitmap = TileBitmap::default();
        let index = usize::try_from(TILE_SIZE + 5).expect("index");
        assert!(!bitmap.test(index));
        bitmap.set(index);
        assert!(bitmap.test(index));
        assert!(bitmap.any());
        bitmap.reset(index);
        assert!(!bitmap.any());

        bitmap.set_all();
        assert!(bitmap.test(0));
        assert!(bitmap.test((TILE_SIZE * TILE_SIZE - 1) as usize));
    }
}

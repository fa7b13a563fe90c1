use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::ShapeHandle;
use crate::math::{BoundingBox, Vector2};

/// A spatial index over shape bounding boxes.
///
/// Queries return lazy iterators. Every handle whose stored box overlaps
/// the query box is yielded exactly once; callers do the exact test.
pub trait SpatialIndex {
    /// Adds a shape with its bounding box
    fn insert(&mut self, handle: ShapeHandle, bb: BoundingBox);

    /// Removes a shape; unknown handles are ignored
    fn remove(&mut self, handle: ShapeHandle);

    /// Replaces the stored bounding box of a shape
    fn update(&mut self, handle: ShapeHandle, bb: BoundingBox);

    /// Returns the stored bounding box of a shape
    fn get_bb(&self, handle: ShapeHandle) -> Option<BoundingBox>;

    /// Returns every shape whose bounding box overlaps `bb`
    fn query<'a>(&'a self, bb: BoundingBox) -> Box<dyn Iterator<Item = ShapeHandle> + 'a>;

    /// Returns the number of indexed shapes
    fn len(&self) -> usize;

    /// Removes every shape from the index
    fn clear(&mut self);

    /// Returns whether the index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the shape is indexed
    fn contains(&self, handle: ShapeHandle) -> bool {
        self.get_bb(handle).is_some()
    }

    /// Returns every shape whose bounding box is crossed by a swept circle
    fn query_segment<'a>(
        &'a self,
        a: Vector2,
        b: Vector2,
        radius: f32,
    ) -> Box<dyn Iterator<Item = ShapeHandle> + 'a> {
        let sweep = BoundingBox::for_segment(a, b, radius);
        Box::new(self.query(sweep).filter(move |handle| {
            self.get_bb(*handle)
                .map_or(false, |bb| bb.grow(radius).segment_query(a, b).is_some())
        }))
    }
}

/// Which spatial index a space uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum BroadPhaseKind {
    /// Uniform grid hashing (default)
    #[default]
    SpatialHash,

    /// Linear scan over every shape
    BruteForce,
}

/// Creates a boxed spatial index of the given kind
pub fn new_spatial_index(kind: BroadPhaseKind, cell_size: f32) -> Box<dyn SpatialIndex> {
    match kind {
        BroadPhaseKind::SpatialHash => Box::new(SpatialHash::new(cell_size)),
        BroadPhaseKind::BruteForce => Box::new(BruteForceIndex::new()),
    }
}

/// Simple brute-force index that tests every stored box
#[derive(Debug, Default, Clone)]
pub struct BruteForceIndex {
    /// The shapes and their bounding boxes
    entries: BTreeMap<ShapeHandle, BoundingBox>,
}

impl BruteForceIndex {
    /// Creates a new brute-force index
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl SpatialIndex for BruteForceIndex {
    fn insert(&mut self, handle: ShapeHandle, bb: BoundingBox) {
        self.entries.insert(handle, bb);
    }

    fn remove(&mut self, handle: ShapeHandle) {
        self.entries.remove(&handle);
    }

    fn update(&mut self, handle: ShapeHandle, bb: BoundingBox) {
        self.entries.insert(handle, bb);
    }

    fn get_bb(&self, handle: ShapeHandle) -> Option<BoundingBox> {
        self.entries.get(&handle).copied()
    }

    fn query<'a>(&'a self, bb: BoundingBox) -> Box<dyn Iterator<Item = ShapeHandle> + 'a> {
        Box::new(
            self.entries
                .iter()
                .filter(move |(_, stored)| stored.intersects(&bb))
                .map(|(handle, _)| *handle),
        )
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Shapes covering more cells than this are kept in a separate list
const MAX_CELLS_PER_SHAPE: i64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    min: (i32, i32),
    max: (i32, i32),
}

impl CellRange {
    fn cell_count(&self) -> i64 {
        (self.max.0 as i64 - self.min.0 as i64 + 1) * (self.max.1 as i64 - self.min.1 as i64 + 1)
    }

    fn cells(self) -> impl Iterator<Item = (i32, i32)> {
        (self.min.0..=self.max.0).flat_map(move |x| (self.min.1..=self.max.1).map(move |y| (x, y)))
    }
}

#[derive(Debug, Clone, Copy)]
struct HashEntry {
    bb: BoundingBox,
    range: Option<CellRange>,
}

/// Uniform-grid spatial hash
#[derive(Debug, Clone)]
pub struct SpatialHash {
    /// The cell size (both dimensions)
    cell_size: f32,

    /// The cells containing shapes
    cells: HashMap<(i32, i32), Vec<ShapeHandle>>,

    /// Every indexed shape with its bounding box and covered cells
    entries: BTreeMap<ShapeHandle, HashEntry>,

    /// Shapes too large (or not finite) to be hashed into cells
    oversized: Vec<ShapeHandle>,
}

impl SpatialHash {
    /// Creates a new spatial hash with the given cell size
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 && cell_size.is_finite() { cell_size } else { 1.0 };
        Self {
            cell_size,
            cells: HashMap::new(),
            entries: BTreeMap::new(),
            oversized: Vec::new(),
        }
    }

    /// Returns the cell size
    pub fn get_cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Gets the cell index for a position
    fn get_cell_index(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Gets the range of cell indices for a bounding box, or `None` if it is
    /// too large to hash
    fn get_cell_range(&self, bb: &BoundingBox) -> Option<CellRange> {
        if !bb.is_finite() {
            return None;
        }

        let range = CellRange {
            min: self.get_cell_index(bb.left, bb.bottom),
            max: self.get_cell_index(bb.right, bb.top),
        };

        (range.cell_count() <= MAX_CELLS_PER_SHAPE).then_some(range)
    }

    fn unlink(&mut self, handle: ShapeHandle, range: Option<CellRange>) {
        match range {
            Some(range) => {
                for key in range.cells() {
                    if let Some(cell) = self.cells.get_mut(&key) {
                        cell.retain(|h| *h != handle);
                        if cell.is_empty() {
                            self.cells.remove(&key);
                        }
                    }
                }
            }
            None => self.oversized.retain(|h| *h != handle),
        }
    }

    fn link(&mut self, handle: ShapeHandle, range: Option<CellRange>) {
        match range {
            Some(range) => {
                for key in range.cells() {
                    self.cells.entry(key).or_default().push(handle);
                }
            }
            None => self.oversized.push(handle),
        }
    }
}

impl SpatialIndex for SpatialHash {
    fn insert(&mut self, handle: ShapeHandle, bb: BoundingBox) {
        if self.entries.contains_key(&handle) {
            self.update(handle, bb);
            return;
        }

        let range = self.get_cell_range(&bb);
        self.link(handle, range);
        self.entries.insert(handle, HashEntry { bb, range });
    }

    fn remove(&mut self, handle: ShapeHandle) {
        if let Some(entry) = self.entries.remove(&handle) {
            self.unlink(handle, entry.range);
        }
    }

    fn update(&mut self, handle: ShapeHandle, bb: BoundingBox) {
        let range = self.get_cell_range(&bb);

        match self.entries.get_mut(&handle) {
            Some(entry) if entry.range == range => {
                entry.bb = bb;
            }
            Some(entry) => {
                let old_range = entry.range;
                *entry = HashEntry { bb, range };
                self.unlink(handle, old_range);
                self.link(handle, range);
            }
            None => self.insert(handle, bb),
        }
    }

    fn get_bb(&self, handle: ShapeHandle) -> Option<BoundingBox> {
        self.entries.get(&handle).map(|entry| entry.bb)
    }

    fn query<'a>(&'a self, bb: BoundingBox) -> Box<dyn Iterator<Item = ShapeHandle> + 'a> {
        let entries = &self.entries;
        let overlaps = move |handle: &ShapeHandle| {
            entries.get(handle).map_or(false, |entry| entry.bb.intersects(&bb))
        };

        match self.get_cell_range(&bb) {
            // Walking the cells only pays off when the query is small.
            Some(range) if range.cell_count() <= (entries.len() as i64).max(1) * 4 => {
                let mut seen = HashSet::new();
                let oversized = self.oversized.iter().copied().filter(overlaps);
                let hashed = range
                    .cells()
                    .filter_map(move |key| self.cells.get(&key))
                    .flat_map(|cell| cell.iter().copied())
                    .filter(move |handle| overlaps(handle) && seen.insert(*handle));
                Box::new(oversized.chain(hashed))
            }
            _ => Box::new(
                entries
                    .iter()
                    .filter(move |(_, entry)| entry.bb.intersects(&bb))
                    .map(|(handle, _)| *handle),
            ),
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.oversized.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Handle;

    fn handle(i: u32) -> ShapeHandle {
        ShapeHandle::from_raw_parts(i, 0)
    }

    #[test]
    fn hash_matches_brute_force() {
        let mut hash = SpatialHash::new(1.0);
        let mut brute = BruteForceIndex::new();

        for i in 0..40u32 {
            let x = (i % 8) as f32 * 1.3 - 4.0;
            let y = (i / 8) as f32 * 0.9 - 2.0;
            let bb = BoundingBox::for_extents(Vector2::new(x, y), 0.4 + (i % 3) as f32 * 0.3, 0.5);
            hash.insert(handle(i), bb);
            brute.insert(handle(i), bb);
        }
        // One huge shape that lands in the oversized list
        let floor = BoundingBox::new(-1000.0, -3.0, 1000.0, -2.5);
        hash.insert(handle(99), floor);
        brute.insert(handle(99), floor);

        for query in [
            BoundingBox::new(-1.0, -1.0, 1.0, 1.0),
            BoundingBox::new(-10.0, -10.0, 10.0, 10.0),
            BoundingBox::new(2.0, 0.5, 2.1, 0.6),
        ] {
            let mut a: Vec<_> = hash.query(query).collect();
            let mut b: Vec<_> = brute.query(query).collect();
            a.sort();
            b.sort();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn update_moves_shape_between_cells() {
        let mut hash = SpatialHash::new(1.0);
        hash.insert(handle(0), BoundingBox::for_circle(Vector2::zero(), 0.25));
        hash.update(handle(0), BoundingBox::for_circle(Vector2::new(5.0, 5.0), 0.25));

        assert_eq!(hash.query(BoundingBox::for_circle(Vector2::zero(), 0.1)).count(), 0);
        assert_eq!(hash.query(BoundingBox::for_circle(Vector2::new(5.0, 5.0), 0.1)).count(), 1);

        hash.remove(handle(0));
        assert!(hash.is_empty());
    }
}

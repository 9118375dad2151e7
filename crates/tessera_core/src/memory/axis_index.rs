//! # Sparse Axis Index
//!
//! A sorted associative array from one integer coordinate to a value.
//!
//! Three of these nested inside each other (Y → X → Z) address an unbounded,
//! sparse 3D grid of chunks without allocating anything for empty regions.
//!
//! ## Layout
//!
//! ```text
//! nodes: [ (-7, a) | (-2, b) | (0, c) | (5, d) | .. free .. ]
//!          ^ sorted ascending, unique coordinates
//! ```
//!
//! Lookups are a binary search. Inserting or removing shifts the tail by one
//! slot, which is O(n) but fine because the fan-out per level is small.

/// Initial node capacity of a fresh index.
pub const AXIS_INITIAL_CAPACITY: usize = 64;

/// One `(coordinate, value)` slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxisNode<T> {
    /// Coordinate along this axis.
    pub coord: i32,
    /// Stored value.
    pub value: T,
}

/// Sorted sparse map `i32 → T`.
///
/// # Invariants
///
/// - Coordinates are unique and strictly increasing by position.
/// - Capacity starts at [`AXIS_INITIAL_CAPACITY`] and doubles; it never shrinks.
#[derive(Clone, Debug)]
pub struct SparseAxisIndex<T> {
    nodes: Vec<AxisNode<T>>,
}

impl<T> SparseAxisIndex<T> {
    /// Creates an empty index with the initial capacity reserved.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(AXIS_INITIAL_CAPACITY),
        }
    }

    /// Number of stored coordinates.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no coordinate is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Currently reserved node slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Binary search.
    ///
    /// `Ok(idx)` if `coord` is stored at `idx`, otherwise `Err(idx)` with the
    /// position where it would have to be inserted to keep the order.
    #[inline]
    fn find(&self, coord: i32) -> Result<usize, usize> {
        let idx = self.nodes.partition_point(|node| node.coord < coord);
        match self.nodes.get(idx) {
            Some(node) if node.coord == coord => Ok(idx),
            _ => Err(idx),
        }
    }

    /// Returns the value stored at `coord`.
    #[inline]
    #[must_use]
    pub fn get(&self, coord: i32) -> Option<&T> {
        self.find(coord).ok().map(|idx| &self.nodes[idx].value)
    }

    /// Returns the value stored at `coord`, mutably.
    #[inline]
    pub fn get_mut(&mut self, coord: i32) -> Option<&mut T> {
        match self.find(coord) {
            Ok(idx) => Some(&mut self.nodes[idx].value),
            Err(_) => None,
        }
    }

    /// Stores `value` at `coord`.
    ///
    /// Overwrites an existing entry and returns the previous value.
    pub fn add(&mut self, coord: i32, value: T) -> Option<T> {
        match self.find(coord) {
            Ok(idx) => Some(std::mem::replace(&mut self.nodes[idx].value, value)),
            Err(idx) => {
                self.grow_for(self.nodes.len() + 1);
                self.nodes.insert(idx, AxisNode { coord, value });
                None
            }
        }
    }

    /// Returns the value at `coord`, inserting `make()` first if absent.
    pub fn get_or_insert_with(&mut self, coord: i32, make: impl FnOnce() -> T) -> &mut T {
        let idx = match self.find(coord) {
            Ok(idx) => idx,
            Err(idx) => {
                self.grow_for(self.nodes.len() + 1);
                self.nodes.insert(idx, AxisNode { coord, value: make() });
                idx
            }
        };
        &mut self.nodes[idx].value
    }

    /// Removes `coord` and returns its value.
    pub fn remove(&mut self, coord: i32) -> Option<T> {
        self.find(coord).ok().map(|idx| self.nodes.remove(idx).value)
    }

    /// Iterates entries in ascending coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &T)> {
        self.nodes.iter().map(|node| (node.coord, &node.value))
    }

    /// Iterates entries mutably in ascending coordinate order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (i32, &mut T)> {
        self.nodes.iter_mut().map(|node| (node.coord, &mut node.value))
    }

    /// Doubles the capacity until `required` fits with one slot to spare.
    fn grow_for(&mut self, required: usize) {
        let mut capacity = self.nodes.capacity().max(AXIS_INITIAL_CAPACITY);
        if required < capacity {
            return;
        }
        while capacity <= required {
            capacity *= 2;
        }
        self.nodes.reserve_exact(capacity - self.nodes.len());
    }
}

impl<T> Default for SparseAxisIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

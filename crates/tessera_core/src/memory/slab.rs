//! # Slab
//!
//! Growable slot storage with stable handles and slot reuse.
//!
//! Chunks live here; indices and query windows hold [`SlabHandle`]s instead of
//! references, so resolving a chunk is one array index and nothing borrows the
//! storage while the world keeps mutating it.

/// Handle to an occupied slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlabHandle {
    index: usize,
}

impl SlabHandle {
    /// Raw slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

/// Slot storage.
///
/// Freed slots go onto a free list and are reused before the storage grows.
///
/// # Thread Safety
///
/// Not thread-safe. Wrap the owner in a lock to share it.
#[derive(Debug)]
pub struct Slab<T> {
    storage: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> Slab<T> {
    /// Creates an empty slab.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores a value and returns its handle. O(1) amortized.
    pub fn insert(&mut self, value: T) -> SlabHandle {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            self.storage[index] = Some(value);
            SlabHandle { index }
        } else {
            self.storage.push(Some(value));
            SlabHandle {
                index: self.storage.len() - 1,
            }
        }
    }

    /// Frees a slot and returns its value, or `None` for a stale handle.
    pub fn remove(&mut self, handle: SlabHandle) -> Option<T> {
        let value = self.storage.get_mut(handle.index)?.take()?;
        self.free_list.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Gets a reference to an occupied slot.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: SlabHandle) -> Option<&T> {
        self.storage.get(handle.index)?.as_ref()
    }

    /// Gets a mutable reference to an occupied slot.
    #[inline]
    pub fn get_mut(&mut self, handle: SlabHandle) -> Option<&mut T> {
        self.storage.get_mut(handle.index)?.as_mut()
    }

    /// Iterates over all occupied slots.
    pub fn iter(&self) -> impl Iterator<Item = (SlabHandle, &T)> {
        self.storage
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|v| (SlabHandle { index }, v)))
    }

    /// Iterates mutably over all occupied slots.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlabHandle, &mut T)> {
        self.storage
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|v| (SlabHandle { index }, v)))
    }
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut slab = Slab::new();
        let a = slab.insert("a");
        let b = slab.insert("b");
        assert_eq!(slab.len(), 2);
        assert_eq!(slab.get(a), Some(&"a"));

        assert_eq!(slab.remove(a), Some("a"));
        assert_eq!(slab.remove(a), None, "stale handle must not free twice");
        assert_eq!(slab.get(a), None);
        assert_eq!(slab.get(b), Some(&"b"));
        assert_eq!(slab.len(), 1);
    }

    #[test]
    fn test_slot_reuse() {
        let mut slab = Slab::new();
        let a = slab.insert(1u32);
        slab.insert(2);
        slab.remove(a);
        let c = slab.insert(3);
        assert_eq!(c.index(), a.index(), "freed slot should be reused");
        assert_eq!(slab.iter().count(), 2);
    }

    #[test]
    fn test_get_mut() {
        let mut slab = Slab::new();
        let h = slab.insert(vec![1u8]);
        slab.get_mut(h).unwrap().push(2);
        assert_eq!(slab.get(h), Some(&vec![1, 2]));
        for (_, v) in slab.iter_mut() {
            v.clear();
        }
        assert!(slab.get(h).unwrap().is_empty());
    }
}

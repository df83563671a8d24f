use crate::containers::StorageKey;

/// A handle to a set over the universe `0..capacity` which is restored automatically when the
/// engine backtracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrailedSet {
    id: u32,
}

impl StorageKey for TrailedSet {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        Self { id: index as u32 }
    }
}

/// Swap-array storage of a [`TrailedSet`].
///
/// The first `size` entries of `elements` are the members; `positions[e]` is the index of `e` in
/// `elements`. Insertion and removal swap the element across the boundary in constant time.
#[derive(Debug, Clone)]
pub(crate) struct SparseSetStorage {
    elements: Vec<usize>,
    positions: Vec<usize>,
    size: usize,
}

impl SparseSetStorage {
    pub(crate) fn new(capacity: usize) -> Self {
        SparseSetStorage {
            elements: (0..capacity).collect(),
            positions: (0..capacity).collect(),
            size: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.size
    }

    pub(crate) fn contains(&self, element: usize) -> bool {
        element < self.capacity() && self.positions[element] < self.size
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.elements[..self.size].iter().copied()
    }

    /// Returns `true` if the element was not yet a member.
    pub(crate) fn insert(&mut self, element: usize) -> bool {
        if self.contains(element) {
            return false;
        }

        self.swap(element, self.size);
        self.size += 1;
        true
    }

    /// Returns `true` if the element was a member.
    pub(crate) fn remove(&mut self, element: usize) -> bool {
        if !self.contains(element) {
            return false;
        }

        self.size -= 1;
        self.swap(element, self.size);
        true
    }

    /// Move `element` to index `target` in `elements`.
    fn swap(&mut self, element: usize, target: usize) {
        let current = self.positions[element];
        let displaced = self.elements[target];

        self.elements.swap(current, target);
        self.positions[displaced] = current;
        self.positions[element] = target;
    }
}

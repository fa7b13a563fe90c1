use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

/// A typed handle into a [`Storage`] arena.
///
/// Handles carry a generation counter so that a handle to a removed item
/// never resolves to whatever later reuses its slot.
pub trait Handle: Copy + Eq + Ord + Hash + Debug {
    /// Builds a handle from a slot index and generation
    fn from_raw_parts(index: u32, generation: u32) -> Self;

    /// Returns the slot index
    fn index(&self) -> u32;

    /// Returns the slot generation
    fn generation(&self) -> u32;
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied { generation: u32, item: T },
    Vacant { generation: u32 },
}

impl<T> Slot<T> {
    fn generation(&self) -> u32 {
        match self {
            Slot::Occupied { generation, .. } | Slot::Vacant { generation } => *generation,
        }
    }
}

/// Generational arena used for bodies, shapes and constraints.
///
/// Iteration always walks slots in index order, so two spaces built by the
/// same sequence of calls visit their objects in the same order.
#[derive(Debug, Clone)]
pub struct Storage<T, H> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _marker: PhantomData<H>,
}

impl<T, H: Handle> Storage<T, H> {
    /// Creates a new empty storage
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Adds an item to the storage and returns its handle
    pub fn add(&mut self, item: T) -> H {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = slot.generation().wrapping_add(1);
            *slot = Slot::Occupied { generation, item };
            return H::from_raw_parts(index, generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied { generation: 0, item });
        H::from_raw_parts(index, 0)
    }

    /// Gets a reference to an item by its handle
    pub fn get(&self, handle: H) -> Option<&T> {
        match self.slots.get(handle.index() as usize) {
            Some(Slot::Occupied { generation, item }) if *generation == handle.generation() => {
                Some(item)
            }
            _ => None,
        }
    }

    /// Gets a mutable reference to an item by its handle
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        match self.slots.get_mut(handle.index() as usize) {
            Some(Slot::Occupied { generation, item }) if *generation == handle.generation() => {
                Some(item)
            }
            _ => None,
        }
    }

    /// Gets mutable references to two distinct items at once
    pub fn get2_mut(&mut self, a: H, b: H) -> Option<(&mut T, &mut T)> {
        if a.index() == b.index() {
            return None;
        }

        let (ia, ib) = (a.index() as usize, b.index() as usize);
        if ia.max(ib) >= self.slots.len() {
            return None;
        }

        let (first, second) = if ia < ib {
            let (lo, hi) = self.slots.split_at_mut(ib);
            (&mut lo[ia], &mut hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(ia);
            (&mut hi[0], &mut lo[ib])
        };

        match (first, second) {
            (
                Slot::Occupied { generation: ga, item: item_a },
                Slot::Occupied { generation: gb, item: item_b },
            ) if *ga == a.generation() && *gb == b.generation() => Some((item_a, item_b)),
            _ => None,
        }
    }

    /// Returns true if the handle refers to a live item
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Removes an item from the storage
    pub fn remove(&mut self, handle: H) -> Option<T> {
        let index = handle.index() as usize;
        match self.slots.get(index) {
            Some(Slot::Occupied { generation, .. }) if *generation == handle.generation() => {}
            _ => return None,
        }

        let old = std::mem::replace(
            &mut self.slots[index],
            Slot::Vacant { generation: handle.generation() },
        );
        self.free.push(handle.index());
        self.len -= 1;

        match old {
            Slot::Occupied { item, .. } => Some(item),
            Slot::Vacant { .. } => None,
        }
    }

    /// Returns the number of items in the storage
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears all items from the storage
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    /// Returns all live handles in slot order
    pub fn handles(&self) -> Vec<H> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Returns an iterator over all items
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| match slot {
            Slot::Occupied { generation, item } => {
                Some((H::from_raw_parts(index as u32, *generation), item))
            }
            Slot::Vacant { .. } => None,
        })
    }

    /// Returns a mutable iterator over all items
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| match slot {
            Slot::Occupied { generation, item } => {
                Some((H::from_raw_parts(index as u32, *generation), item))
            }
            Slot::Vacant { .. } => None,
        })
    }
}

impl<T, H: Handle> Default for Storage<T, H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BodyHandle;

    #[test]
    fn stale_handles_do_not_resolve() {
        let mut storage: Storage<&str, BodyHandle> = Storage::new();
        let a = storage.add("a");
        assert_eq!(storage.remove(a), Some("a"));

        let b = storage.add("b");
        assert_eq!(a.index(), b.index());
        assert!(storage.get(a).is_none());
        assert_eq!(storage.get(b), Some(&"b"));
    }

    #[test]
    fn get2_mut_rejects_aliasing() {
        let mut storage: Storage<i32, BodyHandle> = Storage::new();
        let a = storage.add(1);
        let b = storage.add(2);

        assert!(storage.get2_mut(a, a).is_none());
        let (x, y) = storage.get2_mut(b, a).unwrap();
        *x += 10;
        *y += 20;
        assert_eq!(storage.get(a), Some(&21));
        assert_eq!(storage.get(b), Some(&12));
    }
}

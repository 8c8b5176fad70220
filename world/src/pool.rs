//! Fixed-capacity slot pools backing every entity collection.

use last_bus_core::SlotId;

/// Error returned when a pool has no empty slot left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{pool} pool is full ({capacity} slots)")]
pub struct PoolFull {
    /// Name of the pool that overflowed.
    pub pool: &'static str,
    /// Capacity of the pool.
    pub capacity: usize,
}

/// Arena of reusable slots allocated once at a fixed capacity.
///
/// An empty slot holds `None`. Insertion claims the first empty slot and
/// removal resets the slot, so identifiers stay stable for the life of the
/// entity they were handed out for.
#[derive(Clone, Debug)]
pub struct Pool<T> {
    name: &'static str,
    slots: Vec<Option<T>>,
}

impl<T> Pool<T> {
    /// Creates a pool with `capacity` empty slots.
    #[must_use]
    pub fn new(name: &'static str, capacity: usize) -> Self {
        debug_assert!(capacity <= usize::from(u16::MAX));
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { name, slots }
    }

    /// Name used in capacity errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Reports whether every slot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Number of empty slots.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Stores `value` in the first empty slot.
    pub fn insert(&mut self, value: T) -> Result<SlotId, PoolFull> {
        let Some(index) = self.slots.iter().position(Option::is_none) else {
            return Err(PoolFull {
                pool: self.name,
                capacity: self.slots.len(),
            });
        };
        self.slots[index] = Some(value);
        Ok(slot_id(index))
    }

    /// Overwrites the slot, returning its previous occupant.
    pub fn replace(&mut self, id: SlotId, value: T) -> Option<T> {
        self.slots
            .get_mut(id.index())
            .and_then(|slot| slot.replace(value))
    }

    /// Empties the slot, returning its occupant.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.slots.get_mut(id.index()).and_then(Option::take)
    }

    /// Occupant of the slot, if any.
    #[must_use]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Mutable occupant of the slot, if any.
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Iterates occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (slot_id(index), value)))
    }

    /// Iterates occupied slots mutably in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|value| (slot_id(index), value)))
    }

    /// Empties every slot for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(SlotId, &mut T) -> bool) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot {
                if !keep(slot_id(index), value) {
                    *slot = None;
                }
            }
        }
    }
}

fn slot_id(index: usize) -> SlotId {
    SlotId::new(index as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reuses_the_first_empty_slot() {
        let mut pool = Pool::new("test", 3);
        let first = pool.insert('a').expect("slot");
        let second = pool.insert('b').expect("slot");
        assert_eq!(pool.remove(first), Some('a'));

        let reused = pool.insert('c').expect("slot");
        assert_eq!(reused, first);
        assert_eq!(pool.get(second), Some(&'b'));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn insert_fails_when_full() {
        let mut pool = Pool::new("holes", 1);
        let _ = pool.insert(1).expect("slot");
        assert_eq!(
            pool.insert(2),
            Err(PoolFull {
                pool: "holes",
                capacity: 1
            })
        );
    }

    #[test]
    fn retain_frees_rejected_slots() {
        let mut pool = Pool::new("test", 4);
        for value in 0..4 {
            let _ = pool.insert(value).expect("slot");
        }
        pool.retain(|_, value| *value % 2 == 0);
        let kept: Vec<_> = pool.iter().map(|(_, value)| *value).collect();
        assert_eq!(kept, vec![0, 2]);
        assert_eq!(pool.remaining(), 2);
    }
}

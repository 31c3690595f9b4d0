//! Fixed-capacity arena of native resources.
//!
//! The host only ever sees an opaque `u64` token. A token encodes a slot
//! index and the slot's generation; it is valid only while that slot still
//! holds the resource it was issued for. Closing a resource bumps the slot's
//! generation, so stale or forged tokens are rejected before any native
//! pointer is used.

use crate::error::{PosixError, PosixResult};

/// Hard ceiling on concurrently open directory streams.
pub const MAX_OPEN_DIRS: usize = 256;

/// An index-plus-generation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Encode for the host. The low word is `index + 1`, so `0` is never a
    /// valid token.
    pub fn to_raw(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64 + 1)
    }

    /// Decode a host token. Returns `None` for values no arena could issue.
    pub fn from_raw(raw: u64) -> Option<Self> {
        let low = (raw & 0xFFFF_FFFF) as u32;
        let index = low.checked_sub(1)?;
        Some(Self {
            index,
            generation: (raw >> 32) as u32,
        })
    }
}

#[derive(Debug)]
struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// A bounded set of live resources addressed by [`Handle`].
#[derive(Debug)]
pub struct HandleArena<T> {
    entries: Vec<Entry<T>>,
    capacity: usize,
    live: usize,
}

impl<T> HandleArena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            live: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Fail with [`PosixError::HandleLimit`] when no slot is free.
    ///
    /// Call before acquiring the native resource, so a full arena never
    /// causes a native open.
    pub fn ensure_vacancy(&self) -> PosixResult<()> {
        if self.live >= self.capacity {
            tracing::warn!(capacity = self.capacity, "handle arena full");
            return Err(PosixError::HandleLimit(self.capacity));
        }
        Ok(())
    }

    /// Store `value` and return its token.
    ///
    /// On a full arena the value is handed back with the error, so the
    /// caller can release it.
    pub fn insert(&mut self, value: T) -> Result<Handle, (PosixError, T)> {
        if let Err(err) = self.ensure_vacancy() {
            return Err((err, value));
        }
        let index = match self.entries.iter().position(|entry| entry.value.is_none()) {
            Some(index) => index,
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    value: None,
                });
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[index];
        entry.value = Some(value);
        self.live += 1;
        Ok(Handle {
            index: index as u32,
            generation: entry.generation,
        })
    }

    fn entry(&self, handle: Handle) -> Option<&Entry<T>> {
        self.entries
            .get(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation && entry.value.is_some())
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entry(handle).is_some()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.entries
            .get_mut(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation)
            .and_then(|entry| entry.value.as_mut())
    }

    /// Remove and return the value for `handle`, retiring the token.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let entry = self
            .entries
            .get_mut(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation)?;
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.live -= 1;
        Some(value)
    }

    /// Remove every live value.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.live = 0;
        self.entries.iter_mut().filter_map(|entry| {
            let value = entry.value.take();
            if value.is_some() {
                entry.generation = entry.generation.wrapping_add(1);
            }
            value
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Tokens ─────────────────────────────────────────────────────

    #[test]
    fn zero_is_never_a_token() {
        assert!(Handle::from_raw(0).is_none());
        assert!(Handle::from_raw(5 << 32).is_none());
    }

    #[test]
    fn token_round_trips() {
        let handle = Handle { index: 3, generation: 9 };
        assert_eq!(Handle::from_raw(handle.to_raw()), Some(handle));
    }

    // ── Insert / lookup ────────────────────────────────────────────

    #[test]
    fn insert_and_get() {
        let mut arena = HandleArena::with_capacity(4);
        let h = arena.insert("a").unwrap();
        assert!(arena.contains(h));
        assert_eq!(arena.get_mut(h), Some(&mut "a"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn full_arena_rejects_and_returns_value() {
        let mut arena = HandleArena::with_capacity(2);
        arena.insert(1).unwrap();
        arena.insert(2).unwrap();
        assert_eq!(arena.ensure_vacancy(), Err(PosixError::HandleLimit(2)));
        let (err, value) = arena.insert(3).unwrap_err();
        assert_eq!(err.errno(), libc::EMFILE);
        assert_eq!(value, 3);
    }

    // ── Removal and staleness ──────────────────────────────────────

    #[test]
    fn remove_twice_fails_second_time() {
        let mut arena = HandleArena::with_capacity(2);
        let h = arena.insert('x').unwrap();
        assert_eq!(arena.remove(h), Some('x'));
        assert_eq!(arena.remove(h), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn reused_slot_rejects_stale_token() {
        let mut arena = HandleArena::with_capacity(1);
        let old = arena.insert("first").unwrap();
        arena.remove(old).unwrap();
        let new = arena.insert("second").unwrap();
        assert_ne!(old.to_raw(), new.to_raw());
        assert!(arena.get_mut(old).is_none());
        assert_eq!(arena.get_mut(new), Some(&mut "second"));
    }

    #[test]
    fn forged_token_is_rejected() {
        let mut arena = HandleArena::with_capacity(4);
        arena.insert(()).unwrap();
        let forged = Handle::from_raw(0xdead_beef).unwrap();
        assert!(!arena.contains(forged));
        assert!(arena.remove(forged).is_none());
    }

    #[test]
    fn drain_empties_arena() {
        let mut arena = HandleArena::with_capacity(4);
        let h = arena.insert(1).unwrap();
        arena.insert(2).unwrap();
        let mut drained: Vec<_> = arena.drain().collect();
        drained.sort();
        assert_eq!(drained, vec![1, 2]);
        assert!(arena.is_empty());
        assert!(!arena.contains(h));
    }
}

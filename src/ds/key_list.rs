//! Ordered key set with O(1) lookup, reordering, and removal.
//!
//! Each key is held once, in a dense `Vec` of links threaded from newest to
//! oldest by position. An `FxHashMap<K, usize>` maps a key to its position.
//! Removal swap-removes the link and re-points the link that moved into the
//! hole, so there are never vacant slots to recycle.
//!
//! ```text
//!   index: FxHashMap<K, usize>     links: Vec<Link<K>>
//!   ┌─────┬───┐                    ┌─────┬─────┬───────┬───────┐
//!   │ "a" │ 0 │                    │ pos │ key │ newer │ older │
//!   │ "b" │ 1 │                    ├─────┼─────┼───────┼───────┤
//!   │ "c" │ 2 │                    │  0  │ "a" │   1   │  NIL  │
//!   └─────┴───┘                    │  1  │ "b" │   2   │   0   │
//!                                  │  2  │ "c" │  NIL  │   1   │
//!                                  └─────┴─────┴───────┴───────┘
//!
//!   newest ─► [c] ─► [b] ─► [a] ◄─ oldest
//! ```
//!
//! The front is the newest (or most recently used) end; the back is the
//! oldest. Used by the FIFO, LIFO, LRU and MRU layers, which differ only in
//! which end they evict from and whether access reorders.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Position marking "no neighbor". Never a valid index into `links`.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Link<K> {
    key: K,
    newer: usize,
    older: usize,
}

#[derive(Debug)]
pub struct KeyList<K> {
    links: Vec<Link<K>>,
    index: FxHashMap<K, usize>,
    newest: usize,
    oldest: usize,
}

impl<K> KeyList<K>
where
    K: Clone + Eq + Hash,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            newest: NIL,
            oldest: NIL,
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Pushes `key` at the front. Returns `false` (and does nothing) if the key
    /// is already present.
    pub fn push_front(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let pos = self.links.len();
        self.links.push(Link {
            key: key.clone(),
            newer: NIL,
            older: NIL,
        });
        self.index.insert(key, pos);
        self.link_newest(pos);
        true
    }

    /// Moves `key` to the front. Returns `false` if the key is not present.
    pub fn move_to_front(&mut self, key: &K) -> bool {
        let Some(&pos) = self.index.get(key) else {
            return false;
        };
        if pos != self.newest {
            self.unlink(pos);
            self.link_newest(pos);
        }
        true
    }

    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(pos) => {
                self.take(pos);
                true
            },
            None => false,
        }
    }

    pub fn pop_front(&mut self) -> Option<K> {
        self.pop_at(self.newest)
    }

    pub fn pop_back(&mut self) -> Option<K> {
        self.pop_at(self.oldest)
    }

    pub fn front(&self) -> Option<&K> {
        self.links.get(self.newest).map(|link| &link.key)
    }

    pub fn back(&self) -> Option<&K> {
        self.links.get(self.oldest).map(|link| &link.key)
    }

    /// Iterates keys from front (newest) to back (oldest).
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            links: &self.links,
            next: self.newest,
        }
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.index.clear();
        self.newest = NIL;
        self.oldest = NIL;
    }

    fn pop_at(&mut self, pos: usize) -> Option<K> {
        if pos >= self.links.len() {
            return None;
        }
        let key = self.take(pos);
        self.index.remove(&key);
        Some(key)
    }

    /// Makes the detached link at `pos` the newest.
    fn link_newest(&mut self, pos: usize) {
        let previous = self.newest;
        let link = &mut self.links[pos];
        link.newer = NIL;
        link.older = previous;
        match self.links.get_mut(previous) {
            Some(old_front) => old_front.newer = pos,
            None => self.oldest = pos,
        }
        self.newest = pos;
    }

    /// Detaches `pos` from its neighbors; the link itself stays in place.
    fn unlink(&mut self, pos: usize) {
        let (newer, older) = (self.links[pos].newer, self.links[pos].older);
        match self.links.get_mut(newer) {
            Some(link) => link.older = older,
            None => self.newest = older,
        }
        match self.links.get_mut(older) {
            Some(link) => link.newer = newer,
            None => self.oldest = newer,
        }
    }

    /// Unlinks and drops the link at `pos`, returning its key. The caller owns
    /// the index entry of the removed key.
    fn take(&mut self, pos: usize) -> K {
        self.unlink(pos);
        let removed = self.links.swap_remove(pos);

        // the former last link now sits at `pos`
        if let Some(moved) = self.links.get(pos) {
            let (newer, older) = (moved.newer, moved.older);
            if let Some(slot) = self.index.get_mut(&moved.key) {
                *slot = pos;
            }
            match self.links.get_mut(newer) {
                Some(link) => link.older = pos,
                None => self.newest = pos,
            }
            match self.links.get_mut(older) {
                Some(link) => link.newer = pos,
                None => self.oldest = pos,
            }
        }
        removed.key
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.links.len(), self.index.len());

        let mut walked = 0usize;
        let mut newer = NIL;
        let mut current = self.newest;
        while let Some(link) = self.links.get(current) {
            assert_eq!(link.newer, newer, "broken newer link at {current}");
            assert_eq!(self.index.get(&link.key), Some(&current), "stale index");
            newer = current;
            current = link.older;
            walked += 1;
            assert!(walked <= self.links.len(), "cycle in key list");
        }

        assert_eq!(current, NIL);
        assert_eq!(self.oldest, newer);
        assert_eq!(walked, self.links.len());
    }
}

/// Iterator over keys from newest to oldest.
pub struct Iter<'a, K> {
    links: &'a [Link<K>],
    next: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.links.get(self.next)?;
        self.next = link.older;
        Some(&link.key)
    }
}

//! MaxHeap: array-backed max priority container.
//!
//! Entries are `(priority, value)` pairs kept in a `Vec` whose length is the
//! live count. The logical capacity grows by the configured resize factor
//! when the heap fills up. Priorities only need `PartialOrd`; pairs that do
//! not compare (NaN) are treated as "not greater" and stay where they are.

use crate::config::{HeapConfig, DEFAULT_HEAP_CAPACITY};
use crate::error::{Error, Result};
use crate::reentrancy::DebugReentrancy;
use log::debug;

#[inline]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

/// Move `entries[i]` toward the root while it beats its parent.
fn trickle_up<P: PartialOrd, V>(entries: &mut [(P, V)], mut i: usize) {
    while i > 0 {
        let p = parent(i);
        if entries[i].0 > entries[p].0 {
            entries.swap(i, p);
            i = p;
        } else {
            break;
        }
    }
}

/// Move `entries[i]` toward the leaves while its larger child beats it.
fn trickle_down<P: PartialOrd, V>(entries: &mut [(P, V)], mut i: usize) {
    let len = entries.len();
    loop {
        let left = 2 * i + 1;
        if left >= len {
            break;
        }
        let right = left + 1;
        let child = if right < len && entries[right].0 > entries[left].0 {
            right
        } else {
            left
        };
        if entries[child].0 > entries[i].0 {
            entries.swap(i, child);
            i = child;
        } else {
            break;
        }
    }
}

/// Bottom-up heap construction, O(n).
fn heapify_slice<P: PartialOrd, V>(entries: &mut [(P, V)]) {
    for i in (0..entries.len() / 2).rev() {
        trickle_down(entries, i);
    }
}

fn grown_capacity(capacity: usize, factor: f64) -> usize {
    ((capacity as f64 * factor) as usize).max(capacity + 1)
}

/// In-place heapsort. Returns `values` in ascending priority order; equal
/// priorities come out in no particular order.
pub fn heap_sort<P: PartialOrd, V>(mut values: Vec<(P, V)>) -> Vec<(P, V)> {
    heapify_slice(&mut values);
    for end in (1..values.len()).rev() {
        values.swap(0, end);
        trickle_down(&mut values[..end], 0);
    }
    values
}

#[derive(Clone, Debug)]
pub struct MaxHeap<P, V> {
    entries: Vec<(P, V)>,
    capacity: usize,
    config: HeapConfig,
    reentrancy: DebugReentrancy,
}

impl<P, V> MaxHeap<P, V>
where
    P: PartialOrd,
{
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HEAP_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(Vec::with_capacity(capacity), capacity, HeapConfig::default())
    }

    pub fn with_config(capacity: usize, config: HeapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(Vec::with_capacity(capacity), capacity, config))
    }

    /// Take ownership of arbitrary pairs and restore heap order over them.
    pub fn from_entries(entries: Vec<(P, V)>) -> Self {
        let capacity = entries.len();
        let mut heap = Self::build(entries, capacity, HeapConfig::default());
        heap.heapify();
        heap
    }

    fn build(entries: Vec<(P, V)>, capacity: usize, config: HeapConfig) -> Self {
        Self {
            entries,
            capacity,
            config,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots available before the next growth step.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    pub fn peek(&self) -> Option<(&P, &V)> {
        self.entries.first().map(|(p, v)| (p, v))
    }

    pub fn add(&mut self, priority: P, value: V) {
        let _g = self.reentrancy.enter();
        if self.entries.len() == self.capacity {
            let grown = grown_capacity(self.capacity, self.config.resize_factor);
            debug!("growing heap: {} -> {} slots", self.capacity, grown);
            self.entries.reserve_exact(grown - self.entries.len());
            self.capacity = grown;
        }
        self.entries.push((priority, value));
        let last = self.entries.len() - 1;
        trickle_up(&mut self.entries, last);
    }

    /// Extract the entry with the highest priority.
    pub fn remove(&mut self) -> Result<(P, V)> {
        let _g = self.reentrancy.enter();
        if self.entries.is_empty() {
            return Err(Error::EmptyHeap);
        }
        let top = self.entries.swap_remove(0);
        trickle_down(&mut self.entries, 0);
        Ok(top)
    }

    /// Extract the first entry (in array order) whose priority equals
    /// `priority`.
    ///
    /// The last entry fills the hole and is then repaired in whichever
    /// direction restores order: up if it beats its new parent, else down.
    pub fn remove_arbitrary(&mut self, priority: &P) -> Result<(P, V)> {
        let _g = self.reentrancy.enter();
        let i = self
            .entries
            .iter()
            .position(|(p, _)| p == priority)
            .ok_or(Error::ElementNotFound)?;
        let removed = self.entries.swap_remove(i);
        if i < self.entries.len() {
            if i > 0 && self.entries[i].0 > self.entries[parent(i)].0 {
                trickle_up(&mut self.entries, i);
            } else {
                trickle_down(&mut self.entries, i);
            }
        }
        Ok(removed)
    }

    /// Restore heap order after priorities were changed through `iter_mut`.
    pub fn heapify(&mut self) {
        let _g = self.reentrancy.enter();
        heapify_slice(&mut self.entries);
    }

    /// True when every parent's priority is at least each child's.
    pub fn is_heap(&self) -> bool {
        (1..self.entries.len()).all(|i| !(self.entries[i].0 > self.entries[parent(i)].0))
    }

    /// All entries in descending priority order; the heap itself is left
    /// untouched.
    pub fn sort(&self) -> Vec<(P, V)>
    where
        P: Clone,
        V: Clone,
    {
        let mut scratch = self.clone();
        let mut out = Vec::with_capacity(scratch.len());
        while let Ok(entry) = scratch.remove() {
            out.push(entry);
        }
        out
    }

    /// Entries in array order.
    pub fn iter(&self) -> impl Iterator<Item = (&P, &V)> {
        self.entries.iter().map(|(p, v)| (p, v))
    }

    /// Entries in array order with mutable priorities. Changing a priority
    /// can break heap order; call [`heapify`](Self::heapify) afterwards.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&mut P, &mut V)> {
        self.entries.iter_mut().map(|(p, v)| (p, v))
    }

    /// Backing entries in array order.
    pub fn into_vec(self) -> Vec<(P, V)> {
        self.entries
    }
}

impl<P, V> Default for MaxHeap<P, V>
where
    P: PartialOrd,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, V> FromIterator<(P, V)> for MaxHeap<P, V>
where
    P: PartialOrd,
{
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        Self::from_entries(iter.into_iter().collect())
    }
}

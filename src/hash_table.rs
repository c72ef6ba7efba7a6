//! HashTable: prime-sized open addressing with double hashing, tombstones,
//! and automatic grow/shrink inside a configurable load-factor window.
//!
//! Layers:
//! - `RawTable` owns the slot array and implements probing, placement and
//!   the resize policy. A resize builds a fresh `RawTable` with
//!   `auto_resize = false`, moves every live entry across and keeps its slots.
//! - `HashTable` is the public surface: it hashes keys up front (so an
//!   unhashable key fails before anything moves) and wraps each entry point
//!   in the debug reentrancy guard.

use crate::config::{TableConfig, DEFAULT_TABLE_SIZE};
use crate::error::{Error, Result};
use crate::key::{HashKey, KeyHashes};
use crate::prime::next_prime_usize;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt::{self, Display, Write as _};
use core::str::FromStr;
use log::{debug, trace};

#[derive(Clone, Debug)]
enum Slot<K, V> {
    /// Never used; terminates a probe.
    Empty,
    /// Previously occupied; probes continue past it.
    Tombstone,
    Occupied { key: K, value: V, hashes: KeyHashes },
}

impl<K, V> Slot<K, V> {
    fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }
}

/// Outcome of walking a key's probe sequence.
enum Probe {
    Hit(usize),
    /// First `Empty` slot on the sequence; where the key would go.
    Vacant(usize),
    /// Every slot probed without a hit or an `Empty` slot.
    Saturated,
}

#[derive(Clone, Debug)]
struct RawTable<K, V> {
    slots: Vec<Slot<K, V>>,
    count: usize,
    config: TableConfig,
    auto_resize: bool,
}

impl<K, V> RawTable<K, V> {
    fn with_len(requested: usize, config: TableConfig, auto_resize: bool) -> Self {
        let len = next_prime_usize(requested);
        Self {
            slots: (0..len).map(|_| Slot::Empty).collect(),
            count: 0,
            config,
            auto_resize,
        }
    }

    fn load_factor(&self) -> f64 {
        self.count as f64 / self.slots.len() as f64
    }

    fn probe<Q>(&self, hashes: KeyHashes, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let len = self.slots.len();
        let stride = hashes.stride(len);
        let mut i = hashes.home(len);
        for _ in 0..len {
            match &self.slots[i] {
                Slot::Empty => return Probe::Vacant(i),
                Slot::Occupied { key, hashes: h, .. }
                    if *h == hashes && <K as Borrow<Q>>::borrow(key) == q =>
                {
                    return Probe::Hit(i)
                }
                _ => {}
            }
            i = (i + stride) % len;
        }
        Probe::Saturated
    }

    fn hit<Q>(&self, hashes: KeyHashes, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        match self.probe(hashes, q) {
            Probe::Hit(i) => Some(i),
            _ => None,
        }
    }

    /// Slot for a key known to be absent. A table saturated with tombstones
    /// is rebuilt in place first; the rebuild always leaves an `Empty` slot.
    fn vacant_slot(&mut self, hashes: KeyHashes, key: &K) -> usize
    where
        K: Eq,
    {
        if let Probe::Vacant(i) = self.probe(hashes, key) {
            return i;
        }
        trace!(
            "probe saturated at {} slots ({} live); clearing tombstones",
            self.slots.len(),
            self.count
        );
        // `count` already includes the key being placed, so one slot is free.
        self.rebuild(self.slots.len());
        match self.probe(hashes, key) {
            Probe::Vacant(i) => i,
            _ => unreachable!("a freshly rebuilt table has a vacant slot for an absent key"),
        }
    }

    /// Insert or overwrite. A new key bumps `count` and resizes before its
    /// slot is chosen, since a resize replaces the slot array.
    fn put(&mut self, key: K, value: V, hashes: KeyHashes) -> Option<V>
    where
        K: Eq,
    {
        if let Some(i) = self.hit(hashes, &key) {
            if let Some((_, slot_value)) = self.slots[i].entry_mut() {
                return Some(core::mem::replace(slot_value, value));
            }
        }
        self.count += 1;
        if self.auto_resize {
            self.resize_if_needed();
        }
        let i = self.vacant_slot(hashes, &key);
        self.slots[i] = Slot::Occupied { key, value, hashes };
        None
    }

    /// Remove a key. `count` drops and the resize check runs while the entry
    /// is still live, so it travels with a rebuild and is found again after.
    fn remove<Q>(&mut self, hashes: KeyHashes, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.hit(hashes, q)?;
        self.count -= 1;
        if self.auto_resize && self.resize_if_needed() {
            trace!("remove relocated by resize to {} slots", self.slots.len());
        }
        let i = self
            .hit(hashes, q)
            .expect("live entry must survive a rebuild");
        match core::mem::replace(&mut self.slots[i], Slot::Tombstone) {
            Slot::Occupied { value, .. } => Some(value),
            _ => unreachable!("probe hit must land on an occupied slot"),
        }
    }

    fn resize_if_needed(&mut self) -> bool {
        let lf = self.load_factor();
        let target = if lf > self.config.max_load_factor {
            self.grown_len()
        } else if lf < self.config.min_load_factor {
            // Sized at the top of the window so the next removals stay put.
            (self.count as f64 / self.config.max_load_factor).ceil() as usize
        } else {
            return false;
        };
        let len = self.fit_window(target);
        self.rebuild(len);
        true
    }

    /// Next prime past `len * resize_factor`, stepping again in the rare
    /// case one step still leaves the table above `max_load_factor`.
    fn grown_len(&self) -> usize {
        let max = self.config.max_load_factor;
        let mut len = self.slots.len();
        loop {
            let scaled = (len as f64 * self.config.resize_factor).ceil() as usize;
            len = next_prime_usize(scaled.max(len + 1));
            if self.count as f64 <= max * len as f64 {
                return len;
            }
        }
    }

    /// Prime size for `count` entries, at least `count + 1` so the rebuild
    /// has room for the entry in flight. `target` is kept when its load
    /// factor lands in `[min, max]`; otherwise the tightest fit,
    /// `next_prime(ceil(count / max))`, is used. For a validated config
    /// the tightest fit is never below `min`.
    fn fit_window(&self, target: usize) -> usize {
        let floor = self.count + 1;
        let len = next_prime_usize(target.max(floor));
        if self.count == 0 || self.count as f64 / len as f64 >= self.config.min_load_factor {
            return len;
        }
        let tight = (self.count as f64 / self.config.max_load_factor).ceil() as usize;
        let fitted = next_prime_usize(tight.max(floor));
        trace!(
            "resize target {} slots under min load for {} entries; using {}",
            len,
            self.count,
            fitted
        );
        fitted
    }

    /// Move every live entry into a fresh non-resizing table of at least
    /// `requested` slots, dropping tombstones.
    fn rebuild(&mut self, requested: usize) {
        let live = self.slots.iter().filter(|s| s.is_occupied()).count();
        let mut fresh = RawTable::with_len(requested.max(live), self.config, false);
        debug!(
            "resizing hash table: {} -> {} slots ({} entries)",
            self.slots.len(),
            fresh.slots.len(),
            self.count
        );
        for slot in core::mem::take(&mut self.slots) {
            if let Slot::Occupied { key, value, hashes } = slot {
                fresh.place(key, value, hashes);
            }
        }
        self.slots = fresh.slots;
    }

    /// Place a key known to be unique without comparing keys.
    fn place(&mut self, key: K, value: V, hashes: KeyHashes) {
        debug_assert!(self.count < self.slots.len());
        let len = self.slots.len();
        let stride = hashes.stride(len);
        let mut i = hashes.home(len);
        while !matches!(self.slots[i], Slot::Empty) {
            i = (i + stride) % len;
        }
        self.slots[i] = Slot::Occupied { key, value, hashes };
        self.count += 1;
    }
}

/// Open-addressing hash table with double hashing and prime capacity.
///
/// Iteration order is physical slot order; it is unrelated to insertion
/// order and changes whenever the table resizes.
#[derive(Clone)]
pub struct HashTable<K, V> {
    raw: RawTable<K, V>,
    reentrancy: DebugReentrancy,
}

impl<K, V> HashTable<K, V>
where
    K: HashKey,
{
    /// Default sizing and load-factor window (`0.0..=0.5`, doubling).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TABLE_SIZE)
    }

    /// `size` is rounded up to the next prime.
    pub fn with_capacity(size: usize) -> Self {
        Self::from_raw(RawTable::with_len(size, TableConfig::default(), true))
    }

    pub fn with_config(size: usize, config: TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_raw(RawTable::with_len(size, config, true)))
    }

    fn from_raw(raw: RawTable<K, V>) -> Self {
        Self {
            raw,
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<K, V> Default for HashTable<K, V>
where
    K: HashKey,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> HashTable<K, V>
where
    K: HashKey,
{
    pub fn len(&self) -> usize {
        self.raw.count
    }

    pub fn is_empty(&self) -> bool {
        self.raw.count == 0
    }

    /// Number of slots; always prime.
    pub fn capacity(&self) -> usize {
        self.raw.slots.len()
    }

    pub fn config(&self) -> &TableConfig {
        &self.raw.config
    }

    /// `len() / capacity()`.
    pub fn load_factor(&self) -> f64 {
        self.raw.load_factor()
    }

    /// Insert or overwrite, returning the previous value for the key.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        let _g = self.reentrancy.enter();
        let hashes = key.key_hashes()?;
        Ok(self.raw.put(key, value, hashes))
    }

    pub fn get<Q>(&self, q: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + HashKey,
    {
        let _g = self.reentrancy.enter();
        let hashes = q.key_hashes()?;
        self.raw
            .hit(hashes, q)
            .and_then(|i| self.raw.slots[i].entry())
            .map(|(_, v)| v)
            .ok_or(Error::KeyNotFound)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + HashKey,
    {
        let _g = self.reentrancy.enter();
        let hashes = q.key_hashes()?;
        match self.raw.hit(hashes, q) {
            Some(i) => self.raw.slots[i]
                .entry_mut()
                .map(|(_, v)| v)
                .ok_or(Error::KeyNotFound),
            None => Err(Error::KeyNotFound),
        }
    }

    /// True iff the key is present. Keys that cannot be hashed are never
    /// present, since `put` rejects them.
    pub fn has_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + HashKey,
    {
        let _g = self.reentrancy.enter();
        match q.key_hashes() {
            Ok(hashes) => self.raw.hit(hashes, q).is_some(),
            Err(_) => false,
        }
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + HashKey,
    {
        self.has_key(q)
    }

    /// Remove a key, leaving a tombstone, and hand back its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + HashKey,
    {
        let _g = self.reentrancy.enter();
        let hashes = q.key_hashes()?;
        self.raw.remove(hashes, q).ok_or(Error::KeyNotFound)
    }

    /// Live entries in physical slot order. Each call starts a fresh pass.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.raw.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            slots: self.raw.slots.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// One `key,value` line per entry. Nothing is escaped: keys or values
    /// whose text contains `,` or a newline will not read back.
    pub fn export(&self) -> String
    where
        K: Display,
        V: Display,
    {
        let mut out = String::new();
        for (k, v) in self.iter() {
            writeln!(out, "{k},{v}").expect("writing to a String cannot fail");
        }
        out
    }

    /// Rebuild a table from `export` text. Blank lines are skipped and the
    /// first occurrence of a repeated key wins.
    pub fn read(text: &str) -> Result<Self>
    where
        K: FromStr,
        V: FromStr,
    {
        let records: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .map(|(i, l)| (i + 1, l))
            .collect();
        let mut table = Self::with_capacity(records.len());
        for (line, record) in records {
            let (k, v) = split_record(line, record)?;
            let key: K = k.parse().map_err(|_| Error::MalformedRecord {
                line,
                reason: "key does not parse",
            })?;
            let value: V = v.parse().map_err(|_| Error::MalformedRecord {
                line,
                reason: "value does not parse",
            })?;
            if !table.has_key(&key) {
                table.put(key, value)?;
            }
        }
        Ok(table)
    }
}

fn split_record(line: usize, record: &str) -> Result<(&str, &str)> {
    let mut parts = record.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(k), Some(v), None) => Ok((k, v)),
        (_, None, _) => Err(Error::MalformedRecord {
            line,
            reason: "missing ',' separator",
        }),
        _ => Err(Error::MalformedRecord {
            line,
            reason: "more than one ',' in record",
        }),
    }
}

impl<K, V> fmt::Debug for HashTable<K, V>
where
    K: HashKey + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over live entries of a `HashTable`.
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.slots.by_ref().find_map(Slot::entry)
    }
}

/// Iterator over live entries of a `HashTable` with mutable values.
pub struct IterMut<'a, K, V> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.slots.by_ref().find_map(Slot::entry_mut)
    }
}

impl<'a, K, V> IntoIterator for &'a HashTable<K, V>
where
    K: HashKey,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

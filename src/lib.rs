//! netsim-containers: the two containers behind the social-network
//! simulation, a prime-sized double-hashing `HashTable` and an
//! array-backed `MaxHeap`.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep each container's invariants small and local so the graph
//!   and ranking layers built on top can treat them as black boxes.
//! - Layers:
//!   - `prime`: smallest prime >= a requested size. Table lengths are
//!     always prime so every probe stride is coprime to the length.
//!   - `key`: `HashKey` trait plus the two hash functions (polynomial
//!     rolling for the home slot, FNV-1a style for the stride) over a
//!     key's byte encoding; `Scalar` for tables mixing strings and ints.
//!   - `HashTable<K, V>`: open addressing over `Empty | Tombstone |
//!     Occupied` slots, grow/shrink inside `[min, max]` load factor, flat
//!     `key,value` text export/import.
//!   - `MaxHeap<P, V>`: `(priority, value)` pairs in a `Vec`, iterative
//!     trickle up/down, arbitrary removal, heapify, sort and heapsort.
//!
//! Constraints
//! - Single-threaded. Containers are `Send` but not `Sync`; callers that
//!   share one across threads serialize access themselves.
//! - Every failure is a returned [`Error`]; a failed call leaves the
//!   container as it was.
//! - Hashes are non-cryptographic and deterministic (no per-process seed),
//!   so slot layout is reproducible across runs.
//!
//! Resize ordering
//! - `put` of a new key bumps the count and runs the resize check before
//!   choosing its slot; the slot array may have been replaced.
//! - `remove` bumps the count down and runs the resize check while the
//!   entry is still live, then probes again and tombstones the slot.
//! - A resize target whose load factor would land under `min` (a growth
//!   step overshooting a narrow window) is replaced by the tightest prime
//!   size for the current count. Validation keeps that size in the window.
//! - Rebuilds move entries into a fresh non-resizing table using the
//!   hashes cached in each slot; key hashing never runs during a rebuild.
//!
//! Reentrancy policy
//! - Public entry points hold a debug-only guard. Probing calls `K: Eq` and
//!   heap repair calls `P: PartialOrd`; re-entering the same container from
//!   those panics in debug builds and goes unchecked in release.
//!
//! Notes and non-goals
//! - No escaping in the text format: a `,` or newline inside a key or value
//!   does not survive `export`/`read`.
//! - Iteration order is physical slot order and changes on resize.
//! - Heap ties are not FIFO.

mod config;
mod error;
mod hash_table;
mod hash_table_proptest;
mod key;
mod max_heap;
mod max_heap_proptest;
mod prime;
mod reentrancy;

// Public surface
pub use config::{HeapConfig, TableConfig, DEFAULT_HEAP_CAPACITY, DEFAULT_TABLE_SIZE};
pub use error::{Error, Result};
pub use hash_table::{HashTable, Iter, IterMut};
pub use key::{primary_hash, step_hash, HashKey, KeyHashes, Scalar};
pub use max_heap::{heap_sort, MaxHeap};
pub use prime::{is_prime, next_prime};

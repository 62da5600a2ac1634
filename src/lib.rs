//! chain-table: a single-threaded, separately chained hash table over
//! fixed-width key and value blocks, with explicit copy, move and swap.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the type-erased core small and checkable, and put typing
//!   on top as a thin veneer.
//! - Layers:
//!   - ByteTable<S>: structural table. Keys and values are byte blocks of
//!     widths fixed at setup; hashing and equality come from a
//!     `KeyStrategy`.
//!   - TypedTable<K, V, S>: public typed API for `FixedBytes` keys and
//!     values; encodes to blocks and delegates every operation.
//!
//! Storage
//! - Buckets are chain heads (`Option<EntryKey>`); nodes live in a
//!   `SlotMap` arena and link to their successor by handle. Each node owns
//!   one boxed key block and one boxed value block.
//! - New keys are linked at the front of their chain.
//! - Rehash walks every old chain and relinks each node onto the front of
//!   its new chain. Handles change, payload blocks never move or copy.
//!
//! Growth policy
//! - Insert grows when `len == capacity`, to `len * GROWTH_FACTOR` buckets.
//! - Erase shrinks when `len == capacity / SHRINK_DIVISOR`, also to
//!   `len * GROWTH_FACTOR` buckets. Targets under `MINIMUM_CAPACITY` clamp
//!   to the floor, or do nothing if the table is already there.
//! - `threshold = capacity * LOAD_FACTOR` is advisory and only consulted
//!   by `reserve`, which resizes to `minimum / LOAD_FACTOR` buckets.
//!
//! Lifecycle
//! - `setup` allocates; `destroy` releases entries and buckets and leaves
//!   the table uninitialized, after which operations report
//!   `NotInitialized`. `Drop` frees whatever is left.
//! - `try_clone`/`copy_from` deep-copy into fresh storage. The destination
//!   is replaced only once the copy is complete.
//! - `take`/`move_from` transfer the whole state in O(1); the source is
//!   left live and empty at the floor capacity.
//! - `swap_with` exchanges two live tables in O(1).
//!
//! Failure model
//! - Every failure is returned as `TableError`; nothing is retried.
//! - Bucket arrays and payload blocks are allocated fallibly, before any
//!   counter or link changes, so a failed insert or resize leaves the
//!   table as it was.
//! - A missing key is an ordinary outcome (`Option`, `bool`,
//!   `EraseOutcome::NotFound`), not an error.
//!
//! Notes and non-goals
//! - Single-threaded and unsynchronized; share behind a lock if needed.
//! - Iteration order is unspecified.
//! - No persistence; `FixedBytes` encodings are native-endian.

pub mod byte_table;
mod byte_table_proptest;
pub mod error;
pub mod fixed_bytes;
pub mod strategy;
pub mod typed_table;

// Public surface
pub use byte_table::{
    ByteTable, EraseOutcome, InsertOutcome, GROWTH_FACTOR, LOAD_FACTOR, MINIMUM_CAPACITY,
    SHRINK_DIVISOR,
};
pub use error::{ArgumentError, Block, TableError};
pub use fixed_bytes::FixedBytes;
pub use strategy::{byte_hash, BuildHasherStrategy, ByteStrategy, FnStrategy, KeyStrategy};
pub use typed_table::TypedTable;

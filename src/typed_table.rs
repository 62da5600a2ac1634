//! TypedTable: a typed veneer over ByteTable for `FixedBytes` keys and values.
//!
//! Widths come from `K::WIDTH` and `V::WIDTH`, so width mismatches cannot
//! happen through this API. Growth, shrink and ownership semantics are the
//! byte table's.

use crate::byte_table::{ByteTable, EraseOutcome, InsertOutcome};
use crate::error::TableError;
use crate::fixed_bytes::FixedBytes;
use crate::strategy::{ByteStrategy, KeyStrategy};
use core::fmt;
use core::marker::PhantomData;

pub struct TypedTable<K, V, S = ByteStrategy> {
    raw: ByteTable<S>,
    _pd: PhantomData<fn(K) -> V>,
}

impl<K: FixedBytes, V: FixedBytes> TypedTable<K, V> {
    pub fn new() -> Result<Self, TableError> {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::with_strategy(capacity, ByteStrategy)
    }
}

impl<K, V, S> TypedTable<K, V, S>
where
    K: FixedBytes,
    V: FixedBytes,
    S: KeyStrategy,
{
    pub fn with_strategy(capacity: usize, strategy: S) -> Result<Self, TableError> {
        Ok(Self {
            raw: ByteTable::setup_with_strategy(K::WIDTH, V::WIDTH, capacity, strategy)?,
            _pd: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn is_initialized(&self) -> bool {
        self.raw.is_initialized()
    }

    /// The underlying byte table.
    pub fn as_bytes(&self) -> &ByteTable<S> {
        &self.raw
    }

    pub fn insert(&mut self, key: K, value: V) -> Result<InsertOutcome, TableError> {
        let raw = &mut self.raw;
        key.with_bytes(|k| value.with_bytes(|v| raw.insert(k, v)))
    }

    /// Copy of the value stored under `key`.
    pub fn get(&self, key: &K) -> Result<Option<V>, TableError> {
        let found = key.with_bytes(|k| self.raw.lookup(k))?;
        Ok(found.map(V::from_bytes))
    }

    /// Apply `f` to the stored value in place. Returns `false` when the key is absent.
    pub fn update<F>(&mut self, key: &K, f: F) -> Result<bool, TableError>
    where
        F: FnOnce(&mut V),
    {
        let raw = &mut self.raw;
        key.with_bytes(|k| match raw.lookup_mut(k)? {
            Some(block) => {
                let mut value = V::from_bytes(block);
                f(&mut value);
                value.with_bytes(|b| block.copy_from_slice(b));
                Ok(true)
            }
            None => Ok(false),
        })
    }

    pub fn contains_key(&self, key: &K) -> Result<bool, TableError> {
        key.with_bytes(|k| self.raw.contains(k))
    }

    pub fn remove(&mut self, key: &K) -> Result<EraseOutcome, TableError> {
        let raw = &mut self.raw;
        key.with_bytes(|k| raw.erase(k))
    }

    pub fn reserve(&mut self, minimum_capacity: usize) -> Result<(), TableError> {
        self.raw.reserve(minimum_capacity)
    }

    pub fn clear(&mut self) -> Result<(), TableError> {
        self.raw.clear()
    }

    pub fn destroy(&mut self) -> Result<(), TableError> {
        self.raw.destroy()
    }

    pub fn swap_with(&mut self, other: &mut Self) -> Result<(), TableError> {
        self.raw.swap_with(&mut other.raw)
    }

    /// Unordered iteration over decoded entries.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.raw
            .iter()
            .map(|(k, v)| (K::from_bytes(k), V::from_bytes(v)))
    }
}

impl<K, V, S> TypedTable<K, V, S>
where
    K: FixedBytes,
    V: FixedBytes,
    S: KeyStrategy + Clone,
{
    pub fn try_clone(&self) -> Result<Self, TableError> {
        Ok(Self {
            raw: self.raw.try_clone()?,
            _pd: PhantomData,
        })
    }

    /// Move the contents out, leaving `self` live and empty.
    pub fn take(&mut self) -> Result<Self, TableError> {
        Ok(Self {
            raw: self.raw.take()?,
            _pd: PhantomData,
        })
    }

    pub fn move_from(&mut self, source: &mut Self) -> Result<(), TableError> {
        self.raw.move_from(&mut source.raw)
    }
}

impl<K, V, S> fmt::Debug for TypedTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedTable").field("raw", &self.raw).finish()
    }
}

//! ByteTable: separately chained hash table over fixed-width byte blocks.
//!
//! Buckets hold the handle of their chain head; chain nodes live in a
//! generational slot arena and link to each other by handle. Rehashing
//! rewrites handles only, payload blocks never move.

use crate::error::{ArgumentError, Block, TableError};
use crate::strategy::{ByteStrategy, KeyStrategy};
use core::fmt;
use slotmap::{new_key_type, SlotMap};

/// Smallest bucket count a live table ever has.
pub const MINIMUM_CAPACITY: usize = 8;
/// `threshold = capacity * LOAD_FACTOR`; consulted by [`ByteTable::reserve`].
pub const LOAD_FACTOR: usize = 5;
/// Resize target is `len * GROWTH_FACTOR`, for growth and shrink alike.
pub const GROWTH_FACTOR: usize = 2;
/// Erase shrinks once `len == capacity / SHRINK_DIVISOR`.
pub const SHRINK_DIVISOR: usize = 4;

new_key_type! {
    /// Arena handle of one chain node.
    struct EntryKey;
}

#[derive(Debug)]
struct Node {
    key: Box<[u8]>,
    value: Box<[u8]>,
    next: Option<EntryKey>,
}

/// Result of [`ByteTable::insert`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertOutcome {
    /// A new entry was created.
    Inserted,
    /// The key was present; its value was overwritten in place.
    Updated,
}

/// Result of [`ByteTable::erase`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EraseOutcome {
    /// The entry was unlinked and freed.
    Erased,
    /// No entry matched the key.
    NotFound,
}

/// Separately chained hash table over `key_size`-byte keys and
/// `value_size`-byte values, hashed and compared through `S`.
pub struct ByteTable<S = ByteStrategy> {
    key_size: usize,
    value_size: usize,
    threshold: usize,
    strategy: S,
    // Chain heads. Empty once destroyed; at least MINIMUM_CAPACITY long otherwise.
    buckets: Vec<Option<EntryKey>>,
    entries: SlotMap<EntryKey, Node>,
}

#[inline]
fn slot_for(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

fn allocate_buckets(capacity: usize) -> Result<Vec<Option<EntryKey>>, TableError> {
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(capacity)?;
    buckets.resize(capacity, None);
    Ok(buckets)
}

fn copy_block(bytes: &[u8]) -> Result<Box<[u8]>, TableError> {
    let mut block = Vec::new();
    block.try_reserve_exact(bytes.len())?;
    block.extend_from_slice(bytes);
    Ok(block.into_boxed_slice())
}

impl ByteTable {
    /// Set up a table storing `key_size`-byte keys and `value_size`-byte
    /// values with at least `capacity` buckets, using [`ByteStrategy`].
    pub fn setup(key_size: usize, value_size: usize, capacity: usize) -> Result<Self, TableError> {
        Self::setup_with_strategy(key_size, value_size, capacity, ByteStrategy)
    }
}

impl<S: KeyStrategy> ByteTable<S> {
    /// Like [`setup`](ByteTable::setup), with a caller-supplied strategy.
    pub fn setup_with_strategy(
        key_size: usize,
        value_size: usize,
        capacity: usize,
        strategy: S,
    ) -> Result<Self, TableError> {
        if key_size == 0 {
            return Err(ArgumentError::ZeroWidth { block: Block::Key }.into());
        }
        if value_size == 0 {
            return Err(ArgumentError::ZeroWidth {
                block: Block::Value,
            }
            .into());
        }
        let capacity = capacity.max(MINIMUM_CAPACITY);
        Ok(Self {
            key_size,
            value_size,
            threshold: capacity.saturating_mul(LOAD_FACTOR),
            strategy,
            buckets: allocate_buckets(capacity)?,
            entries: SlotMap::with_key(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of buckets; zero once destroyed.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// `capacity * LOAD_FACTOR`; zero once destroyed.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// True until [`destroy`](Self::destroy) releases the bucket array.
    pub fn is_initialized(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Insert or overwrite. Grows first when `len == capacity`, even if the
    /// key turns out to be present.
    ///
    /// New entries are linked at the front of their chain. On failure the
    /// table is unchanged apart from a growth that already completed.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<InsertOutcome, TableError> {
        self.check_live()?;
        self.check_width(Block::Key, key)?;
        self.check_width(Block::Value, value)?;

        if self.should_grow() {
            log::trace!("grow triggered at {} entries", self.len());
            self.adjust_capacity()?;
        }

        let index = self.bucket_of(key);
        if let Some(found) = self.find_in_chain(index, key) {
            self.entries[found].value.copy_from_slice(value);
            return Ok(InsertOutcome::Updated);
        }

        self.push_front(index, key, value)?;
        Ok(InsertOutcome::Inserted)
    }

    pub fn contains(&self, key: &[u8]) -> Result<bool, TableError> {
        Ok(self.locate(key)?.is_some())
    }

    /// Shared view of the value stored under `key`.
    pub fn lookup(&self, key: &[u8]) -> Result<Option<&[u8]>, TableError> {
        Ok(self.locate(key)?.map(|k| &*self.entries[k].value))
    }

    /// Mutable view of the value stored under `key`. Writes go straight
    /// into the table's own copy.
    pub fn lookup_mut(&mut self, key: &[u8]) -> Result<Option<&mut [u8]>, TableError> {
        match self.locate(key)? {
            Some(k) => Ok(Some(&mut *self.entries[k].value)),
            None => Ok(None),
        }
    }

    /// Unlink and free the entry for `key`, then shrink if the table fell to
    /// a quarter of its capacity.
    ///
    /// A shrink that fails to allocate returns `Allocation`; the entry is
    /// already gone at that point and the table keeps its old bucket array.
    pub fn erase(&mut self, key: &[u8]) -> Result<EraseOutcome, TableError> {
        self.check_live()?;
        self.check_width(Block::Key, key)?;

        let index = self.bucket_of(key);
        let mut previous: Option<EntryKey> = None;
        let mut cursor = self.buckets[index];
        while let Some(current) = cursor {
            let node = &self.entries[current];
            let next = node.next;
            if self.strategy.equal(key, &node.key) {
                match previous {
                    Some(p) => self.entries[p].next = next,
                    None => self.buckets[index] = next,
                }
                self.entries.remove(current);

                if self.should_shrink() {
                    log::trace!(
                        "shrink triggered at {} entries, {} buckets",
                        self.len(),
                        self.capacity()
                    );
                    self.adjust_capacity()?;
                }
                return Ok(EraseOutcome::Erased);
            }
            previous = Some(current);
            cursor = next;
        }
        Ok(EraseOutcome::NotFound)
    }

    /// Pre-grow for a known bulk insert. When `minimum_capacity` exceeds the
    /// threshold the table is resized to `minimum_capacity / LOAD_FACTOR`
    /// buckets; otherwise nothing happens.
    pub fn reserve(&mut self, minimum_capacity: usize) -> Result<(), TableError> {
        self.check_live()?;
        if minimum_capacity > self.threshold {
            log::trace!(
                "reserve {} over threshold {}",
                minimum_capacity,
                self.threshold
            );
            return self.resize(minimum_capacity / LOAD_FACTOR);
        }
        Ok(())
    }

    /// Remove every entry and reset to [`MINIMUM_CAPACITY`] buckets.
    pub fn clear(&mut self) -> Result<(), TableError> {
        self.check_live()?;
        let buckets = allocate_buckets(MINIMUM_CAPACITY)?;
        log::debug!("clearing {} entries", self.len());
        self.entries = SlotMap::with_key();
        self.buckets = buckets;
        self.threshold = MINIMUM_CAPACITY * LOAD_FACTOR;
        Ok(())
    }

    /// Free every entry and the bucket array. Afterwards every operation
    /// except the accessors reports `NotInitialized`, including a second
    /// `destroy`.
    pub fn destroy(&mut self) -> Result<(), TableError> {
        self.check_live()?;
        log::debug!(
            "destroying table with {} entries, {} buckets",
            self.len(),
            self.capacity()
        );
        self.entries = SlotMap::with_key();
        self.buckets = Vec::new();
        self.threshold = 0;
        Ok(())
    }

    /// Exchange the complete state of two live tables. O(1), no allocation.
    pub fn swap_with(&mut self, other: &mut Self) -> Result<(), TableError> {
        self.check_live()?;
        other.check_live()?;
        core::mem::swap(self, other);
        Ok(())
    }

    /// Unordered iteration over `(key, value)` blocks.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            it: self.entries.values(),
        }
    }

    /// Unordered iteration with writable values.
    pub fn iter_mut(&mut self) -> IterMut<'_> {
        IterMut {
            it: self.entries.values_mut(),
        }
    }

    fn check_live(&self) -> Result<(), TableError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(TableError::NotInitialized)
        }
    }

    fn check_width(&self, block: Block, bytes: &[u8]) -> Result<(), TableError> {
        let expected = match block {
            Block::Key => self.key_size,
            Block::Value => self.value_size,
        };
        if bytes.len() != expected {
            return Err(ArgumentError::WidthMismatch {
                block,
                expected,
                got: bytes.len(),
            }
            .into());
        }
        Ok(())
    }

    #[inline]
    fn bucket_of(&self, key: &[u8]) -> usize {
        slot_for(self.strategy.hash(key), self.capacity())
    }

    fn locate(&self, key: &[u8]) -> Result<Option<EntryKey>, TableError> {
        self.check_live()?;
        self.check_width(Block::Key, key)?;
        Ok(self.find_in_chain(self.bucket_of(key), key))
    }

    fn find_in_chain(&self, index: usize, key: &[u8]) -> Option<EntryKey> {
        let mut cursor = self.buckets[index];
        while let Some(current) = cursor {
            let node = &self.entries[current];
            if self.strategy.equal(key, &node.key) {
                return Some(current);
            }
            cursor = node.next;
        }
        None
    }

    // Both payload copies are made before the arena or the chain is touched.
    fn push_front(&mut self, index: usize, key: &[u8], value: &[u8]) -> Result<(), TableError> {
        let node = Node {
            key: copy_block(key)?,
            value: copy_block(value)?,
            next: self.buckets[index],
        };
        let handle = self.entries.insert(node);
        self.buckets[index] = Some(handle);
        Ok(())
    }

    fn should_grow(&self) -> bool {
        debug_assert!(self.len() <= self.capacity());
        self.len() == self.capacity()
    }

    fn should_shrink(&self) -> bool {
        debug_assert!(self.len() <= self.capacity());
        self.len() == self.capacity() / SHRINK_DIVISOR
    }

    // Shrink reuses the growth target: len * GROWTH_FACTOR.
    fn adjust_capacity(&mut self) -> Result<(), TableError> {
        self.resize(self.len().saturating_mul(GROWTH_FACTOR))
    }

    fn resize(&mut self, new_capacity: usize) -> Result<(), TableError> {
        let new_capacity = if new_capacity >= MINIMUM_CAPACITY {
            new_capacity
        } else if self.capacity() > MINIMUM_CAPACITY {
            MINIMUM_CAPACITY
        } else {
            return Ok(());
        };

        let fresh = allocate_buckets(new_capacity)?;
        let old = core::mem::replace(&mut self.buckets, fresh);
        self.threshold = new_capacity.saturating_mul(LOAD_FACTOR);
        self.rehash(old);

        log::debug!(
            "resized {} entries into {} buckets",
            self.len(),
            new_capacity
        );
        Ok(())
    }

    // Relink every node of `old` onto the front of its chain in the current array.
    fn rehash(&mut self, old: Vec<Option<EntryKey>>) {
        let capacity = self.capacity();
        for head in old {
            let mut cursor = head;
            while let Some(current) = cursor {
                let node = &mut self.entries[current];
                cursor = node.next;
                let index = slot_for(self.strategy.hash(&node.key), capacity);
                node.next = self.buckets[index];
                self.buckets[index] = Some(current);
            }
        }
    }
}

impl<S: KeyStrategy + Clone> ByteTable<S> {
    /// Deep copy: fresh bucket array of the same capacity, fresh payload
    /// blocks for every entry, same widths and strategy.
    pub fn try_clone(&self) -> Result<Self, TableError> {
        self.check_live()?;
        let mut copy = Self {
            key_size: self.key_size,
            value_size: self.value_size,
            threshold: self.threshold,
            strategy: self.strategy.clone(),
            buckets: allocate_buckets(self.capacity())?,
            entries: SlotMap::with_capacity_and_key(self.len()),
        };
        for (index, head) in self.buckets.iter().enumerate() {
            let mut cursor = *head;
            while let Some(current) = cursor {
                let node = &self.entries[current];
                copy.push_front(index, &node.key, &node.value)?;
                cursor = node.next;
            }
        }
        Ok(copy)
    }

    /// Replace `self` with a deep copy of `source`. A failed copy leaves
    /// `self` untouched.
    pub fn copy_from(&mut self, source: &Self) -> Result<(), TableError> {
        *self = source.try_clone()?;
        Ok(())
    }

    /// Move the whole state out, leaving `self` live and empty with
    /// [`MINIMUM_CAPACITY`] buckets and the same widths and strategy.
    ///
    /// The replacement bucket array is allocated first, so this can also
    /// fail with `Allocation`; `self` is untouched in that case.
    pub fn take(&mut self) -> Result<Self, TableError> {
        self.check_live()?;
        let emptied = Self {
            key_size: self.key_size,
            value_size: self.value_size,
            threshold: MINIMUM_CAPACITY * LOAD_FACTOR,
            strategy: self.strategy.clone(),
            buckets: allocate_buckets(MINIMUM_CAPACITY)?,
            entries: SlotMap::with_key(),
        };
        Ok(core::mem::replace(self, emptied))
    }

    /// Take over `source`'s state; `source` is left live and empty.
    ///
    /// Fails with `NotInitialized` if `source` is destroyed, or with
    /// `Allocation` if its replacement bucket array cannot be allocated.
    /// Both tables are unchanged on failure.
    pub fn move_from(&mut self, source: &mut Self) -> Result<(), TableError> {
        *self = source.take()?;
        Ok(())
    }
}

impl<S> fmt::Debug for ByteTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteTable")
            .field("key_size", &self.key_size)
            .field("value_size", &self.value_size)
            .field("len", &self.entries.len())
            .field("capacity", &self.buckets.len())
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// Iterator over `(key, value)` blocks of a [`ByteTable`].
pub struct Iter<'a> {
    it: slotmap::basic::Values<'a, EntryKey, Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|n| (&*n.key, &*n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over `(key, value)` blocks with writable values.
pub struct IterMut<'a> {
    it: slotmap::basic::ValuesMut<'a, EntryKey, Node>,
}

impl<'a> Iterator for IterMut<'a> {
    type Item = (&'a [u8], &'a mut [u8]);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|n| (&*n.key, &mut *n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hasher;
use core::iter::FusedIterator;

use crate::error::TableError;
use crate::fnv::FnvBuildHasher;

/// Capacity of a freshly created table, and the smallest capacity any table
/// ever has.
pub const INITIAL_CAPACITY: usize = 8;

/// Returns `true` when `occupied` slots (live entries plus tombstones) would
/// push a table of `capacity` slots past the 0.7 load factor.
#[inline(always)]
fn exceeds_load_factor(occupied: usize, capacity: usize) -> bool {
    occupied as u128 * 10 > capacity as u128 * 7
}

/// Smallest power-of-two capacity, at least [`INITIAL_CAPACITY`], that holds
/// `entries` live entries without growing.
///
/// Saturates to `usize::MAX` on overflow so the following reservation
/// reports `CapacityOverflow`.
fn capacity_for(entries: usize) -> usize {
    let mut capacity = INITIAL_CAPACITY;
    while exceeds_load_factor(entries, capacity) {
        match capacity.checked_mul(2) {
            Some(doubled) => capacity = doubled,
            None => return usize::MAX,
        }
    }
    capacity
}

fn alloc_slots<V>(capacity: usize) -> Result<Vec<Slot<V>>, TryReserveError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity)?;
    slots.resize_with(capacity, || Slot::Empty);
    Ok(slots)
}

/// One element of the slot array.
#[derive(Clone)]
pub(crate) enum Slot<V> {
    /// Never used since the last growth or clear. Terminates every probe.
    Empty,
    /// Held an entry that has since been removed. Probes continue past it.
    Tombstone,
    Occupied {
        hash: u64,
        key: Box<str>,
        value: V,
    },
}

/// A string-keyed hash table using open addressing with linear probing and
/// tombstones.
///
/// Every operation hashes the key, then scans slots one at a time starting at
/// `hash mod capacity`, wrapping at the end of the array. Removal leaves a
/// tombstone behind so that keys placed further along the same probe sequence
/// stay reachable.
///
/// ## Ownership
///
/// Keys and values are treated asymmetrically:
///
/// - **Keys** are owned. [`insert`](Self::insert) accepts anything convertible
///   into a `Box<str>`; a borrowed `&str` is copied so the caller keeps their
///   buffer, an owned `String` is moved in.
/// - **Values** are handles the table never owns. `V` must be [`Copy`], and
///   `Copy` types cannot implement `Drop`, so the table has no way to release
///   a value. Overwritten and removed values are handed back to the caller.
///   Use `Option<&T>` to store "null" values: [`get`](Self::get) then
///   returns `Some(None)` for a stored null and `None` for a missing key.
///
/// ## Growth and tombstones
///
/// The capacity is always a power of two, at least [`INITIAL_CAPACITY`].
/// Before every insert, if `len + deleted + 1` would exceed 70% of the
/// capacity, the table doubles and re-places every live entry, dropping all
/// tombstones. Reusing a tombstone on insert does not decrement the tombstone
/// counter; only growth resets it. A workload that repeatedly inserts and
/// removes keys therefore keeps growing the table even when it holds few live
/// entries.
///
/// ## Concurrency
///
/// There is no internal synchronization. Mutation requires `&mut self`; wrap
/// the table in a `Mutex` to share it between threads.
///
/// ## Example
///
/// ```rust
/// use probe_table::ProbingTable;
///
/// struct User {
///     id: u32,
/// }
///
/// let alice = User { id: 1 };
/// let mut table: ProbingTable<&User> = ProbingTable::new();
///
/// assert_eq!(table.insert("alice", &alice).unwrap().map(|u| u.id), None);
/// assert_eq!(table.get("alice").map(|u| u.id), Some(1));
/// assert_eq!(table.size(), 1);
///
/// assert!(table.remove("alice").is_some());
/// assert!(table.get("alice").is_none());
/// ```
#[derive(Clone)]
pub struct ProbingTable<V, S = FnvBuildHasher> {
    pub(crate) slots: Vec<Slot<V>>,
    pub(crate) len: usize,
    pub(crate) deleted: usize,
    hash_builder: S,
}

impl<V, S> Debug for ProbingTable<V, S>
where
    V: Copy + Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V, S> Default for ProbingTable<V, S>
where
    V: Copy,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<V> ProbingTable<V, FnvBuildHasher>
where
    V: Copy,
{
    /// Creates an empty table with capacity [`INITIAL_CAPACITY`], hashing
    /// keys with FNV-1a.
    ///
    /// # Panics
    ///
    /// Panics if the slot array cannot be allocated. Use
    /// [`try_new`](Self::try_new) to handle that case.
    pub fn new() -> Self {
        Self::with_hasher(FnvBuildHasher)
    }

    /// Creates an empty table, reporting allocation failure instead of
    /// panicking.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_table::ProbingTable;
    ///
    /// let table = ProbingTable::<u32>::try_new().expect("eight slots");
    /// assert_eq!(table.capacity(), 8);
    /// assert!(table.is_empty());
    /// ```
    pub fn try_new() -> Result<Self, TableError> {
        Self::try_with_hasher(FnvBuildHasher)
    }

    /// Creates an empty table that can hold `capacity` entries before it has
    /// to grow.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_table::ProbingTable;
    ///
    /// let table: ProbingTable<u32> = ProbingTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 256);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FnvBuildHasher)
    }
}

impl<V, S> ProbingTable<V, S>
where
    V: Copy,
    S: BuildHasher,
{
    /// Creates an empty table that hashes keys with `hash_builder`.
    ///
    /// Key bytes are fed to the hasher through [`Hasher::write`] in one call,
    /// so any `BuildHasher` works, including seeded ones that resist
    /// collision attacks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_table::ProbingTable;
    /// use probe_table::RandomState;
    ///
    /// let mut table = ProbingTable::with_hasher(RandomState::default());
    /// table.insert("key", 7u8).unwrap();
    /// assert_eq!(table.get("key"), Some(7));
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Fallible form of [`with_hasher`](Self::with_hasher).
    pub fn try_with_hasher(hash_builder: S) -> Result<Self, TableError> {
        Self::try_with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty table that can hold `capacity` entries before growing,
    /// hashing keys with `hash_builder`.
    ///
    /// # Panics
    ///
    /// Panics if the slot array cannot be allocated.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        match Self::try_with_capacity_and_hasher(capacity, hash_builder) {
            Ok(table) => table,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible form of
    /// [`with_capacity_and_hasher`](Self::with_capacity_and_hasher).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_table::ProbingTable;
    /// use probe_table::TableError;
    /// use probe_table::fnv::FnvBuildHasher;
    ///
    /// let result = ProbingTable::<u64>::try_with_capacity_and_hasher(usize::MAX, FnvBuildHasher);
    /// assert!(matches!(result, Err(TableError::AllocationFailure(_))));
    /// ```
    pub fn try_with_capacity_and_hasher(
        capacity: usize,
        hash_builder: S,
    ) -> Result<Self, TableError> {
        Ok(Self {
            slots: alloc_slots(capacity_for(capacity))?,
            len: 0,
            deleted: 0,
            hash_builder,
        })
    }

    /// Returns the number of live entries. Tombstones are not counted.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Same as [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots in the table. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the tombstone counter that, together with [`len`](Self::len),
    /// drives growth.
    ///
    /// The counter goes up on every removal and is reset only when the table
    /// grows or is cleared. Inserting into a tombstone slot does not lower it,
    /// so it can exceed the number of tombstones actually present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_table::ProbingTable;
    ///
    /// let mut table = ProbingTable::new();
    /// table.insert("a", 1).unwrap();
    /// table.remove("a");
    /// table.insert("a", 2).unwrap();
    ///
    /// assert_eq!(table.len(), 1);
    /// assert_eq!(table.deleted(), 1);
    /// ```
    pub fn deleted(&self) -> usize {
        self.deleted
    }

    /// Removes every entry, keeping the current capacity. Tombstones are
    /// cleared as well.
    pub fn clear(&mut self) {
        self.slots.fill_with(|| Slot::Empty);
        self.len = 0;
        self.deleted = 0;
    }

    /// Returns an iterator over `(key, value)` pairs in slot order.
    ///
    /// The order is unspecified and changes whenever the table grows.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.len,
        }
    }

    fn make_hash(&self, key: &str) -> u64 {
        let mut hasher = self.hash_builder.build_hasher();
        hasher.write(key.as_bytes());
        hasher.finish()
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    /// Probes for `key`, returning the index of its occupied slot.
    fn find_index(&self, key: &str) -> Option<usize> {
        let hash = self.make_hash(key);
        let mask = self.mask();
        let mut index = hash as usize & mask;

        loop {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied {
                    hash: stored,
                    key: stored_key,
                    ..
                } if *stored == hash && **stored_key == *key => return Some(index),
                Slot::Occupied { .. } | Slot::Tombstone => {}
            }
            index = (index + 1) & mask;
        }
    }

    /// Inserts `value` under `key`.
    ///
    /// Returns `Ok(None)` when the key was not present, or `Ok(Some(previous))`
    /// when an existing entry was updated in place; the previous value is
    /// handed back untouched.
    ///
    /// If the insert would push the table past its load factor, the table
    /// doubles first. Failure to allocate the larger slot array returns
    /// [`TableError::AllocationFailure`] and leaves the table unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_table::ProbingTable;
    ///
    /// let mut table = ProbingTable::new();
    /// let key = String::from("user1");
    ///
    /// assert_eq!(table.insert(key.as_str(), 1u32).unwrap(), None);
    /// assert_eq!(table.insert(key, 2).unwrap(), Some(1));
    /// assert_eq!(table.get("user1"), Some(2));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(
        &mut self,
        key: impl Into<Box<str>>,
        value: V,
    ) -> Result<Option<V>, TableError> {
        if exceeds_load_factor(self.len + self.deleted + 1, self.slots.len()) {
            self.grow()?;
        }

        let key = key.into();
        let hash = self.make_hash(&key);
        let mask = self.mask();
        let mut index = hash as usize & mask;
        let mut first_tombstone = None;

        // The key may live past a tombstone, so keep scanning to an empty slot
        // before reusing the first tombstone seen.
        loop {
            match &mut self.slots[index] {
                Slot::Empty => break,
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
                Slot::Occupied {
                    hash: stored,
                    key: stored_key,
                    value: stored_value,
                } if *stored == hash && **stored_key == *key => {
                    return Ok(Some(core::mem::replace(stored_value, value)));
                }
                Slot::Occupied { .. } => {}
            }
            index = (index + 1) & mask;
        }

        let target = first_tombstone.unwrap_or(index);
        self.slots[target] = Slot::Occupied { hash, key, value };
        self.len += 1;

        debug_assert!(self.len + self.deleted <= self.slots.len());
        Ok(None)
    }

    /// Returns the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_table::ProbingTable;
    ///
    /// let mut table: ProbingTable<Option<&str>> = ProbingTable::new();
    /// table.insert("null_value", None).unwrap();
    ///
    /// // A stored null is distinct from a missing key.
    /// assert_eq!(table.get("null_value"), Some(None));
    /// assert_eq!(table.get("nonexistent"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<V> {
        let index = self.find_index(key)?;
        let Slot::Occupied { value, .. } = self.slots[index] else {
            unreachable!("probe matched a slot that is not occupied");
        };
        Some(value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.find_index(key).is_some()
    }

    /// Removes `key`, returning its value, or `None` if the key is absent.
    ///
    /// The owned key is dropped and its slot becomes a tombstone.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_table::ProbingTable;
    ///
    /// let mut table = ProbingTable::new();
    /// table.insert("a", 1).unwrap();
    ///
    /// assert_eq!(table.remove("a"), Some(1));
    /// assert_eq!(table.remove("a"), None);
    /// assert_eq!(table.deleted(), 1);
    /// ```
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.find_index(key)?;
        let Slot::Occupied { value, .. } =
            core::mem::replace(&mut self.slots[index], Slot::Tombstone)
        else {
            unreachable!("probe matched a slot that is not occupied");
        };
        self.len -= 1;
        self.deleted += 1;
        Some(value)
    }

    /// Doubles the slot array and re-places every live entry by its stored
    /// hash. Tombstones are dropped.
    ///
    /// The new array is fully allocated before the old one is touched, so a
    /// failed allocation leaves the table as it was.
    fn grow(&mut self) -> Result<(), TableError> {
        let new_capacity = self.slots.len().checked_mul(2).unwrap_or(usize::MAX);
        let mut slots = alloc_slots(new_capacity)?;
        let mask = new_capacity - 1;

        for slot in core::mem::take(&mut self.slots) {
            if let Slot::Occupied { hash, .. } = slot {
                let mut index = hash as usize & mask;
                while !matches!(slots[index], Slot::Empty) {
                    index = (index + 1) & mask;
                }
                slots[index] = slot;
            }
        }

        self.slots = slots;
        self.deleted = 0;
        Ok(())
    }
}

impl<'a, V, S> IntoIterator for &'a ProbingTable<V, S>
where
    V: Copy,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, V>;
    type Item = (&'a str, V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`ProbingTable`], created by
/// [`ProbingTable::iter`].
#[derive(Clone)]
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V>
where
    V: Copy,
{
    type Item = (&'a str, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied { key, value, .. } = slot {
                self.remaining -= 1;
                return Some((&**key, *value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> where V: Copy {}

impl<V> FusedIterator for Iter<'_, V> where V: Copy {}

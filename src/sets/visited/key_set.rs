use crate::{
    alloc::{AllocError, AllocPolicy},
    sets::visited::VisitorSet,
};

/// Number of slots a [`KeySet`] starts with when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 64;

const EMPTY: u64 = 0;

/// Open-addressing set of `u64` keys with linear probing.
///
/// A key is stored as `key + 1` in slot `key % capacity` (or the next free slot
/// after it, wrapping around), so a zero slot always means "empty". The table
/// doubles before an insert would push the load factor to one half, which
/// guarantees every probe sequence ends on an empty slot. Keys cannot be
/// removed; rebuild the set instead.
///
/// `u64::MAX` has no stored form and is tracked separately.
///
/// # Examples
/// ```
/// use lsbucket::sets::visited::KeySet;
///
/// let mut set = KeySet::with_capacity(4).unwrap();
/// for key in 0..5 {
///     set.insert(key).unwrap();
/// }
/// assert!(set.contains(0));
/// assert!(!set.contains(5));
/// assert!(set.capacity() >= 16);
/// ```
pub struct KeySet {
    slots: Box<[u64]>,
    used: usize,
    holds_max: bool,
    policy: AllocPolicy,
}

impl KeySet {
    pub fn new() -> Result<Self, AllocError> {
        KeySet::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        KeySet::with_policy(capacity, AllocPolicy::default())
    }

    /// A capacity of zero is raised to one slot.
    pub fn with_policy(capacity: usize, policy: AllocPolicy) -> Result<Self, AllocError> {
        Ok(KeySet {
            slots: policy.filled(capacity.max(1), EMPTY)?,
            used: 0,
            holds_max: false,
            policy,
        })
    }

    pub fn len(&self) -> usize {
        self.used + usize::from(self.holds_max)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Fraction of table slots in use.
    pub fn load_factor(&self) -> f64 {
        self.used as f64 / self.slots.len() as f64
    }

    /// Adds `key`, returning `false` if it was already present.
    pub fn insert(&mut self, key: u64) -> Result<bool, AllocError> {
        let Some(stored) = key.checked_add(1) else {
            let fresh = !self.holds_max;
            self.holds_max = true;
            return Ok(fresh);
        };

        let mut position = probe(&self.slots, home(key, self.slots.len()), stored);
        if self.slots[position] == stored {
            return Ok(false);
        }

        if (self.used + 1) * 2 >= self.slots.len() {
            let mut capacity = self.slots.len() * 2;
            while (self.used + 1) * 2 >= capacity {
                capacity *= 2;
            }
            self.resize(capacity)?;
            position = probe(&self.slots, home(key, capacity), stored);
        }

        self.slots[position] = stored;
        self.used += 1;
        Ok(true)
    }

    pub fn contains(&self, key: u64) -> bool {
        match key.checked_add(1) {
            None => self.holds_max,
            Some(stored) => {
                self.slots[probe(&self.slots, home(key, self.slots.len()), stored)] == stored
            }
        }
    }

    /// Live keys in slot order (not insertion order).
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.slots
            .iter()
            .filter(|&&stored| stored != EMPTY)
            .map(|&stored| stored - 1)
            .chain(self.holds_max.then_some(u64::MAX))
    }

    /// Copies every key into a freshly allocated vector, in slot order.
    pub fn to_vec(&self) -> Result<Vec<u64>, AllocError> {
        let mut out = Vec::new();
        self.policy.reserve_exact(&mut out, self.len())?;
        out.extend(self.keys());
        Ok(out)
    }

    /// Copies every key into the front of `out`, in slot order, and returns
    /// how many were written.
    ///
    /// # Panics
    /// Panics if `out` is shorter than [`len`](KeySet::len).
    pub fn copy_into(&self, out: &mut [u64]) -> usize {
        assert!(
            out.len() >= self.len(),
            "output holds {} keys, set has {}",
            out.len(),
            self.len()
        );
        for (slot, key) in out.iter_mut().zip(self.keys()) {
            *slot = key;
        }
        self.len()
    }

    /// Rehashes every live key into a zeroed table of `capacity` slots.
    fn resize(&mut self, capacity: usize) -> Result<(), AllocError> {
        let mut slots = self.policy.filled(capacity, EMPTY)?;
        for &stored in self.slots.iter().filter(|&&stored| stored != EMPTY) {
            let position = probe(&slots, home(stored - 1, capacity), stored);
            slots[position] = stored;
        }
        tracing::debug!(
            from = self.slots.len(),
            to = capacity,
            keys = self.used,
            "growing key set"
        );
        self.slots = slots;
        Ok(())
    }
}

impl VisitorSet for KeySet {
    fn empty(policy: AllocPolicy) -> Result<Self, AllocError> {
        KeySet::with_policy(DEFAULT_CAPACITY, policy)
    }

    fn get(&self, key: u64) -> bool {
        self.contains(key)
    }

    fn set(&mut self, key: u64) -> Result<bool, AllocError> {
        self.insert(key)
    }

    fn visited(&self) -> usize {
        self.len()
    }
}

impl std::fmt::Debug for KeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySet")
            .field("capacity", &self.slots.len())
            .field("len", &self.len())
            .finish()
    }
}

fn home(key: u64, capacity: usize) -> usize {
    (key % capacity as u64) as usize
}

/// First slot from `position` onwards (wrapping) that is empty or holds
/// `stored`. The load factor bound guarantees one exists.
fn probe(slots: &[u64], mut position: usize, stored: u64) -> usize {
    while slots[position] != EMPTY && slots[position] != stored {
        position += 1;
        if position == slots.len() {
            position = 0;
        }
    }
    position
}

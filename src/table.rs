//! The open-addressing engine: a prime-length slot array probed by
//! double hashing with a tetrahedral perturbation term.

use crate::capacity::{CapacityPlanner, Direction};
use crate::key::{Key, KeyRef};

/// Live load factor (`active / length`) at or above which an insert
/// grows the table first.
const GROW_LOAD_FACTOR: f64 = 0.60;
/// Live load factor at or below which a removal shrinks the table.
const SHRINK_LOAD_FACTOR: f64 = 0.12;

#[derive(Debug)]
enum Slot<V> {
    Empty,
    Occupied { key: Key, value: V },
    Tombstone,
}

impl<V> Slot<V> {
    fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Replace an occupied slot with a tombstone, yielding its value.
    /// Leaves empty and tombstone slots untouched.
    fn bury(&mut self) -> Option<V> {
        match std::mem::replace(self, Slot::Tombstone) {
            Slot::Occupied { value, .. } => Some(value),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// A string-keyed map over a single prime-length slot array.
///
/// Collisions are resolved in place: double hashing plus a tetrahedral
/// perturbation walk the array until the key's slot is found. Removed
/// entries leave tombstones so longer probe sequences keep resolving;
/// tombstones are reclaimed by later inserts and dropped wholesale on
/// resize.
///
/// Keys are at most [`MAX_KEY_LEN`](crate::MAX_KEY_LEN) bytes. Values
/// are unconstrained.
pub struct ProbeMap<V> {
    slots: Vec<Slot<V>>,
    /// Occupied slots (live entries).
    active: u64,
    /// Occupied plus tombstone slots; what probing actually walks over.
    occupied: u64,
    /// Diagnostic: probe steps taken past a home slot.
    collisions: u64,
    planner: CapacityPlanner,
}

impl<V> ProbeMap<V> {
    /// Create a table sized for at least `capacity_hint` slots; the hint
    /// is rounded up to the nearest certified prime length (a hint of 10
    /// yields 17 slots, 40 yields 53).
    pub fn with_capacity(capacity_hint: u64) -> Self {
        let planner = CapacityPlanner::new();
        let length = planner.next_length(capacity_hint, Direction::Up);
        Self {
            slots: empty_slots(length),
            active: 0,
            occupied: 0,
            collisions: 0,
            planner,
        }
    }

    /// Create a table at the smallest certified length.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.active as usize
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Current backing-array length.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots that are not empty: live entries plus tombstones. This is
    /// the quantity that bounds probe-sequence length, not `len()`.
    pub fn occupied_slots(&self) -> usize {
        self.occupied as usize
    }

    /// Probe steps taken past a home slot since creation. Diagnostic
    /// only; a rough measure of clustering.
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    /// Insert `key` -> `value`, overwriting in place if the key is
    /// already present. When the live load factor has reached 60% the
    /// table grows to at least double its length before the insert.
    ///
    /// # Panics
    /// Panics if `key` exceeds [`MAX_KEY_LEN`](crate::MAX_KEY_LEN) bytes,
    /// or if growth would overflow the `u64` capacity domain.
    pub fn insert(&mut self, key: &str, value: V) {
        let key = Key::new(key);
        if self.load_factor() >= GROW_LOAD_FACTOR {
            self.grow();
        }
        self.insert_key(key, value);
    }

    /// Look up `key`, returning a reference to its value.
    ///
    /// # Panics
    /// Panics if `key` exceeds [`MAX_KEY_LEN`](crate::MAX_KEY_LEN) bytes.
    pub fn find(&self, key: &str) -> Option<&V> {
        let query = KeyRef::new(key);
        let index = self.find_slot(&query)?;
        match &self.slots[index as usize] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Remove `key`, returning its value. The slot becomes a tombstone
    /// so probe sequences passing through it keep resolving. When the
    /// live load factor drops to 12% the table shrinks to at most half
    /// its length (never below the smallest certified length).
    ///
    /// # Panics
    /// Panics if `key` exceeds [`MAX_KEY_LEN`](crate::MAX_KEY_LEN) bytes.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let query = KeyRef::new(key);
        let index = self.find_slot(&query)?;
        let value = self.slots[index as usize].bury();
        self.active -= 1;
        self.check_counters();
        self.maybe_shrink();
        value
    }

    /// Probe for the occupied slot holding `query`. An empty slot or a
    /// full probe cycle proves absence. Borrowed keys only; the read
    /// paths never allocate.
    fn find_slot(&self, query: &KeyRef<'_>) -> Option<u64> {
        let home = self.probe(query.digest(), 0);
        let mut attempt = 0;
        loop {
            let index = self.probe(query.digest(), attempt);
            if attempt > 0 && index == home {
                return None;
            }
            match &self.slots[index as usize] {
                // An empty slot proves absence along this probe path.
                Slot::Empty => return None,
                Slot::Occupied { key: existing, .. } if existing == query => {
                    return Some(index)
                }
                // Foreign entry or tombstone: keep walking.
                _ => {}
            }
            attempt += 1;
        }
    }

    /// Probe index for `digest` at the given attempt. Attempt 0 is the
    /// home slot. With a prime length the sequence revisits the home
    /// slot at attempt == length, which bounds every probe loop.
    fn probe(&self, digest: u64, attempt: u64) -> u64 {
        let length = self.length();
        let h1 = digest % length;
        let h2 = 1 + (digest % (length - 1));
        // Tetrahedral term; u128 because attempt^3 can overflow u64.
        let a = u128::from(attempt);
        let perturbation = (a * a * a - a) / 6;
        let index =
            (u128::from(h1) + a * u128::from(h2) + perturbation) % u128::from(length);
        index as u64
    }

    /// Probe-insert a normalized key. The caller has already applied the
    /// load-factor policy; this is also the rehash path during resize.
    fn insert_key(&mut self, key: Key, value: V) {
        let mut pending = (key, value);
        loop {
            match self.try_insert_key(pending.0, pending.1) {
                Ok(()) => return,
                Err(returned) => {
                    // A probe cycle can close after far fewer than
                    // `length` attempts when the step size lines up with
                    // the length, so exhaustion is reachable even at low
                    // load. Growing changes the length, which breaks the
                    // cycle; the retry then lands.
                    self.grow();
                    pending = returned;
                }
            }
        }
    }

    /// One probe pass for an insert. Fails, handing the entry back, when
    /// the probe cycle closes with every visited slot holding a foreign
    /// key and no tombstone to reuse.
    fn try_insert_key(&mut self, key: Key, value: V) -> Result<(), (Key, V)> {
        let home = self.probe(key.digest(), 0);
        let mut reuse: Option<u64> = None;
        let mut attempt = 0;
        loop {
            let index = self.probe(key.digest(), attempt);
            if attempt > 0 {
                if index == home {
                    break;
                }
                self.collisions += 1;
            }
            match &mut self.slots[index as usize] {
                Slot::Occupied {
                    key: existing,
                    value: slot_value,
                } => {
                    if *existing == key {
                        // Update in place; counters unchanged.
                        *slot_value = value;
                        return Ok(());
                    }
                }
                Slot::Empty => {
                    // Prefer the earliest tombstone seen on the way, so
                    // probe sequences stop growing past freed slots.
                    self.place(reuse.unwrap_or(index), key, value);
                    return Ok(());
                }
                Slot::Tombstone => {
                    if reuse.is_none() {
                        reuse = Some(index);
                    }
                }
            }
            attempt += 1;
        }
        // Full cycle without an empty slot. A recorded tombstone still
        // admits the entry; otherwise the caller must resize and retry.
        match reuse {
            Some(index) => {
                self.place(index, key, value);
                Ok(())
            }
            None => Err((key, value)),
        }
    }

    /// Write an entry into an empty or tombstone slot.
    fn place(&mut self, index: u64, key: Key, value: V) {
        let slot = index as usize;
        if self.slots[slot].is_empty() {
            // A reused tombstone is already counted in `occupied`.
            self.occupied += 1;
        }
        self.slots[slot] = Slot::Occupied { key, value };
        self.active += 1;
        self.check_counters();
    }

    fn length(&self) -> u64 {
        self.slots.len() as u64
    }

    fn load_factor(&self) -> f64 {
        self.active as f64 / self.length() as f64
    }

    fn grow(&mut self) {
        let candidate = match self.length().checked_mul(2) {
            Some(candidate) => candidate,
            None => panic!("table cannot grow: doubling {} overflows u64", self.length()),
        };
        let new_length = self.planner.next_length(candidate, Direction::Up);
        self.resize(new_length);
    }

    fn maybe_shrink(&mut self) {
        if self.load_factor() > SHRINK_LOAD_FACTOR {
            return;
        }
        if self.length() <= self.planner.min_length() {
            return;
        }
        // Halving can land below the curated range, where the Down pass
        // degenerates to a primality scan; clamp the target so the table
        // never drops below the smallest certified length.
        let new_length = self
            .planner
            .next_length(self.length() / 2, Direction::Down)
            .max(self.planner.min_length());
        self.resize(new_length);
    }

    /// Rebuild the table at `new_length`: fresh slot array, counters
    /// reset, every live entry re-inserted through the normal probe
    /// path with its stored digest. Tombstones do not survive.
    fn resize(&mut self, new_length: u64) {
        let old = std::mem::replace(&mut self.slots, empty_slots(new_length));
        self.active = 0;
        self.occupied = 0;
        for slot in old {
            if let Slot::Occupied { key, value } = slot {
                self.insert_key(key, value);
            }
        }
    }

    fn check_counters(&self) {
        debug_assert!(
            self.active <= self.occupied && self.occupied <= self.length(),
            "counter invariant violated: active={} occupied={} length={}",
            self.active,
            self.occupied,
            self.length()
        );
    }
}

impl<V> Default for ProbeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_slots<V>(length: u64) -> Vec<Slot<V>> {
    let mut slots = Vec::with_capacity(length as usize);
    slots.resize_with(length as usize, || Slot::Empty);
    slots
}

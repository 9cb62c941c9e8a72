//! Capacity planning: certified prime table lengths for double hashing.

/// Curated ascending table lengths, roughly doubling per step. Every
/// value is prime, which keeps the secondary hash step coprime with the
/// length and the probe sequence a full cycle.
const CURATED_LENGTHS: &[u64] = &[
    17,
    23,
    37,
    53,
    97,
    193,
    389,
    769,
    1543,
    3079,
    6151,
    12289,
    24593,
    49157,
    98317,
    196613,
    393241,
    786433,
    1572869,
    3145739,
    6291469,
    12582917,
    25165843,
    50331653,
    100663319,
    201326611,
    402653189,
    805306457,
    1610612741,
];

#[derive(Copy, Clone, Debug)]
pub(crate) enum Direction {
    Up,
    Down,
}

/// Immutable planner over the curated length list. Consulted at table
/// construction and on every resize.
#[derive(Debug)]
pub(crate) struct CapacityPlanner {
    lengths: &'static [u64],
}

impl CapacityPlanner {
    pub(crate) const fn new() -> Self {
        Self {
            lengths: CURATED_LENGTHS,
        }
    }

    /// Smallest certified length.
    pub(crate) fn min_length(&self) -> u64 {
        self.lengths[0]
    }

    /// Nearest certified length: the smallest listed value `>= candidate`
    /// for [`Direction::Up`], the largest `<= candidate` for
    /// [`Direction::Down`]. Candidates outside the curated range fall
    /// back to a primality scan, so the table size is not capped by the
    /// list.
    ///
    /// # Panics
    /// Panics if the scan exhausts the `u64` domain without finding a
    /// prime. Unreachable in practice, but a table that cannot be sized
    /// cannot continue.
    pub(crate) fn next_length(&self, candidate: u64, direction: Direction) -> u64 {
        let listed = match direction {
            Direction::Up => self.lengths.iter().copied().find(|&len| len >= candidate),
            Direction::Down => self
                .lengths
                .iter()
                .rev()
                .copied()
                .find(|&len| len <= candidate),
        };
        match listed {
            Some(length) => length,
            None => scan_prime(candidate),
        }
    }
}

/// First prime at or above `candidate`, by trial division over odd
/// numbers.
fn scan_prime(candidate: u64) -> u64 {
    let start = if candidate % 2 == 0 {
        candidate + 1
    } else {
        candidate
    };
    let mut n = start.max(3);
    loop {
        if is_prime(n) {
            return n;
        }
        n = match n.checked_add(2) {
            Some(next) => next,
            None => panic!("no prime table length at or above {candidate}"),
        };
    }
}

/// Trial division by odd numbers up to the square root.
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut divisor = 3;
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

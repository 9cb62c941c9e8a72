//! probemap: a single-threaded, string-keyed hash map built on open
//! addressing instead of chaining, with tombstone deletion and
//! prime-sized backing storage.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the entire map in one flat slot array so lookups stay
//!   local and no per-entry bucket allocation ever happens; each piece
//!   is small enough to be reasoned about independently.
//! - Layers:
//!   - key: normalizes a raw string into a `Key` carrying the original
//!     bytes and a precomputed FNV-1a digest, so probing and rehashing
//!     never recompute the hash.
//!   - capacity: maps capacity requests to prime table lengths, from a
//!     curated ascending list for typical sizes with a trial-division
//!     primality scan beyond it.
//!   - table: the open-addressing engine. Double hashing with a
//!     tetrahedral perturbation term sequences the probes; slots cycle
//!     Empty -> Occupied -> Tombstone; the table grows at 60% live load
//!     and shrinks at 12%.
//!
//! Constraints
//! - Single-threaded: mutation requires `&mut self`; no internal locking.
//! - Keys are at most [`MAX_KEY_LEN`] (36) bytes; longer keys are a
//!   caller contract violation and panic.
//! - Values are unconstrained: no `Eq`, `Hash`, or `Clone` required on `V`.
//! - No iteration or enumeration API; the surface is insert/find/remove
//!   plus read-only diagnostics.
//!
//! Error taxonomy
//! - Absence is an ordinary outcome: `find` and `remove` return `Option`.
//! - Contract and structural violations are fatal: oversized keys,
//!   capacity overflow on growth, and primality-scan exhaustion panic
//!   rather than surfacing as recoverable errors.
//!
//! Hashing invariants
//! - Each entry stores its `u64` digest at normalization time and every
//!   probe, comparison, and rehash reuses it; the raw bytes are only
//!   consulted to confirm equality after a digest match.
//!
//! Resize invariants
//! - Resize builds a fresh slot array and re-inserts every live entry
//!   through the regular probe path, then swaps it in. Exactly one
//!   backing array is ever visible; tombstones do not survive a resize.

mod capacity;
mod key;
mod table;

// Public surface
pub use key::MAX_KEY_LEN;
pub use table::ProbeMap;

//! # moat-cache
//!
//! Content-addressable memoization of remote model responses.
//!
//! Every cacheable request is reduced to a SHA-256 digest over its full
//! canonical form — model, deterministically encoded prompt, parameters —
//! and stored one file per key. Identical requests short-circuit the
//! network entirely; a miss, a corrupt entry, or an I/O failure all just
//! mean "call the model", because caching is an optimization and never a
//! correctness dependency.
//!
//! Writes are atomic (temp file + rename), so an interrupted call can
//! never leave a partial entry, and concurrent `get`/`put` from parallel
//! agents is safe.

#![deny(unsafe_code)]

pub mod errors;
pub mod key;
pub mod store;

pub use errors::CacheError;
pub use key::cache_key;
pub use store::{CacheStats, CacheStore, PruneReport};

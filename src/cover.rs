//! Cover art cache.
//!
//! Cover lookups run on a worker thread. Callers send commands through a
//! `CoverArtCache` handle and receive `CoverFound { track_id, cover }`
//! messages on a channel; it is up to the receiver to drop results for a
//! track it no longer shows.

mod cache;
mod embedded;
mod types;

pub use cache::CoverArtCache;
pub use embedded::{content_hash, front_cover, hash_of_embedded_cover, read_embedded_cover};
pub use types::*;

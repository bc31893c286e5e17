//! Track library: scanning a folder into `Track` entities.
//!
//! The library owns every `Track`; the track info editor only ever holds a
//! `TrackId` and borrows the entity when it needs to read or write it.

mod display;
mod model;
mod scan;
mod sidecar;

pub use display::display_from_fields;
pub use model::*;
pub use scan::{read_track, scan};

#[cfg(test)]
mod tests;

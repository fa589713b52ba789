//! Ordered, size-capped, persisted lists of `PlayListItem`.
//!
//! The same `PlayList` type backs the user playlist (unbounded) and the playback
//! history (capped, most recent first). `model` holds the in-memory list and its
//! operations, `store` the on-disk encoding.

mod model;
mod store;

pub use model::*;

#[cfg(test)]
mod tests;

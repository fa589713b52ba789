//! Configuration loader and schema types.
//!
//! This module exposes the settings schema (storage locations, list caps,
//! audio/repeat defaults, decoder priority, logging) and helpers to load it
//! from disk and the environment.

mod load;
mod schema;

pub use load::*;
pub use schema::*;

#[cfg(test)]
mod tests;

//! Turning command-line arguments and directories into playlist items.

mod scan;

pub use scan::*;

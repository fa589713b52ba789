//! Application module: the view state used by the TUI and runtime.
//!
//! `App` lives in `app::model` and tracks focus, selection and the input
//! prompt. The lists it points into belong to the `Session`.

mod model;

pub use model::*;

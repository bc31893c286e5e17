//! Application module: the model driven by the TUI and runtime.
//!
//! `App` in `app::model` holds the scanned library, the browser selection and
//! filter, the track info editor with its on-screen state, and whatever
//! dialog is currently open. `app::picker` is the cover image file picker.

mod model;
mod picker;

pub use model::*;
pub use picker::{FilePicker, PickerEntry};

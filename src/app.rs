//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the rows on screen,
//! the search text and the status line.

mod model;

pub use model::*;

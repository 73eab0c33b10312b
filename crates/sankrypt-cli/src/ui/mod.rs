//! UI primitives for the Sankrypt CLI.
//!
//! - **Context**: environment detection (TTY, color, unicode, quiet)
//! - **Mode**: JSON, plain or pretty output
//! - **Theme**: status badges
//! - **Render**: tables, key-value lines, hints, strength meter
//! - **Progress**: re-encryption progress bar

mod context;
mod mode;
pub mod progress;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use mode::OutputMode;
pub use progress::ReencryptProgress;
pub use render::{badge, format_bytes, format_datetime, hint, kv, strength_meter, table, Column};
pub use theme::Badge;

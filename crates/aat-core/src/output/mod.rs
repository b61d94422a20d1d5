//! Output rendering for CLI commands.
//!
//! Every payload has a JSON form with stable snake_case column names (the
//! contract downstream renderers consume), a Markdown form for humans, and a
//! one-line summary.

pub mod tables;

pub use tables::{render_check, render_quantiles, render_sweep};

pub mod analyze;
pub mod categories;
pub mod config;
pub mod tui;

//! Terminal display: theme and tables for text output.

pub mod tables;
pub mod theme;

pub use tables::{TableBuilder, create_entries_table, create_package_table, create_scope_table};
pub use theme::{THEME, Theme};

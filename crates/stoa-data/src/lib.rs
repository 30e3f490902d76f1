//! Raw table loading for the Stoa pricing pipeline.
//!
//! Reads the listing and session source tables from CSV into polars
//! DataFrames and validates that the columns the downstream transforms
//! require are actually present. All schema knowledge about the raw
//! sources lives here.

#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{DataError, Result};
pub use loader::{read_listings, read_sessions, read_table, require_columns};

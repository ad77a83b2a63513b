//! Persistence implementations
//!
//! This module provides the file-based implementation of the repository traits.

mod file_database;
mod tables;

pub use file_database::FileDatabase;

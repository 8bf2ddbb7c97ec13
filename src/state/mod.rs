/// State management module
///
/// This module handles all application state, including:
/// - Database connection and queries (library.rs)
/// - Shared data structures (data.rs)
/// - The observable game list and reload-after-mutation (catalog.rs)
/// - Edit form input and validation (form.rs)

pub mod catalog;
pub mod data;
pub mod form;
pub mod library;

//! Data layer
//!
//! SQLite storage for users, roles, follows, microposts and their likes,
//! comments, categories and views.

pub mod sqlite;
pub mod types;

pub use sqlite::{SqliteError, SqlitePool, SqliteService};

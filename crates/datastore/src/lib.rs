//! The datastore crate.
//!
//! This crate moves records in and out of sqlite for the load and extract slides.  There are 4 pieces:
//!
//! - Settings and the connection lifecycle: open with our pragmas, close on the way out no matter what.
//! - Mappings: for each record type, a statically declared list of columns and how to get values in and out of a row.
//!   Statements are rendered from the mapping with tera, so nothing is discovered at runtime.
//! - The loader, which inserts a lazy sequence of records using one of several strategies.
//! - Extraction, which reads a table back as a lazy sequence using one of several cursor or paging strategies.
//!
//! The `users` table the demos share lives in [users].
mod connection;
mod extract;
mod loader;
mod mapping;
mod settings;
pub mod users;

pub use connection::*;
pub use extract::*;
pub use loader::*;
pub use mapping::*;
pub use settings::*;

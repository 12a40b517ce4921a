//! Local storage for the client
//!
//! A string-keyed blob store standing in for the browser's local storage,
//! with a file-backed implementation and an in-memory one for tests.

pub mod json_map_store;
pub mod local_store;

pub use local_store::{keys, read_json, write_json, FileLocalStore, LocalStore, MemoryLocalStore};

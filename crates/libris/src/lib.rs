//! Libris - Library Management Backend
//!
//! Tracks users, the book inventory and borrow/return records in a document
//! store, and recommends similar books from a reader's borrowing history.

pub mod accounts;
pub mod circulation;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod recommend;
pub mod server;
pub mod store;

pub use error::{LibraryError, Result};

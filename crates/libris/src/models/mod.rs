//! Documents stored in the library collections

pub mod book;
pub mod loan;
pub mod user;

pub use book::Book;
pub use loan::{BorrowRecord, BorrowedEntry};
pub use user::{Admin, User};

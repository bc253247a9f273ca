//! Endpoint handlers grouped by resource

pub mod books;
pub mod circulation;
pub mod logs;
pub mod recommendations;
pub mod status;
pub mod users;

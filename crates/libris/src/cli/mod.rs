//! Command line interface over the local document store

pub mod commands;
pub mod display;

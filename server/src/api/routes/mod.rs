//! API route handlers

pub mod catalog;
pub mod health;
pub mod query;
pub mod sessions;
pub mod structures;

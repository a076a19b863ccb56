//! Data types for the challenge extraction library.

pub mod config;
pub mod fields;
pub mod page;
pub mod result;

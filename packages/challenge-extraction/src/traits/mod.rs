//! Core trait abstractions for the challenge extraction library.
//!
//! These traits are the seams between the pipeline driver and its
//! collaborators: the page fetcher, the LLM oracle, the reply strategy and
//! the tabular row store.

pub mod fetcher;
pub mod oracle;
pub mod store;
pub mod strategy;

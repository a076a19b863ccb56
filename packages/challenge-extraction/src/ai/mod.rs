//! Oracle implementations for the extraction library.
//!
//! This module provides reference implementations of the `Oracle` trait.
//! Users can use these directly or implement their own.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::GeminiOracle;

#[cfg(feature = "gemini")]
pub use gemini_client::DEFAULT_MODEL as DEFAULT_GEMINI_MODEL;

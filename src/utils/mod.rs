//! Shared helpers.
//!
//! - [`tokenizer`] - Term extraction for content indexing and phrase splitting
//!   for content queries
//! - [`progress`] - Progress bars, no-op without the `progress` feature

pub mod progress;
pub mod tokenizer;

pub use tokenizer::*;

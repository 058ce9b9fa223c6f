//! # FRE - File Retrieval Engine
//!
//! FRE crawls a directory tree and builds three in-memory indexes over every
//! file it finds, then answers multi-criteria searches against them.
//!
//! ## Architecture
//!
//! - [`index`] - Crawling, the worker pool, indexing strategies and the
//!   shared [`IndexStore`](index::IndexStore)
//! - [`query`] - Search criteria and their evaluation
//! - [`config`] - File and environment configuration
//! - [`output`] - Result formatting (plain or JSON)
//! - [`error`] - Error types
//! - [`utils`] - Tokenizer and progress helpers
//!
//! ## Quick Start
//!
//! ```no_run
//! use fre::index::{IndexConfig, IndexStore, Indexer};
//! use fre::query::{QueryExecutor, SearchCriteria};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let store = Arc::new(IndexStore::new());
//! let indexer = Indexer::new(store.clone(), IndexConfig::default());
//! indexer.index(Path::new("/path/to/dataset")).unwrap();
//!
//! let criteria = SearchCriteria::new().with_content("hello world").with_min_size(6);
//! for record in QueryExecutor::new(&store).search(&criteria).unwrap() {
//!     println!("{}", record.path.display());
//! }
//! ```
//!
//! ## Indexes
//!
//! 1. **Content** - lowercased term -> record -> occurrence count
//! 2. **Size** - byte size -> records, ordered for range scans
//! 3. **Name** - exact file name -> records
//!
//! Each index sits behind its own lock, so strategies for different indexes
//! merge in parallel.

pub mod config;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;

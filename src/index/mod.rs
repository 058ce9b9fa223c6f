pub mod build;
pub mod crawl;
pub mod pool;
pub mod stats;
pub mod store;
pub mod strategy;
pub mod types;

pub use build::{IndexReport, Indexer};
pub use store::IndexStore;
pub use types::*;

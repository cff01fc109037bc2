//! Game resource loading
//!
//! Tables are fetched whole when a collection is created; individual
//! entries are decoded on first request and cached per id.

pub mod cache;
pub mod collections;
pub mod fetcher;

pub use cache::{CacheStats, IdCache};
pub use collections::{
    AmapCollection, AnimCollection, ModanimCollection, ModelCollection, ResourceCollection,
};
pub use fetcher::{DataFetcher, DirFetcher};

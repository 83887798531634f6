//! Instance type reference dataset loading

pub mod fetcher;

pub use fetcher::{DataLocation, InstanceDataFetcher};

//! Per-node visual encodings: fill colour and category buckets.

pub mod category;
pub mod color;

pub use category::{CategoryMap, categories_for};
pub use color::{NodeColor, color_for};

//! Reshaping of long-format observations into per-view matrices.

pub mod wide;

pub use wide::{extract_sample_metadata, flatten_views, pivot_view, pivot_views, LongCell};

//! Data structures for multi-omics factor analysis input.

mod dataset;
mod long_table;
pub(crate) mod metadata;
mod view_matrix;

pub use dataset::MultiViewDataset;
pub use long_table::{LongRecord, LongTable, LONG_COLUMNS};
pub use metadata::{SampleMetadata, Variable, VariableType};
pub use view_matrix::ViewMatrix;

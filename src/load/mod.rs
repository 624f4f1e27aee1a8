//! Loaders for on-disk multi-omics inputs.

pub mod modality;

pub use modality::{load_modalities, load_sample_metadata, read_modality, CLL_MODALITIES, SAMPLE_KEY};

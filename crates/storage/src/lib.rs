#![forbid(unsafe_code)]

pub mod dataset;
pub mod json_file;
pub mod repository;
pub mod sqlite;

pub use dataset::{DatasetError, load_dataset, parse_dataset};
pub use repository::{
    InMemoryProgressStore, PROGRESS_KEY, ProgressStore, Storage, StorageError, decode_progress,
    encode_progress,
};

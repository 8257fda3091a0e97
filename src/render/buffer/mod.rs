//! GPU buffer management

pub mod storage;

pub use storage::{check_storage_size, create_storage_buffer, create_storage_buffer_init};

// File: kudos-core/src/stores/mod.rs
pub mod http_store;
pub mod memory;

pub use http_store::HttpStreamerStore;
pub use memory::MemoryStreamerStore;

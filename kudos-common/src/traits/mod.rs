pub mod store_traits;

pub use store_traits::{NoopSync, RosterSync, StreamerStore};

/// File-backed store of tracked group chat ids
pub mod group_store;

pub use group_store::{GroupStore, StoreError};

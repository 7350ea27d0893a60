// Service exports
pub mod cache;
pub mod directory;
pub mod store;

pub use cache::{CacheError, SnapshotCache};
pub use directory::ProviderDirectory;
pub use store::{ProviderStore, StoreError};

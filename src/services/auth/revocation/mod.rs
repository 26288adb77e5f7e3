pub mod cache;
pub mod store;

pub use cache::CacheRevocationStore;
pub use store::{RevocationEntry, RevocationError, RevocationStore, token_digest};

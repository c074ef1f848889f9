//! Store liveness check.

use async_trait::async_trait;

use super::error::StorageResult;

/// Cheap round trip proving the backing database answers.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> StorageResult<()>;
}

use crate::solidity::{StandardJsonInput, StandardJsonOutput};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves short compiler versions (`0.8.17`) into long ones
/// (`0.8.17+commit.8df45f5f`). Implementations do their own caching.
#[async_trait]
pub trait VersionRegistry: Send + Sync {
    /// `Ok(None)` when the version is unknown.
    async fn fetch_long_version(&self, short_version: &str) -> anyhow::Result<Option<String>>;
}

/// Runs the compiler matching `long_version` on a standard json input.
#[async_trait]
pub trait CompilerWorker: Send + Sync {
    async fn run(
        &self,
        long_version: &str,
        input: &StandardJsonInput,
    ) -> anyhow::Result<StandardJsonOutput>;
}

#[async_trait]
impl<T: VersionRegistry + ?Sized> VersionRegistry for Arc<T> {
    async fn fetch_long_version(&self, short_version: &str) -> anyhow::Result<Option<String>> {
        self.as_ref().fetch_long_version(short_version).await
    }
}

#[async_trait]
impl<T: CompilerWorker + ?Sized> CompilerWorker for Arc<T> {
    async fn run(
        &self,
        long_version: &str,
        input: &StandardJsonInput,
    ) -> anyhow::Result<StandardJsonOutput> {
        self.as_ref().run(long_version, input).await
    }
}

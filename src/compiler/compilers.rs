use super::{
    download_cache::DownloadCache,
    fetcher::{FetchError, Fetcher},
    version::{ParseError, Version},
};
use crate::{
    audit::CompilerWorker,
    solidity::{StandardJsonInput, StandardJsonOutput},
};
use async_trait::async_trait;
use ethers_solc::{error::SolcError, Solc};
use std::{num::NonZeroUsize, str::FromStr, sync::Arc};
use thiserror::Error as DeriveError;
use tokio::sync::{AcquireError, Semaphore};

#[derive(Debug, DeriveError)]
pub enum Error {
    #[error("invalid compiler version: {0}")]
    InvalidVersion(#[from] ParseError),
    #[error("Error while fetching compiler: {0:#}")]
    Fetch(#[from] FetchError),
    #[error("Internal error while compiling: {0}")]
    Internal(#[from] SolcError),
    #[error("failed to acquire a compilation slot: {0}")]
    Acquire(#[from] AcquireError),
    #[error("compilation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Downloads compilers on demand and runs them on standard json inputs.
///
/// At most `max_threads` compilers run at the same time.
pub struct Compilers {
    cache: DownloadCache,
    fetcher: Arc<dyn Fetcher>,
    threads_semaphore: Arc<Semaphore>,
}

impl Compilers {
    pub fn new(fetcher: Arc<dyn Fetcher>, max_threads: NonZeroUsize) -> Self {
        Self {
            cache: DownloadCache::new(),
            fetcher,
            threads_semaphore: Arc::new(Semaphore::new(max_threads.get())),
        }
    }

    pub async fn compile(
        &self,
        compiler_version: &Version,
        input: &StandardJsonInput,
    ) -> Result<StandardJsonOutput, Error> {
        let solc_path = self.cache.get(&*self.fetcher, compiler_version).await?;
        let _permit = self.threads_semaphore.acquire().await?;

        let start = std::time::Instant::now();
        let input = input.clone();
        let output = tokio::task::spawn_blocking(move || {
            let solc = Solc::from(solc_path);
            solc.compile_as::<_, StandardJsonOutput>(&input)
        })
        .await??;
        log::debug!(
            "compilation with {} took {:?}",
            compiler_version,
            start.elapsed()
        );

        // Compilation errors, warnings and info messages are returned in `errors`
        Ok(output)
    }
}

#[async_trait]
impl CompilerWorker for Compilers {
    async fn run(
        &self,
        long_version: &str,
        input: &StandardJsonInput,
    ) -> anyhow::Result<StandardJsonOutput> {
        let version = Version::from_str(long_version).map_err(Error::from)?;
        Ok(self.compile(&version, input).await?)
    }
}

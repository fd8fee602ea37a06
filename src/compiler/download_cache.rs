use super::{
    fetcher::{FetchError, Fetcher},
    version::Version,
};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::RwLock;

/// Remembers where every downloaded compiler lives.
///
/// Each version has its own lock, so downloading one compiler
/// never blocks lookups of the versions already installed.
#[derive(Default)]
pub struct DownloadCache {
    cache: parking_lot::Mutex<HashMap<Version, Arc<RwLock<Option<PathBuf>>>>>,
}

impl DownloadCache {
    pub fn new() -> Self {
        Default::default()
    }

    async fn try_get(&self, ver: &Version) -> Option<PathBuf> {
        let entry = {
            let cache = self.cache.lock();
            cache.get(ver).cloned()
        };
        match entry {
            Some(lock) => {
                let solc = lock.read().await;
                solc.as_ref().cloned()
            }
            None => None,
        }
    }

    pub async fn get<D: Fetcher + ?Sized>(
        &self,
        fetcher: &D,
        ver: &Version,
    ) -> Result<PathBuf, FetchError> {
        match self.try_get(ver).await {
            Some(solc) => Ok(solc),
            None => self.fetch(fetcher, ver).await,
        }
    }

    async fn fetch<D: Fetcher + ?Sized>(
        &self,
        fetcher: &D,
        ver: &Version,
    ) -> Result<PathBuf, FetchError> {
        let lock = {
            let mut cache = self.cache.lock();
            Arc::clone(cache.entry(ver.clone()).or_default())
        };
        let mut entry = lock.write().await;
        match entry.as_ref() {
            Some(solc) => Ok(solc.clone()),
            None => {
                log::info!(target: "compiler_cache", "installing solc version {}", ver);
                let solc = fetcher.fetch(ver).await?;
                *entry = Some(solc.clone());
                Ok(solc)
            }
        }
    }
}

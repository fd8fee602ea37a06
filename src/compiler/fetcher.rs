use super::version::Version;
use crate::mismatch::Mismatch;
use async_trait::async_trait;
use bytes::Bytes;
use primitive_types::H256;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("version {0} not found")]
    NotFound(Version),
    #[error("compiler download from {url} failed with status {status}")]
    Download { url: Url, status: StatusCode },
    #[error("couldn't fetch the file: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("hashsum of fetched file mismatch: {0}")]
    HashMismatch(#[from] Mismatch<H256>),
    #[error("couldn't install the compiler: {0}")]
    File(#[from] std::io::Error),
    #[error("tokio sheduling error: {0}")]
    Schedule(#[from] tokio::task::JoinError),
}

/// Source of compiler binaries.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Makes the compiler available locally and returns a path to the executable.
    async fn fetch(&self, ver: &Version) -> Result<PathBuf, FetchError>;
}

/// Downloads the binary at `url` and installs it as `<folder>/<ver>/solc`.
pub async fn download_executable(
    url: &Url,
    sha256: H256,
    folder: &Path,
    ver: &Version,
) -> Result<PathBuf, FetchError> {
    let response = reqwest::get(url.clone()).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Download {
            url: url.clone(),
            status,
        });
    }
    let data = response.bytes().await?;
    log::debug!("downloaded {} bytes of solc {}", data.len(), ver);
    install_executable(data, sha256, folder, ver).await
}

fn validate_checksum(bytes: &[u8], expected: H256) -> Result<(), Mismatch<H256>> {
    let found = H256::from_slice(&Sha256::digest(bytes));
    if expected != found {
        Err(Mismatch::new(expected, found))
    } else {
        Ok(())
    }
}

#[cfg(target_family = "unix")]
fn write_partial(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::os::unix::prelude::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o755)
        .open(path)?;
    file.write_all(data)
}

#[cfg(not(target_family = "unix"))]
fn write_partial(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(data)
}

/// Writes `data` next to its final location while its sha256 is checked,
/// and moves it in place only once the checksum matched. On any failure
/// the partial file is removed, so `solc` is either complete or absent.
async fn install_executable(
    data: Bytes,
    sha256: H256,
    folder: &Path,
    ver: &Version,
) -> Result<PathBuf, FetchError> {
    let dir = folder.join(ver.to_string());
    let solc = dir.join("solc");
    let partial = dir.join("solc.partial");

    let write = {
        let partial = partial.clone();
        let data = data.clone();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&dir)?;
            write_partial(&partial, &data)
        })
    };
    let check = tokio::task::spawn_blocking(move || validate_checksum(&data, sha256));
    let (check, write) = futures::join!(check, write);

    let installed = match (check?, write?) {
        (Err(mismatch), _) => Err(FetchError::from(mismatch)),
        (_, Err(err)) => Err(FetchError::from(err)),
        (Ok(()), Ok(())) => tokio::fs::rename(&partial, &solc)
            .await
            .map_err(FetchError::from),
    };
    if let Err(err) = &installed {
        log::warn!("failed to install solc {}: {}", ver, err);
        match tokio::fs::remove_file(&partial).await {
            Err(err) if err.kind() != ErrorKind::NotFound => {
                log::warn!("couldn't remove {}: {}", partial.display(), err)
            }
            _ => {}
        }
    }
    installed.map(|()| solc)
}

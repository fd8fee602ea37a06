use super::{
    fetcher::{download_executable, FetchError, Fetcher},
    version::Version,
};
use crate::{audit::VersionRegistry, scheduler};
use async_trait::async_trait;
use cron::Schedule;
use primitive_types::H256;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use thiserror::Error;
use url::Url;

mod json {
    use crate::compiler::Version;
    use primitive_types::H256;
    use serde::{Deserialize, Serialize};
    use url::Url;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    pub struct List {
        pub builds: Vec<CompilerInfo>,
    }

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct CompilerInfo {
        pub path: DownloadPath,
        #[serde(with = "serde_with::rust::display_fromstr")]
        pub long_version: Version,
        pub sha256: H256,
    }

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    #[serde(untagged)]
    pub enum DownloadPath {
        Url(Url),
        Filename(String),
    }
}

type VersionsMap = HashMap<Version, CompilerInfo>;

#[derive(Debug, PartialEq, Clone)]
struct CompilerInfo {
    pub url: Url,
    pub sha256: H256,
}

#[derive(Error, Debug)]
pub enum ListError {
    #[error("fetching list json returned error: {0}")]
    ListJsonFetch(reqwest::Error),
    #[error("cannot parse list json file: {0}")]
    ParseListJson(reqwest::Error),
    #[error("error parsing 'path' field: {0}")]
    Path(url::ParseError),
}

async fn try_fetch_versions(versions_list_url: &Url) -> Result<VersionsMap, ListError> {
    let list_json_file: json::List = reqwest::get(versions_list_url.as_str())
        .await
        .map_err(ListError::ListJsonFetch)?
        .json()
        .await
        .map_err(ListError::ParseListJson)?;
    try_parse_json_file(list_json_file, versions_list_url)
}

fn try_parse_json_file(
    list_json_file: json::List,
    versions_list_url: &Url,
) -> Result<VersionsMap, ListError> {
    list_json_file
        .builds
        .into_iter()
        .map(|json_compiler_info| {
            let version = json_compiler_info.long_version.clone();
            CompilerInfo::try_from((json_compiler_info, versions_list_url))
                .map(|compiler_info| (version, compiler_info))
                .map_err(ListError::Path)
        })
        .collect()
}

impl TryFrom<(json::CompilerInfo, &Url)> for CompilerInfo {
    type Error = url::ParseError;

    fn try_from(
        (compiler_info, download_url): (json::CompilerInfo, &Url),
    ) -> Result<Self, Self::Error> {
        let url = match compiler_info.path {
            json::DownloadPath::Url(url) => url,
            // download_url ends with `.../list.json` but join() will replace this with `filename`
            json::DownloadPath::Filename(filename) => download_url.join(&filename)?,
        };
        Ok(Self {
            url,
            sha256: compiler_info.sha256,
        })
    }
}

#[derive(Default, Clone)]
struct Versions(Arc<parking_lot::RwLock<VersionsMap>>);

impl Versions {
    fn spawn_refresh_job(self, versions_list_url: Url, cron_schedule: Schedule) {
        log::info!("spawn version refresh job");
        scheduler::spawn_job(cron_schedule, "refresh compiler versions", move || {
            let versions_list_url = versions_list_url.clone();
            let versions = self.clone();
            async move {
                let refresh_result = versions.refresh_versions(&versions_list_url).await;
                if let Err(err) = refresh_result {
                    log::error!("error during version refresh: {}", err);
                };
            }
        });
    }

    async fn refresh_versions(&self, versions_list_url: &Url) -> anyhow::Result<()> {
        log::info!("looking for new compilers versions");
        let fetched_versions = try_fetch_versions(versions_list_url).await?;
        let need_to_update = {
            let versions = self.0.read();
            fetched_versions != *versions
        };
        if need_to_update {
            let (old_len, new_len) = {
                // we don't need to check condition again,
                // we can just override the value
                let mut versions = self.0.write();
                let old_len = versions.len();
                *versions = fetched_versions;
                (old_len, versions.len())
            };
            log::info!(
                "found new compiler versions. old length: {}, new length: {}",
                old_len,
                new_len,
            );
        } else {
            log::info!("no new versions found")
        }
        Ok(())
    }

    /// Newest release whose `major.minor.patch` equals `short_version`.
    /// A long version present in the list resolves to itself.
    fn resolve(&self, short_version: &str) -> Option<Version> {
        let requested = short_version.trim().trim_start_matches('v');
        let versions = self.0.read();
        if let Ok(long) = requested.parse::<Version>() {
            return versions.contains_key(&long).then_some(long);
        }
        versions
            .keys()
            .filter(|ver| ver.is_release() && ver.short() == requested)
            .max()
            .cloned()
    }
}

/// Compiler registry backed by a solc `list.json` file.
///
/// Serves both as the source of compiler binaries and as the
/// registry turning short versions into long ones.
///
/// Long-lived users may pass a cron schedule to keep the list fresh;
/// without one the list is fetched once, on creation.
#[derive(Default)]
pub struct ListFetcher {
    compiler_versions: Versions,
    folder: PathBuf,
}

impl ListFetcher {
    pub async fn new(
        versions_list_url: Url,
        refresh_versions_schedule: Option<Schedule>,
        folder: PathBuf,
    ) -> anyhow::Result<Self> {
        let compiler_versions = try_fetch_versions(&versions_list_url).await?;
        log::debug!(
            "fetched {} compiler versions from {}",
            compiler_versions.len(),
            versions_list_url
        );
        let compiler_versions = Versions(Arc::new(parking_lot::RwLock::new(compiler_versions)));
        if let Some(cron_schedule) = refresh_versions_schedule {
            compiler_versions
                .clone()
                .spawn_refresh_job(versions_list_url.clone(), cron_schedule)
        }
        Ok(Self {
            compiler_versions,
            folder,
        })
    }
}

#[async_trait]
impl Fetcher for ListFetcher {
    async fn fetch(&self, ver: &Version) -> Result<PathBuf, FetchError> {
        let compiler_info = {
            let compiler_versions = self.compiler_versions.0.read();
            compiler_versions
                .get(ver)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(ver.clone()))?
        };

        download_executable(&compiler_info.url, compiler_info.sha256, &self.folder, ver).await
    }
}

#[async_trait]
impl VersionRegistry for ListFetcher {
    async fn fetch_long_version(&self, short_version: &str) -> anyhow::Result<Option<String>> {
        let long_version = self.compiler_versions.resolve(short_version);
        log::debug!(
            "compiler version {} resolved to {:?}",
            short_version,
            long_version
        );
        Ok(long_version.map(|ver| ver.to_string()))
    }
}

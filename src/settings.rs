use crate::consts::DEFAULT_COMPILER_LIST;
use anyhow::anyhow;
use config::{Config, File};
use serde::{de::IgnoredAny, Deserialize};
use std::{num::NonZeroUsize, path::PathBuf};
use url::Url;

const CONFIG_ENV: &str = "CONTRACT_SOURCE_AUDIT__CONFIG";
const ENV_PREFIX: &str = "CONTRACT_SOURCE_AUDIT";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub compilers: CompilersSettings,

    pub config: IgnoredAny,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilersSettings {
    /// Location of the solc `list.json`.
    pub list_url: Url,
    /// Where downloaded compilers are stored.
    pub dir: PathBuf,
    /// Maximum number of compilers running at the same time.
    pub max_threads: NonZeroUsize,
}

impl Default for CompilersSettings {
    fn default() -> Self {
        Self {
            list_url: Url::try_from(DEFAULT_COMPILER_LIST).expect("valid url"),
            dir: std::env::temp_dir().join("solidity-compilers"),
            max_threads: NonZeroUsize::new(8).expect("is not zero"),
        }
    }
}

impl Settings {
    /// Reads the file named by `CONTRACT_SOURCE_AUDIT__CONFIG`, if any,
    /// and applies `CONTRACT_SOURCE_AUDIT__*` environment overrides.
    pub fn new() -> anyhow::Result<Self> {
        let config_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        Self::build(config_path)
    }

    /// Same as [`Settings::new`], but `config_path` takes precedence
    /// over the environment variable.
    pub fn build(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut builder = Config::builder();
        if let Some(config_path) = config_path {
            builder = builder.add_source(File::from(config_path));
        };
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()?
            .try_deserialize()
            .map_err(|err| anyhow!(err))
    }
}

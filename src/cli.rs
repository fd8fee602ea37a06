use crate::{
    audit::{ContractSourceAudit, ContractSourceAuditor},
    bundle,
    compiler::{Compilers, ListFetcher},
    settings::Settings,
};
use anyhow::Context;
use clap::Parser;
use std::{path::PathBuf, sync::Arc};

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Settings file; `CONTRACT_SOURCE_AUDIT__CONFIG` is used when not set.
    #[clap(short, long)]
    pub config: Option<PathBuf>,
    /// Directory with the uploaded sources and metadata files.
    #[clap(short, long)]
    pub sources: PathBuf,
    /// Compiler version as typed by the user, e.g. `0.8.17`.
    #[clap(long)]
    pub compiler_version: String,
    /// Deployed bytecode in hex, or `@path` to a file containing it.
    #[clap(long)]
    pub deployed_bytecode: String,
}

impl Args {
    pub fn settings(&self) -> anyhow::Result<Settings> {
        match &self.config {
            Some(config_path) => Settings::build(Some(config_path.clone())),
            None => Settings::new(),
        }
    }

    pub fn read_deployed_bytecode(&self) -> anyhow::Result<String> {
        match self.deployed_bytecode.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path)
                .map(|code| code.trim().to_string())
                .with_context(|| format!("failed to read deployed bytecode from {path}")),
            None => Ok(self.deployed_bytecode.trim().to_string()),
        }
    }
}

/// Audits the sources named by `args` with compilers from the solc list.
pub async fn run(args: &Args, settings: Settings) -> anyhow::Result<ContractSourceAudit> {
    let files = bundle::load_dir(&args.sources)?;
    let deployed_bytecode = args.read_deployed_bytecode()?;
    log::info!(
        "auditing {} files from {}",
        files.len(),
        args.sources.display()
    );

    let fetcher = Arc::new(
        // a single audit never outlives the versions list, so no refresh job
        ListFetcher::new(settings.compilers.list_url, None, settings.compilers.dir)
        .await
        .context("failed to fetch compiler versions")?,
    );
    let compilers = Compilers::new(fetcher.clone(), settings.compilers.max_threads);
    let auditor = ContractSourceAuditor::new(fetcher, compilers);

    Ok(auditor
        .audit(&files, &args.compiler_version, &deployed_bytecode)
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args() {
        let args = Args::parse_from([
            "contract-source-audit",
            "--sources",
            "contracts",
            "--compiler-version",
            "0.8.17",
            "--deployed-bytecode",
            " 0x6080 ",
        ]);
        assert_eq!(args.config, None);
        assert_eq!(args.sources, PathBuf::from("contracts"));
        assert_eq!(args.read_deployed_bytecode().unwrap(), "0x6080");
    }

    #[test]
    fn read_bytecode_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployed_bytecode");
        std::fs::write(&path, "0x6080604052\n").unwrap();
        let args = Args::parse_from([
            "contract-source-audit",
            "-s",
            "contracts",
            "--compiler-version",
            "0.8.17",
            "--deployed-bytecode",
            &format!("@{}", path.display()),
        ]);
        assert_eq!(args.read_deployed_bytecode().unwrap(), "0x6080604052");
    }
}

use super::{
    input::ClassifiedFile,
    status::{AuditStatus, ItemStatus},
};
use crate::solidity::{SolcMetadata, StandardJsonInput};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("version registry failed: {0:#}")]
    VersionRegistry(anyhow::Error),
    #[error("compiler worker failed: {0:#}")]
    Compiler(anyhow::Error),
}

/// Proof the verdict relies on: the original solc metadata, or the
/// compiler input embedded in a HardHat build info.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedMetadata {
    Solc(SolcMetadata),
    HardHatInput(StandardJsonInput),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractAuditItem {
    path: String,
    content: Value,
    status: ItemStatus,
    target: bool,
}

impl ContractAuditItem {
    pub(super) fn new(file: &ClassifiedFile<'_>, status: ItemStatus, target: bool) -> Self {
        Self {
            path: file.path.to_string(),
            content: file.content.clone(),
            status,
            target,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Whether this file is authoritative for the deployed contract.
    ///
    /// At most one file of each kind is a target: when compiled sources
    /// are confirmed by solc metadata, both the source file declaring the
    /// contract and that metadata file are targets. A HardHat match or an
    /// unconfirmed compilation has a single target.
    pub fn target(&self) -> bool {
        self.target
    }
}

/// Result of verifying uploaded files against deployed bytecode.
///
/// Built once per verification attempt and never modified afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSourceAudit {
    status: AuditStatus,
    items: Vec<ContractAuditItem>,
    long_compiler_version: Option<String>,
    resolved_contract_name: Option<String>,
    resolved_metadata: Option<ResolvedMetadata>,
    missing_files: Vec<String>,
    #[serde(serialize_with = "serialize_failure")]
    failure: Option<Arc<Error>>,
}

fn serialize_failure<S: Serializer>(
    failure: &Option<Arc<Error>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match failure {
        Some(err) => serializer.collect_str(&format_args!("{err:#}")),
        None => serializer.serialize_none(),
    }
}

impl PartialEq for ContractSourceAudit {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.items == other.items
            && self.long_compiler_version == other.long_compiler_version
            && self.resolved_contract_name == other.resolved_contract_name
            && self.resolved_metadata == other.resolved_metadata
            && self.missing_files == other.missing_files
            && self.failure.as_ref().map(ToString::to_string)
                == other.failure.as_ref().map(ToString::to_string)
    }
}

impl ContractSourceAudit {
    pub(super) fn new(status: AuditStatus, items: Vec<ContractAuditItem>) -> Self {
        Self {
            status,
            items,
            long_compiler_version: None,
            resolved_contract_name: None,
            resolved_metadata: None,
            missing_files: vec![],
            failure: None,
        }
    }

    /// Every file is `Unknown` and none is the target.
    pub(super) fn unresolved<'a, 'b: 'a>(
        status: AuditStatus,
        files: impl IntoIterator<Item = &'a ClassifiedFile<'b>>,
    ) -> Self {
        let items = files
            .into_iter()
            .map(|file| ContractAuditItem::new(file, ItemStatus::Unknown, false))
            .collect();
        Self::new(status, items)
    }

    pub(super) fn with_long_compiler_version(mut self, version: String) -> Self {
        self.long_compiler_version = Some(version);
        self
    }

    pub(super) fn with_resolved_contract_name(mut self, name: String) -> Self {
        self.resolved_contract_name = Some(name);
        self
    }

    pub(super) fn with_resolved_metadata(mut self, metadata: Option<ResolvedMetadata>) -> Self {
        self.resolved_metadata = metadata;
        self
    }

    pub(super) fn with_missing_files(mut self, missing_files: Vec<String>) -> Self {
        self.missing_files = missing_files;
        self
    }

    pub(super) fn with_failure(mut self, failure: Error) -> Self {
        self.failure = Some(Arc::new(failure));
        self
    }

    pub fn status(&self) -> AuditStatus {
        self.status
    }

    pub fn items(&self) -> &[ContractAuditItem] {
        &self.items
    }

    pub fn long_compiler_version(&self) -> Option<&str> {
        self.long_compiler_version.as_deref()
    }

    pub fn resolved_contract_name(&self) -> Option<&str> {
        self.resolved_contract_name.as_deref()
    }

    pub fn resolved_metadata(&self) -> Option<&ResolvedMetadata> {
        self.resolved_metadata.as_ref()
    }

    /// Source paths the compiler could not find; only set on compilation errors.
    pub fn missing_files(&self) -> &[String] {
        &self.missing_files
    }

    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_deref()
    }

    pub fn target_items(&self) -> impl Iterator<Item = &ContractAuditItem> {
        self.items.iter().filter(|item| item.target)
    }

    pub fn is_verified(&self) -> bool {
        self.status == AuditStatus::Resolved
    }
}

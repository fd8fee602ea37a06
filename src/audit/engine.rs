use super::{
    collaborators::{CompilerWorker, VersionRegistry},
    input::{AuditFile, ClassifiedFile, ClassifiedFiles, Files},
    report::{ContractAuditItem, ContractSourceAudit, Error, ResolvedMetadata},
    status::{AuditStatus, ItemStatus},
};
use crate::solidity::{
    bytecode, find_hardhat_match, ContractRecord, HardHatMatch, SolcMetadata, SourceFidelity,
    StandardJsonInput,
};

/// Runs audits using the same pair of collaborators.
///
/// Holds no state of its own, so a single auditor may serve
/// any number of concurrent audits.
#[derive(Debug, Clone)]
pub struct ContractSourceAuditor<R, C> {
    registry: R,
    compiler: C,
}

impl<R: VersionRegistry, C: CompilerWorker> ContractSourceAuditor<R, C> {
    pub fn new(registry: R, compiler: C) -> Self {
        Self { registry, compiler }
    }

    pub async fn audit(
        &self,
        files: &Files,
        solc_version: &str,
        deployed_bytecode: &str,
    ) -> ContractSourceAudit {
        ContractSourceAudit::build(
            &self.registry,
            &self.compiler,
            files,
            solc_version,
            deployed_bytecode,
        )
        .await
    }
}

impl ContractSourceAudit {
    /// Verifies `files` against `deployed_bytecode`.
    ///
    /// A HardHat build info containing the deployed bytecode resolves the
    /// audit without compiling anything. Otherwise the raw sources are
    /// compiled with `solc_version` and the output is matched against
    /// the deployed bytecode. Never fails: errors of the collaborators
    /// end up in a [`AuditStatus::Failure`] report.
    pub async fn build<R, C>(
        registry: &R,
        compiler: &C,
        files: &Files,
        solc_version: &str,
        deployed_bytecode: &str,
    ) -> ContractSourceAudit
    where
        R: VersionRegistry + ?Sized,
        C: CompilerWorker + ?Sized,
    {
        let files = ClassifiedFiles::classify(files);

        let audit = match find_hardhat_match(deployed_bytecode, files.hardhat()) {
            Some(hardhat_match) => {
                log::info!(
                    "deployed bytecode found in hardhat build info {}",
                    hardhat_match.metadata_path
                );
                from_hardhat_match(&files, hardhat_match)
            }
            None => {
                log::debug!("no hardhat match, falling back to compilation");
                from_compilation(registry, compiler, &files, solc_version, deployed_bytecode).await
            }
        };
        log::info!(
            "audit finished with status {:?}, contract {:?}",
            audit.status(),
            audit.resolved_contract_name()
        );
        audit
    }
}

fn from_hardhat_match(files: &ClassifiedFiles<'_>, hardhat_match: HardHatMatch) -> ContractSourceAudit {
    let items = files
        .iter()
        .map(|file| {
            if file.path == hardhat_match.metadata_path {
                ContractAuditItem::new(file, ItemStatus::Ok, true)
            } else {
                ContractAuditItem::new(file, ItemStatus::Unused, false)
            }
        })
        .collect();
    ContractSourceAudit::new(AuditStatus::Resolved, items)
        .with_long_compiler_version(hardhat_match.long_compiler_version)
        .with_resolved_contract_name(hardhat_match.contract_name)
        .with_resolved_metadata(Some(ResolvedMetadata::HardHatInput(hardhat_match.input)))
}

async fn from_compilation<R, C>(
    registry: &R,
    compiler: &C,
    files: &ClassifiedFiles<'_>,
    solc_version: &str,
    deployed_bytecode: &str,
) -> ContractSourceAudit
where
    R: VersionRegistry + ?Sized,
    C: CompilerWorker + ?Sized,
{
    if files.sources().next().is_none() {
        log::info!("no source file to compile");
        return ContractSourceAudit::unresolved(AuditStatus::NoSourceFile, files.iter());
    }

    let long_version = match registry.fetch_long_version(solc_version).await {
        Ok(Some(long_version)) => long_version,
        Ok(None) => {
            log::info!("compiler version {} is unknown", solc_version);
            return ContractSourceAudit::unresolved(
                AuditStatus::UnknownCompilerVersion,
                files.iter(),
            );
        }
        Err(err) => {
            log::error!("failed to resolve compiler version {}: {:#}", solc_version, err);
            return ContractSourceAudit::unresolved(AuditStatus::Failure, files.iter())
                .with_failure(Error::VersionRegistry(err));
        }
    };
    log::debug!("compiler version {} resolved to {}", solc_version, long_version);

    let input = StandardJsonInput::from_sources(files.sources());
    let output = match compiler.run(&long_version, &input).await {
        Ok(output) => output,
        Err(err) => {
            log::error!("compiler {} failed: {:#}", long_version, err);
            return ContractSourceAudit::unresolved(AuditStatus::Failure, files.iter())
                .with_long_compiler_version(long_version)
                .with_failure(Error::Compiler(err));
        }
    };

    if output.has_errors() {
        let missing_files: Vec<_> = output
            .missing_files()
            .into_iter()
            .filter(|path| !files.contains(path))
            .collect();
        log::warn!(
            "compilation failed with {} errors, missing files: {:?}",
            output.errors().count(),
            missing_files
        );
        return ContractSourceAudit::unresolved(AuditStatus::CompilationErrors, files.iter())
            .with_long_compiler_version(long_version)
            .with_missing_files(missing_files);
    }

    let record = match output.find_contract(|emitted| bytecode::is_equal(deployed_bytecode, emitted))
    {
        Some(record) => record,
        None => {
            log::info!("no compiled contract matches the deployed bytecode");
            return ContractSourceAudit::unresolved(AuditStatus::Mismatch, files.iter())
                .with_long_compiler_version(long_version);
        }
    };
    log::debug!(
        "deployed bytecode matches {}:{}",
        record.source_file,
        record.contract_name
    );

    let resolved = files
        .metadata()
        .find(|(_, metadata)| metadata.contract_name() == record.contract_name);
    let status = match resolved {
        Some(_) => AuditStatus::Resolved,
        None => AuditStatus::Uncertain,
    };
    let items = files
        .iter()
        .map(|file| classify_item(file, &record, resolved))
        .collect();

    ContractSourceAudit::new(status, items)
        .with_long_compiler_version(long_version)
        .with_resolved_contract_name(record.contract_name)
        .with_resolved_metadata(resolved.map(|(_, metadata)| ResolvedMetadata::Solc(metadata.clone())))
}

/// Status of a single file once the compiled contract is known.
fn classify_item(
    file: &ClassifiedFile<'_>,
    record: &ContractRecord,
    resolved: Option<(&str, &SolcMetadata)>,
) -> ContractAuditItem {
    let is_target_source = file.path == record.source_file;
    let (status, target) = match (&file.kind, resolved) {
        (_, None) => (ItemStatus::Unknown, is_target_source),
        (AuditFile::Source(content), Some((_, metadata))) => {
            let status = match metadata.source_fidelity(file.path, content) {
                SourceFidelity::Unrecorded => ItemStatus::Unused,
                SourceFidelity::Matching => ItemStatus::Ok,
                SourceFidelity::Modified => ItemStatus::Dirty,
            };
            (status, is_target_source)
        }
        (AuditFile::SolcMetadata(_), Some((metadata_path, _))) if file.path == metadata_path => {
            (ItemStatus::Ok, true)
        }
        _ => (ItemStatus::Unused, false),
    };
    ContractAuditItem::new(file, status, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solidity::keccak256_hex;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn record() -> ContractRecord {
        ContractRecord {
            source_file: "A.sol".into(),
            contract_name: "A".into(),
        }
    }

    fn metadata() -> SolcMetadata {
        SolcMetadata::try_from(&json!({
            "compiler": { "version": "0.8.17+commit.8df45f5f" },
            "language": "Solidity",
            "settings": { "compilationTarget": { "A.sol": "A" } },
            "sources": {
                "A.sol": { "keccak256": format!("0x{}", keccak256_hex("contract A {}")) },
                "Lib.sol": { "keccak256": keccak256_hex("library Lib {}") }
            }
        }))
        .unwrap()
    }

    fn classify(path: &str, content: &Value, resolved: Option<(&str, &SolcMetadata)>) -> (ItemStatus, bool) {
        let file = ClassifiedFile {
            path,
            content,
            kind: AuditFile::decode(content),
        };
        let item = classify_item(&file, &record(), resolved);
        (item.status(), item.target())
    }

    #[test]
    fn classify_without_metadata() {
        assert_eq!(
            classify("A.sol", &json!("contract A {}"), None),
            (ItemStatus::Unknown, true)
        );
        assert_eq!(
            classify("B.sol", &json!("contract B {}"), None),
            (ItemStatus::Unknown, false)
        );
        assert_eq!(
            classify("notes.txt", &json!(42), None),
            (ItemStatus::Unknown, false)
        );
    }

    #[test]
    fn classify_with_metadata() {
        let metadata = metadata();
        let metadata_value = serde_json::to_value(&metadata).unwrap();
        let resolved = Some(("A.json", &metadata));

        assert_eq!(
            classify("A.sol", &json!("contract A {}"), resolved),
            (ItemStatus::Ok, true)
        );
        assert_eq!(
            classify("A.sol", &json!("contract A { }"), resolved),
            (ItemStatus::Dirty, true)
        );
        assert_eq!(
            classify("Lib.sol", &json!("library Lib {}"), resolved),
            (ItemStatus::Ok, false)
        );
        assert_eq!(
            classify("Unused.sol", &json!("contract U {}"), resolved),
            (ItemStatus::Unused, false)
        );
        assert_eq!(
            classify("A.json", &metadata_value, resolved),
            (ItemStatus::Ok, true)
        );
        assert_eq!(
            classify("other/A.json", &metadata_value, resolved),
            (ItemStatus::Unused, false)
        );
        assert_eq!(
            classify("notes.txt", &json!(42), resolved),
            (ItemStatus::Unused, false)
        );
    }
}

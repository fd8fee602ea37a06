use super::bytecode::normalize;
use crate::consts::SOLIDITY_LANGUAGE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Metadata json the compiler emits for a single contract.
///
/// Fields the audit does not read are kept in `other`
/// so the document can be handed back as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolcMetadata {
    pub compiler: Compiler,
    pub language: String,
    pub settings: MetadataSettings,
    pub sources: BTreeMap<String, MetadataSource>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compiler {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSettings {
    pub compilation_target: BTreeMap<String, String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataSource {
    pub keccak256: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("invalid metadata structure: {0}")]
    Structure(String),
    #[error("unsupported language: {0}")]
    Language(String),
    #[error("compilation target must have exactly one entry, found {0}")]
    CompilationTarget(usize),
}

/// How a source file relates to the hash recorded in metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFidelity {
    /// The path is not part of the metadata sources.
    Unrecorded,
    Matching,
    Modified,
}

impl TryFrom<&Value> for SolcMetadata {
    type Error = MetadataError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let metadata = SolcMetadata::deserialize(value)
            .map_err(|err| MetadataError::Structure(err.to_string()))?;
        if metadata.language != SOLIDITY_LANGUAGE {
            return Err(MetadataError::Language(metadata.language));
        }
        let targets = metadata.settings.compilation_target.len();
        if targets != 1 {
            return Err(MetadataError::CompilationTarget(targets));
        }
        Ok(metadata)
    }
}

impl SolcMetadata {
    /// `(source file, contract name)` this metadata describes.
    pub fn compilation_target(&self) -> (&str, &str) {
        self.settings
            .compilation_target
            .iter()
            .next()
            .map(|(file, contract)| (file.as_str(), contract.as_str()))
            .unwrap_or_default()
    }

    pub fn contract_name(&self) -> &str {
        self.compilation_target().1
    }

    pub fn recorded_hash(&self, path: &str) -> Option<&str> {
        self.sources
            .get(path)
            .map(|source| source.keccak256.as_str())
    }

    /// Compares keccak256 of `content` with the hash recorded for `path`.
    pub fn source_fidelity(&self, path: &str, content: &str) -> SourceFidelity {
        match self.recorded_hash(path) {
            None => SourceFidelity::Unrecorded,
            Some(recorded) if normalize(recorded) == keccak256_hex(content) => {
                SourceFidelity::Matching
            }
            Some(_) => SourceFidelity::Modified,
        }
    }
}

/// Hex encoded keccak256 of the UTF-8 bytes of `content`, without `0x`.
pub fn keccak256_hex(content: &str) -> String {
    hex::encode(ethers_core::utils::keccak256(content.as_bytes()))
}

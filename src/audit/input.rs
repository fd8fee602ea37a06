use crate::solidity::{HardHatBuildInfo, SolcMetadata};
use serde_json::Value;

/// Uploaded files: path -> content, in upload order.
///
/// Content is a json string for raw sources, or a json object
/// for metadata files. Anything else is kept but never used.
pub type Files = serde_json::Map<String, Value>;

/// Content of an input file decoded once, at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditFile<'a> {
    Source(&'a str),
    SolcMetadata(SolcMetadata),
    HardHat(HardHatBuildInfo),
    Malformed,
}

impl<'a> AuditFile<'a> {
    pub fn decode(content: &'a Value) -> Self {
        match content {
            Value::String(source) => Self::Source(source),
            Value::Object(_) => HardHatBuildInfo::from_value(content)
                .map(Self::HardHat)
                .or_else(|| SolcMetadata::try_from(content).ok().map(Self::SolcMetadata))
                .unwrap_or(Self::Malformed),
            _ => Self::Malformed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFile<'a> {
    pub path: &'a str,
    pub content: &'a Value,
    pub kind: AuditFile<'a>,
}

/// Input files together with their decoded kinds, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFiles<'a> {
    files: Vec<ClassifiedFile<'a>>,
}

impl<'a> ClassifiedFiles<'a> {
    pub fn classify(files: &'a Files) -> Self {
        let files = files
            .iter()
            .map(|(path, content)| {
                let kind = AuditFile::decode(content);
                if kind == AuditFile::Malformed {
                    log::debug!("{} is neither a source nor a known metadata file", path);
                }
                ClassifiedFile {
                    path: path.as_str(),
                    content,
                    kind,
                }
            })
            .collect();
        Self { files }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedFile<'a>> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|file| file.path == path)
    }

    pub fn hardhat(&self) -> impl Iterator<Item = (&'a str, &HardHatBuildInfo)> {
        self.files.iter().filter_map(|file| match &file.kind {
            AuditFile::HardHat(build_info) => Some((file.path, build_info)),
            _ => None,
        })
    }

    pub fn metadata(&self) -> impl Iterator<Item = (&'a str, &SolcMetadata)> {
        self.files.iter().filter_map(|file| match &file.kind {
            AuditFile::SolcMetadata(metadata) => Some((file.path, metadata)),
            _ => None,
        })
    }

    pub fn sources(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.files.iter().filter_map(|file| match file.kind {
            AuditFile::Source(content) => Some((file.path, content)),
            _ => None,
        })
    }
}

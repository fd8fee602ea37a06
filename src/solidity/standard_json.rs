use crate::consts::{OUTPUT_SELECTION, SOLIDITY_LANGUAGE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// `outputSelection`: file -> contract -> requested outputs.
pub type OutputSelection = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Compiler input in solc standard json format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardJsonInput {
    pub language: String,
    pub sources: BTreeMap<String, Source>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub output_selection: OutputSelection,
    /// Optimizer, evm version, remappings and everything else
    /// we pass to the compiler untouched.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl StandardJsonInput {
    /// Input compiling every source and requesting the metadata
    /// and deployed bytecode of every contract.
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let sources = sources
            .into_iter()
            .map(|(path, content)| {
                (
                    path.to_string(),
                    Source {
                        content: content.to_string(),
                    },
                )
            })
            .collect();
        let output_selection = BTreeMap::from([(
            "*".to_string(),
            BTreeMap::from([(
                "*".to_string(),
                OUTPUT_SELECTION.iter().map(ToString::to_string).collect(),
            )]),
        )]);
        Self {
            language: SOLIDITY_LANGUAGE.to_string(),
            sources,
            settings: Settings {
                output_selection,
                other: Map::new(),
            },
        }
    }
}

/// Compiler output in solc standard json format.
/// Only the parts the audit relies on are typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardJsonOutput {
    #[serde(default)]
    pub errors: Vec<CompilationError>,
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, CompiledContract>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationError {
    pub severity: Severity,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    pub message: String,
    #[serde(default)]
    pub formatted_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledContract {
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub evm: Option<Evm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evm {
    #[serde(default)]
    pub deployed_bytecode: Option<DeployedBytecode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployedBytecode {
    #[serde(default)]
    pub object: Option<String>,
}

/// Compiled contract whose deployed bytecode matched the on-chain one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    pub source_file: String,
    pub contract_name: String,
}

impl CompiledContract {
    pub fn deployed_bytecode(&self) -> Option<&str> {
        self.evm
            .as_ref()?
            .deployed_bytecode
            .as_ref()?
            .object
            .as_deref()
    }
}

impl StandardJsonOutput {
    /// Errors only; warnings and info messages are skipped.
    pub fn errors(&self) -> impl Iterator<Item = &CompilationError> {
        self.errors
            .iter()
            .filter(|err| err.severity == Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Paths the compiler tried to import but could not find,
    /// deduplicated, in the order they are reported.
    pub fn missing_files(&self) -> Vec<String> {
        self.errors()
            .filter_map(|err| missing_source(&err.message))
            .fold(Vec::new(), |mut missing, path| {
                if !missing.iter().any(|known| known == path) {
                    missing.push(path.to_string());
                }
                missing
            })
    }

    /// All compiled contracts as (file, contract name, contract),
    /// ordered by file path and then by contract name.
    pub fn contracts(&self) -> impl Iterator<Item = (&str, &str, &CompiledContract)> {
        self.contracts.iter().flat_map(|(file, contracts)| {
            contracts
                .iter()
                .map(move |(name, contract)| (file.as_str(), name.as_str(), contract))
        })
    }

    /// First contract whose deployed bytecode satisfies `matches`.
    pub fn find_contract(&self, matches: impl Fn(&str) -> bool) -> Option<ContractRecord> {
        self.contracts()
            .find(|(_, _, contract)| contract.deployed_bytecode().map_or(false, &matches))
            .map(|(file, name, _)| ContractRecord {
                source_file: file.to_string(),
                contract_name: name.to_string(),
            })
    }
}

/// Extracts `path` from `Source "path" not found: ...` messages.
fn missing_source(message: &str) -> Option<&str> {
    let rest = message.trim_start().strip_prefix("Source \"")?;
    let (path, _) = rest.split_once("\" not found")?;
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::parse::test_serialize_json_ok;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serialize_input() {
        let input = StandardJsonInput::from_sources([("A.sol", "contract A {}")]);
        test_serialize_json_ok(vec![(
            input,
            json!({
                "language": "Solidity",
                "sources": { "A.sol": { "content": "contract A {}" } },
                "settings": {
                    "outputSelection": {
                        "*": { "*": ["metadata", "evm.deployedBytecode.object"] }
                    }
                }
            }),
        )]);
    }

    #[test]
    fn parse_input_keeps_other_settings() {
        let input: StandardJsonInput = serde_json::from_value(json!({
            "language": "Solidity",
            "sources": { "A.sol": { "content": "contract A {}" } },
            "settings": {
                "optimizer": { "enabled": true, "runs": 200 },
                "outputSelection": { "*": { "*": ["abi"] } }
            }
        }))
        .unwrap();
        assert_eq!(
            input.settings.other.get("optimizer"),
            Some(&json!({ "enabled": true, "runs": 200 }))
        );
        assert_eq!(input.settings.output_selection["*"]["*"], vec!["abi"]);
    }

    fn output() -> StandardJsonOutput {
        serde_json::from_value(json!({
            "errors": [
                {
                    "severity": "warning",
                    "type": "Warning",
                    "message": "Source \"Ignored.sol\" not found: only a warning"
                },
                {
                    "severity": "error",
                    "type": "ParserError",
                    "message": "Source \"Missing.sol\" not found: File import callback not supported",
                    "formattedMessage": "ParserError: Source \"Missing.sol\" not found"
                },
                {
                    "severity": "error",
                    "type": "ParserError",
                    "message": "Source \"Missing.sol\" not found: File import callback not supported"
                },
                {
                    "severity": "error",
                    "type": "TypeError",
                    "message": "Undeclared identifier."
                },
                {
                    "severity": "error",
                    "type": "ParserError",
                    "message": "Source \"lib/Other.sol\" not found: File not found."
                }
            ],
            "contracts": {
                "B.sol": {
                    "B": { "evm": { "deployedBytecode": { "object": "6002" } } },
                    "Lib": { "evm": { "deployedBytecode": { "object": "6001" } } }
                },
                "A.sol": {
                    "A": { "metadata": "{}", "evm": { "deployedBytecode": { "object": "6001" } } },
                    "NoCode": {}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn extract_missing_files() {
        let output = output();
        assert!(output.has_errors());
        assert_eq!(output.errors().count(), 4);
        assert_eq!(output.missing_files(), vec!["Missing.sol", "lib/Other.sol"]);
    }

    #[test]
    fn find_first_matching_contract() {
        let output = output();
        assert_eq!(
            output.find_contract(|code| code == "6001"),
            Some(ContractRecord {
                source_file: "A.sol".into(),
                contract_name: "A".into(),
            })
        );
        assert_eq!(
            output.find_contract(|code| code == "6002"),
            Some(ContractRecord {
                source_file: "B.sol".into(),
                contract_name: "B".into(),
            })
        );
        assert_eq!(output.find_contract(|code| code == "6003"), None);
    }

    #[test]
    fn unknown_severity_is_not_an_error() {
        let output: StandardJsonOutput = serde_json::from_value(json!({
            "errors": [{ "severity": "fatal-ish", "message": "?" }]
        }))
        .unwrap();
        assert_eq!(output.errors[0].severity, Severity::Unknown);
        assert!(!output.has_errors());
        assert!(output.contracts.is_empty());
    }
}

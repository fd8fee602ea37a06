use super::{
    bytecode,
    standard_json::{StandardJsonInput, StandardJsonOutput},
};
use crate::consts::HARDHAT_BUILD_INFO_FORMAT;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Build info file HardHat writes to `artifacts/build-info/`.
/// Carries the complete compiler input and output of one compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardHatBuildInfo {
    #[serde(rename = "_format")]
    pub format: String,
    #[serde(default)]
    pub id: Option<String>,
    pub solc_version: String,
    pub solc_long_version: String,
    pub input: StandardJsonInput,
    pub output: StandardJsonOutput,
}

impl HardHatBuildInfo {
    /// Structural sniff: `None` unless the value has the build info shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        let build_info = HardHatBuildInfo::deserialize(value).ok()?;
        build_info
            .format
            .starts_with(HARDHAT_BUILD_INFO_FORMAT)
            .then_some(build_info)
    }
}

/// Contract found inside a HardHat build info whose bytecode
/// equals the deployed one.
#[derive(Debug, Clone, PartialEq)]
pub struct HardHatMatch {
    pub long_compiler_version: String,
    pub contract_name: String,
    pub source_file: String,
    pub metadata_path: String,
    pub input: StandardJsonInput,
}

/// Scans build infos in the given order; the first matching contract wins.
pub fn find_match<'a, 'b>(
    deployed_bytecode: &str,
    build_infos: impl IntoIterator<Item = (&'a str, &'b HardHatBuildInfo)>,
) -> Option<HardHatMatch> {
    build_infos.into_iter().find_map(|(path, build_info)| {
        build_info
            .output
            .find_contract(|emitted| bytecode::is_equal_ignoring_auxdata(deployed_bytecode, emitted))
            .map(|record| HardHatMatch {
                long_compiler_version: build_info.solc_long_version.clone(),
                contract_name: record.contract_name,
                source_file: record.source_file,
                metadata_path: path.to_string(),
                input: build_info.input.clone(),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn build_info(format: &str, contracts: Value) -> Value {
        json!({
            "_format": format,
            "id": "5a0d4e2f7b1c9c1b6e0c1f3c0b2c2e11",
            "solcVersion": "0.8.17",
            "solcLongVersion": "0.8.17+commit.8df45f5f",
            "input": {
                "language": "Solidity",
                "sources": { "contracts/Greeter.sol": { "content": "contract Greeter {}" } },
                "settings": { "optimizer": { "enabled": false, "runs": 200 } }
            },
            "output": { "contracts": contracts }
        })
    }

    fn contracts(code: &str) -> Value {
        json!({
            "contracts/Greeter.sol": {
                "Greeter": { "evm": { "deployedBytecode": { "object": code } } }
            }
        })
    }

    #[test]
    fn sniff_build_info() {
        let value = build_info("hh-sol-build-info-1", contracts("6080"));
        let info = HardHatBuildInfo::from_value(&value).expect("build info expected");
        assert_eq!(info.solc_long_version, "0.8.17+commit.8df45f5f");
        assert_eq!(
            info.input.sources["contracts/Greeter.sol"].content,
            "contract Greeter {}"
        );

        let unknown_format = build_info("truffle-artifact", contracts("6080"));
        assert_eq!(HardHatBuildInfo::from_value(&unknown_format), None);
        assert_eq!(HardHatBuildInfo::from_value(&json!("contract A {}")), None);
        assert_eq!(
            HardHatBuildInfo::from_value(&json!({ "_format": "hh-sol-build-info-1" })),
            None
        );
    }

    #[test]
    fn first_matching_build_info_wins() {
        let unrelated = HardHatBuildInfo::from_value(&build_info(
            "hh-sol-build-info-1",
            contracts("6001"),
        ))
        .unwrap();
        let first = HardHatBuildInfo::from_value(&build_info(
            "hh-sol-build-info-1",
            contracts("6080"),
        ))
        .unwrap();
        let second = first.clone();

        let found = find_match(
            "0x6080",
            [
                ("build-info/a.json", &unrelated),
                ("build-info/b.json", &first),
                ("build-info/c.json", &second),
            ],
        )
        .expect("match expected");
        assert_eq!(
            found,
            HardHatMatch {
                long_compiler_version: "0.8.17+commit.8df45f5f".into(),
                contract_name: "Greeter".into(),
                source_file: "contracts/Greeter.sol".into(),
                metadata_path: "build-info/b.json".into(),
                input: first.input.clone(),
            }
        );

        assert_eq!(find_match("0x6002", [("build-info/a.json", &unrelated)]), None);
    }
}

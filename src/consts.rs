#[cfg(target_os = "linux")]
pub const DEFAULT_COMPILER_LIST: &str = "https://binaries.soliditylang.org/linux-amd64/list.json";
#[cfg(target_os = "macos")]
pub const DEFAULT_COMPILER_LIST: &str = "https://binaries.soliditylang.org/macosx-amd64/list.json";
#[cfg(target_os = "windows")]
pub const DEFAULT_COMPILER_LIST: &str = "https://binaries.soliditylang.org/windows-amd64/list.json";

/// The only `language` accepted in solc metadata and standard json input.
pub const SOLIDITY_LANGUAGE: &str = "Solidity";

/// Outputs requested from the compiler for every contract in every file.
pub const OUTPUT_SELECTION: [&str; 2] = ["metadata", "evm.deployedBytecode.object"];

/// Prefix of `_format` in HardHat build info files (e.g. "hh-sol-build-info-1").
pub const HARDHAT_BUILD_INFO_FORMAT: &str = "hh-sol-build-info";

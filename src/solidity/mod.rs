pub mod bytecode;
mod hardhat;
mod metadata;
mod standard_json;

pub use hardhat::{find_match as find_hardhat_match, HardHatBuildInfo, HardHatMatch};
pub use metadata::{keccak256_hex, MetadataError, SolcMetadata, SourceFidelity};
pub use standard_json::{
    CompilationError, CompiledContract, ContractRecord, Severity, StandardJsonInput,
    StandardJsonOutput,
};

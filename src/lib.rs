pub mod audit;
mod bundle;
mod cli;
pub mod compiler;
mod consts;
mod mismatch;
mod scheduler;
mod settings;
pub mod solidity;


pub use self::settings::{CompilersSettings, Settings};
pub use audit::{
    AuditStatus, CompilerWorker, ContractAuditItem, ContractSourceAudit, ContractSourceAuditor,
    Files, ItemStatus, VersionRegistry,
};
pub use bundle::load_dir;
pub use cli::{run, Args};
pub use consts::DEFAULT_COMPILER_LIST;

mod collaborators;
mod engine;
mod input;
mod report;
mod status;

pub use collaborators::{CompilerWorker, VersionRegistry};
pub use engine::ContractSourceAuditor;
pub use input::{AuditFile, Files};
pub use report::{ContractAuditItem, ContractSourceAudit, Error, ResolvedMetadata};
pub use status::{AuditStatus, ItemStatus};

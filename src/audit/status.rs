use serde::Serialize;

/// Verdict of one audit, in ascending confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AuditStatus {
    /// No HardHat match and no source file to compile.
    NoSourceFile,
    /// Unexpected error while resolving, compiling or matching.
    Failure,
    UnknownCompilerVersion,
    CompilationErrors,
    /// Compiled fine, but no contract has the deployed bytecode.
    Mismatch,
    /// Bytecode matched, no original metadata to corroborate it.
    Uncertain,
    Resolved,
}

/// Provenance of a single input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemStatus {
    Ok,
    Unused,
    /// Source differs from the hash recorded in the resolved metadata.
    Dirty,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_ordered_by_confidence() {
        let ordered = [
            AuditStatus::NoSourceFile,
            AuditStatus::Failure,
            AuditStatus::UnknownCompilerVersion,
            AuditStatus::CompilationErrors,
            AuditStatus::Mismatch,
            AuditStatus::Uncertain,
            AuditStatus::Resolved,
        ];
        assert!(ordered.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

use thiserror::Error;

/// Hard failures of row assembly. Missing inputs and malformed timing are
/// not errors; they degrade to an empty or partial row instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("cannot decode pipeline token {token:?}: {reason}")]
    Encoding { token: String, reason: String },
}

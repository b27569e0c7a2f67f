use std::path::PathBuf;

use thiserror::Error;

use crate::schema::ColumnRole;

/// Fatal conditions a run can end with. Everything else is absorbed
/// (unparsable dates drop the row, unreadable sidecars are skipped).
#[derive(Error, Debug)]
pub enum YtdError {
    #[error("no primary input found; tried {tried:?}")]
    MissingInput { tried: Vec<PathBuf> },

    #[error("could not detect a {role} column; columns: {columns:?}")]
    SchemaResolution {
        role: ColumnRole,
        columns: Vec<String>,
    },

    #[error("no amount column and no sidecar candidates under {dir:?}")]
    NoSidecarCandidates { dir: PathBuf },

    #[error("no sidecar produced a merged amount; tried {tried:?}")]
    ReconciliationExhausted { tried: Vec<PathBuf> },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl YtdError {
    /// Process exit status for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            YtdError::MissingInput { .. } => 2,
            _ => 1,
        }
    }
}

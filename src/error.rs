use thiserror::Error;

use crate::data::snapshot::EntityKind;
use crate::decode::{DecodeError, FuncType};

/// Failures while assembling or hydrating an entity.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },
    /// A dataVals string in the snapshot could not be decoded.
    #[error("function {func_id} ({func_type}): cannot decode {raw:?}: {source}")]
    Decode {
        func_id: i64,
        func_type: FuncType,
        raw: String,
        #[source]
        source: DecodeError,
    },
    /// An id reached through another row or an inverted index is absent from the snapshot.
    #[error("{kind} {id} is referenced but missing from the snapshot")]
    MissingSource { kind: EntityKind, id: i64 },
}

impl EngineError {
    /// Re-classify a lookup miss on a referenced id as a data defect.
    pub(crate) fn into_missing_source(self) -> Self {
        match self {
            Self::NotFound { kind, id } => Self::MissingSource { kind, id },
            other => other,
        }
    }
}

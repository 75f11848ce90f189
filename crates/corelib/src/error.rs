//! Registry errors. Every variant is recoverable: a rejected call leaves the registry untouched.

use thiserror::Error;

use crate::body::{BodyId, BodyKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{0} already exists")]
    AlreadyExists(BodyKind),
    #[error("cannot add {kind}: add a {requires} first")]
    MissingPrerequisite { kind: BodyKind, requires: BodyKind },
    #[error("cannot add {kind}: limit of {max} reached")]
    CapacityExceeded { kind: BodyKind, max: usize },
    #[error("{kind} has invalid parent {parent:?}")]
    InvalidParent {
        kind: BodyKind,
        parent: Option<BodyId>,
    },
    #[error("invalid config value `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

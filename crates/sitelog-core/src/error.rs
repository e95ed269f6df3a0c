use thiserror::Error;

use crate::session::{Capability, Role};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("no user registered for {0}")]
    UnknownUser(String),

    #[error("row {index} out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("{role} may not {capability}")]
    NotPermitted { role: Role, capability: Capability },
}

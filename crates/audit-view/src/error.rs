//! Errors surfaced by view operations.

use audit_types::{GatewayError, InvalidFieldValue, RegulationId};

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),
    #[error("no result row with id {0}")]
    UnknownRecord(RegulationId),
    #[error(transparent)]
    InvalidValue(#[from] InvalidFieldValue),
    #[error("invalid setting: {0}")]
    Validation(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

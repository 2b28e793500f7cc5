//! Error taxonomy for report operations.

use wastewatch_db::DbError;
use wastewatch_types::{ReportId, ReportStatus};

use crate::validation::PayloadField;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("a user is already registered")]
    AlreadyRegistered,

    #[error("caller is not the registered identity")]
    Unauthorized,

    #[error("invalid payload, missing or empty: {}", format_fields(.0))]
    InvalidPayload(Vec<PayloadField>),

    #[error("invalid status {0:?}, expected one of pending, in_progress, resolved")]
    InvalidStatus(String),

    #[error("report {id} is {current}, only in_progress reports can be resolved")]
    InvalidTransition { id: ReportId, current: ReportStatus },

    #[error("report {0} not found")]
    NotFound(ReportId),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        Self::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

fn format_fields(fields: &[PayloadField]) -> String {
    fields
        .iter()
        .map(PayloadField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

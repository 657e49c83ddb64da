use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::model::record::RecordStatus;

/// Failures surfaced by a [`RecordStore`](crate::store::RecordStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The (employee, date) or employee-login uniqueness key is already taken.
    #[error("uniqueness constraint violated")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt {entity} row {id}: {detail}")]
    Corrupt {
        entity: &'static str,
        id: String,
        detail: String,
    },
}

/// Errors returned by [`AttendanceService`](crate::service::AttendanceService)
/// operations. Every variant carries the ids needed to act on it.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid {field}: {value:?}")]
    InvalidInput { field: &'static str, value: String },

    #[error("attendance already recorded for {employee_id} on {date}")]
    DuplicateRecord {
        employee_id: String,
        date: NaiveDate,
    },

    #[error("login {login} is already taken")]
    DuplicateIdentifier { login: String },

    #[error("attendance record {record_id} not found")]
    RecordNotFound { record_id: Uuid },

    #[error("employee {employee_id} not found")]
    EmployeeNotFound { employee_id: String },

    /// Decision attempted on a record that already left the pending state.
    #[error("attendance record {record_id} is already {status}")]
    InvalidStateTransition {
        record_id: Uuid,
        status: RecordStatus,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Failures of a monthly export job. The whole job aborts on the first error;
/// no partial archive is ever published.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export period {year}-{month:02}")]
    InvalidPeriod { year: i32, month: u32 },

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// An approved record references an employee the store no longer has.
    #[error("employee {employee_id} referenced by approved records but missing")]
    MissingEmployee { employee_id: String },

    #[error("failed to render report for {employee_id}: {source}")]
    Render {
        employee_id: String,
        #[source]
        source: RenderError,
    },

    #[error("failed to write archive: {0}")]
    Archive(#[from] std::io::Error),

    #[error("failed to bundle archive: {0}")]
    Bundle(#[from] zip::result::ZipError),
}

/// Failures while rendering a single per-employee report.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("pdf: {0}")]
    Pdf(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

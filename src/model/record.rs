use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Classification of a worked day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Shift {
    Day,
    Night,
    Travel,
}

/// Lifecycle state of an attendance record.
///
/// `Pending` is the only state with an outgoing transition; `Approved` and
/// `Rejected` are terminal. A wrong decision is corrected with a new record,
/// never by re-deciding this one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RecordStatus {
    Pending,
    Approved,
    Rejected,
}

/// An admin's binding ruling on a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(self) -> RecordStatus {
        match self {
            Decision::Approve => RecordStatus::Approved,
            Decision::Reject => RecordStatus::Rejected,
        }
    }
}

/// One employee's claim of having worked a given date under a given shift.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "6d2f1e3e-5b0a-4c8e-9f21-0f2b7c9a1d44", value_type = String)]
    pub id: Uuid,

    #[schema(example = "dupont.jean")]
    pub employee_id: String,

    #[schema(example = "2025-03-10", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "day")]
    pub shift: Shift,

    #[schema(example = "pending")]
    pub status: RecordStatus,

    #[schema(example = "2025-03-10T08:12:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(example = "2025-03-11T09:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub decided_at: Option<DateTime<Utc>>,

    #[schema(example = "admin.admin", nullable = true)]
    pub decided_by: Option<String>,
}

impl AttendanceRecord {
    /// A fresh record in the initial `Pending` state, with no decision stamp.
    pub fn pending(
        employee_id: String,
        date: NaiveDate,
        shift: Shift,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            date,
            shift,
            status: RecordStatus::Pending,
            created_at,
            decided_at: None,
            decided_by: None,
        }
    }
}

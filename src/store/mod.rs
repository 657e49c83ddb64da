//! Durable keyed storage for employees and attendance records.
//!
//! All application state is reachable only through an injected
//! `Arc<dyn RecordStore>` handle. [`MySqlStore`] is the production backend;
//! [`MemoryStore`] backs tests and embedded use with the same invariants:
//! the (employee, date) uniqueness key is enforced at insertion, and the
//! decision transition is a per-record compare-and-set.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::employee::Employee;
use crate::model::record::{AttendanceRecord, RecordStatus};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Result of a compare-and-set decision attempt.
///
/// Two callers racing on the same pending record observe exactly one
/// `Updated` and one `NotPending`.
#[derive(Debug)]
pub enum DecisionApplied {
    Updated(AttendanceRecord),
    NotPending(RecordStatus),
    Missing,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rejects a second employee with the same login with [`StoreError::Duplicate`].
    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError>;

    async fn employee(&self, id: &str) -> Result<Option<Employee>, StoreError>;

    async fn employees(&self) -> Result<Vec<Employee>, StoreError>;

    /// Rejects a second record for the same (employee, date), in any status,
    /// with [`StoreError::Duplicate`].
    async fn insert_record(&self, record: &AttendanceRecord) -> Result<(), StoreError>;

    async fn record(&self, id: &Uuid) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Returns whether a record was actually removed.
    async fn delete_record(&self, id: &Uuid) -> Result<bool, StoreError>;

    /// Atomically moves a record from `Pending` to the given terminal status,
    /// stamping the deciding admin and timestamp. The update only applies if
    /// the record is still pending at the moment of the write.
    async fn apply_decision(
        &self,
        id: &Uuid,
        status: RecordStatus,
        admin_id: &str,
        decided_at: DateTime<Utc>,
    ) -> Result<DecisionApplied, StoreError>;

    async fn pending(&self) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn by_employee_in_range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Approved records with a date inside `[from, to]`, ordered by
    /// (date, id). The returned set is owned by the caller and serves as the
    /// export's stable snapshot: later mutations do not affect it.
    async fn approved_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
}

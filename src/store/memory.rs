use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::employee::Employee;
use crate::model::record::{AttendanceRecord, RecordStatus};
use crate::store::{DecisionApplied, RecordStore};

/// In-memory [`RecordStore`] with the same invariants as the MySQL backend.
///
/// The decision compare-and-set runs under the write lock, so racing
/// `apply_decision` calls on the same record serialize and exactly one wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    employees: BTreeMap<String, Employee>,
    records: HashMap<Uuid, AttendanceRecord>,
    // secondary index enforcing the one-record-per-day invariant
    by_day: HashMap<(String, NaiveDate), Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("attendance store poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("attendance store poisoned")
    }
}

fn sorted(mut records: Vec<AttendanceRecord>) -> Vec<AttendanceRecord> {
    records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    records
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        let mut inner = self.write();
        if inner.employees.contains_key(&employee.id) {
            return Err(StoreError::Duplicate);
        }
        inner.employees.insert(employee.id.clone(), employee.clone());
        Ok(())
    }

    async fn employee(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self.read().employees.get(id).cloned())
    }

    async fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.read().employees.values().cloned().collect())
    }

    async fn insert_record(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let mut inner = self.write();
        let key = (record.employee_id.clone(), record.date);
        if inner.by_day.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        inner.by_day.insert(key, record.id);
        inner.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn record(&self, id: &Uuid) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self.read().records.get(id).cloned())
    }

    async fn delete_record(&self, id: &Uuid) -> Result<bool, StoreError> {
        let mut inner = self.write();
        match inner.records.remove(id) {
            Some(record) => {
                inner.by_day.remove(&(record.employee_id, record.date));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn apply_decision(
        &self,
        id: &Uuid,
        status: RecordStatus,
        admin_id: &str,
        decided_at: DateTime<Utc>,
    ) -> Result<DecisionApplied, StoreError> {
        let mut inner = self.write();
        let Some(record) = inner.records.get_mut(id) else {
            return Ok(DecisionApplied::Missing);
        };
        if record.status != RecordStatus::Pending {
            return Ok(DecisionApplied::NotPending(record.status));
        }
        record.status = status;
        record.decided_by = Some(admin_id.to_string());
        record.decided_at = Some(decided_at);
        Ok(DecisionApplied::Updated(record.clone()))
    }

    async fn pending(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(sorted(
            self.read()
                .records
                .values()
                .filter(|r| r.status == RecordStatus::Pending)
                .cloned()
                .collect(),
        ))
    }

    async fn by_employee_in_range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(sorted(
            self.read()
                .records
                .values()
                .filter(|r| r.employee_id == employee_id && r.date >= from && r.date <= to)
                .cloned()
                .collect(),
        ))
    }

    async fn approved_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(sorted(
            self.read()
                .records
                .values()
                .filter(|r| r.status == RecordStatus::Approved && r.date >= from && r.date <= to)
                .cloned()
                .collect(),
        ))
    }
}

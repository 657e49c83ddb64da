use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{ServiceError, StoreError};
use crate::model::employee::{Employee, Role, login};
use crate::model::record::{AttendanceRecord, Decision, Shift};
use crate::store::{DecisionApplied, RecordStore};

/// Enforces record creation rules and the approval state machine on top of an
/// injected [`RecordStore`]. Holds no state of its own.
pub struct AttendanceService {
    store: Arc<dyn RecordStore>,
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ServiceError::InvalidInput {
        field,
        value: value.to_string(),
    })
}

impl AttendanceService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Record a worked day for an employee. The new record starts `Pending`.
    pub async fn create_record(
        &self,
        employee_id: &str,
        date: &str,
        shift: &str,
    ) -> Result<AttendanceRecord, ServiceError> {
        let date = parse_date("date", date)?;
        let shift: Shift = shift
            .trim()
            .parse()
            .map_err(|_| ServiceError::InvalidInput {
                field: "shift",
                value: shift.to_string(),
            })?;

        if self.store.employee(employee_id).await?.is_none() {
            return Err(ServiceError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            });
        }

        let record = AttendanceRecord::pending(employee_id.to_string(), date, shift, Utc::now());
        match self.store.insert_record(&record).await {
            Ok(()) => {
                tracing::info!(employee_id, %date, %shift, record_id = %record.id, "attendance recorded");
                Ok(record)
            }
            Err(StoreError::Duplicate) => Err(ServiceError::DuplicateRecord {
                employee_id: employee_id.to_string(),
                date,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply an admin decision to a pending record. Terminal states are
    /// immutable: a second decision fails with `InvalidStateTransition`.
    pub async fn decide(
        &self,
        record_id: Uuid,
        decision: Decision,
        admin_id: &str,
    ) -> Result<AttendanceRecord, ServiceError> {
        if self.store.employee(admin_id).await?.is_none() {
            return Err(ServiceError::EmployeeNotFound {
                employee_id: admin_id.to_string(),
            });
        }

        let applied = self
            .store
            .apply_decision(&record_id, decision.target_status(), admin_id, Utc::now())
            .await?;

        match applied {
            DecisionApplied::Updated(record) => {
                tracing::info!(%record_id, %decision, admin_id, "attendance decided");
                Ok(record)
            }
            DecisionApplied::NotPending(status) => {
                Err(ServiceError::InvalidStateTransition { record_id, status })
            }
            DecisionApplied::Missing => Err(ServiceError::RecordNotFound { record_id }),
        }
    }

    pub async fn record(&self, record_id: Uuid) -> Result<AttendanceRecord, ServiceError> {
        self.store
            .record(&record_id)
            .await?
            .ok_or(ServiceError::RecordNotFound { record_id })
    }

    /// Explicit administrative delete; frees the (employee, date) slot.
    pub async fn delete_record(&self, record_id: Uuid) -> Result<(), ServiceError> {
        if self.store.delete_record(&record_id).await? {
            tracing::info!(%record_id, "attendance record deleted");
            Ok(())
        } else {
            Err(ServiceError::RecordNotFound { record_id })
        }
    }

    /// Admin work queue: all records still awaiting a decision.
    pub async fn list_pending(&self) -> Result<Vec<AttendanceRecord>, ServiceError> {
        Ok(self.store.pending().await?)
    }

    /// One employee's records with dates inside `[from, to]`.
    pub async fn list_for_employee(
        &self,
        employee_id: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<AttendanceRecord>, ServiceError> {
        let from = parse_date("from", from)?;
        let to = parse_date("to", to)?;
        if from > to {
            return Err(ServiceError::InvalidInput {
                field: "from",
                value: format!("{from} is after {to}"),
            });
        }
        Ok(self.store.by_employee_in_range(employee_id, from, to).await?)
    }

    /// Provisioning surface consumed from the account-creation collaborator:
    /// derives the login from the name and refuses to overwrite an existing
    /// one.
    pub async fn register_employee(
        &self,
        first_name: &str,
        last_name: &str,
        role: Role,
    ) -> Result<Employee, ServiceError> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if first_name.is_empty() {
            return Err(ServiceError::InvalidInput {
                field: "first_name",
                value: String::new(),
            });
        }
        if last_name.is_empty() {
            return Err(ServiceError::InvalidInput {
                field: "last_name",
                value: String::new(),
            });
        }

        let employee = Employee {
            id: login(last_name, first_name),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
        };
        match self.store.insert_employee(&employee).await {
            Ok(()) => {
                tracing::info!(login = %employee.id, %role, "employee registered");
                Ok(employee)
            }
            Err(StoreError::Duplicate) => Err(ServiceError::DuplicateIdentifier {
                login: employee.id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn employees(&self) -> Result<Vec<Employee>, ServiceError> {
        Ok(self.store.employees().await?)
    }

    /// Seed an `admin.admin` account when the store has no admin yet, so a
    /// fresh deployment can approve records out of the box.
    pub async fn ensure_default_admin(&self) -> Result<Option<Employee>, ServiceError> {
        let has_admin = self
            .store
            .employees()
            .await?
            .iter()
            .any(|e| e.role == Role::Admin);
        if has_admin {
            return Ok(None);
        }
        match self.register_employee("admin", "admin", Role::Admin).await {
            Ok(admin) => Ok(Some(admin)),
            // lost a race against a concurrent seed
            Err(ServiceError::DuplicateIdentifier { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::RecordStatus;
    use crate::store::MemoryStore;

    async fn service_with_employees() -> AttendanceService {
        let service = AttendanceService::new(Arc::new(MemoryStore::new()));
        service
            .register_employee("Jean", "Dupont", Role::Employee)
            .await
            .unwrap();
        service
            .register_employee("admin", "admin", Role::Admin)
            .await
            .unwrap();
        service
    }

    #[actix_web::test]
    async fn create_record_starts_pending() {
        let service = service_with_employees().await;
        let record = service
            .create_record("dupont.jean", "2025-03-10", "day")
            .await
            .unwrap();
        assert_eq!(record.status, RecordStatus::Pending);
        assert_eq!(record.employee_id, "dupont.jean");
        assert_eq!(record.shift, Shift::Day);
    }

    #[actix_web::test]
    async fn create_record_rejects_bad_input() {
        let service = service_with_employees().await;

        let err = service
            .create_record("dupont.jean", "2025-03-10", "holiday")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidInput { field: "shift", .. }
        ));

        let err = service
            .create_record("dupont.jean", "10/03/2025", "day")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidInput { field: "date", .. }
        ));

        let err = service
            .create_record("unknown.nobody", "2025-03-10", "day")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmployeeNotFound { .. }));
    }

    #[actix_web::test]
    async fn second_record_for_same_day_is_a_duplicate() {
        let service = service_with_employees().await;
        service
            .create_record("dupont.jean", "2025-03-10", "day")
            .await
            .unwrap();

        // any shift, same day
        let err = service
            .create_record("dupont.jean", "2025-03-10", "travel")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateRecord { .. }));
    }

    #[actix_web::test]
    async fn approve_stamps_decision_and_is_final() {
        let service = service_with_employees().await;
        let record = service
            .create_record("dupont.jean", "2025-03-10", "day")
            .await
            .unwrap();

        let approved = service
            .decide(record.id, Decision::Approve, "admin.admin")
            .await
            .unwrap();
        assert_eq!(approved.status, RecordStatus::Approved);
        assert_eq!(approved.decided_by.as_deref(), Some("admin.admin"));
        assert!(approved.decided_at.is_some());

        // no re-decision, no undo
        let err = service
            .decide(record.id, Decision::Reject, "admin.admin")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidStateTransition {
                status: RecordStatus::Approved,
                ..
            }
        ));
    }

    #[actix_web::test]
    async fn racing_decisions_yield_exactly_one_success() {
        let service = service_with_employees().await;
        let record = service
            .create_record("dupont.jean", "2025-03-10", "night")
            .await
            .unwrap();

        let (a, b) = futures::join!(
            service.decide(record.id, Decision::Approve, "admin.admin"),
            service.decide(record.id, Decision::Reject, "admin.admin"),
        );
        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);

        let loser = if a.is_err() { a } else { b };
        assert!(matches!(
            loser.unwrap_err(),
            ServiceError::InvalidStateTransition { .. }
        ));
    }

    #[actix_web::test]
    async fn decide_requires_known_record_and_admin() {
        let service = service_with_employees().await;
        let record = service
            .create_record("dupont.jean", "2025-03-10", "day")
            .await
            .unwrap();

        let err = service
            .decide(Uuid::new_v4(), Decision::Approve, "admin.admin")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::RecordNotFound { .. }));

        let err = service
            .decide(record.id, Decision::Approve, "ghost.admin")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmployeeNotFound { .. }));
    }

    #[actix_web::test]
    async fn delete_then_recreate_same_day() {
        let service = service_with_employees().await;
        let record = service
            .create_record("dupont.jean", "2025-03-10", "day")
            .await
            .unwrap();

        service.delete_record(record.id).await.unwrap();
        let err = service.delete_record(record.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::RecordNotFound { .. }));

        // the day slot is free again
        service
            .create_record("dupont.jean", "2025-03-10", "travel")
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn listings_filter_by_status_and_range() {
        let service = service_with_employees().await;
        let first = service
            .create_record("dupont.jean", "2025-03-10", "day")
            .await
            .unwrap();
        service
            .create_record("dupont.jean", "2025-03-12", "night")
            .await
            .unwrap();
        service
            .decide(first.id, Decision::Approve, "admin.admin")
            .await
            .unwrap();

        let pending = service.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].date.to_string(), "2025-03-12");

        let march = service
            .list_for_employee("dupont.jean", "2025-03-01", "2025-03-31")
            .await
            .unwrap();
        assert_eq!(march.len(), 2);
        // ascending by date
        assert!(march[0].date < march[1].date);

        let err = service
            .list_for_employee("dupont.jean", "2025-03-31", "2025-03-01")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput { .. }));
    }

    #[actix_web::test]
    async fn duplicate_login_is_surfaced_at_provisioning() {
        let service = service_with_employees().await;
        let err = service
            .register_employee("Jean", "Dupont", Role::Employee)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::DuplicateIdentifier { login } if login == "dupont.jean"
        ));
    }

    #[actix_web::test]
    async fn default_admin_seeded_once() {
        let service = AttendanceService::new(Arc::new(MemoryStore::new()));
        let seeded = service.ensure_default_admin().await.unwrap();
        assert_eq!(seeded.map(|a| a.id).as_deref(), Some("admin.admin"));
        assert!(service.ensure_default_admin().await.unwrap().is_none());
    }
}

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::employee::Employee;
use crate::model::record::{AttendanceRecord, RecordStatus, Shift};
use crate::store::{DecisionApplied, RecordStore};

/// MySQL SQLSTATE for unique-key violations.
const DUPLICATE_SQLSTATE: &str = "23000";

const CREATE_EMPLOYEES: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id         VARCHAR(190) PRIMARY KEY,
    first_name VARCHAR(190) NOT NULL,
    last_name  VARCHAR(190) NOT NULL,
    role       VARCHAR(16)  NOT NULL
)
"#;

const CREATE_RECORDS: &str = r#"
CREATE TABLE IF NOT EXISTS attendance_records (
    id          CHAR(36)     PRIMARY KEY,
    employee_id VARCHAR(190) NOT NULL,
    day         DATE         NOT NULL,
    shift       VARCHAR(16)  NOT NULL,
    status      VARCHAR(16)  NOT NULL,
    created_at  DATETIME     NOT NULL,
    decided_at  DATETIME     NULL,
    decided_by  VARCHAR(190) NULL,
    UNIQUE KEY uniq_employee_day (employee_id, day),
    KEY idx_status_day (status, day)
)
"#;

const RECORD_COLUMNS: &str =
    "id, employee_id, day, shift, status, created_at, decided_at, decided_by";

/// Production [`RecordStore`] on the MySQL pool, with a moka read-through
/// cache for employee rows (warmed at startup, refreshed on insert).
pub struct MySqlStore {
    pool: MySqlPool,
    employees: Cache<String, Employee>,
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    first_name: String,
    last_name: String,
    role: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, StoreError> {
        let role = row.role.parse().map_err(|_| StoreError::Corrupt {
            entity: "employee",
            id: row.id.clone(),
            detail: format!("unknown role {:?}", row.role),
        })?;
        Ok(Employee {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            role,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: String,
    employee_id: String,
    day: NaiveDate,
    shift: String,
    status: String,
    created_at: NaiveDateTime,
    decided_at: Option<NaiveDateTime>,
    decided_by: Option<String>,
}

impl TryFrom<RecordRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, StoreError> {
        let corrupt = |detail: String| StoreError::Corrupt {
            entity: "attendance_record",
            id: row.id.clone(),
            detail,
        };
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| corrupt(format!("bad record id: {e}")))?;
        let shift: Shift = row
            .shift
            .parse()
            .map_err(|_| corrupt(format!("unknown shift {:?}", row.shift)))?;
        let status: RecordStatus = row
            .status
            .parse()
            .map_err(|_| corrupt(format!("unknown status {:?}", row.status)))?;
        Ok(AttendanceRecord {
            id,
            employee_id: row.employee_id,
            date: row.day,
            shift,
            status,
            created_at: Utc.from_utc_datetime(&row.created_at),
            decided_at: row.decided_at.map(|at| Utc.from_utc_datetime(&at)),
            decided_by: row.decided_by,
        })
    }
}

fn is_duplicate(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some(DUPLICATE_SQLSTATE);
    }
    false
}

impl MySqlStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = MySqlPool::connect(database_url).await?;
        Ok(Self {
            pool,
            employees: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(Duration::from_secs(86400))
                .build(),
        })
    }

    /// Create the tables consumed by this store if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_EMPLOYEES).execute(&self.pool).await?;
        sqlx::query(CREATE_RECORDS).execute(&self.pool).await?;
        Ok(())
    }

    /// Stream all employees into the read-through cache in one pass.
    pub async fn warm_employee_cache(&self) -> Result<usize, StoreError> {
        let mut stream = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, first_name, last_name, role FROM employees",
        )
        .fetch(&self.pool);

        let mut total = 0usize;
        while let Some(row) = stream.next().await {
            let employee = Employee::try_from(row?)?;
            self.employees.insert(employee.id.clone(), employee).await;
            total += 1;
        }

        log::info!("Employee cache warmup complete: {} employees", total);
        Ok(total)
    }

    async fn fetch_record(&self, id: &Uuid) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance_records WHERE id = ?");
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(AttendanceRecord::try_from).transpose()
    }
}

fn into_records(rows: Vec<RecordRow>) -> Result<Vec<AttendanceRecord>, StoreError> {
    rows.into_iter().map(AttendanceRecord::try_from).collect()
}

#[async_trait]
impl RecordStore for MySqlStore {
    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO employees (id, first_name, last_name, role) VALUES (?, ?, ?, ?)",
        )
        .bind(&employee.id)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(employee.role.to_string())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                self.employees
                    .insert(employee.id.clone(), employee.clone())
                    .await;
                Ok(())
            }
            Err(e) if is_duplicate(&e) => Err(StoreError::Duplicate),
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn employee(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        if let Some(employee) = self.employees.get(id).await {
            return Ok(Some(employee));
        }

        let row = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, first_name, last_name, role FROM employees WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let employee = Employee::try_from(row)?;
                self.employees
                    .insert(employee.id.clone(), employee.clone())
                    .await;
                Ok(Some(employee))
            }
            None => Ok(None),
        }
    }

    async fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, first_name, last_name, role FROM employees ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn insert_record(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO attendance_records (id, employee_id, day, shift, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(&record.employee_id)
        .bind(record.date)
        .bind(record.shift.to_string())
        .bind(record.status.to_string())
        .bind(record.created_at.naive_utc())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate(&e) => Err(StoreError::Duplicate),
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn record(&self, id: &Uuid) -> Result<Option<AttendanceRecord>, StoreError> {
        self.fetch_record(id).await
    }

    async fn delete_record(&self, id: &Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM attendance_records WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_decision(
        &self,
        id: &Uuid,
        status: RecordStatus,
        admin_id: &str,
        decided_at: DateTime<Utc>,
    ) -> Result<DecisionApplied, StoreError> {
        // Compare-and-set: the WHERE clause only matches while the record is
        // still pending, so two racing updates yield exactly one row change.
        let result = sqlx::query(
            "UPDATE attendance_records \
             SET status = ?, decided_by = ?, decided_at = ? \
             WHERE id = ? AND status = 'pending'",
        )
        .bind(status.to_string())
        .bind(admin_id)
        .bind(decided_at.naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.fetch_record(id).await? {
                Some(record) => Ok(DecisionApplied::NotPending(record.status)),
                None => Ok(DecisionApplied::Missing),
            };
        }

        match self.fetch_record(id).await? {
            Some(record) => Ok(DecisionApplied::Updated(record)),
            None => Ok(DecisionApplied::Missing),
        }
    }

    async fn pending(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records \
             WHERE status = 'pending' ORDER BY day, id"
        );
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    async fn by_employee_in_range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records \
             WHERE employee_id = ? AND day BETWEEN ? AND ? ORDER BY day, id"
        );
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(employee_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    async fn approved_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records \
             WHERE status = 'approved' AND day BETWEEN ? AND ? ORDER BY day, id"
        );
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }
}

use crate::api::employee::RegisterEmployee;
use crate::api::record::{CreateRecord, DecideRecord};
use crate::model::employee::{Employee, Role};
use crate::model::record::{AttendanceRecord, RecordStatus, Shift};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timeclock API",
        version = "1.0.0",
        description = r#"
## Attendance tracking & monthly export

This API records employee attendance (a worked day classified as **day**,
**night** or **travel**), routes each record through an admin approval
workflow, and bundles monthly per-employee reports into a single archive.

### 🔹 Key Features
- **Attendance Records**
  - One record per employee and day, created pending
  - Admin approval/rejection; decisions are final
- **Employee Accounts**
  - Logins derived from names (`lastname.firstname`)
- **Monthly Exports**
  - One report per employee with approved records, zipped and published
    atomically

### 📦 Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::record::create_record,
        crate::api::record::list_records,
        crate::api::record::list_pending,
        crate::api::record::get_record,
        crate::api::record::delete_record,
        crate::api::record::approve_record,
        crate::api::record::reject_record,

        crate::api::employee::register_employee,
        crate::api::employee::list_employees,

        crate::api::export::generate_export,
    ),
    components(
        schemas(
            CreateRecord,
            DecideRecord,
            AttendanceRecord,
            Shift,
            RecordStatus,
            RegisterEmployee,
            Employee,
            Role
        )
    ),
    tags(
        (name = "Records", description = "Attendance record lifecycle APIs"),
        (name = "Employees", description = "Employee account APIs"),
        (name = "Exports", description = "Monthly export APIs"),
    )
)]
pub struct ApiDoc;

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::service_error_response;
use crate::model::employee::{Employee, Role};
use crate::service::AttendanceService;

#[derive(Deserialize, ToSchema)]
pub struct RegisterEmployee {
    #[schema(example = "Jean")]
    pub first_name: String,
    #[schema(example = "Dupont")]
    pub last_name: String,
    /// Defaults to `employee`.
    #[serde(default)]
    #[schema(example = "employee")]
    pub role: Role,
}

/// Register an employee account
///
/// The login is derived from the name (`lastname.firstname`, lowercase); a
/// name that collides with an existing login is rejected rather than
/// overwritten.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = RegisterEmployee,
    responses(
        (status = 200, description = "Employee registered", body = Employee),
        (status = 400, description = "Blank name"),
        (status = 409, description = "Login already taken"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employees"
)]
pub async fn register_employee(
    service: web::Data<AttendanceService>,
    payload: web::Json<RegisterEmployee>,
) -> actix_web::Result<impl Responder> {
    match service
        .register_employee(&payload.first_name, &payload.last_name, payload.role)
        .await
    {
        Ok(employee) => Ok(HttpResponse::Ok().json(employee)),
        Err(e) => Ok(service_error_response(e)),
    }
}

/// List employee accounts
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses(
        (status = 200, description = "Employees ordered by login", body = [Employee]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employees"
)]
pub async fn list_employees(
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    match service.employees().await {
        Ok(employees) => Ok(HttpResponse::Ok().json(employees)),
        Err(e) => Ok(service_error_response(e)),
    }
}

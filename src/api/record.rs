use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::service_error_response;
use crate::model::record::{AttendanceRecord, Decision};
use crate::service::AttendanceService;

#[derive(Deserialize, ToSchema)]
pub struct CreateRecord {
    #[schema(example = "dupont.jean")]
    pub employee_id: String,
    #[schema(example = "2025-03-10", format = "date")]
    pub date: String,
    /// One of `day`, `night`, `travel`.
    #[schema(example = "day")]
    pub shift: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DecideRecord {
    #[schema(example = "admin.admin")]
    pub admin_id: String,
}

#[derive(Deserialize, IntoParams)]
pub struct RangeQuery {
    /// Employee login to list records for
    pub employee_id: String,
    /// Inclusive range start, `YYYY-MM-DD`
    pub from: String,
    /// Inclusive range end, `YYYY-MM-DD`
    pub to: String,
}

/// Record a worked day
#[utoipa::path(
    post,
    path = "/api/v1/records",
    request_body = CreateRecord,
    responses(
        (status = 200, description = "Attendance recorded, awaiting decision", body = AttendanceRecord),
        (status = 400, description = "Malformed date or unknown shift"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "A record already exists for this employee and day"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Records"
)]
pub async fn create_record(
    service: web::Data<AttendanceService>,
    payload: web::Json<CreateRecord>,
) -> actix_web::Result<impl Responder> {
    match service
        .create_record(&payload.employee_id, &payload.date, &payload.shift)
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(record)),
        Err(e) => Ok(service_error_response(e)),
    }
}

/// List one employee's records in a date range
#[utoipa::path(
    get,
    path = "/api/v1/records",
    params(RangeQuery),
    responses(
        (status = 200, description = "Records ordered by date", body = [AttendanceRecord]),
        (status = 400, description = "Malformed range"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Records"
)]
pub async fn list_records(
    service: web::Data<AttendanceService>,
    query: web::Query<RangeQuery>,
) -> actix_web::Result<impl Responder> {
    match service
        .list_for_employee(&query.employee_id, &query.from, &query.to)
        .await
    {
        Ok(records) => Ok(HttpResponse::Ok().json(records)),
        Err(e) => Ok(service_error_response(e)),
    }
}

/// Admin work queue: records awaiting a decision
#[utoipa::path(
    get,
    path = "/api/v1/records/pending",
    responses(
        (status = 200, description = "Pending records ordered by date", body = [AttendanceRecord]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Records"
)]
pub async fn list_pending(
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    match service.list_pending().await {
        Ok(records) => Ok(HttpResponse::Ok().json(records)),
        Err(e) => Ok(service_error_response(e)),
    }
}

/// Fetch one record
#[utoipa::path(
    get,
    path = "/api/v1/records/{record_id}",
    params(
        ("record_id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record found", body = AttendanceRecord),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Records"
)]
pub async fn get_record(
    service: web::Data<AttendanceService>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    match service.record(path.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Ok().json(record)),
        Err(e) => Ok(service_error_response(e)),
    }
}

/// Administrative delete
#[utoipa::path(
    delete,
    path = "/api/v1/records/{record_id}",
    params(
        ("record_id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Records"
)]
pub async fn delete_record(
    service: web::Data<AttendanceService>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    match service.delete_record(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Record deleted"
        }))),
        Err(e) => Ok(service_error_response(e)),
    }
}

/// Approve a pending record
#[utoipa::path(
    put,
    path = "/api/v1/records/{record_id}/approve",
    params(
        ("record_id" = String, Path, description = "Record id")
    ),
    request_body = DecideRecord,
    responses(
        (status = 200, description = "Record approved", body = AttendanceRecord),
        (status = 404, description = "Record or admin not found"),
        (status = 409, description = "Record already decided"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Records"
)]
pub async fn approve_record(
    service: web::Data<AttendanceService>,
    path: web::Path<Uuid>,
    payload: web::Json<DecideRecord>,
) -> actix_web::Result<impl Responder> {
    decide(service, path.into_inner(), Decision::Approve, payload).await
}

/// Reject a pending record
#[utoipa::path(
    put,
    path = "/api/v1/records/{record_id}/reject",
    params(
        ("record_id" = String, Path, description = "Record id")
    ),
    request_body = DecideRecord,
    responses(
        (status = 200, description = "Record rejected", body = AttendanceRecord),
        (status = 404, description = "Record or admin not found"),
        (status = 409, description = "Record already decided"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Records"
)]
pub async fn reject_record(
    service: web::Data<AttendanceService>,
    path: web::Path<Uuid>,
    payload: web::Json<DecideRecord>,
) -> actix_web::Result<impl Responder> {
    decide(service, path.into_inner(), Decision::Reject, payload).await
}

async fn decide(
    service: web::Data<AttendanceService>,
    record_id: Uuid,
    decision: Decision,
    payload: web::Json<DecideRecord>,
) -> actix_web::Result<HttpResponse> {
    match service.decide(record_id, decision, &payload.admin_id).await {
        Ok(record) => Ok(HttpResponse::Ok().json(record)),
        Err(e) => Ok(service_error_response(e)),
    }
}

use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::error::ExportError;
use crate::export::{ExportEngine, ExportOutcome};

/// Build the monthly archive
///
/// One report per employee with approved records in the month, bundled into
/// a single zip. Safe to call repeatedly for the same period: the previous
/// archive is replaced atomically. Meant for the interactive admin and for
/// the periodic trigger alike; callers are rate limited per IP.
#[utoipa::path(
    post,
    path = "/api/v1/exports/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Calendar month (1-12)")
    ),
    responses(
        (status = 200, description = "Archive published", body = Object, example = json!({
            "archive": "exports/attendance-2025-03.zip",
            "employees": 2,
            "records": 14
        })),
        (status = 204, description = "No approved records for this period"),
        (status = 400, description = "Invalid period"),
        (status = 500, description = "Export failed, no archive published")
    ),
    tag = "Exports"
)]
pub async fn generate_export(
    engine: web::Data<ExportEngine>,
    path: web::Path<(i32, u32)>,
) -> actix_web::Result<impl Responder> {
    let (year, month) = path.into_inner();

    match engine.generate_monthly_export(year, month).await {
        Ok(ExportOutcome::Archive(archive)) => Ok(HttpResponse::Ok().json(json!({
            "archive": archive.path.display().to_string(),
            "employees": archive.employees,
            "records": archive.records,
        }))),
        Ok(ExportOutcome::Empty) => Ok(HttpResponse::NoContent().finish()),
        Err(e @ ExportError::InvalidPeriod { .. }) => {
            Ok(HttpResponse::BadRequest().json(json!({
                "message": e.to_string()
            })))
        }
        Err(e) => {
            tracing::error!(error = %e, year, month, "monthly export failed");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

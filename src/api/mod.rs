pub mod employee;
pub mod export;
pub mod record;

use actix_web::HttpResponse;
use serde_json::json;

use crate::error::ServiceError;

/// Map a service error onto the wire: message bodies stay JSON, storage
/// failures are logged and surfaced as an opaque 500.
pub(crate) fn service_error_response(err: ServiceError) -> HttpResponse {
    match &err {
        ServiceError::InvalidInput { .. } => HttpResponse::BadRequest().json(json!({
            "message": err.to_string()
        })),
        ServiceError::DuplicateRecord { .. }
        | ServiceError::DuplicateIdentifier { .. }
        | ServiceError::InvalidStateTransition { .. } => HttpResponse::Conflict().json(json!({
            "message": err.to_string()
        })),
        ServiceError::RecordNotFound { .. } | ServiceError::EmployeeNotFound { .. } => {
            HttpResponse::NotFound().json(json!({
                "message": err.to_string()
            }))
        }
        ServiceError::Storage(e) => {
            tracing::error!(error = %e, "storage failure");
            HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::web::Data;
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::config::Config;
    use crate::export::ExportEngine;
    use crate::export::report::ReportFormat;
    use crate::model::employee::Role;
    use crate::routes;
    use crate::service::AttendanceService;
    use crate::store::{MemoryStore, RecordStore};

    fn test_config(export_dir: PathBuf) -> Config {
        Config {
            server_addr: "127.0.0.1:0".into(),
            database_url: String::new(),
            export_dir,
            report_format: ReportFormat::Csv,
            api_prefix: "/api/v1".into(),
            rate_export_per_min: 600,
            rate_write_per_min: 600,
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("timeclock-api-{}", Uuid::new_v4()))
    }

    /// App state over a fresh in-memory store with the default admin and one
    /// employee provisioned.
    async fn test_state(
        export_dir: PathBuf,
    ) -> (Data<AttendanceService>, Data<ExportEngine>, Config) {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let config = test_config(export_dir.clone());
        let service = AttendanceService::new(store.clone());
        let _ = service.ensure_default_admin().await.unwrap();
        service
            .register_employee("Jean", "Dupont", Role::Employee)
            .await
            .unwrap();
        let engine = ExportEngine::new(store, config.report_format.renderer(), export_dir);
        (Data::new(service), Data::new(engine), config)
    }

    macro_rules! spawn_app {
        ($export_dir:expr) => {{
            let (service, engine, config) = test_state($export_dir).await;
            test::init_service(
                App::new()
                    .app_data(service)
                    .app_data(engine)
                    .configure(move |cfg| routes::configure(cfg, config.clone())),
            )
            .await
        }};
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    #[actix_web::test]
    async fn record_lifecycle_over_http() {
        let app = spawn_app!(scratch_dir());

        // create
        let req = test::TestRequest::post()
            .uri("/api/v1/records")
            .peer_addr(peer())
            .set_json(json!({
                "employee_id": "dupont.jean",
                "date": "2025-03-10",
                "shift": "day"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "pending");
        let record_id = body["id"].as_str().unwrap().to_string();

        // duplicate day
        let req = test::TestRequest::post()
            .uri("/api/v1/records")
            .peer_addr(peer())
            .set_json(json!({
                "employee_id": "dupont.jean",
                "date": "2025-03-10",
                "shift": "travel"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // pending queue sees it
        let req = test::TestRequest::get()
            .uri("/api/v1/records/pending")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let pending: Value = test::read_body_json(resp).await;
        assert_eq!(pending.as_array().unwrap().len(), 1);

        // approve
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/records/{record_id}/approve"))
            .peer_addr(peer())
            .set_json(json!({ "admin_id": "admin.admin" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "approved");
        assert_eq!(body["decided_by"], "admin.admin");

        // second decision conflicts
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/records/{record_id}/reject"))
            .peer_addr(peer())
            .set_json(json!({ "admin_id": "admin.admin" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn invalid_input_and_missing_records_map_to_4xx() {
        let app = spawn_app!(scratch_dir());

        let req = test::TestRequest::post()
            .uri("/api/v1/records")
            .peer_addr(peer())
            .set_json(json!({
                "employee_id": "dupont.jean",
                "date": "10/03/2025",
                "shift": "day"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/records/{}/approve", Uuid::new_v4()))
            .peer_addr(peer())
            .set_json(json!({ "admin_id": "admin.admin" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn provisioning_rejects_login_collisions() {
        let app = spawn_app!(scratch_dir());

        let req = test::TestRequest::post()
            .uri("/api/v1/employees")
            .peer_addr(peer())
            .set_json(json!({ "first_name": "Jean", "last_name": "Dupont" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/api/v1/employees")
            .peer_addr(peer())
            .set_json(json!({ "first_name": "Paul", "last_name": "Martin" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], "martin.paul");
    }

    #[actix_web::test]
    async fn export_endpoint_publishes_archive_or_reports_empty() {
        let dir = scratch_dir();
        let app = spawn_app!(dir.clone());

        // nothing approved yet
        let req = test::TestRequest::post()
            .uri("/api/v1/exports/2025/3")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        // create + approve, then export
        let req = test::TestRequest::post()
            .uri("/api/v1/records")
            .peer_addr(peer())
            .set_json(json!({
                "employee_id": "dupont.jean",
                "date": "2025-03-10",
                "shift": "night"
            }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let record_id = body["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/records/{record_id}/approve"))
            .peer_addr(peer())
            .set_json(json!({ "admin_id": "admin.admin" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::OK
        );

        let req = test::TestRequest::post()
            .uri("/api/v1/exports/2025/3")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["employees"], 1);
        assert_eq!(body["records"], 1);
        assert!(body["archive"].as_str().unwrap().ends_with("attendance-2025-03.zip"));

        let req = test::TestRequest::post()
            .uri("/api/v1/exports/2025/13")
            .peer_addr(peer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

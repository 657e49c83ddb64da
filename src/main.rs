use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod config;
mod docs;
mod error;
mod export;
mod model;
mod routes;
mod service;
mod store;

use config::Config;
use export::ExportEngine;
use service::AttendanceService;
use store::{MySqlStore, RecordStore};

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "timeclock"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let mysql = Arc::new(MySqlStore::connect(&config.database_url).await?);
    mysql.migrate().await?;

    let warmup_store = mysql.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = warmup_store.warm_employee_cache().await {
            eprintln!("Failed to warm employee cache: {:?}", e);
        }
    });

    let store: Arc<dyn RecordStore> = mysql;
    let service = AttendanceService::new(store.clone());
    if let Some(admin) = service.ensure_default_admin().await? {
        info!(login = %admin.id, "seeded default admin account");
    }
    let engine = ExportEngine::new(
        store,
        config.report_format.renderer(),
        config.export_dir.clone(),
    );

    let service_data = Data::new(service);
    let engine_data = Data::new(engine);
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service_data.clone())
            .app_data(engine_data.clone())
            .app_data(Data::new(config_data.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}

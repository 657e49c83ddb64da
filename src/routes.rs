use crate::{
    api::{employee, export, record},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let write_limiter = Arc::new(build_limiter(config.rate_write_per_min));
    // the export endpoint is reachable by the periodic trigger, so it gets
    // its own tighter limit
    let export_limiter = Arc::new(build_limiter(config.rate_export_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::register_employee))
                            .route(web::get().to(employee::list_employees)),
                    ),
            )
            .service(
                web::scope("/records")
                    .wrap(write_limiter)
                    // /records
                    .service(
                        web::resource("")
                            .route(web::post().to(record::create_record))
                            .route(web::get().to(record::list_records)),
                    )
                    // /records/pending
                    .service(
                        web::resource("/pending").route(web::get().to(record::list_pending)),
                    )
                    // /records/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(record::get_record))
                            .route(web::delete().to(record::delete_record)),
                    )
                    // /records/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(record::approve_record)),
                    )
                    // /records/{id}/reject
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(record::reject_record)),
                    ),
            )
            .service(
                web::scope("/exports")
                    // /exports/{year}/{month}
                    .service(
                        web::resource("/{year}/{month}")
                            .wrap(export_limiter)
                            .route(web::post().to(export::generate_export)),
                    ),
            ),
    );
}

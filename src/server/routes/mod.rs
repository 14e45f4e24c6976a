//! HTTP routes

mod health;
mod metrics;

use actix_web::web;

pub use health::BuildInfo;

/// Register every route of the console
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(metrics::index))
        .route("/metrics", web::get().to(metrics::metrics))
        .route("/health", web::get().to(health::health_check))
        .route("/version", web::get().to(health::version_info));
}

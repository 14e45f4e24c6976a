//! Liveness and build information

use actix_web::HttpResponse;
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

/// Liveness of the console process itself
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("OK")
}

/// Version and build information
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: Cow<'static, str>,
    pub version: Cow<'static, str>,
    pub build_time: Cow<'static, str>,
    pub git_hash: Cow<'static, str>,
    pub rust_version: Cow<'static, str>,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: Cow::Borrowed(env!("CARGO_PKG_NAME")),
            version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
            build_time: Cow::Borrowed(env!("BUILD_TIME")),
            git_hash: Cow::Borrowed(env!("GIT_HASH")),
            rust_version: Cow::Borrowed(env!("RUST_VERSION")),
        }
    }
}

pub async fn version_info() -> HttpResponse {
    debug!("Version info requested");
    HttpResponse::Ok().json(BuildInfo::current())
}

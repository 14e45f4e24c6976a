//! Prometheus exposition and the index page

use crate::server::state::AppState;
use actix_web::{HttpResponse, web};
use prometheus::{Encoder, TextEncoder};
use tracing::{debug, error};

/// Metrics endpoint (Prometheus text format)
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    debug!("Metrics requested");

    match state.sink.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type(TextEncoder::new().format_type())
            .body(body),
        Err(e) => {
            error!(error = %e, "failed to render metrics");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    let collectors: String = state
        .collectors
        .iter()
        .map(|name| format!("<li>{name}</li>"))
        .collect();

    let body = format!(
        r#"<html>
<head><title>Health Console</title></head>
<body>
<h1>Health Console</h1>
<p>Version {version}, up {uptime}s</p>
<ul>
<li><a href="/metrics">Metrics</a></li>
<li><a href="/health">Health</a></li>
<li><a href="/version">Version</a></li>
</ul>
<h2>Collectors</h2>
<ul>{collectors}</ul>
</body>
</html>
"#,
        version = env!("CARGO_PKG_VERSION"),
        uptime = state.uptime_seconds(),
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

//! HTTP server core implementation

use crate::config::ServerConfig;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{ConsoleError, Result};
use actix_web::dev::Server;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use tracing::info;

/// Seconds in-flight scrapes get to finish on stop
const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// HTTP server exposing the console's metrics
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        Self {
            config: config.clone(),
            state,
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("Server", "health-console")))
            .configure(routes::configure_routes)
    }

    /// Bind the listener and return the running server
    ///
    /// OS signals are left to the caller, which stops the collectors first and
    /// then the server through [`Server::handle`].
    pub fn start(self) -> Result<Server> {
        let bind_addr = self.config.address();
        let port = self.config.port;

        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .disable_signals()
            .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr, port))?
            .run();

        info!("HTTP server listening on {}", bind_addr);
        Ok(server)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Readable message for port binding failures
    pub(crate) fn format_bind_error(
        error: std::io::Error,
        bind_addr: &str,
        port: u16,
    ) -> ConsoleError {
        let error_str = error.to_string();

        if error_str.contains("Address already in use")
            || error_str.contains("os error 48")
            || error_str.contains("os error 98")
        {
            ConsoleError::server(format!(
                "port {port} is already in use; pick another one with --port {} or METRICS_PORT={}",
                port.saturating_add(1),
                port.saturating_add(1)
            ))
        } else if error_str.contains("Permission denied") || error_str.contains("os error 13") {
            ConsoleError::server(format!(
                "permission denied for port {port}; use a port >= 1024 such as the default 9090"
            ))
        } else {
            ConsoleError::server(format!("Failed to bind to {}: {}", bind_addr, error))
        }
    }
}

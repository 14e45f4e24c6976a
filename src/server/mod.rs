//! HTTP surface: `/metrics`, `/health`, `/version` and an index page

pub mod routes;
mod server;
pub mod state;
mod utils;


pub use routes::BuildInfo;
pub use server::HttpServer;
pub use state::AppState;
pub use utils::shutdown_signal;

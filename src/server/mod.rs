pub mod config;
mod error;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod state;
mod stubs;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use http_layers::*;
pub use server::{make_app, run_server};

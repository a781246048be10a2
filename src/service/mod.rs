pub use app_error::{AppError, AppResult};
pub use config::{global_config, GatewayConfig, NetworkConfig, SessionConfig, GLOBAL_CONFIG};
pub use tracing_config::{setup_local_tracing, setup_tracing, LogGuard};

mod app_error;
mod config;
mod tracing_config;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

use crate::infrastructure::config::AppConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = AppConfig::load().map_err(|err| {
        error!(error = %err, "Failed to load configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;
    info!(host = %config.host, port = config.port, "Starting test case generator");

    actix_web::rt::System::new().block_on(crate::infrastructure::bootstrap::serve(config))
}

use crate::api::ApiClient;
use crate::error::AppResult;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod api;
pub mod error;
pub mod form;
pub mod model;
pub mod notify;
pub mod query;
pub mod screen;
pub mod session;
pub mod state;
pub mod utils;

static APPLICATION_NAME: &str = "kelas";

/// Builds an API client from the loaded configuration.
#[tracing::instrument]
pub async fn build_client() -> AppResult<ApiClient> {
    let use_local = cfg!(debug_assertions);
    let config = Config::get_or_init(use_local).await;

    let client = ApiClient::new(config.api())?;
    tracing::debug!("api client ready for {}", config.api().base_url());
    Ok(client)
}

pub fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

pub mod api;
pub mod error;
pub mod routes;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Settings;
use crate::data::registry::DataRegistry;

pub use error::{ApiError, ApiResult};
pub use routes::router;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<DataRegistry>,
    /// Required in the reload header when set.
    pub reload_token: Option<String>,
}

impl AppState {
    pub fn new(registry: Arc<DataRegistry>, reload_token: Option<String>) -> Self {
        Self {
            registry,
            reload_token,
        }
    }
}

pub async fn run_server(
    settings: &Settings,
    registry: Arc<DataRegistry>,
) -> std::io::Result<()> {
    let state = AppState::new(registry, settings.reload_token.clone());
    let listener = TcpListener::bind(&settings.bind).await?;
    info!(addr = %settings.bind, "atlas server listening");
    axum::serve(listener, router(state)).await
}

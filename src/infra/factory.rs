use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::infra::store::Store;
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let store = Store::connect(config).await?;
    info!(
        backend = if config.is_postgres() { "postgres" } else { "sqlite" },
        max_connections = config.db_max_connections,
        "Store ready"
    );
    Ok(AppState::new(config.clone(), store))
}

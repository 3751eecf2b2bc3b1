pub mod due;
pub mod grade;
pub mod import;
pub mod init;
pub mod lookup;
pub mod quiz;
pub mod search;
pub mod submit;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use wordloop_core::QuizService;
use wordloop_store::config::{create_store, load_config_from};

/// Load configuration and open a service on the configured store.
pub fn open_service(config_path: Option<&Path>) -> Result<QuizService> {
    let config = load_config_from(config_path)?;
    tracing::debug!(store = ?config.store, "configuration loaded");
    let store = create_store(&config.store)?;
    Ok(QuizService::with_system_clock(store, config.service_config()))
}

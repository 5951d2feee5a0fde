//! # Config Commands
//!
//! The effective configuration and the session identity.

use std::path::PathBuf;

use ingrid_client::{ClientConfig, ClientError};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// The effective configuration as TOML.
pub fn effective_config(config: &ClientConfig) -> ApiResult<String> {
    debug!("effective_config command");
    let rendered = toml::to_string_pretty(config).map_err(ClientError::from)?;
    Ok(rendered)
}

/// Writes the effective configuration and returns the path written.
pub fn write_config(config: &ClientConfig, path: Option<PathBuf>) -> ApiResult<PathBuf> {
    debug!("write_config command");
    Ok(config.save(path)?)
}

/// The session identity that groups this profile's history and bookmarks.
pub fn whoami(app: &AppState) -> String {
    debug!("whoami command");
    app.workflow.identity().to_string()
}

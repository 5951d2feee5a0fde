//! # Result Commands
//!
//! The result screen: show the current product, toggle its bookmark.

use std::fmt;

use tracing::debug;

use crate::commands::ProductView;
use crate::error::ApiResult;
use crate::state::AppState;

/// What `show` displays.
#[derive(Debug, Clone)]
pub enum ShowResponse {
    Current(ProductView),
    /// Nothing has been scanned yet; the user is sent back to scanning.
    Redirected,
}

impl fmt::Display for ShowResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowResponse::Current(product) => write!(f, "{product}"),
            ShowResponse::Redirected => write!(
                f,
                "No scan result yet. Scan a product first (ingrid scan, barcode, camera or photo)."
            ),
        }
    }
}

/// Shows the current result.
pub fn show(app: &AppState) -> ShowResponse {
    debug!("show command");
    match app.workflow.open_result() {
        Some(result) => ShowResponse::Current(ProductView::from(&result)),
        None => ShowResponse::Redirected,
    }
}

/// Toggles the bookmark of the current result.
///
/// The displayed state only changes once the backend confirms it.
pub async fn toggle_bookmark(app: &AppState) -> ApiResult<ProductView> {
    debug!("toggle_bookmark command");
    let result = app.workflow.toggle_bookmark().await?;
    Ok(ProductView::from(&result))
}

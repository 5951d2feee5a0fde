//! # List Commands
//!
//! History and favorites. Opening an entry makes it the current result.

use std::fmt;

use ingrid_core::ScanResult;
use tracing::debug;

use crate::commands::ProductView;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// One row of a list.
#[derive(Debug, Clone)]
pub struct ListRow {
    pub name: String,
    pub rating_label: &'static str,
    pub ingredient_count: u32,
    pub is_bookmarked: bool,
}

impl From<&ScanResult> for ListRow {
    fn from(entry: &ScanResult) -> Self {
        ListRow {
            name: entry.product.name.clone(),
            rating_label: entry.product.rating.label(),
            ingredient_count: entry.product.ingredient_count,
            is_bookmarked: entry.is_bookmarked,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ListResponse {
    Rows {
        title: &'static str,
        rows: Vec<ListRow>,
    },
    Opened(ProductView),
}

impl fmt::Display for ListResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListResponse::Rows { title, rows } if rows.is_empty() => {
                write!(f, "{title}: nothing here yet.")
            }
            ListResponse::Rows { title, rows } => {
                write!(f, "{title}:")?;
                for (i, row) in rows.iter().enumerate() {
                    write!(
                        f,
                        "\n{:>3}. {}  [{}, {} ingredients]{}",
                        i + 1,
                        row.name,
                        row.rating_label,
                        row.ingredient_count,
                        if row.is_bookmarked { " *" } else { "" }
                    )?;
                }
                Ok(())
            }
            ListResponse::Opened(product) => write!(f, "{product}"),
        }
    }
}

/// Lists the scan history, or opens entry `open` (1-based).
pub async fn history(app: &AppState, open: Option<usize>) -> ApiResult<ListResponse> {
    debug!(?open, "history command");
    let entries = app.workflow.open_history().await;
    respond(app, "History", entries, open)
}

/// Lists bookmarked products, or opens entry `open` (1-based).
pub async fn favorites(app: &AppState, open: Option<usize>) -> ApiResult<ListResponse> {
    debug!(?open, "favorites command");
    let entries = app.workflow.open_favorites().await;
    respond(app, "Favorites", entries, open)
}

fn respond(
    app: &AppState,
    title: &'static str,
    mut entries: Vec<ScanResult>,
    open: Option<usize>,
) -> ApiResult<ListResponse> {
    let Some(position) = open else {
        return Ok(ListResponse::Rows {
            title,
            rows: entries.iter().map(ListRow::from).collect(),
        });
    };

    if position == 0 || position > entries.len() {
        return Err(ApiError::validation(format!(
            "{title} has {} entries, cannot open #{position}",
            entries.len()
        )));
    }

    let entry = entries.swap_remove(position - 1);
    let opened = app.workflow.view_entry(entry);
    Ok(ListResponse::Opened(ProductView::from(&opened)))
}

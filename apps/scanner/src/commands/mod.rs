//! # Commands Module
//!
//! One function per user action. Commands take the [`AppState`], drive the
//! workflow, and return a response that renders itself for the terminal.
//!
//! ## Command Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Scanner Commands                                  │
//! │                                                                         │
//! │  scan.rs                          results.rs                            │
//! │  ├── enter_barcode                ├── show                              │
//! │  ├── scan_barcode                 └── toggle_bookmark                   │
//! │  ├── start_camera / camera_step                                         │
//! │  └── upload_photo                 lists.rs                              │
//! │                                   ├── history                           │
//! │  config.rs                        └── favorites                         │
//! │  ├── effective_config                                                   │
//! │  ├── write_config                                                       │
//! │  └── whoami                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`AppState`]: crate::state::AppState

pub mod config;
pub mod lists;
pub mod results;
pub mod scan;

use std::fmt;

use ingrid_core::{Rating, ScanResult};
use serde::Serialize;

/// A product as shown on the result screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub rating: Rating,
    pub rating_label: &'static str,
    pub ingredient_count: u32,
    pub ingredients: Vec<String>,
    pub certifications: Vec<String>,
    pub is_bookmarked: bool,
}

impl From<&ScanResult> for ProductView {
    fn from(result: &ScanResult) -> Self {
        let product = &result.product;
        ProductView {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            barcode: product.barcode.clone(),
            rating: product.rating,
            rating_label: product.rating.label(),
            ingredient_count: product.ingredient_count,
            ingredients: product.ingredients.clone(),
            certifications: product.certifications.clone(),
            is_bookmarked: result.is_bookmarked,
        }
    }
}

impl fmt::Display for ProductView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(brand) = &self.brand {
            write!(f, " ({brand})")?;
        }
        writeln!(f)?;
        if let Some(barcode) = &self.barcode {
            writeln!(f, "Barcode:        {barcode}")?;
        }
        writeln!(
            f,
            "Rating:         {} [{}]",
            self.rating_label,
            self.rating.as_str()
        )?;
        writeln!(f, "Ingredients:    {}", self.ingredient_count)?;
        for ingredient in &self.ingredients {
            writeln!(f, "  - {ingredient}")?;
        }
        if !self.certifications.is_empty() {
            writeln!(f, "Certifications: {}", self.certifications.join(", "))?;
        }
        write!(
            f,
            "Bookmarked:     {}",
            if self.is_bookmarked { "yes" } else { "no" }
        )
    }
}

//! # ingrid-core: Pure Domain Logic for the Ingrid Scanner
//!
//! This crate holds the domain model shared by every other crate in the
//! workspace. Everything here is a pure function or a plain data type.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ingrid Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/scanner (CLI)                           │   │
//! │  │    Mode select ──► Capture ──► Submit ──► Result / Lists        │   │
//! │  └─────────────┬───────────────────┬───────────────────┬───────────┘   │
//! │                │                   │                   │                │
//! │  ┌─────────────▼──────┐ ┌──────────▼─────────┐ ┌───────▼───────────┐   │
//! │  │  ingrid-capture    │ │  ingrid-client     │ │  ingrid-store     │   │
//! │  │  sessions, guards  │ │  HTTP backend      │ │  identity, slot   │   │
//! │  └─────────────┬──────┘ └──────────┬─────────┘ └───────┬───────────┘   │
//! │                └───────────────────┼───────────────────┘                │
//! │  ┌─────────────────────────────────▼───────────────────────────────┐   │
//! │  │               ★ ingrid-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  rating   │  │   error   │  │ validation│  │   │
//! │  │   │ Product   │  │  Rating   │  │ CoreError │  │  barcode  │  │   │
//! │  │   │ Artifact  │  │  oracle   │  │           │  │  image    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO DEVICES • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ProductRecord, ScanResult, CaptureArtifact, ...)
//! - [`rating`] - Cleanliness rating derived from the ingredient count
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation (barcodes, images, identifiers)
//!
//! ## Example Usage
//!
//! ```rust
//! use ingrid_core::{Barcode, Rating};
//!
//! let barcode = Barcode::parse(" 3017620422003 ").unwrap();
//! assert_eq!(barcode.as_str(), "3017620422003");
//!
//! assert_eq!(Rating::from_ingredient_count(4), Rating::Green);
//! assert_eq!(Rating::from_ingredient_count(5), Rating::Amber);
//! assert_eq!(Rating::from_ingredient_count(10), Rating::Red);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod rating;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use rating::Rating;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Shortest accepted barcode (EAN-8).
pub const MIN_BARCODE_DIGITS: usize = 8;

/// Longest accepted barcode (GTIN-14).
pub const MAX_BARCODE_DIGITS: usize = 14;

/// Namespace prefix of every generated session identity.
pub const SESSION_ID_PREFIX: &str = "session_";

/// Number of random characters following [`SESSION_ID_PREFIX`].
pub const SESSION_TOKEN_LEN: usize = 9;

/// Largest image accepted for label analysis (10 MiB).
///
/// Phone cameras produce 3-6 MB JPEGs; anything larger is almost always a
/// wrong file and would be rejected by the backend's upload limit anyway.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

//! # Rating Module
//!
//! Traffic-light cleanliness rating derived from a product's ingredient count.
//!
//! ## The Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ingredient Count → Rating                          │
//! │                                                                         │
//! │   0 ─────────── 4 │ 5 ─────────── 9 │ 10 ──────────────────► ∞          │
//! │   ▓▓▓ GREEN ▓▓▓▓▓ │ ▒▒▒ AMBER ▒▒▒▒▒ │ ░░░ RED ░░░░░░░░░░░░░            │
//! │   "Clean Choice"  │ "Moderate"      │ "Complex"                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The backend applies the same thresholds. The client re-derives the rating
//! for every record it receives so a product can never be displayed with a
//! rating that disagrees with its ingredient count.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Highest ingredient count still rated green.
pub const GREEN_MAX_INGREDIENTS: u32 = 4;

/// Highest ingredient count still rated amber.
pub const AMBER_MAX_INGREDIENTS: u32 = 9;

/// Three-level cleanliness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Four ingredients or fewer.
    Green,
    /// Five to nine ingredients.
    Amber,
    /// Ten ingredients or more.
    Red,
}

impl Rating {
    /// Derives the rating from an ingredient count.
    ///
    /// ## Example
    /// ```rust
    /// use ingrid_core::Rating;
    ///
    /// assert_eq!(Rating::from_ingredient_count(0), Rating::Green);
    /// assert_eq!(Rating::from_ingredient_count(9), Rating::Amber);
    /// assert_eq!(Rating::from_ingredient_count(42), Rating::Red);
    /// ```
    pub const fn from_ingredient_count(count: u32) -> Self {
        if count <= GREEN_MAX_INGREDIENTS {
            Rating::Green
        } else if count <= AMBER_MAX_INGREDIENTS {
            Rating::Amber
        } else {
            Rating::Red
        }
    }

    /// Wire/storage name (`green`, `amber`, `red`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Rating::Green => "green",
            Rating::Amber => "amber",
            Rating::Red => "red",
        }
    }

    /// Human-readable label shown next to the rating.
    pub const fn label(&self) -> &'static str {
        match self {
            Rating::Green => "Clean Choice",
            Rating::Amber => "Moderate",
            Rating::Red => "Complex",
        }
    }

    /// Ingredient range covered by this rating, for the rating guide.
    pub const fn range_description(&self) -> &'static str {
        match self {
            Rating::Green => "1-4 ingredients",
            Rating::Amber => "5-9 ingredients",
            Rating::Red => "10+ ingredients",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(Rating::Green),
            "amber" | "yellow" => Ok(Rating::Amber),
            "red" => Ok(Rating::Red),
            _ => Err(ValidationError::NotAllowed {
                field: "rating".to_string(),
                allowed: vec!["green".into(), "amber".into(), "red".into()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_green_boundary() {
        assert_eq!(Rating::from_ingredient_count(0), Rating::Green);
        assert_eq!(Rating::from_ingredient_count(1), Rating::Green);
        assert_eq!(Rating::from_ingredient_count(4), Rating::Green);
    }

    #[test]
    fn test_amber_boundaries() {
        assert_eq!(Rating::from_ingredient_count(5), Rating::Amber);
        assert_eq!(Rating::from_ingredient_count(7), Rating::Amber);
        assert_eq!(Rating::from_ingredient_count(9), Rating::Amber);
    }

    #[test]
    fn test_red_boundary() {
        assert_eq!(Rating::from_ingredient_count(10), Rating::Red);
        assert_eq!(Rating::from_ingredient_count(50), Rating::Red);
        assert_eq!(Rating::from_ingredient_count(u32::MAX), Rating::Red);
    }

    #[test]
    fn test_every_count_below_five_is_green() {
        for count in 0..5 {
            assert_eq!(Rating::from_ingredient_count(count), Rating::Green, "count {count}");
        }
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Rating::Amber).unwrap(), "\"amber\"");
        let parsed: Rating = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(parsed, Rating::Red);
    }

    #[test]
    fn test_parse_and_labels() {
        assert_eq!("GREEN".parse::<Rating>().unwrap(), Rating::Green);
        assert_eq!("yellow".parse::<Rating>().unwrap(), Rating::Amber);
        assert!("purple".parse::<Rating>().is_err());

        assert_eq!(Rating::Green.label(), "Clean Choice");
        assert_eq!(Rating::Amber.label(), "Moderate");
        assert_eq!(Rating::Red.label(), "Complex");
        assert_eq!(Rating::Red.to_string(), "red");
    }
}

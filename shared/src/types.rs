//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Visibility filter for soft-deletable listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewFilter {
    #[default]
    Active,
    Deleted,
    All,
}

impl ViewFilter {
    /// Parse the `?view=` query parameter; anything unrecognized falls
    /// back to the active view, matching the original API behavior.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("all") => ViewFilter::All,
            Some("deleted") => ViewFilter::Deleted,
            _ => ViewFilter::Active,
        }
    }

    /// SQL predicate on the `is_deleted` column for this view. Callers
    /// interpolate it behind a table alias, so every arm must be an
    /// expression on the column itself, including the all-rows case.
    pub fn predicate(&self) -> &'static str {
        match self {
            ViewFilter::Active => "is_deleted = FALSE",
            ViewFilter::Deleted => "is_deleted = TRUE",
            ViewFilter::All => "is_deleted IN (FALSE, TRUE)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_filter_parses_known_values() {
        assert_eq!(ViewFilter::from_param(Some("all")), ViewFilter::All);
        assert_eq!(ViewFilter::from_param(Some("deleted")), ViewFilter::Deleted);
        assert_eq!(ViewFilter::from_param(Some("active")), ViewFilter::Active);
        assert_eq!(ViewFilter::from_param(Some("bogus")), ViewFilter::Active);
        assert_eq!(ViewFilter::from_param(None), ViewFilter::Active);
    }

    #[test]
    fn predicates_survive_alias_prefixing() {
        for view in [ViewFilter::Active, ViewFilter::Deleted, ViewFilter::All] {
            let clause = format!("WHERE t.{}", view.predicate());
            assert!(
                clause.starts_with("WHERE t.is_deleted"),
                "not a column expression: {clause}"
            );
        }
    }

    #[test]
    fn all_view_predicate_matches_both_states() {
        assert_eq!(ViewFilter::All.predicate(), "is_deleted IN (FALSE, TRUE)");
    }
}

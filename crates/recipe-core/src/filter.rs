// ABOUTME: Parses recipe list query parameters into a tag/ingredient filter
// ABOUTME: Pure and infallible; malformed identifiers are dropped silently
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Recipe filter resolution.
//!
//! A filter restricts the recipe list by tag and ingredient identifiers.
//! Within one dimension identifiers are alternatives (a recipe matches when it
//! carries ANY of them). Across dimensions constraints are combined with AND.
//! An empty dimension imposes no constraint.

use std::collections::BTreeSet;

/// Query parameter carrying comma-separated tag identifiers
pub const TAGS_PARAM: &str = "tags";

/// Query parameter carrying comma-separated ingredient identifiers
pub const INGREDIENTS_PARAM: &str = "ingredients";

/// Resolved recipe list filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Tag identifiers, any of which must be present on a matching recipe
    pub tag_ids: BTreeSet<i64>,
    /// Ingredient identifiers, any of which must be present on a matching recipe
    pub ingredient_ids: BTreeSet<i64>,
}

impl RecipeFilter {
    /// Build a filter from raw query pairs.
    ///
    /// Repeated keys accumulate. Keys other than `tags` and `ingredients` are
    /// ignored.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (key, value) in params {
            match key.as_ref() {
                TAGS_PARAM => filter.tag_ids.extend(parse_id_list(value.as_ref())),
                INGREDIENTS_PARAM => filter
                    .ingredient_ids
                    .extend(parse_id_list(value.as_ref())),
                _ => {}
            }
        }
        filter
    }

    /// Whether neither dimension constrains the result
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.tag_ids.is_empty() && self.ingredient_ids.is_empty()
    }

    /// Evaluate the filter against a recipe's related identifiers.
    ///
    /// This is the reference semantics the repository query must agree with.
    pub fn matches<T, I>(&self, tag_ids: T, ingredient_ids: I) -> bool
    where
        T: IntoIterator<Item = i64>,
        I: IntoIterator<Item = i64>,
    {
        dimension_matches(&self.tag_ids, tag_ids)
            && dimension_matches(&self.ingredient_ids, ingredient_ids)
    }
}

fn dimension_matches(wanted: &BTreeSet<i64>, present: impl IntoIterator<Item = i64>) -> bool {
    wanted.is_empty() || present.into_iter().any(|id| wanted.contains(&id))
}

/// Parse a comma-separated identifier list.
///
/// Whitespace around each item is trimmed. Empty items, non-numeric items
/// and non-positive numbers are skipped. Duplicates collapse.
#[must_use]
pub fn parse_id_list(raw: &str) -> BTreeSet<i64> {
    raw.split(',')
        .filter_map(|item| item.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list_basic() {
        assert_eq!(parse_id_list("1,2,3"), BTreeSet::from([1, 2, 3]));
        assert_eq!(parse_id_list(" 4 , 5 "), BTreeSet::from([4, 5]));
        assert_eq!(parse_id_list("7,7,7"), BTreeSet::from([7]));
    }

    #[test]
    fn test_parse_id_list_drops_garbage() {
        assert!(parse_id_list("").is_empty());
        assert!(parse_id_list(",,,").is_empty());
        assert_eq!(parse_id_list("1,abc,2"), BTreeSet::from([1, 2]));
        assert_eq!(parse_id_list("0,-3,9"), BTreeSet::from([9]));
        assert_eq!(parse_id_list("1.5,2"), BTreeSet::from([2]));
        assert!(parse_id_list("99999999999999999999999").is_empty());
    }

    #[test]
    fn test_from_params_accumulates_repeated_keys() {
        let filter = RecipeFilter::from_params([
            ("tags", "1,2"),
            ("tags", "3"),
            ("ingredients", "10"),
            ("page", "2"),
        ]);
        assert_eq!(filter.tag_ids, BTreeSet::from([1, 2, 3]));
        assert_eq!(filter.ingredient_ids, BTreeSet::from([10]));
    }

    #[test]
    fn test_empty_params_are_unconstrained() {
        let filter = RecipeFilter::from_params(Vec::<(String, String)>::new());
        assert!(filter.is_unconstrained());

        let filter = RecipeFilter::from_params([("tags", "x,y"), ("ingredients", "")]);
        assert!(filter.is_unconstrained());
    }

    #[test]
    fn test_from_urlencoded_query() {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str("tags=1%2C2&ingredients=%204%20").unwrap();
        let filter = RecipeFilter::from_params(pairs);
        assert_eq!(filter.tag_ids, BTreeSet::from([1, 2]));
        assert_eq!(filter.ingredient_ids, BTreeSet::from([4]));
    }

    #[test]
    fn test_matches_any_within_dimension() {
        let filter = RecipeFilter::from_params([("tags", "1,2")]);
        assert!(filter.matches([2, 5], []));
        assert!(filter.matches([1], [8]));
        assert!(!filter.matches([3], []));
        assert!(!filter.matches([], []));
    }

    #[test]
    fn test_matches_all_across_dimensions() {
        let filter = RecipeFilter::from_params([("tags", "1"), ("ingredients", "9")]);
        assert!(filter.matches([1], [9, 10]));
        assert!(!filter.matches([1], [10]));
        assert!(!filter.matches([2], [9]));
    }

    #[test]
    fn test_unconstrained_matches_everything() {
        let filter = RecipeFilter::default();
        assert!(filter.matches([], []));
        assert!(filter.matches([4], [5]));
    }
}

//! Header deny-list filtering.
//!
//! Collections exported from an API client tend to carry noise headers
//! (cache control, tracking tokens) that documentation should not show.
//! Both parsers filter request and response headers through the deny-lists
//! configured in the builder options while copying them into the model.

use crate::models::KeyValuePair;

/// Returns whether a header survives filtering against a deny-list.
///
/// Matching is a case-sensitive exact comparison; no wildcards.
pub fn should_keep(header_name: &str, deny_list: &[String]) -> bool {
    !deny_list.iter().any(|denied| denied == header_name)
}

/// Filters an ordered header list against a deny-list, preserving the
/// relative order of the survivors.
pub fn filter_pairs(headers: Vec<KeyValuePair>, deny_list: &[String]) -> Vec<KeyValuePair> {
    headers
        .into_iter()
        .filter(|header| should_keep(&header.name, deny_list))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn deny(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn pairs(names: &[&str]) -> Vec<KeyValuePair> {
        names.iter().map(|n| KeyValuePair::new(*n, "x")).collect()
    }

    #[test]
    fn test_should_keep_exact_match() {
        let deny_list = deny(&["X-Api-Key"]);
        assert!(!should_keep("X-Api-Key", &deny_list));
        assert!(should_keep("Content-Type", &deny_list));
    }

    #[test]
    fn test_should_keep_is_case_sensitive() {
        let deny_list = deny(&["x-api-key"]);
        assert!(should_keep("X-Api-Key", &deny_list));
    }

    #[test]
    fn test_empty_deny_list_keeps_order_unchanged() {
        let headers = pairs(&["B", "A", "C"]);
        let filtered = filter_pairs(headers.clone(), &[]);
        assert_eq!(filtered, headers);
    }

    #[test]
    fn test_filter_preserves_survivor_order() {
        let headers = pairs(&["Accept", "X-Tracking", "Content-Type"]);
        let filtered = filter_pairs(headers, &deny(&["X-Tracking"]));
        let names: Vec<&str> = filtered.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Accept", "Content-Type"]);
    }

    proptest! {
        #[test]
        fn prop_filtering_is_idempotent(
            names in proptest::collection::vec("[A-Za-z-]{1,12}", 0..8),
            denied in proptest::collection::vec("[A-Za-z-]{1,12}", 0..4),
        ) {
            let deny_list: Vec<String> = denied;
            let headers: Vec<KeyValuePair> =
                names.iter().map(|n| KeyValuePair::new(n.clone(), "v")).collect();

            let once = filter_pairs(headers, &deny_list);
            let twice = filter_pairs(once.clone(), &deny_list);
            prop_assert_eq!(once, twice);
        }
    }
}

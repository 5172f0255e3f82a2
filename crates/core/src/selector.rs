//! Bucket selection

/// Keep the buckets whose name contains `filter`, preserving order
///
/// With no filter, or an empty one, every bucket is kept.
pub fn select_buckets(buckets: &[String], filter: Option<&str>) -> Vec<String> {
    match filter {
        Some(f) if !f.is_empty() => buckets.iter().filter(|b| b.contains(f)).cloned().collect(),
        _ => buckets.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_filter_keeps_all() {
        let buckets = names(&["zeta", "alpha", "mid"]);
        assert_eq!(select_buckets(&buckets, None), buckets);
        assert_eq!(select_buckets(&buckets, Some("")), buckets);
    }

    #[test]
    fn test_filter_is_substring_and_ordered() {
        let buckets = names(&["prod-logs", "assets", "logs-archive", "staging"]);
        assert_eq!(
            select_buckets(&buckets, Some("logs")),
            names(&["prod-logs", "logs-archive"])
        );
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let buckets = names(&["Prod", "prod"]);
        assert_eq!(select_buckets(&buckets, Some("prod")), names(&["prod"]));
    }

    #[test]
    fn test_empty_input() {
        assert!(select_buckets(&[], Some("x")).is_empty());
        assert!(select_buckets(&[], None).is_empty());
    }
}

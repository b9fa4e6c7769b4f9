//! Repository exclusion by literal substring

/// True iff `pattern` is present, non-empty and occurs in `name`
///
/// Matching is case-sensitive with no globbing or regex semantics.
pub fn is_excluded(name: &str, pattern: Option<&str>) -> bool {
    match pattern {
        Some(pattern) if !pattern.is_empty() => name.contains(pattern),
        _ => false,
    }
}

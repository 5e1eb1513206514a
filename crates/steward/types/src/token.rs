//! Enumeration tokens arrive from hosts in assorted spellings
//! (`cross-pod`, `Cross Pod`, `CROSS_POD`). They are folded to one
//! canonical snake_case form before matching.

/// Trim, lower-case, and fold `-` and interior whitespace runs to `_`.
pub fn normalize_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch == '-' || ch == '_' || ch.is_whitespace() {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.extend(ch.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_spellings() {
        assert_eq!(normalize_token("cross_pod"), "cross_pod");
        assert_eq!(normalize_token("Cross-Pod"), "cross_pod");
        assert_eq!(normalize_token("  CROSS   POD "), "cross_pod");
        assert_eq!(normalize_token("local__pod"), "local_pod");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize_token("   "), "");
        assert_eq!(normalize_token("-_-"), "");
    }
}

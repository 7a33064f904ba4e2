/// Canonical comparison key for a tattoo / animal id.
///
/// Lower-cases the input and drops everything outside `[a-z0-9]`, so
/// `"ABC-045"`, `"abc045"` and `"ABC 045"` all compare equal.
pub fn normalize_id(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_and_case_collapse() {
        assert_eq!(normalize_id("ABC-045"), "abc045");
        assert_eq!(normalize_id("abc045"), "abc045");
        assert_eq!(normalize_id("ABC 045"), "abc045");
        assert_eq!(normalize_id(" a.b/c_0-4 5 "), "abc045");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["ABC-045", "  x y z ", "Ñandú-12", "", "---", "Tatuaje#77"] {
            let once = normalize_id(raw);
            assert_eq!(normalize_id(&once), once);
        }
    }

    #[test]
    fn test_non_ascii_letters_are_dropped() {
        assert_eq!(normalize_id("Ñ12"), "12");
        assert_eq!(normalize_id("---"), "");
    }
}

//! Format check for university IDs, the login handle.

use once_cell::sync::Lazy;
use regex::Regex;

static UNIVERSITY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}/\d{5}$").expect("valid university id pattern"));

/// University IDs look like `2023/01234`: enrolment year, slash, five digits
pub fn is_valid_university_id(value: &str) -> bool {
    UNIVERSITY_ID_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_university_id() {
        assert!(is_valid_university_id("2023/01234"));
        assert!(!is_valid_university_id("2023/1234"));
        assert!(!is_valid_university_id("23/01234"));
        assert!(!is_valid_university_id("2023-01234"));
        assert!(!is_valid_university_id(" 2023/01234"));
    }
}

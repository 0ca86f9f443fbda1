//! Phone number handling.
//!
//! Customer identity uses the cleaned local form as typed at the counter
//! (`0812-3456 7890` → `081234567890`). Message delivery uses the
//! international form without the plus sign (`6281234567890`).

const COUNTRY_CODE: &str = "62";

/// Strips whitespace, dashes and parentheses.
pub fn clean(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

/// Converts a cleaned or raw number into international digits.
pub fn to_international(phone: &str) -> String {
    let cleaned = clean(phone);
    let digits = cleaned.trim_start_matches('+');
    if let Some(local) = digits.strip_prefix('0') {
        format!("{COUNTRY_CODE}{local}")
    } else if digits.starts_with(COUNTRY_CODE) {
        digits.to_string()
    } else {
        format!("{COUNTRY_CODE}{digits}")
    }
}

/// A number is usable once cleaned if it is 8 to 15 digits with an optional
/// leading `+`.
pub fn is_valid(phone: &str) -> bool {
    let cleaned = clean(phone);
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_separators() {
        assert_eq!(clean(" 0812-3456 (789) "), "08123456789");
    }

    #[test]
    fn converts_to_international() {
        assert_eq!(to_international("0812-3456-7890"), "6281234567890");
        assert_eq!(to_international("+6281234567890"), "6281234567890");
        assert_eq!(to_international("81234567890"), "6281234567890");
    }

    #[test]
    fn validates_numbers() {
        assert!(is_valid("0812 3456 7890"));
        assert!(is_valid("+6281234567890"));
        assert!(!is_valid(""));
        assert!(!is_valid("12345"));
        assert!(!is_valid("0812abc4567"));
    }
}

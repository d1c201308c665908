//! Event id helpers.
//!
//! The event id is the only join key between log rows, video files and review
//! decisions. Counter exports and clip names do not always agree on zero
//! padding, so ids are compared in a normalised form.

use std::cmp::Ordering;

/// Normalised join key: all-digit ids lose their leading zeros, anything else
/// is only trimmed.
pub fn normalize_id(id: &str) -> String {
    let cleaned = id.trim();
    if !cleaned.is_empty() && cleaned.bytes().all(|b| b.is_ascii_digit()) {
        let stripped = cleaned.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    } else {
        cleaned.to_string()
    }
}

/// Order ids numerically when both are numeric; numeric ids sort before
/// non-numeric ones, which compare lexically.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    let na = normalize_id(a);
    let nb = normalize_id(b);
    let a_num = na.bytes().all(|c| c.is_ascii_digit()) && !na.is_empty();
    let b_num = nb.bytes().all(|c| c.is_ascii_digit()) && !nb.is_empty();

    match (a_num, b_num) {
        // same digits, no leading zeros: longer is larger
        (true, true) => na.len().cmp(&nb.len()).then_with(|| na.cmp(&nb)),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => na.cmp(&nb),
    }
    .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_zeros_from_numeric_ids() {
        assert_eq!(normalize_id("0042"), "42");
        assert_eq!(normalize_id(" 1001 "), "1001");
        assert_eq!(normalize_id("000"), "0");
        assert_eq!(normalize_id("A007"), "A007");
    }

    #[test]
    fn numeric_ids_compare_by_value() {
        assert_eq!(compare_ids("9", "10"), Ordering::Less);
        assert_eq!(compare_ids("100", "99"), Ordering::Greater);
        assert_eq!(compare_ids("12", "abc"), Ordering::Less);
        assert_eq!(compare_ids("abc", "abd"), Ordering::Less);
    }

    #[test]
    fn padded_ids_still_have_a_total_order() {
        assert_eq!(compare_ids("007", "7"), Ordering::Less);
        assert_eq!(compare_ids("7", "7"), Ordering::Equal);
    }
}

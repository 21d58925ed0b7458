/// Count used for "Over 100 applicants".
pub const OVER_APPLICANTS_SENTINEL: f64 = 100.0;

/// Read an applicant count such as `57 applicants` or `Over 100 applicants`.
///
/// When the leading word is neither a number nor `Over`, the whole text is
/// coerced to a number as a last resort, yielding `None` if that fails too.
pub fn parse_applicant_count(text: &str) -> Option<f64> {
    let first = text.split_whitespace().next().unwrap_or_default();

    if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
        return first.parse().ok();
    }
    if first == "Over" {
        return Some(OVER_APPLICANTS_SENTINEL);
    }
    text.trim().parse::<f64>().ok().filter(|count| count.is_finite())
}

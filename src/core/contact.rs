use once_cell::sync::Lazy;
use regex::Regex;

/// Country calling code prefixed to bare phone numbers
pub const COUNTRY_CODE: &str = "55";

/// First run of 10 to 13 digits after separators are removed
static PHONE_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{10,13}").expect("valid phone digit pattern"));

/// Extract a phone number from a free-text contact field
///
/// Separators (`-`, `(`, `)` and spaces) are removed, then the first run of
/// 10 to 13 digits is taken and prefixed with the country code unless it
/// already starts with it.
///
/// # Returns
/// The normalized number, or `None` when no qualifying digit run exists
pub fn normalize_contact(text: Option<&str>) -> Option<String> {
    let text = text?;
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '-' | '(' | ')' | ' '))
        .collect();

    let digits = PHONE_DIGITS.find(&cleaned)?.as_str();

    if digits.starts_with(COUNTRY_CODE) {
        Some(digits.to_string())
    } else {
        Some(format!("{}{}", COUNTRY_CODE, digits))
    }
}

//! Naming helpers for generated SQL aliases.
//!
//! Every alias has the form `{PREFIX}{counter}` optionally followed by
//! `_{HINT}`, where the counter is zero padded and the hint is a readable
//! fragment of the underlying table or column name.
//!
//! Examples:
//! - `("T", 1, 4, "person")` → `"T0001_PERSON"`
//! - `("FK", 12, 4, "parent_id")` → `"FK0012_PARENTID"`
//! - `("V", 3, 4, "")` → `"V0003"`

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_LETTERS: Regex = Regex::new(r"[^A-Za-z]+").unwrap();
}

/// Reduce a raw name to an alias hint: letters only, upper-cased, at most
/// `max_length` characters.
///
/// # Examples
/// ```
/// use aggregate_sql::utils::alias_naming::sanitize_hint;
///
/// assert_eq!(sanitize_hint("order_item", 20), "ORDERITEM");
/// assert_eq!(sanitize_hint("customer_address", 4), "CUST");
/// assert_eq!(sanitize_hint("42", 20), "");
/// ```
pub fn sanitize_hint(raw: &str, max_length: usize) -> String {
    NON_LETTERS
        .replace_all(raw, "")
        .to_uppercase()
        .chars()
        .take(max_length)
        .collect()
}

/// Format an alias from its prefix, counter and already sanitised hint.
///
/// An empty hint produces no suffix.
///
/// # Examples
/// ```
/// use aggregate_sql::utils::alias_naming::format_alias;
///
/// assert_eq!(format_alias("T", 1, 4, "PERSON"), "T0001_PERSON");
/// assert_eq!(format_alias("RN", 7, 2, ""), "RN07");
/// ```
pub fn format_alias(prefix: &str, counter: usize, width: usize, hint: &str) -> String {
    if hint.is_empty() {
        format!("{}{:0width$}", prefix, counter, width = width)
    } else {
        format!("{}{:0width$}_{}", prefix, counter, hint, width = width)
    }
}

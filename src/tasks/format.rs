//! Message formatting for `log`, `ok` and `fail`.

use std::fmt::Display;

/// Joins message parts with a single space, skipping `None` and empty parts.
///
/// # Example
/// ```
/// use taskweave::format_message;
///
/// assert_eq!(format_message([Some("a"), None, Some(""), Some("b")]), "a b");
/// assert_eq!(format_message(Vec::<Option<&str>>::new()), "");
/// assert_eq!(format_message([Some("solo")]), "solo");
/// ```
pub fn format_message<I, P>(parts: I) -> String
where
    I: IntoIterator<Item = Option<P>>,
    P: Display,
{
    let mut out = String::new();
    for part in parts.into_iter().flatten() {
        let part = part.to_string();
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&part);
    }
    out
}

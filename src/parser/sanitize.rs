//! Text sanitization utilities for cleaning extracted fields
//!
//! Everything pulled out of a page (titles, summaries, date text) goes
//! through [`clean_text`] before it is stored on an article. Input is DOM
//! text, so entities are already decoded and any `<` or `&` left in it is
//! literal content.

use crate::utils::normalize_whitespace;

/// Clean extracted text into a single trimmed line
///
/// Steps:
/// 1. Remove zero-width and bidi formatting characters
/// 2. Turn control characters into spaces
/// 3. Collapse all whitespace runs to one space and trim
///
/// # Examples
///
/// ```
/// use newsharvest::parser::sanitize::clean_text;
///
/// let dirty = "  Board\u{200B} exams & results\r\n\tannounced  ";
/// assert_eq!(clean_text(dirty), "Board exams & results announced");
/// ```
pub fn clean_text(text: &str) -> String {
    let result = remove_zero_width(text);
    let result = replace_control_chars(&result);

    normalize_whitespace(&result)
}

/// Remove zero-width spaces, joiners and bidi formatting marks
///
/// Line separators and no-break spaces are whitespace, not formatting, and
/// are left for whitespace collapsing.
///
/// # Examples
///
/// ```
/// use newsharvest::parser::sanitize::remove_zero_width;
///
/// assert_eq!(remove_zero_width("a\u{200B}b\u{FEFF}c"), "abc");
/// assert_eq!(remove_zero_width("a\u{202F}b"), "a\u{202F}b");
/// ```
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}'..='\u{200F}' |
                '\u{202A}'..='\u{202E}' |
                '\u{2060}' |
                '\u{FEFF}'
            )
        })
        .collect()
}

/// Replace control characters (including `\r`) with a space
pub fn replace_control_chars(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Check if text contains meaningful content
///
/// # Examples
///
/// ```
/// use newsharvest::parser::sanitize::has_content;
///
/// assert!(has_content("Hello"));
/// assert!(!has_content("   \n\t  "));
/// ```
pub fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}

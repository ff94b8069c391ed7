//! Small string helpers shared by the markup and inflection code.

use maud::html;

/// Escape text for inclusion in HTML content or a quoted attribute value.
///
/// Uses maud's escaper so attribute values and element text are escaped the
/// same way as everything rendered through `html!`.
pub fn escape_html(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Letter-case shape of a word, used to make generated words look like the
/// word they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseClass {
    /// `url`
    Lower,
    /// `URL`
    Upper,
    /// `Url`
    Title,
    /// `iPhone`, `McDonald`, or no letters at all
    Mixed,
}

pub fn case_class(word: &str) -> CaseClass {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    let Some((first, rest)) = letters.split_first() else {
        return CaseClass::Mixed;
    };
    if letters.iter().all(|c| c.is_lowercase()) {
        CaseClass::Lower
    } else if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        CaseClass::Upper
    } else if first.is_uppercase() && rest.iter().all(|c| c.is_lowercase()) {
        // Includes a lone capital letter ("A" → "As")
        CaseClass::Title
    } else {
        CaseClass::Mixed
    }
}

/// Upper-case the first character.
pub fn ucfirst(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Truncate `text` to at most `max` characters, breaking on the last word
/// boundary that fits and appending `ellipsis`. The ellipsis counts towards
/// the limit. Text that already fits is returned unchanged.
pub fn truncate(text: &str, max: usize, ellipsis: &str) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(ellipsis.chars().count());
    let cut: String = text.chars().take(budget).collect();
    // The cut already ends a word when whitespace follows it
    let ends_word = text.chars().nth(budget).is_some_and(char::is_whitespace);
    let kept = match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 && !ends_word => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}{}", kept.trim_end(), ellipsis)
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

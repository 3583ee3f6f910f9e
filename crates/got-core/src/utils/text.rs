use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for blank API fields.
///
/// The houses API sends unknown values as empty strings, and some records
/// carry the literal text `null`.
///
/// # Examples
/// ```
/// use got_core::utils::text::empty_string_handler;
/// assert_eq!(empty_string_handler(""), "N/A");
/// assert_eq!(empty_string_handler("The North"), "The North");
/// ```
pub fn empty_string_handler(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

/// Joins list fields such as titles or seats, or `N/A` when none are set.
pub fn join_or_placeholder(values: &[String]) -> String {
    let present: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();

    if present.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        present.join(", ")
    }
}

/// Truncate text to a display width, appending `...` when cut
pub fn truncate_text(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: &str = "...";
    let ellipsis_width = ELLIPSIS.width();

    if max_width <= ellipsis_width {
        return ELLIPSIS[..max_width].to_string();
    }

    let target_width = max_width - ellipsis_width;
    let mut result = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }

    result.push_str(ELLIPSIS);
    result
}

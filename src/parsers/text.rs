/// Options for cleaning text pulled out of result markup
#[derive(Debug, Clone, Copy)]
pub struct TextCleanOptions {
    /// Collapse runs of whitespace (including newlines) into single spaces
    pub normalize_whitespace: bool,
    /// Cut the text to at most this many characters, if set
    pub max_chars: Option<usize>,
}

impl Default for TextCleanOptions {
    fn default() -> Self {
        Self {
            normalize_whitespace: true,
            max_chars: None,
        }
    }
}

/// Marker appended to truncated text
pub const ELLIPSIS: char = '…';

/// Cleans text with default options
pub fn clean(text: &str) -> String {
    clean_with_options(text, &TextCleanOptions::default())
}

/// Cleans text with specific options
pub fn clean_with_options(text: &str, options: &TextCleanOptions) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let cleaned = if options.normalize_whitespace {
        normalize_whitespace(text)
    } else {
        text.trim().to_string()
    };

    match options.max_chars {
        Some(max) => truncate_chars(&cleaned, max),
        None => cleaned,
    }
}

/// Collapses all whitespace runs into single spaces and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max` characters, ending with an ellipsis when cut.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut cut: String = text.chars().take(max - 1).collect();
    let trimmed_len = cut.trim_end().len();
    cut.truncate(trimmed_len);
    cut.push(ELLIPSIS);
    cut
}

/// Whether a title is long enough to be a real result rather than page chrome
pub fn is_substantive(title: &str, min_chars: usize) -> bool {
    let len = title.chars().count();
    len > 0 && len >= min_chars
}

use crate::parsers::text::{self, ELLIPSIS, TextCleanOptions};

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(text::normalize_whitespace(""), "");
        assert_eq!(text::normalize_whitespace("  Back   pain \n"), "Back pain");
        assert_eq!(
            text::normalize_whitespace("Low back pain\n\t and sciatica"),
            "Low back pain and sciatica"
        );
    }

    #[test]
    fn test_clean_empty_input() {
        assert_eq!(text::clean("   \n\t"), "");
    }

    #[test]
    fn test_clean_without_normalizing() {
        let options = TextCleanOptions {
            normalize_whitespace: false,
            max_chars: None,
        };
        assert_eq!(
            text::clean_with_options("  Line 1\nLine 2  ", &options),
            "Line 1\nLine 2"
        );
    }

    #[test]
    fn test_truncate_chars() {
        // Short text is untouched
        assert_eq!(text::truncate_chars("Sciatica", 20), "Sciatica");
        assert_eq!(text::truncate_chars("Sciatica", 8), "Sciatica");

        // Cut text ends with an ellipsis and stays within the limit
        let cut = text::truncate_chars("Managing chronic pain", 10);
        assert_eq!(cut, format!("Managing{}", ELLIPSIS));
        assert!(cut.chars().count() <= 10);

        assert_eq!(text::truncate_chars("anything", 0), "");
    }

    #[test]
    fn test_truncate_respects_multibyte_characters() {
        let cut = text::truncate_chars("Ménière’s disease and vertigo", 9);
        assert_eq!(cut, format!("Ménière’{}", ELLIPSIS));
        assert_eq!(cut.chars().count(), 9);
    }

    #[test]
    fn test_is_substantive() {
        assert!(!text::is_substantive("", 0));
        assert!(!text::is_substantive("Next", 5));
        assert!(text::is_substantive("Sciatica", 5));
        assert!(text::is_substantive("Pain", 4));
    }
}

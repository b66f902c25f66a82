//! Text normalization for string columns

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Options for [`normalize_text`].
///
/// Control characters are always removed, surrounding whitespace trimmed and
/// the result lowercased. The optional passes remove URLs and punctuation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCleaning {
    /// Remove `http…`, `https…` and `www…` tokens.
    pub strip_urls: bool,
    /// Remove everything that is not a word character, whitespace or comma.
    pub strip_punctuation: bool,
}

impl TextCleaning {
    /// Normalization plus URL and punctuation removal.
    pub fn thorough() -> Self {
        Self {
            strip_urls: true,
            strip_punctuation: true,
        }
    }
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?\S+|www\S+").expect("URL pattern is valid"))
}

fn punctuation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s,]").expect("punctuation pattern is valid"))
}

/// Normalize one text value.
pub fn normalize_text(text: &str, options: TextCleaning) -> String {
    let mut cleaned: String = text.chars().filter(|c| !c.is_control()).collect();

    if options.strip_urls {
        cleaned = url_pattern().replace_all(&cleaned, "").into_owned();
    }
    if options.strip_punctuation {
        cleaned = punctuation_pattern().replace_all(&cleaned, "").into_owned();
    }

    cleaned.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_normalization() {
        let options = TextCleaning::default();
        assert_eq!(normalize_text("  Hello World \n", options), "hello world");
        assert_eq!(normalize_text("a\u{0007}b\u{0000}C", options), "abc");
        assert_eq!(normalize_text("ÉCOLE", options), "école");
    }

    #[test]
    fn test_default_keeps_punctuation() {
        assert_eq!(
            normalize_text("Hi! see www.example.com", TextCleaning::default()),
            "hi! see www.example.com"
        );
    }

    #[test]
    fn test_thorough_strips_urls_and_punctuation() {
        let cleaned = normalize_text(
            "Great product!!! Visit https://shop.example.com/x?y=1 now, thanks.",
            TextCleaning::thorough(),
        );
        assert_eq!(cleaned, "great product visit  now, thanks");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let options = TextCleaning::thorough();
        let once = normalize_text("  MiXeD, Case\t", options);
        assert_eq!(normalize_text(&once, options), once);
    }
}

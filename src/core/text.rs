// TuneSift - core/text.rs
//
// Text normalisation shared by profile mining and scoring: case folding,
// whitespace tokenisation, punctuation-only detection, and stopword sets.
// Core layer: stopword files are read by the platform layer and handed here
// as strings.

use std::collections::HashSet;

/// Built-in English stopword list, embedded at compile time.
const BUILTIN_STOPWORDS: &str = include_str!("../../assets/stopwords_en.txt");

/// Typographic marks treated as punctuation in addition to ASCII punctuation.
const EXTRA_PUNCTUATION: &[char] = &[
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', // dashes
    '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', // curly quotes
    '\u{2022}', '\u{2026}', '\u{00B7}', // bullet, ellipsis, middle dot
    '\u{00AB}', '\u{00BB}', '\u{00A1}', '\u{00BF}', // guillemets, inverted marks
];

/// Case-fold text for membership tests.
pub fn case_fold(text: &str) -> String {
    text.to_lowercase()
}

/// Case-fold `text` and split it on whitespace.
pub fn tokens(text: &str) -> Vec<String> {
    case_fold(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Returns true if every character of `token` is punctuation.
///
/// An empty token is not punctuation-only (it is simply never produced by
/// whitespace splitting).
pub fn is_punctuation_only(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_punctuation() || EXTRA_PUNCTUATION.contains(&c))
}

/// Case-folded set of words ignored when mining and scoring descriptions.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// The embedded English list.
    pub fn english() -> Self {
        Self::parse(BUILTIN_STOPWORDS)
    }

    /// Parse a newline-separated list. Blank lines and `#` comments are
    /// ignored; entries are case-folded and trimmed.
    pub fn parse(content: &str) -> Self {
        let words = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(case_fold)
            .collect();
        Self { words }
    }

    /// Build from any iterator of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| case_fold(w.as_ref())).collect(),
        }
    }

    /// `word` must already be case-folded.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_fold_and_split_on_any_whitespace() {
        assert_eq!(
            tokens("Official  MUSIC\tVideo\n(HD)"),
            vec!["official", "music", "video", "(hd)"]
        );
        assert!(tokens("   ").is_empty());
    }

    #[test]
    fn test_punctuation_only() {
        assert!(is_punctuation_only("-"));
        assert!(is_punctuation_only("..."));
        assert!(is_punctuation_only("|"));
        assert!(is_punctuation_only("\u{2014}"));
        assert!(is_punctuation_only("\u{2026}"));
        assert!(!is_punctuation_only("#1"));
        assert!(!is_punctuation_only("(hd)"));
        assert!(!is_punctuation_only(""));
    }

    #[test]
    fn test_builtin_english_list_loads() {
        let stop = StopWords::english();
        assert!(stop.len() > 100);
        assert!(stop.contains("the"));
        assert!(stop.contains("don't"));
        assert!(!stop.contains("music"));
        // The header comment is not a word.
        assert!(!stop.contains("#"));
    }

    #[test]
    fn test_parse_folds_and_skips_comments() {
        let stop = StopWords::parse("# custom\nThe\n\n  AND \n");
        assert_eq!(stop.len(), 2);
        assert!(stop.contains("the"));
        assert!(stop.contains("and"));
    }
}

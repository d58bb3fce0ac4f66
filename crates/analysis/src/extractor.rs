//! Citation extraction
//!
//! Turns one document's raw text into the ordered sequence of citation
//! tokens it contains. Matching is purely lexical: unterminated or
//! overlapping delimiters are skipped, never reported.

use citeorder_common::errors::{AppError, Result};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Book titles in `《…》`, person names in `〚…〛`.
pub const DEFAULT_CITATION_PATTERN: &str = r"《([^》]+)》|〚([^〛]+)〛";

static DEFAULT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_CITATION_PATTERN).expect("built-in citation pattern compiles"));

/// Citation tokens of one document, in document order.
///
/// May be empty and may repeat tokens. Immutable once extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(Vec<String>);

impl Sequence {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for Sequence {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl<S: Into<String>> FromIterator<S> for Sequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Extracts bracket-delimited citation tokens from free text.
///
/// The token is the first capture group that took part in the match, so
/// the default pattern yields the text between the brackets. Patterns
/// without groups, or an extractor built with `keep_delimiters(true)`,
/// yield the whole match instead.
///
/// Stripping merges `《X》` and `〚X〛` into the same token `X`, so a work
/// and a person sharing a name never form a pair unless delimiters are kept.
#[derive(Debug, Clone)]
pub struct CitationExtractor {
    pattern: Regex,
    keep_delimiters: bool,
}

impl CitationExtractor {
    /// Extractor for the built-in two bracket styles
    pub fn new() -> Self {
        Self {
            pattern: DEFAULT_REGEX.clone(),
            keep_delimiters: false,
        }
    }

    /// Extractor for a caller-supplied delimiter pattern
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| AppError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        // An empty match would produce an empty token at every position
        if regex.is_match("") {
            return Err(AppError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "pattern matches the empty string".to_string(),
            });
        }

        Ok(Self {
            pattern: regex,
            keep_delimiters: false,
        })
    }

    /// Build from an optional pattern, falling back to the built-in one
    pub fn from_pattern(pattern: Option<&str>) -> Result<Self> {
        match pattern {
            Some(p) => Self::with_pattern(p),
            None => Ok(Self::new()),
        }
    }

    /// Keep the delimiter characters as part of each token
    pub fn keep_delimiters(mut self, keep: bool) -> Self {
        self.keep_delimiters = keep;
        self
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Extract the citation tokens of one document.
    ///
    /// `None` and empty text both yield an empty sequence.
    pub fn extract(&self, text: Option<&str>) -> Sequence {
        let text = match text {
            Some(t) if !t.is_empty() => t,
            _ => return Sequence::default(),
        };

        let group_count = self.pattern.captures_len();
        let mut tokens = Vec::new();

        for cap in self.pattern.captures_iter(text) {
            let token = if self.keep_delimiters || group_count <= 1 {
                cap.get(0)
            } else {
                (1..group_count).find_map(|i| cap.get(i)).or_else(|| cap.get(0))
            };

            if let Some(m) = token {
                tokens.push(m.as_str().to_string());
            }
        }

        Sequence(tokens)
    }

    /// Extract every document of a corpus, preserving corpus order
    pub fn extract_all<'a, I>(&self, texts: I) -> Vec<Sequence>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let sequences: Vec<Sequence> = texts.into_iter().map(|t| self.extract(t)).collect();

        debug!(
            documents = sequences.len(),
            citations = sequences.iter().map(Sequence::len).sum::<usize>(),
            "Citations extracted"
        );

        sequences
    }
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

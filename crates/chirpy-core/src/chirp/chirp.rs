//! Chirp struct and body rules

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::user::UserId;

/// Maximum chirp length in characters
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Replacement written over profane words
pub const CENSOR: &str = "****";

/// Unique identifier for a chirp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChirpId(pub u64);

impl std::fmt::Display for ChirpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A short text post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: ChirpId,
    pub body: String,
    pub author_id: UserId,
}

/// Check that a body is between 1 and [`MAX_CHIRP_LENGTH`] characters
pub fn validate_body(body: &str) -> Result<(), ValidationError> {
    match body.chars().count() {
        0 => Err(ValidationError::Empty),
        len if len > MAX_CHIRP_LENGTH => Err(ValidationError::TooLong {
            len,
            max: MAX_CHIRP_LENGTH,
        }),
        _ => Ok(()),
    }
}

/// Set of words censored out of chirp bodies
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    words: HashSet<String>,
}

impl ProfanityFilter {
    /// Build a filter from the given words (matched case-insensitively)
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Check a single space-delimited word
    pub fn is_profane(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Replace every profane word with [`CENSOR`].
    ///
    /// Words are split on single spaces only, so `"Sharbert!"` is left alone
    /// and runs of spaces are preserved.
    pub fn clean(&self, body: &str) -> String {
        body.split(' ')
            .map(|word| if self.is_profane(word) { CENSOR } else { word })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Censor `body` with `filter`
pub fn clean_body(body: &str, filter: &ProfanityFilter) -> String {
    filter.clean(body)
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        Self::new(["kerfuffle", "sharbert", "fornax"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_small_chirp() {
        assert!(validate_body("First post!").is_ok());
    }

    #[test]
    fn test_validate_empty_chirp() {
        assert_eq!(validate_body(""), Err(ValidationError::Empty));
    }

    #[test]
    fn test_validate_boundaries() {
        assert!(validate_body(&"a".repeat(1)).is_ok());
        assert!(validate_body(&"a".repeat(140)).is_ok());
        assert_eq!(
            validate_body(&"a".repeat(141)),
            Err(ValidationError::TooLong { len: 141, max: 140 })
        );
    }

    #[test]
    fn test_validate_counts_characters() {
        // 140 two-byte characters are still 140 characters
        assert!(validate_body(&"é".repeat(140)).is_ok());
    }

    #[test]
    fn test_clean_body() {
        let filter = ProfanityFilter::default();
        let cases = [
            (
                "This is a kerfuffle opinion I need to share with the world",
                "This is a **** opinion I need to share with the world",
            ),
            (
                "This is a Kerfuffle opinion I need to share with the world",
                "This is a **** opinion I need to share with the world",
            ),
            (
                "This is a KerFuFFle opinion I need to share with the world and FOrnaX",
                "This is a **** opinion I need to share with the world and ****",
            ),
            ("Sharbert!", "Sharbert!"),
            ("KerFuFFle", "****"),
            ("This is a kerfuffle", "This is a ****"),
            (
                "Kerfuffle is an interesting word. Sharbert is misspelled. What is fornax?",
                "**** is an interesting word. **** is misspelled. What is fornax?",
            ),
        ];

        for (body, want) in cases {
            assert_eq!(filter.clean(body), want, "cleaning {body:?}");
        }
    }

    #[test]
    fn test_clean_preserves_spacing() {
        let filter = ProfanityFilter::default();
        assert_eq!(filter.clean("a  fornax  b"), "a  ****  b");
    }
}

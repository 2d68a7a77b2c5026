//! Text tokenization and stemming shared by indexing and querying.

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Words whose raw and stemmed forms are both shorter than this are dropped.
const MIN_WORD_LENGTH: usize = 3;

/// English stop words. Generators leave these out of `terms`, so queries skip them too.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "near", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Stemming language of an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
    German,
    Spanish,
    Italian,
    Portuguese,
    Dutch,
    Russian,
    /// Lowercase only, no stemming or stop words.
    None,
}

impl Language {
    const fn algorithm(self) -> Option<Algorithm> {
        match self {
            Self::English => Some(Algorithm::English),
            Self::French => Some(Algorithm::French),
            Self::German => Some(Algorithm::German),
            Self::Spanish => Some(Algorithm::Spanish),
            Self::Italian => Some(Algorithm::Italian),
            Self::Portuguese => Some(Algorithm::Portuguese),
            Self::Dutch => Some(Algorithm::Dutch),
            Self::Russian => Some(Algorithm::Russian),
            Self::None => None,
        }
    }

    const fn stop_words(self) -> &'static [&'static str] {
        match self {
            Self::English => STOP_WORDS,
            _ => &[],
        }
    }
}

/// A normalized word: the lowercase form as typed and its stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub raw: String,
    pub stem: String,
}

/// Splits text into words and normalizes them into search keys.
pub struct Tokenizer {
    language: Language,
    stemmer: Option<Stemmer>,
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Tokenizer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            stemmer: language.algorithm().map(Stemmer::create),
        }
    }

    pub const fn language(&self) -> Language {
        self.language
    }

    /// Splits on anything that is not a letter, digit or underscore.
    pub fn words<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|w| !w.is_empty())
    }

    /// Normalizes one word, or returns `None` for stop words, numerals and
    /// words too short to be indexed.
    pub fn normalize(&self, word: &str) -> Option<Token> {
        let raw = word.to_lowercase();
        if raw.is_empty()
            || self.language.stop_words().contains(&raw.as_str())
            || raw.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let stem = match &self.stemmer {
            Some(stemmer) => stemmer.stem(&raw).into_owned(),
            None => raw.clone(),
        };

        if stem.chars().count() < MIN_WORD_LENGTH && raw.chars().count() < MIN_WORD_LENGTH {
            return None;
        }

        Some(Token { raw, stem })
    }

    /// Words of `text` as normalized tokens, in order, duplicates kept.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.words(text).filter_map(|w| self.normalize(w)).collect()
    }
}

//! Free-text query parsing.

use super::tokenize::{Token, Tokenizer};

/// A parsed search query.
///
/// Whitespace separates words; a word with a leading `-` excludes documents
/// containing it. Object terms are the lowercase words as typed, without
/// stemming, because object names are matched by containment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    text: String,
    required: Vec<Token>,
    excluded: Vec<Token>,
    object_terms: Vec<String>,
}

impl Query {
    pub fn parse(text: &str, tokenizer: &Tokenizer) -> Self {
        let mut query = Self {
            text: text.trim().to_string(),
            ..Self::default()
        };

        for chunk in text.split_whitespace() {
            let (negated, chunk) = match chunk.strip_prefix('-') {
                Some(rest) if !rest.is_empty() => (true, rest),
                _ => (false, chunk),
            };

            for word in tokenizer.words(chunk) {
                if !negated {
                    let lower = word.to_lowercase();
                    if !query.object_terms.contains(&lower) {
                        query.object_terms.push(lower);
                    }
                }

                let Some(token) = tokenizer.normalize(word) else {
                    continue;
                };
                let list = if negated {
                    &mut query.excluded
                } else {
                    &mut query.required
                };
                if !list.iter().any(|t| t.stem == token.stem) {
                    list.push(token);
                }
            }
        }

        query
    }

    /// The query as typed, trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Words every full-text hit must contain.
    pub fn required(&self) -> &[Token] {
        &self.required
    }

    /// Words no full-text hit may contain.
    pub fn excluded(&self) -> &[Token] {
        &self.excluded
    }

    pub fn object_terms(&self) -> &[String] {
        &self.object_terms
    }

    /// True when nothing in the query can match anything.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.object_terms.is_empty()
    }
}

//! "Did you mean" suggestions for words with no hits.

use crate::index::SearchIndex;
use rapidfuzz::distance::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a term to be suggested.
const MIN_SIMILARITY: f64 = 0.85;

/// A near-miss indexed term.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub term: String,
    pub score: f64,
}

/// Indexed terms (body and title) closest to `word`, best first.
pub fn suggest_terms(index: &SearchIndex, word: &str, limit: usize) -> Vec<Suggestion> {
    let word = word.to_lowercase();
    let mut suggestions: Vec<Suggestion> = index
        .terms()
        .chain(index.title_terms())
        .map(|(term, _)| term)
        .filter(|term| *term != word)
        .filter_map(|term| {
            let score = jaro_winkler::similarity(word.chars(), term.chars());
            (score >= MIN_SIMILARITY).then(|| Suggestion {
                term: term.to_string(),
                score,
            })
        })
        .collect();

    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
    suggestions.dedup_by(|a, b| a.term == b.term);
    suggestions.truncate(limit);
    suggestions
}

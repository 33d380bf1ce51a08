//! # Keyword Extraction
//!
//! The pipeline consumes keyword extraction as a black-box collaborator
//! behind the [`KeywordExtractor`] trait. The shipped
//! [`TermFrequencyExtractor`] is a deterministic stopword-filtering,
//! frequency-weighted implementation so the system runs without any external
//! NLP dependency; deployments can swap in something smarter.

use regex::Regex;
use std::collections::HashMap;

/// One extracted term with its weight. Higher weight means the term matters
/// more for the query; the list is ordered by descending weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

/// Collaborator contract: free text in, ordered weighted terms out.
pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<WeightedTerm>;
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "from", "are", "was", "were", "has", "have",
    "had", "not", "its", "but", "all", "any", "can", "will", "when", "after", "before", "been",
    "into", "out", "our", "your", "their", "they", "them", "you", "about", "there", "which",
    "what", "while", "because", "does", "did", "his", "her", "she", "him", "who", "how", "why",
    "than", "then", "also", "only", "some", "such", "very", "just", "being", "over", "under",
    "again", "still", "getting", "gets", "please", "users", "user",
];

/// Frequency-based extractor with a stopword filter.
pub struct TermFrequencyExtractor {
    token_re: Regex,
    max_terms: usize,
}

impl TermFrequencyExtractor {
    pub fn new(max_terms: usize) -> Self {
        Self {
            // Compiled once at construction; the pattern is a literal so the
            // unwrap cannot fire at runtime.
            token_re: Regex::new(r"[a-z0-9][a-z0-9_.-]*").unwrap(),
            max_terms,
        }
    }
}

impl Default for TermFrequencyExtractor {
    fn default() -> Self {
        Self::new(10)
    }
}

impl KeywordExtractor for TermFrequencyExtractor {
    fn extract(&self, text: &str) -> Vec<WeightedTerm> {
        let lowered = text.to_lowercase();
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for token in self.token_re.find_iter(&lowered) {
            let token = token.as_str().trim_matches(|c| c == '.' || c == '-');
            if token.len() < 3 || STOPWORDS.contains(&token) {
                continue;
            }
            let entry = counts.entry(token.to_string()).or_insert(0);
            if *entry == 0 {
                first_seen.push(token.to_string());
            }
            *entry += 1;
        }

        let mut terms: Vec<WeightedTerm> = first_seen
            .into_iter()
            .map(|term| {
                let weight = counts[&term] as f64;
                WeightedTerm { term, weight }
            })
            .collect();

        // Stable sort keeps first-appearance order among equal weights, so
        // the output is deterministic for identical input text.
        terms.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));
        terms.truncate(self.max_terms);
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_stopwords_and_short_tokens() {
        let extractor = TermFrequencyExtractor::default();
        let terms = extractor.extract("The database is not responding after the update");
        let words: Vec<&str> = terms.iter().map(|t| t.term.as_str()).collect();
        assert!(words.contains(&"database"));
        assert!(words.contains(&"responding"));
        assert!(!words.contains(&"the"));
        assert!(!words.contains(&"is"));
    }

    #[test]
    fn repeated_terms_rank_first() {
        let extractor = TermFrequencyExtractor::default();
        let terms =
            extractor.extract("timeout on checkout, checkout page shows timeout, timeout again");
        assert_eq!(terms[0].term, "timeout");
        assert_eq!(terms[0].weight, 3.0);
        assert_eq!(terms[1].term, "checkout");
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = TermFrequencyExtractor::default();
        let text = "portal login fails with 401 after certificate rotation";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }

    #[test]
    fn empty_text_yields_no_terms() {
        let extractor = TermFrequencyExtractor::default();
        assert!(extractor.extract("   ").is_empty());
    }
}

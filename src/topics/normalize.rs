// Text normalization: tokenize, lowercase, drop excluded words.
//
// No stemming or lemmatization. Tokens are maximal runs of alphanumeric
// characters; apostrophes are kept inside a word ("don't") and trimmed
// from its edges. Duplicates survive so the matrix builder can count them.

use std::collections::HashSet;

use crate::corpus::stopwords::StopwordSet;

/// Normalizer settings beyond the stop-word sets.
#[derive(Debug, Clone, Default)]
pub struct NormalizerConfig {
    /// Literal noise words observed to pollute the topics
    pub noise_words: Vec<String>,
}

/// Tokenizer plus the combined exclusion set (generic ∪ domain ∪ noise).
pub struct Normalizer {
    exclusions: HashSet<String>,
}

impl Normalizer {
    pub fn new(stopwords: &StopwordSet, config: &NormalizerConfig) -> Self {
        let exclusions = stopwords
            .iter()
            .map(str::to_string)
            .chain(config.noise_words.iter().map(|w| w.trim().to_lowercase()))
            .collect();
        Self { exclusions }
    }

    /// Tokenize and filter one document, preserving order and duplicates.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|t| !self.exclusions.contains(t))
            .collect()
    }

    pub fn is_excluded(&self, token: &str) -> bool {
        self.exclusions.contains(token)
    }
}

/// Split raw text into lowercase word tokens with punctuation stripped.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        let c = if c == '\u{2019}' { '\'' } else { c };
        if c.is_alphanumeric() || (c == '\'' && !current.is_empty()) {
            current.extend(c.to_lowercase());
        } else {
            push_token(&mut tokens, &mut current);
        }
    }
    push_token(&mut tokens, &mut current);

    tokens
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    let word = current.trim_end_matches('\'');
    if !word.is_empty() {
        tokens.push(word.to_string());
    }
    current.clear();
}

// Stop-word sets: the generic English list plus a domain supplement.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

/// Union of the generic and domain-specific stop words, lowercased.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// Generic English stop words from the `stop-words` crate plus the
    /// domain-specific supplement.
    pub fn english_with(domain: &[String]) -> Self {
        let generic: Vec<String> = get(LANGUAGE::English);
        Self::from_lists(&generic, domain)
    }

    pub fn from_lists(generic: &[String], domain: &[String]) -> Self {
        let words = generic
            .iter()
            .chain(domain.iter())
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|w| w.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_is_case_normalized() {
        let set = StopwordSet::from_lists(&["The".to_string()], &["  Model ".to_string()]);
        assert!(set.contains("the"));
        assert!(set.contains("model"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_english_list_included() {
        let set = StopwordSet::english_with(&["phenomenon".to_string()]);
        assert!(set.contains("the"));
        assert!(set.contains("phenomenon"));
    }
}

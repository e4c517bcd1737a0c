// Sparse document-term matrix built from (document, token) pairs.
//
// Documents and terms are kept in sorted order so fitting and inference
// see the same layout on every run. A document with no surviving tokens
// never produces a row.

use std::collections::{BTreeMap, BTreeSet};

/// Term counts per document. Rows are sparse `(term_index, count)` lists.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTermMatrix {
    documents: Vec<String>,
    vocabulary: Vec<String>,
    rows: Vec<Vec<(usize, u32)>>,
}

impl DocumentTermMatrix {
    /// Count occurrences of each distinct `(document, token)` pair.
    pub fn from_pairs<I, D, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (D, T)>,
        D: Into<String>,
        T: Into<String>,
    {
        let mut counts: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
        for (doc, token) in pairs {
            *counts
                .entry(doc.into())
                .or_default()
                .entry(token.into())
                .or_insert(0) += 1;
        }

        let vocabulary: Vec<String> = counts
            .values()
            .flat_map(|terms| terms.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut documents = Vec::with_capacity(counts.len());
        let mut rows = Vec::with_capacity(counts.len());
        for (doc, terms) in counts {
            let row = terms
                .into_iter()
                .map(|(term, count)| {
                    // Vocabulary is sorted and contains every term.
                    let idx = vocabulary.binary_search(&term).unwrap_or_default();
                    (idx, count)
                })
                .collect();
            documents.push(doc);
            rows.push(row);
        }

        Self {
            documents,
            vocabulary,
            rows,
        }
    }

    pub fn n_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() || self.vocabulary.is_empty()
    }

    pub fn document_ids(&self) -> &[String] {
        &self.documents
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Sparse row for the document at `index`.
    pub fn row(&self, index: usize) -> &[(usize, u32)] {
        &self.rows[index]
    }

    /// Count for a `(document, term)` pair; zero when unobserved.
    pub fn count(&self, document: &str, term: &str) -> u32 {
        let (Ok(d), Ok(t)) = (
            self.documents.binary_search_by(|x| x.as_str().cmp(document)),
            self.vocabulary.binary_search_by(|x| x.as_str().cmp(term)),
        ) else {
            return 0;
        };
        self.rows[d]
            .iter()
            .find(|(idx, _)| *idx == t)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// Total token count of a document; zero when the document has no row.
    pub fn row_total(&self, document: &str) -> u32 {
        self.documents
            .binary_search_by(|x| x.as_str().cmp(document))
            .map(|d| self.rows[d].iter().map(|(_, c)| c).sum())
            .unwrap_or(0)
    }

    /// All nonzero entries as `(document, term, count)`.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, u32)> + '_ {
        self.documents.iter().zip(&self.rows).flat_map(move |(doc, row)| {
            row.iter()
                .map(move |&(t, c)| (doc.as_str(), self.vocabulary[t].as_str(), c))
        })
    }

    /// Ids from `all` that produced no row (every token was filtered out).
    pub fn dropped_documents<'a, I>(&self, all: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: BTreeSet<&str> = self.documents.iter().map(|d| d.as_str()).collect();
        let dropped: BTreeSet<&str> = all.into_iter().filter(|d| !present.contains(d)).collect();
        dropped.into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_aggregate_per_pair() {
        let dtm = DocumentTermMatrix::from_pairs([("d1", "wave"), ("d1", "wave"), ("d1", "energy")]);
        assert_eq!(dtm.count("d1", "wave"), 2);
        assert_eq!(dtm.count("d1", "energy"), 1);
        assert_eq!(dtm.entries().count(), 2);
        assert_eq!(dtm.row_total("d1"), 3);
    }

    #[test]
    fn test_unobserved_pairs_are_zero() {
        let dtm = DocumentTermMatrix::from_pairs([("d1", "wave"), ("d2", "cell")]);
        assert_eq!(dtm.count("d1", "cell"), 0);
        assert_eq!(dtm.count("d3", "wave"), 0);
        assert_eq!(dtm.vocabulary(), ["cell", "wave"]);
    }

    #[test]
    fn test_empty_input_gives_empty_matrix() {
        let dtm = DocumentTermMatrix::from_pairs(Vec::<(String, String)>::new());
        assert!(dtm.is_empty());
        assert_eq!(dtm.n_documents(), 0);
    }

    #[test]
    fn test_dropped_documents_reported() {
        let dtm = DocumentTermMatrix::from_pairs([("d1", "wave")]);
        assert_eq!(dtm.dropped_documents(["d1", "d2", "d2"]), vec!["d2"]);
    }
}

// Corpus loading: standards, items and the supplementary stop-word list.

pub mod loader;
pub mod records;
pub mod stopwords;

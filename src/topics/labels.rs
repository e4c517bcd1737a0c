// Analyst-assigned topic names.
//
// Labels are chosen after reading each topic's top terms and are injected
// as a JSON object keyed by 1-based topic index:
//
//   {"1": "Motion", "2": "Humans", ...}
//
// The fitter never sees them; they only decorate reports.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{AlignError, Result};

/// Bijection from topic index to a human-readable name.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicLabels {
    names: Vec<String>,
}

impl TopicLabels {
    /// Placeholder labels `Topic 1..K` for runs without a labeling table.
    pub fn numbered(k: usize) -> Self {
        Self {
            names: (1..=k).map(|i| format!("Topic {i}")).collect(),
        }
    }

    pub fn load(path: &Path, k: usize) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| AlignError::io(path.display().to_string(), e))?;
        Self::from_json(&json, k)
    }

    /// Parse and validate: exactly indices 1..=K, unique non-empty names.
    pub fn from_json(json: &str, k: usize) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;

        let mut by_index = BTreeMap::new();
        for (key, name) in raw {
            let index: usize = key.trim().parse().map_err(|_| {
                AlignError::Config(format!("topic label key '{key}' is not an index"))
            })?;
            if index == 0 || index > k {
                return Err(AlignError::Config(format!(
                    "topic label index {index} is outside 1..={k}"
                )));
            }
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AlignError::Config(format!("topic {index} has an empty label")));
            }
            if by_index.insert(index, name).is_some() {
                return Err(AlignError::Config(format!("topic {index} is labeled twice")));
            }
        }

        if by_index.len() != k {
            return Err(AlignError::Config(format!(
                "expected labels for all {k} topics, got {}",
                by_index.len()
            )));
        }

        let names: Vec<String> = by_index.into_values().collect();
        let unique: HashSet<&String> = names.iter().collect();
        if unique.len() != names.len() {
            return Err(AlignError::Config("topic labels must be unique".to_string()));
        }

        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Label of a 0-based topic index.
    pub fn name(&self, topic: usize) -> &str {
        self.names.get(topic).map(String::as_str).unwrap_or("?")
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered() {
        let labels = TopicLabels::numbered(3);
        assert_eq!(labels.name(0), "Topic 1");
        assert_eq!(labels.name(2), "Topic 3");
    }

    #[test]
    fn test_from_json_orders_by_index() {
        let labels = TopicLabels::from_json(r#"{"2": "Humans", "1": "Motion"}"#, 2).unwrap();
        assert_eq!(labels.names(), ["Motion", "Humans"]);
    }

    #[test]
    fn test_missing_topic_rejected() {
        let err = TopicLabels::from_json(r#"{"1": "Motion"}"#, 2).unwrap_err();
        assert!(matches!(err, AlignError::Config(_)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = TopicLabels::from_json(r#"{"1": "Motion", "2": "Motion"}"#, 2).unwrap_err();
        assert!(matches!(err, AlignError::Config(_)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = TopicLabels::from_json(r#"{"0": "A", "1": "B"}"#, 2).unwrap_err();
        assert!(matches!(err, AlignError::Config(_)));
    }
}

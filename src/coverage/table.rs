// Long-form posterior table: one row per (item, topic).
//
// This is the exported artifact and the input to aggregation. Items are
// joined with their difficulty level and topics with their analyst label.

use std::collections::HashMap;

use serde::Serialize;

use crate::corpus::records::{ItemRecord, Level};
use crate::error::{AlignError, Result};
use crate::topics::inference::TopicPosterior;
use crate::topics::labels::TopicLabels;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosteriorRecord {
    pub item: String,
    /// 1-based topic index
    pub topic: usize,
    pub label: String,
    pub probability: f64,
    pub level: Level,
}

/// Flatten the posterior into long rows, joined with levels and labels.
pub fn long_table(
    posterior: &TopicPosterior,
    items: &[ItemRecord],
    labels: &TopicLabels,
) -> Result<Vec<PosteriorRecord>> {
    if labels.len() != posterior.k {
        return Err(AlignError::Config(format!(
            "{} topic labels for a {}-topic model",
            labels.len(),
            posterior.k
        )));
    }

    let levels: HashMap<&str, Level> = items
        .iter()
        .map(|i| (i.item_id.as_str(), i.level))
        .collect();

    let mut records = Vec::with_capacity(posterior.len() * posterior.k);
    for row in &posterior.rows {
        let level = *levels.get(row.document.as_str()).ok_or_else(|| {
            AlignError::Input(format!("posterior row '{}' has no matching item", row.document))
        })?;
        for (t, &probability) in row.probabilities.iter().enumerate() {
            records.push(PosteriorRecord {
                item: row.document.clone(),
                topic: t + 1,
                label: labels.name(t).to_string(),
                probability,
                level,
            });
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::inference::PosteriorRow;

    #[test]
    fn test_long_table_joins_level_and_label() {
        let posterior = TopicPosterior {
            k: 2,
            rows: vec![PosteriorRow {
                document: "H1".to_string(),
                probabilities: vec![0.25, 0.75],
                matched_tokens: 3,
                total_tokens: 3,
            }],
        };
        let items = vec![ItemRecord {
            item_id: "H1".to_string(),
            prompt: String::new(),
            level: Level::High,
        }];
        let labels = TopicLabels::from_json(r#"{"1": "Motion", "2": "Humans"}"#, 2).unwrap();

        let records = long_table(&posterior, &items, &labels).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].topic, 2);
        assert_eq!(records[1].label, "Humans");
        assert_eq!(records[1].level, Level::High);
        assert!((records[1].probability - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let posterior = TopicPosterior { k: 3, rows: vec![] };
        let err = long_table(&posterior, &[], &TopicLabels::numbered(2)).unwrap_err();
        assert!(matches!(err, AlignError::Config(_)));
    }
}

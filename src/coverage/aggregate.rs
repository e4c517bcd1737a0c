// Per-topic, per-level coverage on the log-ratio scale.
//
// The mean probability of a topic within a level is rescaled by K and
// logged:
//
//   value = ln((Σ p / n) · K)
//
// so a topic represented exactly at the uniform rate 1/K sits at 0. Above
// zero the level over-represents the topic, below zero it under-represents.

use std::collections::BTreeMap;

use serde::Serialize;

use super::table::PosteriorRecord;
use crate::corpus::records::Level;

/// Aggregated coverage of one topic at one difficulty level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoveragePoint {
    /// 1-based topic index
    pub topic: usize,
    pub label: String,
    pub level: Level,
    /// Items contributing to the group
    pub n: usize,
    pub mean_probability: f64,
    pub log_ratio: f64,
}

/// `ln((sum / n) · k)`: zero at the uniform baseline 1/k.
pub fn log_ratio(sum: f64, n: usize, k: usize) -> f64 {
    ((sum / n as f64) * k as f64).ln()
}

/// Group long posterior rows by (topic, level) and apply `log_ratio`.
///
/// Output is ordered by topic, then level (Low, Medium, High). Levels with
/// no items produce no points.
pub fn aggregate_by_level(records: &[PosteriorRecord], k: usize) -> Vec<CoveragePoint> {
    let mut groups: BTreeMap<(usize, Level), (String, f64, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups
            .entry((r.topic, r.level))
            .or_insert_with(|| (r.label.clone(), 0.0, 0));
        entry.1 += r.probability;
        entry.2 += 1;
    }

    groups
        .into_iter()
        .map(|((topic, level), (label, sum, n))| CoveragePoint {
            topic,
            label,
            level,
            n,
            mean_probability: sum / n as f64,
            log_ratio: log_ratio(sum, n, k),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(item: &str, topic: usize, probability: f64, level: Level) -> PosteriorRecord {
        PosteriorRecord {
            item: item.to_string(),
            topic,
            label: format!("Topic {topic}"),
            probability,
            level,
        }
    }

    #[test]
    fn test_log_ratio_known_value() {
        // n=2, Σp=0.5, K=7 -> ln(1.75)
        let v = log_ratio(0.5, 2, 7);
        assert!((v - 1.75f64.ln()).abs() < 1e-12);
        assert!((v - 0.559).abs() < 1e-3);
    }

    #[test]
    fn test_uniform_maps_to_zero() {
        assert!(log_ratio(3.0 / 7.0, 3, 7).abs() < 1e-12);
    }

    #[test]
    fn test_groups_by_topic_and_level() {
        let records = vec![
            record("L1", 1, 0.2, Level::Low),
            record("L2", 1, 0.3, Level::Low),
            record("H1", 1, 0.9, Level::High),
        ];
        let points = aggregate_by_level(&records, 7);
        assert_eq!(points.len(), 2);

        let low = &points[0];
        assert_eq!(low.level, Level::Low);
        assert_eq!(low.n, 2);
        assert!((low.mean_probability - 0.25).abs() < 1e-12);
        assert!((low.log_ratio - 1.75f64.ln()).abs() < 1e-12);

        assert_eq!(points[1].level, Level::High);
        assert_eq!(points[1].n, 1);
    }
}

// Fold-in inference: topic mixtures for documents the model never saw.
//
// φ stays fixed. For each new document the variational Dirichlet
// parameter γ is iterated to a fixed point:
//
//   γ_t = α + Σ_w n_w · φ_tw·exp ψ(γ_t) / Σ_t' φ_t'w·exp ψ(γ_t')
//
// and the posterior is γ / Σγ. Terms outside the model vocabulary are
// ignored, so a document with no overlap keeps γ = α and comes out
// exactly uniform. No randomness is involved: the same document gives the
// same row whatever batch it is inferred in.

use serde::Serialize;
use tracing::{debug, warn};

use super::dtm::DocumentTermMatrix;
use super::lda::FittedTopicModel;

/// Convergence settings for the fixed-point iteration.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub max_iterations: usize,
    /// Stop when the mean absolute change in γ falls below this
    pub tolerance: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
        }
    }
}

/// Posterior topic mixture of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosteriorRow {
    pub document: String,
    /// K probabilities summing to 1
    pub probabilities: Vec<f64>,
    /// Tokens whose term is in the model vocabulary
    pub matched_tokens: u32,
    pub total_tokens: u32,
}

impl PosteriorRow {
    /// Index of the most probable topic (ties go to the lower index).
    pub fn dominant_topic(&self) -> usize {
        self.probabilities
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (t, &p)| if p > best.1 { (t, p) } else { best })
            .0
    }
}

/// Posterior mixtures for a batch of documents, in matrix order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPosterior {
    pub k: usize,
    pub rows: Vec<PosteriorRow>,
}

impl TopicPosterior {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, document: &str) -> Option<&PosteriorRow> {
        self.rows.iter().find(|r| r.document == document)
    }

    /// Documents that shared no vocabulary with the model.
    ///
    /// Their posteriors are uniform. This is a finding to report, not an
    /// error, and the rows stay in the posterior.
    pub fn zero_overlap_items(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.matched_tokens == 0)
            .map(|r| r.document.as_str())
            .collect()
    }
}

impl FittedTopicModel {
    /// Infer topic mixtures for every document in `dtm`. Never mutates the model.
    pub fn infer(&self, dtm: &DocumentTermMatrix, config: &InferenceConfig) -> TopicPosterior {
        // Map the new matrix's term indices onto model term ids once.
        let term_map: Vec<Option<usize>> = dtm
            .vocabulary()
            .iter()
            .map(|term| self.term_id(term))
            .collect();

        let rows: Vec<PosteriorRow> = dtm
            .document_ids()
            .iter()
            .enumerate()
            .map(|(di, document)| {
                let row = dtm.row(di);
                let total_tokens = row.iter().map(|&(_, c)| c).sum();
                let counts: Vec<(usize, f64)> = row
                    .iter()
                    .filter_map(|&(t, c)| term_map[t].map(|w| (w, c as f64)))
                    .collect();
                let matched_tokens = counts.iter().map(|&(_, c)| c as u32).sum();

                PosteriorRow {
                    document: document.clone(),
                    probabilities: self.fold_in(&counts, config),
                    matched_tokens,
                    total_tokens,
                }
            })
            .collect();

        let posterior = TopicPosterior { k: self.k(), rows };
        let zero = posterior.zero_overlap_items();
        if !zero.is_empty() {
            warn!(
                items = zero.len(),
                "Items share no vocabulary with the model; their posteriors are uniform"
            );
        }
        posterior
    }

    fn fold_in(&self, counts: &[(usize, f64)], config: &InferenceConfig) -> Vec<f64> {
        let k = self.k();
        let alpha = self.alpha();
        let phi = self.topic_terms();
        let n: f64 = counts.iter().map(|&(_, c)| c).sum();

        let mut gamma = vec![alpha + n / k as f64; k];
        let mut next = vec![0.0; k];
        let mut weights = vec![0.0; k];

        for it in 0..config.max_iterations {
            let exp_elog: Vec<f64> = gamma.iter().map(|&g| digamma(g).exp()).collect();

            next.iter_mut().for_each(|g| *g = alpha);
            for &(w, c) in counts {
                let mut norm = 0.0;
                for t in 0..k {
                    weights[t] = phi[t][w] * exp_elog[t];
                    norm += weights[t];
                }
                if norm > 0.0 {
                    for t in 0..k {
                        next[t] += c * weights[t] / norm;
                    }
                }
            }

            let change: f64 =
                gamma.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum::<f64>() / k as f64;
            std::mem::swap(&mut gamma, &mut next);
            if change < config.tolerance {
                debug!(iterations = it + 1, "Fold-in converged");
                break;
            }
        }

        let total: f64 = gamma.iter().sum();
        gamma.iter().map(|g| g / total).collect()
    }
}

/// Digamma ψ(x) for x > 0: recurrence up to x ≥ 10, then the asymptotic series.
pub fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 10.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    result + x.ln() - 0.5 * inv
        - inv2 * (1.0 / 12.0 - inv2 * (1.0 / 120.0 - inv2 * (1.0 / 252.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::lda::{FitterConfig, GibbsLda};
    use crate::topics::traits::TopicModelFitter;

    fn model() -> FittedTopicModel {
        let docs = [
            ("physics", "force motion velocity force motion velocity"),
            ("biology", "cell organism gene cell organism gene"),
        ];
        let dtm = DocumentTermMatrix::from_pairs(docs.iter().flat_map(|(d, text)| {
            text.split_whitespace().map(move |w| (d.to_string(), w.to_string()))
        }));
        GibbsLda::new(FitterConfig {
            topics: 2,
            iterations: 300,
            ..FitterConfig::default()
        })
        .fit(&dtm)
        .unwrap()
    }

    #[test]
    fn test_digamma_known_values() {
        // ψ(1) = -γ (Euler–Mascheroni)
        assert!((digamma(1.0) + 0.577_215_664_901_532_9).abs() < 1e-9);
        // ψ(0.5) = -γ - 2 ln 2
        assert!((digamma(0.5) + 1.963_510_026_021_423_5).abs() < 1e-9);
    }

    #[test]
    fn test_rows_sum_to_one() {
        let model = model();
        let items = DocumentTermMatrix::from_pairs([
            ("i1", "force"),
            ("i1", "motion"),
            ("i2", "cell"),
            ("i2", "unknown"),
        ]);
        let posterior = model.infer(&items, &InferenceConfig::default());
        assert_eq!(posterior.len(), 2);
        for row in &posterior.rows {
            assert_eq!(row.probabilities.len(), 2);
            assert!((row.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        }
        assert_eq!(posterior.get("i2").unwrap().matched_tokens, 1);
        assert_eq!(posterior.get("i2").unwrap().total_tokens, 2);
    }

    #[test]
    fn test_zero_overlap_is_uniform() {
        let model = model();
        let items = DocumentTermMatrix::from_pairs([("i1", "volcano"), ("i1", "magma")]);
        let posterior = model.infer(&items, &InferenceConfig::default());
        let row = posterior.get("i1").unwrap();
        for p in &row.probabilities {
            assert!((p - 0.5).abs() < 1e-12, "expected uniform, got {p}");
        }
        assert_eq!(posterior.zero_overlap_items(), vec!["i1"]);
    }

    #[test]
    fn test_model_topics_separate_items() {
        let model = model();
        let items = DocumentTermMatrix::from_pairs([
            ("a", "force"),
            ("a", "velocity"),
            ("b", "gene"),
            ("b", "organism"),
        ]);
        let posterior = model.infer(&items, &InferenceConfig::default());
        let a = posterior.get("a").unwrap().dominant_topic();
        let b = posterior.get("b").unwrap().dominant_topic();
        assert_ne!(a, b, "physics and biology items should load on different topics");
    }

    #[test]
    fn test_subset_inference_matches_full_batch() {
        let model = model();
        let config = InferenceConfig::default();
        let full = model.infer(
            &DocumentTermMatrix::from_pairs([("a", "force"), ("b", "gene"), ("b", "cell")]),
            &config,
        );
        let subset = model.infer(
            &DocumentTermMatrix::from_pairs([("b", "gene"), ("b", "cell")]),
            &config,
        );
        assert_eq!(full.get("b"), subset.get("b"));
    }
}

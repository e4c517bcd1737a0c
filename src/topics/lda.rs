// Latent Dirichlet Allocation fitted with collapsed Gibbs sampling.
//
// Every token position carries a topic assignment. Each sweep removes a
// token's assignment from the counts and resamples it from
//
//   p(t) ∝ (n_dt + α) · (n_tw + β) / (n_t + V·β)
//
// After the final sweep the counts are turned into θ (document-topic) and
// φ (topic-term) with the same smoothing. All randomness comes from one
// seeded StdRng, so the same matrix and seed reproduce the same model.

use std::collections::HashMap;

use indicatif::{ProgressBar, ProgressStyle};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::dtm::DocumentTermMatrix;
use super::traits::TopicModelFitter;
use crate::error::{AlignError, Result};

/// Fitter settings. K is the analyst's choice, never inferred.
#[derive(Debug, Clone)]
pub struct FitterConfig {
    /// Number of latent topics (K)
    pub topics: usize,
    /// Symmetric Dirichlet prior on document-topic mixtures
    pub alpha: f64,
    /// Symmetric Dirichlet prior on topic-term distributions
    pub beta: f64,
    /// Number of full Gibbs sweeps over the corpus
    pub iterations: usize,
    pub seed: u64,
    /// Draw an indicatif progress bar while sampling
    pub show_progress: bool,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            topics: 7,
            alpha: 0.1,
            beta: 0.01,
            iterations: 2000,
            seed: 1234,
            show_progress: false,
        }
    }
}

/// Reject priors that are not finite and strictly positive.
///
/// NaN slips through a plain `<= 0.0` test, so check finiteness first.
pub fn check_priors(alpha: f64, beta: f64) -> Result<()> {
    for (name, value) in [("alpha", alpha), ("beta", beta)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(AlignError::Config(format!(
                "Dirichlet prior {name} must be finite and positive, got {value}"
            )));
        }
    }
    Ok(())
}

/// A fitted model: vocabulary, φ and the training documents' θ.
///
/// Immutable after fitting. Inference only reads it, so any number of
/// inference calls can share one model.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedTopicModel {
    alpha: f64,
    vocabulary: Vec<String>,
    term_index: HashMap<String, usize>,
    /// [topic][term]
    phi: Vec<Vec<f64>>,
    documents: Vec<String>,
    /// [document][topic]
    theta: Vec<Vec<f64>>,
}

impl FittedTopicModel {
    pub fn k(&self) -> usize {
        self.phi.len()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn term_id(&self, term: &str) -> Option<usize> {
        self.term_index.get(term).copied()
    }

    /// φ: one distribution over the vocabulary per topic.
    pub fn topic_terms(&self) -> &[Vec<f64>] {
        &self.phi
    }

    pub fn document_ids(&self) -> &[String] {
        &self.documents
    }

    /// θ: one distribution over topics per training document.
    pub fn document_topics(&self) -> &[Vec<f64>] {
        &self.theta
    }

    /// The `n` most probable terms of each topic, highest first.
    pub fn top_terms(&self, n: usize) -> Vec<Vec<(String, f64)>> {
        self.phi
            .iter()
            .map(|dist| {
                let mut pairs: Vec<(usize, f64)> = dist.iter().copied().enumerate().collect();
                pairs.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                pairs
                    .into_iter()
                    .take(n)
                    .map(|(w, p)| (self.vocabulary[w].clone(), p))
                    .collect()
            })
            .collect()
    }
}

/// Collapsed Gibbs sampler for LDA.
#[derive(Debug, Clone, Default)]
pub struct GibbsLda {
    pub config: FitterConfig,
}

impl GibbsLda {
    pub fn new(config: FitterConfig) -> Self {
        Self { config }
    }
}

impl TopicModelFitter for GibbsLda {
    fn fit(&self, dtm: &DocumentTermMatrix) -> Result<FittedTopicModel> {
        let k = self.config.topics;
        if k == 0 {
            return Err(AlignError::Config("number of topics must be at least 1".into()));
        }
        check_priors(self.config.alpha, self.config.beta)?;
        if dtm.is_empty() {
            return Err(AlignError::Config(format!(
                "cannot fit a topic model on an empty matrix ({} documents, {} terms)",
                dtm.n_documents(),
                dtm.n_terms()
            )));
        }
        if dtm.n_documents() < k {
            return Err(AlignError::Config(format!(
                "{} documents is fewer than the {k} topics requested",
                dtm.n_documents()
            )));
        }

        let mut state = GibbsState::init(dtm, &self.config);
        info!(
            documents = dtm.n_documents(),
            terms = dtm.n_terms(),
            tokens = state.nk.iter().sum::<usize>(),
            topics = k,
            seed = self.config.seed,
            "Fitting LDA"
        );

        let pb = if self.config.show_progress {
            ProgressBar::new(self.config.iterations as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Gibbs [{bar:30}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for it in 0..self.config.iterations {
            state.sweep();
            pb.inc(1);
            if (it + 1) % 500 == 0 {
                debug!(iteration = it + 1, "Gibbs sweep");
            }
        }
        pb.finish_and_clear();

        Ok(state.into_model(dtm))
    }
}

/// Token-level assignments and count tables for one sampling run.
struct GibbsState {
    k: usize,
    alpha: f64,
    beta: f64,
    /// Term id of every token, per document
    docs: Vec<Vec<usize>>,
    /// Topic of every token, per document
    z: Vec<Vec<usize>>,
    /// [doc][topic]
    ndk: Vec<Vec<usize>>,
    /// [topic][term]
    nkw: Vec<Vec<usize>>,
    /// [topic]
    nk: Vec<usize>,
    weights: Vec<f64>,
    rng: StdRng,
}

impl GibbsState {
    fn init(dtm: &DocumentTermMatrix, config: &FitterConfig) -> Self {
        let k = config.topics;
        let v = dtm.n_terms();
        let d = dtm.n_documents();

        // Expand sparse counts into token positions in term order.
        let docs: Vec<Vec<usize>> = (0..d)
            .map(|di| {
                dtm.row(di)
                    .iter()
                    .flat_map(|&(w, c)| std::iter::repeat(w).take(c as usize))
                    .collect()
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut z = Vec::with_capacity(d);
        let mut ndk = vec![vec![0usize; k]; d];
        let mut nkw = vec![vec![0usize; v]; k];
        let mut nk = vec![0usize; k];

        for (di, doc) in docs.iter().enumerate() {
            let mut assignments = Vec::with_capacity(doc.len());
            for &w in doc {
                let t = rng.random_range(0..k);
                assignments.push(t);
                ndk[di][t] += 1;
                nkw[t][w] += 1;
                nk[t] += 1;
            }
            z.push(assignments);
        }

        Self {
            k,
            alpha: config.alpha,
            beta: config.beta,
            docs,
            z,
            ndk,
            nkw,
            nk,
            weights: vec![0.0; k],
            rng,
        }
    }

    fn sweep(&mut self) {
        let vb = self.nkw.first().map_or(0, Vec::len) as f64 * self.beta;

        for di in 0..self.docs.len() {
            for pi in 0..self.docs[di].len() {
                let w = self.docs[di][pi];
                let old = self.z[di][pi];

                self.ndk[di][old] -= 1;
                self.nkw[old][w] -= 1;
                self.nk[old] -= 1;

                for t in 0..self.k {
                    self.weights[t] = (self.ndk[di][t] as f64 + self.alpha)
                        * (self.nkw[t][w] as f64 + self.beta)
                        / (self.nk[t] as f64 + vb);
                }
                let new = self.draw();

                self.z[di][pi] = new;
                self.ndk[di][new] += 1;
                self.nkw[new][w] += 1;
                self.nk[new] += 1;
            }
        }
    }

    /// Sample a topic index proportional to the current weights.
    ///
    /// Finite positive priors keep every weight positive, so construction
    /// only fails on overflow. A uniform draw stands in for that case.
    fn draw(&mut self) -> usize {
        match WeightedIndex::new(&self.weights) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => self.rng.random_range(0..self.k),
        }
    }

    fn into_model(self, dtm: &DocumentTermMatrix) -> FittedTopicModel {
        let v = dtm.n_terms();
        let vb = v as f64 * self.beta;
        let ka = self.k as f64 * self.alpha;

        let phi = (0..self.k)
            .map(|t| {
                let denom = self.nk[t] as f64 + vb;
                (0..v)
                    .map(|w| (self.nkw[t][w] as f64 + self.beta) / denom)
                    .collect()
            })
            .collect();

        let theta = self
            .ndk
            .iter()
            .zip(&self.docs)
            .map(|(counts, doc)| {
                let denom = doc.len() as f64 + ka;
                counts
                    .iter()
                    .map(|&c| (c as f64 + self.alpha) / denom)
                    .collect()
            })
            .collect();

        let vocabulary = dtm.vocabulary().to_vec();
        let term_index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();

        FittedTopicModel {
            alpha: self.alpha,
            vocabulary,
            term_index,
            phi,
            documents: dtm.document_ids().to_vec(),
            theta,
        }
    }
}

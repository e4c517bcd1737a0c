// Seeded sampling of items for the per-item radar charts.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::topics::inference::TopicPosterior;

/// Sample size and seed for the per-item chart.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub size: usize,
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { size: 9, seed: 42 }
    }
}

/// Draw `min(size, n)` item ids without replacement.
///
/// Depends only on the posterior's row order and the seed, so a fixed
/// posterior and seed always yield the same ids in the same order.
pub fn sample_items(posterior: &TopicPosterior, config: &SamplerConfig) -> Vec<String> {
    let amount = config.size.min(posterior.len());
    let mut rng = StdRng::seed_from_u64(config.seed);
    index::sample(&mut rng, posterior.len(), amount)
        .into_iter()
        .map(|i| posterior.rows[i].document.clone())
        .collect()
}

// Standards/items alignment pipeline.
//
// Single-threaded and run to completion. Stages run in a fixed order:
// 1. Normalize standards (grouped by domain) and items (grouped by id)
// 2. Build one document-term matrix per corpus
// 3. Fit the topic model on the standards matrix only
// 4. Fold the items into the fitted model
// 5. Join levels and labels, aggregate coverage, sample items for charts
//
// Any error aborts the run; there is no partial result.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::corpus::records::{ItemRecord, StandardRecord};
use crate::corpus::stopwords::StopwordSet;
use crate::coverage::aggregate::{aggregate_by_level, CoveragePoint};
use crate::coverage::sample::sample_items;
use crate::coverage::table::{long_table, PosteriorRecord};
use crate::error::{AlignError, Result};
use crate::output::{export, markdown, radar};
use crate::topics::dtm::DocumentTermMatrix;
use crate::topics::inference::{PosteriorRow, TopicPosterior};
use crate::topics::labels::TopicLabels;
use crate::topics::lda::FittedTopicModel;
use crate::topics::normalize::Normalizer;
use crate::topics::traits::TopicModelFitter;

/// Everything one run produces, ready for reporting.
#[derive(Debug, Clone)]
pub struct AlignmentRun {
    pub model: FittedTopicModel,
    pub standards_dtm: DocumentTermMatrix,
    pub items_dtm: DocumentTermMatrix,
    pub posterior: TopicPosterior,
    pub records: Vec<PosteriorRecord>,
    pub coverage: Vec<CoveragePoint>,
    /// Item ids drawn for the per-item chart
    pub sample: Vec<String>,
    /// Domains with no tokens after filtering
    pub dropped_standards: Vec<String>,
    /// Items with no tokens after filtering (absent from the posterior)
    pub dropped_items: Vec<String>,
}

impl AlignmentRun {
    pub fn sampled_rows(&self) -> Vec<&PosteriorRow> {
        self.sample
            .iter()
            .filter_map(|id| self.posterior.get(id))
            .collect()
    }
}

/// Paths of the artifacts written by `write_artifacts`.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub posterior: PathBuf,
    pub coverage_chart: PathBuf,
    pub item_chart: PathBuf,
    pub report: PathBuf,
}

/// Standards matrix: tokens from every standard, grouped by domain.
pub fn standards_matrix(standards: &[StandardRecord], normalizer: &Normalizer) -> DocumentTermMatrix {
    DocumentTermMatrix::from_pairs(standards.iter().flat_map(|s| {
        normalizer
            .normalize(&s.standard_text)
            .into_iter()
            .map(move |token| (s.domain.clone(), token))
    }))
}

/// Items matrix: tokens from each prompt, grouped by item id.
pub fn items_matrix(items: &[ItemRecord], normalizer: &Normalizer) -> DocumentTermMatrix {
    DocumentTermMatrix::from_pairs(items.iter().flat_map(|i| {
        normalizer
            .normalize(&i.prompt)
            .into_iter()
            .map(move |token| (i.item_id.clone(), token))
    }))
}

/// Standards model fitted on its own, without any items.
#[derive(Debug, Clone)]
pub struct StandardsFit {
    pub model: FittedTopicModel,
    pub dtm: DocumentTermMatrix,
    /// Domains with no tokens after filtering
    pub dropped: Vec<String>,
}

/// Build the standards matrix and report domains that filtered to nothing.
fn build_standards(
    standards: &[StandardRecord],
    normalizer: &Normalizer,
) -> (DocumentTermMatrix, Vec<String>) {
    let dtm = standards_matrix(standards, normalizer);
    let dropped = dtm.dropped_documents(standards.iter().map(|s| s.domain.as_str()));
    if !dropped.is_empty() {
        warn!(domains = ?dropped, "Domains with no tokens after filtering were dropped");
    }
    info!(
        documents = dtm.n_documents(),
        terms = dtm.n_terms(),
        "Built standards document-term matrix"
    );
    (dtm, dropped)
}

fn build_items(items: &[ItemRecord], normalizer: &Normalizer) -> (DocumentTermMatrix, Vec<String>) {
    let dtm = items_matrix(items, normalizer);
    let dropped = dtm.dropped_documents(items.iter().map(|i| i.item_id.as_str()));
    if !dropped.is_empty() {
        warn!(items = ?dropped, "Items with no tokens after filtering were dropped");
    }
    info!(
        documents = dtm.n_documents(),
        terms = dtm.n_terms(),
        "Built items document-term matrix"
    );
    (dtm, dropped)
}

/// Fit the topic model on the standards corpus alone.
pub fn fit_standards(
    standards: &[StandardRecord],
    stopwords: &StopwordSet,
    config: &PipelineConfig,
    fitter: &dyn TopicModelFitter,
) -> Result<StandardsFit> {
    let normalizer = Normalizer::new(stopwords, &config.normalizer);
    let (dtm, dropped) = build_standards(standards, &normalizer);
    let model = fitter.fit(&dtm)?;
    Ok(StandardsFit {
        model,
        dtm,
        dropped,
    })
}

/// Run the full pipeline.
pub fn run(
    standards: &[StandardRecord],
    items: &[ItemRecord],
    stopwords: &StopwordSet,
    labels: &TopicLabels,
    config: &PipelineConfig,
    fitter: &dyn TopicModelFitter,
) -> Result<AlignmentRun> {
    if labels.len() != config.fitter.topics {
        return Err(AlignError::Config(format!(
            "{} topic labels supplied for K={}",
            labels.len(),
            config.fitter.topics
        )));
    }

    let normalizer = Normalizer::new(stopwords, &config.normalizer);
    let (standards_dtm, dropped_standards) = build_standards(standards, &normalizer);
    let (items_dtm, dropped_items) = build_items(items, &normalizer);

    let model = fitter.fit(&standards_dtm)?;
    let posterior = model.infer(&items_dtm, &config.inference);
    info!(items = posterior.len(), topics = posterior.k, "Inferred item posteriors");

    let records = long_table(&posterior, items, labels)?;
    let coverage = aggregate_by_level(&records, posterior.k);
    let sample = sample_items(&posterior, &config.sampler);

    Ok(AlignmentRun {
        model,
        standards_dtm,
        items_dtm,
        posterior,
        records,
        coverage,
        sample,
        dropped_standards,
        dropped_items,
    })
}

/// Write the posterior table, both charts and the Markdown report.
pub fn write_artifacts(
    run: &AlignmentRun,
    items: &[ItemRecord],
    labels: &TopicLabels,
    out_dir: &Path,
) -> Result<Artifacts> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| AlignError::io(out_dir.display().to_string(), e))?;

    let artifacts = Artifacts {
        posterior: out_dir.join("posterior.json"),
        coverage_chart: out_dir.join("coverage.svg"),
        item_chart: out_dir.join("items.svg"),
        report: out_dir.join("report.md"),
    };

    export::write_posterior_table(&run.records, &artifacts.posterior)?;
    radar::write_svg(
        &radar::coverage_chart(&run.coverage, labels),
        &artifacts.coverage_chart,
    )?;
    radar::write_svg(
        &radar::item_charts(&run.sampled_rows(), labels),
        &artifacts.item_chart,
    )?;
    markdown::write_report(run, items, labels, &artifacts.report)?;

    info!(dir = %out_dir.display(), "Wrote alignment artifacts");
    Ok(artifacts)
}

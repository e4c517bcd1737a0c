// Topic model fitter trait: the seam between the pipeline and the algorithm.
//
// The pipeline only needs "matrix in, fitted model out". Collapsed Gibbs
// sampling is the default; a variational fitter could slot in here
// without touching normalization, inference or reporting.

use super::dtm::DocumentTermMatrix;
use super::lda::FittedTopicModel;
use crate::error::Result;

/// Trait for fitting a topic model on a document-term matrix.
pub trait TopicModelFitter {
    /// Fit the model. Fails on an empty matrix or fewer documents than topics.
    fn fit(&self, dtm: &DocumentTermMatrix) -> Result<FittedTopicModel>;
}

// Topic modeling core: normalization, document-term matrices, LDA fitting
// and fold-in inference.

pub mod dtm;
pub mod inference;
pub mod labels;
pub mod lda;
pub mod normalize;
pub mod traits;

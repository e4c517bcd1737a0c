// Topicalign: topic-model content alignment between standards and items.
//
// This is the library root. Each module corresponds to a stage or concern
// of the alignment pipeline.

pub mod config;
pub mod corpus;
pub mod coverage;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod topics;

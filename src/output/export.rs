// Posterior table export.

use std::fs;
use std::path::Path;

use crate::coverage::table::PosteriorRecord;
use crate::error::{AlignError, Result};

/// Write the long posterior table as a JSON array of
/// `{item, topic, label, probability, level}` rows.
pub fn write_posterior_table(records: &[PosteriorRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).map_err(|e| AlignError::io(path.display().to_string(), e))
}

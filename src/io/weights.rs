//! Read/write valuation weight tables as JSON.
//!
//! The file has the shape of `ValuationWeights`; any omitted field keeps its
//! production default, so a file may override a single rate.

use std::fs::File;
use std::path::Path;

use crate::error::AppError;
use crate::valuation::ValuationWeights;

/// Read and validate a weights JSON file.
pub fn read_weights_json(path: &Path) -> Result<ValuationWeights, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open weights JSON '{}': {e}", path.display())))?;
    let weights: ValuationWeights =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid weights JSON: {e}")))?;
    weights
        .validate()
        .map_err(|e| AppError::input(format!("Invalid weights in '{}': {e}", path.display())))?;
    Ok(weights)
}

/// Write a weights table (e.g. the defaults, as a starting point for tuning).
pub fn write_weights_json(path: &Path, weights: &ValuationWeights) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create weights JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, weights)
        .map_err(|e| AppError::input(format!("Failed to write weights JSON: {e}")))?;
    Ok(())
}

//! Run output export.
//!
//! JSON keeps the three named sequences as produced by a run; CSV flattens
//! them into one row per account with an `outcome` column.

use std::path::Path;

use cove_core::CoveOutput;
use serde::Serialize;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export a run's output to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the output holds no records, or if file creation or
/// serialization fails.
pub fn export_to_json<R: Serialize>(
    output: &CoveOutput<R>,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(output)?;
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(output, file)
}

/// Export a run's output to CSV, one row per account.
///
/// Columns: `outcome`, `id`, `name`, `email`, `status`, `assume_role_success`,
/// `result` (JSON-encoded), `error` (captured messages joined with `; `).
///
/// # Errors
///
/// Returns an error if the output holds no records, or if file creation,
/// result encoding, or CSV writing fails.
pub fn export_to_csv<R: Serialize>(
    output: &CoveOutput<R>,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(output)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(output, file)
}

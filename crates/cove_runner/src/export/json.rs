use cove_core::CoveOutput;
use serde::Serialize;

pub(crate) fn export_to_json_impl<R: Serialize>(
    output: &CoveOutput<R>,
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(file, output)?;
    Ok(())
}

use std::fs::File;
use std::path::Path;

use cove_core::CoveOutput;

pub(crate) fn ensure_not_empty<R>(output: &CoveOutput<R>) -> Result<(), Box<dyn std::error::Error>> {
    if output.is_empty() {
        return Err("No records to export".into());
    }

    Ok(())
}

pub(crate) fn create_output_file(
    path: impl AsRef<Path>,
) -> Result<File, Box<dyn std::error::Error>> {
    Ok(File::create(path)?)
}

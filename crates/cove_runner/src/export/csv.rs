use cove_core::{AccountSessionRecord, CoveOutput};
use serde::Serialize;

pub(crate) fn export_to_csv_impl<R: Serialize>(
    output: &CoveOutput<R>,
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "outcome",
        "id",
        "name",
        "email",
        "status",
        "assume_role_success",
        "result",
        "error",
    ])?;

    let classified = output
        .results
        .iter()
        .map(|record| ("result", record))
        .chain(output.exceptions.iter().map(|record| ("exception", record)))
        .chain(
            output
                .failed_assume_role
                .iter()
                .map(|record| ("failed_assume_role", record)),
        );

    for (outcome, record) in classified {
        wtr.write_record(row(outcome, record)?)?;
    }

    wtr.flush()?;
    Ok(())
}

fn row<R: Serialize>(
    outcome: &str,
    record: &AccountSessionRecord<R>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let result = match record.result() {
        Some(result) => serde_json::to_string(result)?,
        None => String::new(),
    };
    let error = record
        .exception_details()
        .map(|details| {
            details
                .iter()
                .map(|detail| detail.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        })
        .unwrap_or_default();

    Ok(vec![
        outcome.to_string(),
        record.id().to_string(),
        record.name().unwrap_or_default().to_string(),
        record.email().unwrap_or_default().to_string(),
        record
            .status()
            .map(|status| status.to_string())
            .unwrap_or_default(),
        record
            .assume_role_success()
            .map(|success| success.to_string())
            .unwrap_or_default(),
        result,
        error,
    ])
}

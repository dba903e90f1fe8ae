use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};

use crate::error::ExtractError;
use crate::ledger::CombinedTable;
use crate::postprocess::Postprocessed;

pub const COMBINED_FILE_NAME: &str = "combined_data.csv";

#[must_use]
pub fn other_table_file_name(index: usize) -> String {
    format!("other_table_{}.csv", index + 1)
}

fn write_combined<W: Write>(
    writer: &mut Writer<W>,
    combined: &CombinedTable,
) -> Result<(), ExtractError> {
    let headers = combined.headers();
    if !headers.is_empty() {
        writer.write_record(headers)?;
    }
    for record in combined.records() {
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_grid(path: &Path, rows: &[Vec<String>], delimiter: u8) -> Result<(), ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_outputs(
    dir: &Path,
    output: &Postprocessed,
    delimiter: u8,
) -> Result<Vec<PathBuf>, ExtractError> {
    std::fs::create_dir_all(dir)?;

    let combined_path = dir.join(COMBINED_FILE_NAME);
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(&combined_path)?;
    write_combined(&mut writer, &output.combined)?;

    let mut written = vec![combined_path];
    for (index, table) in output.others.iter().enumerate() {
        let path = dir.join(other_table_file_name(index));
        write_grid(&path, &table.to_text_rows(), delimiter)?;
        written.push(path);
    }
    Ok(written)
}

pub fn combined_to_csv_string(
    combined: &CombinedTable,
    delimiter: u8,
) -> Result<String, ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    write_combined(&mut writer, combined)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

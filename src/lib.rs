pub mod classify;
mod csv_out;
mod error;
pub mod ledger;
mod model;
pub mod normalize;
mod options;
mod pdf_reader;
mod postprocess;
pub mod repair;
mod table_detect;
mod table_parse;
mod warning;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::pdf_reader::read_pdf_pages;
use crate::table_detect::detect_tables;

pub use classify::{LabeledTable, TableFormat};
pub use csv_out::{
    COMBINED_FILE_NAME, combined_to_csv_string, other_table_file_name, write_outputs,
};
pub use error::ExtractError;
pub use ledger::{Amount, CombinedTable, NewFormatRow, OldFormatRow};
pub use model::{DetectedTable, EmbeddedGrid, RawTable, TableSource};
pub use options::{ExtractOptions, PageSelection};
pub use postprocess::{Aggregator, Postprocessed, postprocess};
pub use warning::{PipelineWarning, WarningCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub row_count: usize,
    pub table_count: usize,
    pub other_count: usize,
    pub files: Vec<PathBuf>,
}

impl ExtractionReport {
    fn new(output: &Postprocessed, table_count: usize, files: Vec<PathBuf>) -> Self {
        Self {
            row_count: output.combined.len(),
            table_count,
            other_count: output.others.len(),
            files,
        }
    }
}

pub fn extract_tables_from_pdf(
    input_pdf: &Path,
    options: &ExtractOptions,
) -> Result<Vec<DetectedTable>, ExtractError> {
    options.validate()?;
    let pages = read_pdf_pages(input_pdf, &options.pages)?;
    let tables = detect_tables(&pages, options);
    debug!(pages = pages.len(), tables = tables.len(), "detected tables");
    Ok(tables)
}

pub fn process_pdf(
    input_pdf: &Path,
    options: &ExtractOptions,
) -> Result<Postprocessed, ExtractError> {
    let tables = extract_tables_from_pdf(input_pdf, options)?;
    postprocess(tables)
}

pub fn process_pdf_to_dir(
    input_pdf: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
) -> Result<(Postprocessed, ExtractionReport), ExtractError> {
    let tables = extract_tables_from_pdf(input_pdf, options)?;
    let table_count = tables.len();
    let output = postprocess(tables)?;
    let files = write_outputs(output_dir, &output, options.delimiter)?;
    let report = ExtractionReport::new(&output, table_count, files);
    Ok((output, report))
}

pub fn process_tables_to_dir<I, T>(
    tables: I,
    output_dir: &Path,
    delimiter: u8,
) -> Result<(Postprocessed, ExtractionReport), ExtractError>
where
    I: IntoIterator<Item = T>,
    T: Into<TableSource>,
{
    let tables = tables.into_iter().map(Into::into).collect::<Vec<TableSource>>();
    let table_count = tables.len();
    let output = postprocess(tables)?;
    let files = write_outputs(output_dir, &output, delimiter)?;
    let report = ExtractionReport::new(&output, table_count, files);
    Ok((output, report))
}

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{TableFormat, classify};
use crate::error::ExtractError;
use crate::ledger::{CombinedTable, NewFormatRow, OldFormatRow};
use crate::model::{RawTable, TableSource};
use crate::normalize::{
    MalformedCell, malformed_new_cells, malformed_old_cells, normalize_new_rows,
    normalize_old_rows, remove_junk_rows,
};
use crate::repair::{repair_new_format, repair_old_format};
use crate::warning::{PipelineWarning, WarningCode};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Postprocessed {
    pub combined: CombinedTable,
    pub others: Vec<RawTable>,
    pub warnings: Vec<PipelineWarning>,
}

#[derive(Debug, Default)]
pub struct Aggregator {
    old_rows: Vec<OldFormatRow>,
    new_rows: Vec<NewFormatRow>,
    first_format: Option<TableFormat>,
    others: Vec<RawTable>,
    warnings: Vec<PipelineWarning>,
    tables_seen: usize,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, table: RawTable) -> Option<TableFormat> {
        let table_index = self.tables_seen;
        self.tables_seen += 1;

        let Some((format, labeled)) = classify(&table) else {
            debug!(table_index, rows = table.len(), "table matches no known format");
            self.warnings.push(
                PipelineWarning::new(
                    WarningCode::UnrecognizedTable,
                    "table matches no known statement format; passed through unchanged",
                )
                .with_table_index(table_index),
            );
            self.others.push(table);
            return None;
        };

        match format {
            TableFormat::Old => {
                let rows = repair_old_format(labeled);
                debug!(table_index, rows = rows.len(), "appending old-format table");
                self.old_rows.extend(rows);
                normalize_old_rows(&mut self.old_rows);
            }
            TableFormat::New => {
                let rows = repair_new_format(&labeled);
                debug!(table_index, rows = rows.len(), "appending new-format table");
                self.new_rows.extend(rows);
                let removed = remove_junk_rows(&mut self.new_rows);
                if removed > 0 {
                    debug!(table_index, removed, "dropped header and footer rows");
                }
                normalize_new_rows(&mut self.new_rows);
            }
        }

        self.first_format.get_or_insert(format);
        Some(format)
    }

    #[must_use]
    pub fn finish(mut self) -> Postprocessed {
        if self.tables_seen == 0 {
            self.warnings.push(PipelineWarning::new(
                WarningCode::NoTablesDetected,
                "no tables were supplied for post-processing",
            ));
        }

        let dominant = match self.old_rows.len().cmp(&self.new_rows.len()) {
            std::cmp::Ordering::Greater => Some(TableFormat::Old),
            std::cmp::Ordering::Less => Some(TableFormat::New),
            std::cmp::Ordering::Equal => self.first_format,
        };

        let old = CombinedTable::Old(std::mem::take(&mut self.old_rows));
        let new = CombinedTable::New(std::mem::take(&mut self.new_rows));
        let (combined, minority) = match dominant {
            Some(TableFormat::Old) => (old, new),
            Some(TableFormat::New) => (new, old),
            None => (CombinedTable::Empty, CombinedTable::Empty),
        };

        for cell in malformed_cells(&combined) {
            warn!(
                row = cell.row,
                column = cell.column,
                text = %cell.text,
                "amount could not be parsed"
            );
            self.warnings.push(
                PipelineWarning::new(
                    WarningCode::MalformedAmount,
                    format!("{} value '{}' is not a number", cell.column, cell.text),
                )
                .with_row_index(cell.row),
            );
        }

        if !minority.is_empty() {
            warn!(
                rows = minority.len(),
                "document mixes statement formats; minority rows exported separately"
            );
            self.warnings.push(PipelineWarning::new(
                WarningCode::MixedFormats,
                format!(
                    "{} row(s) of the other statement format were exported as other table {}",
                    minority.len(),
                    self.others.len() + 1
                ),
            ));
            self.others.push(ledger_as_raw_table(&minority));
        }

        Postprocessed {
            combined,
            others: self.others,
            warnings: self.warnings,
        }
    }
}

fn malformed_cells(table: &CombinedTable) -> Vec<MalformedCell> {
    match table {
        CombinedTable::Empty => Vec::new(),
        CombinedTable::Old(rows) => malformed_old_cells(rows),
        CombinedTable::New(rows) => malformed_new_cells(rows),
    }
}

fn ledger_as_raw_table(table: &CombinedTable) -> RawTable {
    let header = table
        .headers()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    RawTable::from_text_rows(std::iter::once(header).chain(table.records()))
}

pub fn postprocess<I, T>(tables: I) -> Result<Postprocessed, ExtractError>
where
    I: IntoIterator<Item = T>,
    T: Into<TableSource>,
{
    let mut aggregator = Aggregator::new();
    for table in tables {
        aggregator.push(table.into().into_raw_table()?);
    }
    Ok(aggregator.finish())
}

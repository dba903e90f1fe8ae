use std::collections::HashSet;

use serde::Serialize;

use crate::model::RawTable;

pub const OLD_FORMAT_COLUMNS: [&str; 5] = ["TANGGAL", "KETERANGAN", "CBG", "MUTASI", "SALDO"];
pub const NEW_FORMAT_COLUMNS: [&str; 6] = [
    "Tanggal Transaksi",
    "Uraian Transaksi",
    "Teller",
    "Debet",
    "Kredit",
    "Saldo",
];

const HEADER_TOKENS: [&str; 2] = ["tanggal", "tanggaltransaksi"];
const HEADER_RENAMES: [(&str, &str); 2] = [
    ("TanggalTransaksi", "Tanggal Transaksi"),
    ("UraianTransaksi", "Uraian Transaksi"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Old,
    New,
}

impl TableFormat {
    #[must_use]
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::Old => &OLD_FORMAT_COLUMNS,
            Self::New => &NEW_FORMAT_COLUMNS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl LabeledTable {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

pub(crate) fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}

fn fold(text: &str) -> String {
    compact(text).to_lowercase()
}

#[must_use]
pub fn locate_header_row(table: &RawTable) -> Option<usize> {
    table.rows.iter().position(|row| {
        row.iter()
            .flatten()
            .any(|cell| HEADER_TOKENS.contains(&fold(cell).as_str()))
    })
}

#[must_use]
pub fn promote_header(table: &RawTable) -> Option<LabeledTable> {
    let header_index = locate_header_row(table)?;
    let width = table.width();

    let mut headers = table.rows[header_index]
        .iter()
        .map(|cell| cell.as_deref().map(compact).unwrap_or_default())
        .collect::<Vec<_>>();
    headers.resize(width, String::new());
    for header in &mut headers {
        if let Some((_, renamed)) = HEADER_RENAMES
            .iter()
            .find(|(from, _)| header.as_str() == *from)
        {
            *header = (*renamed).to_string();
        }
    }

    let rows = table.rows[header_index + 1..].to_vec();
    Some(LabeledTable::new(headers, rows))
}

fn matches_format(folded_headers: &HashSet<String>, format: TableFormat) -> bool {
    format
        .required_columns()
        .iter()
        .all(|column| folded_headers.contains(&fold(column)))
}

fn canonicalize_headers(table: &mut LabeledTable, format: TableFormat) {
    for header in &mut table.headers {
        let folded = fold(header);
        if let Some(column) = format
            .required_columns()
            .iter()
            .find(|column| fold(column) == folded)
        {
            *header = (*column).to_string();
        }
    }
}

#[must_use]
pub fn classify(table: &RawTable) -> Option<(TableFormat, LabeledTable)> {
    let mut labeled = promote_header(table)?;
    let folded_headers = labeled
        .headers
        .iter()
        .map(String::as_str)
        .map(fold)
        .collect::<HashSet<_>>();

    let format = [TableFormat::Old, TableFormat::New]
        .into_iter()
        .find(|format| matches_format(&folded_headers, *format))?;
    canonicalize_headers(&mut labeled, format);
    Some((format, labeled))
}

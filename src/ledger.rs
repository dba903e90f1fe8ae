use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::classify::{NEW_FORMAT_COLUMNS, TableFormat};

pub const OLD_LEDGER_COLUMNS: [&str; 7] = [
    "TANGGAL",
    "KETERANGAN",
    "CBG",
    "MUTASI",
    "SALDO",
    "DEBET",
    "KREDIT",
];

/// A numeric cell that may still hold its source text.
///
/// `Missing` and `Text` are kept apart so an absent balance is never confused
/// with one that failed to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Amount {
    #[default]
    Missing,
    Text(String),
    Number(f64),
}

impl Amount {
    #[must_use]
    pub fn from_cell(cell: Option<String>) -> Self {
        match cell {
            Some(text) if !text.trim().is_empty() => Self::Text(text),
            _ => Self::Missing,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct OldFormatRow {
    pub tanggal: Option<String>,
    pub keterangan: String,
    pub cbg: Option<String>,
    pub mutasi: Option<String>,
    pub saldo: Amount,
    pub debet: f64,
    pub kredit: f64,
}

impl OldFormatRow {
    fn record(&self) -> Vec<String> {
        vec![
            self.tanggal.clone().unwrap_or_default(),
            self.keterangan.clone(),
            self.cbg.clone().unwrap_or_default(),
            self.mutasi.clone().unwrap_or_default(),
            self.saldo.to_string(),
            self.debet.to_string(),
            self.kredit.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFormatRow {
    #[serde(rename = "Tanggal Transaksi")]
    pub tanggal_transaksi: Option<String>,
    #[serde(rename = "Uraian Transaksi")]
    pub uraian_transaksi: Option<String>,
    #[serde(rename = "Teller")]
    pub teller: Option<String>,
    #[serde(rename = "Debet")]
    pub debet: Amount,
    #[serde(rename = "Kredit")]
    pub kredit: Amount,
    #[serde(rename = "Saldo")]
    pub saldo: Amount,
}

impl NewFormatRow {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        [
            self.tanggal_transaksi.as_deref(),
            self.uraian_transaksi.as_deref(),
            self.teller.as_deref(),
            self.debet.as_text(),
            self.kredit.as_text(),
            self.saldo.as_text(),
        ]
        .into_iter()
        .flatten()
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.tanggal_transaksi.clone().unwrap_or_default(),
            self.uraian_transaksi.clone().unwrap_or_default(),
            self.teller.clone().unwrap_or_default(),
            self.debet.to_string(),
            self.kredit.to_string(),
            self.saldo.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "format", content = "rows", rename_all = "lowercase")]
pub enum CombinedTable {
    #[default]
    Empty,
    Old(Vec<OldFormatRow>),
    New(Vec<NewFormatRow>),
}

impl CombinedTable {
    #[must_use]
    pub fn format(&self) -> Option<TableFormat> {
        match self {
            Self::Empty => None,
            Self::Old(_) => Some(TableFormat::Old),
            Self::New(_) => Some(TableFormat::New),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Old(rows) => rows.len(),
            Self::New(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::Empty => &[],
            Self::Old(_) => &OLD_LEDGER_COLUMNS,
            Self::New(_) => &NEW_FORMAT_COLUMNS,
        }
    }

    #[must_use]
    pub fn records(&self) -> Vec<Vec<String>> {
        match self {
            Self::Empty => Vec::new(),
            Self::Old(rows) => rows.iter().map(OldFormatRow::record).collect(),
            Self::New(rows) => rows.iter().map(NewFormatRow::record).collect(),
        }
    }
}

use std::sync::LazyLock;

use regex::Regex;

use crate::ledger::{Amount, NewFormatRow, OldFormatRow};

const DEBIT_MARKER: &str = "DB";
const JUNK_PHRASES: [&str; 5] = [
    "Currency",
    "Halaman",
    "Page",
    "Tanggal Transaksi",
    "Transaction Date",
];

static JUNK_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = JUNK_PHRASES
        .iter()
        .map(|phrase| regex::escape(phrase))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){alternation}")).expect("hardcoded junk phrase regex is valid")
});

#[must_use]
pub fn parse_locale_number(text: &str) -> Option<f64> {
    text.replace(',', "").trim().parse().ok()
}

pub fn normalize_amount(amount: &mut Amount) -> bool {
    let Amount::Text(text) = amount else {
        return true;
    };
    match parse_locale_number(text) {
        Some(value) => {
            *amount = Amount::Number(value);
            true
        }
        None => false,
    }
}

/// Splits a MUTASI cell into `(debet, kredit)`.
///
/// A `DB` suffix marks a debit. Anything that fails to parse counts as zero.
#[must_use]
pub fn split_mutasi(mutasi: Option<&str>) -> (f64, f64) {
    let Some(mutasi) = mutasi.map(str::trim) else {
        return (0.0, 0.0);
    };
    if mutasi.contains(DEBIT_MARKER) {
        let value = parse_locale_number(&mutasi.replace(DEBIT_MARKER, "")).unwrap_or(0.0);
        (value, 0.0)
    } else {
        (0.0, parse_locale_number(mutasi).unwrap_or(0.0))
    }
}

fn mutasi_parses(mutasi: &str) -> bool {
    parse_locale_number(&mutasi.replace(DEBIT_MARKER, "")).is_some()
}

pub fn normalize_old_rows(rows: &mut [OldFormatRow]) {
    for row in rows {
        normalize_amount(&mut row.saldo);
        let (debet, kredit) = split_mutasi(row.mutasi.as_deref());
        row.debet = debet;
        row.kredit = kredit;
    }
}

pub fn normalize_new_rows(rows: &mut [NewFormatRow]) {
    for row in rows {
        normalize_amount(&mut row.debet);
        normalize_amount(&mut row.kredit);
        normalize_amount(&mut row.saldo);
    }
}

#[must_use]
pub fn is_junk_row(row: &NewFormatRow) -> bool {
    row.texts().any(|text| JUNK_RE.is_match(text))
}

pub fn remove_junk_rows(rows: &mut Vec<NewFormatRow>) -> usize {
    let before = rows.len();
    rows.retain(|row| !is_junk_row(row));
    before - rows.len()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedCell {
    pub row: usize,
    pub column: &'static str,
    pub text: String,
}

#[must_use]
pub fn malformed_old_cells(rows: &[OldFormatRow]) -> Vec<MalformedCell> {
    let mut out = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if let Some(mutasi) = row.mutasi.as_deref().filter(|text| !mutasi_parses(text)) {
            out.push(MalformedCell {
                row: index,
                column: "MUTASI",
                text: mutasi.to_string(),
            });
        }
        if let Some(text) = row.saldo.as_text() {
            out.push(MalformedCell {
                row: index,
                column: "SALDO",
                text: text.to_string(),
            });
        }
    }
    out
}

#[must_use]
pub fn malformed_new_cells(rows: &[NewFormatRow]) -> Vec<MalformedCell> {
    let mut out = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        for (column, amount) in [
            ("Debet", &row.debet),
            ("Kredit", &row.kredit),
            ("Saldo", &row.saldo),
        ] {
            if let Some(text) = amount.as_text() {
                out.push(MalformedCell {
                    row: index,
                    column,
                    text: text.to_string(),
                });
            }
        }
    }
    out
}

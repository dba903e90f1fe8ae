use tracing::debug;

use crate::classify::{LabeledTable, NEW_FORMAT_COLUMNS, compact};
use crate::ledger::{Amount, NewFormatRow, OldFormatRow};

const MERGE_TARGETS: [&str; 2] = ["KETERANGAN", "MUTASI"];
const FUSED_DESCRIPTION: &str = "KETERANGANCBG";

const DESCRIPTION: usize = 1;
const NEW_FORMAT_FIELDS: [usize; 5] = [0, 2, 3, 4, 5];

type Row = Vec<Option<String>>;

fn non_blank(cell: Option<&String>) -> Option<String> {
    cell.filter(|text| !text.trim().is_empty()).cloned()
}

fn join_trimmed<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn keep_columns(table: LabeledTable, keep: &[usize]) -> LabeledTable {
    let headers = keep.iter().map(|&index| table.headers[index].clone()).collect();
    let rows = table
        .rows
        .into_iter()
        .map(|row| keep.iter().map(|&index| row[index].clone()).collect())
        .collect();
    LabeledTable::new(headers, rows)
}

pub fn combine_adjacent_columns(mut table: LabeledTable, targets: &[&str]) -> LabeledTable {
    for target in targets {
        let Some(index) = table.column_index(target) else {
            continue;
        };
        let left = index
            .checked_sub(1)
            .filter(|&left| table.headers[left].is_empty());
        let right = Some(index + 1).filter(|&right| {
            table
                .headers
                .get(right)
                .is_some_and(|header| header.is_empty())
        });

        for row in &mut table.rows {
            let merged = join_trimmed(
                [left, Some(index), right]
                    .into_iter()
                    .flatten()
                    .filter_map(|column| row[column].as_deref()),
            );
            row[index] = Some(merged);
        }
    }

    let keep = (0..table.headers.len())
        .filter(|&index| !table.headers[index].is_empty())
        .collect::<Vec<_>>();
    let mut table = keep_columns(table, &keep);

    if let Some(fused) = table.column_index(FUSED_DESCRIPTION) {
        split_fused_description(&mut table, fused);
    }
    table
}

fn split_fused_description(table: &mut LabeledTable, fused: usize) {
    debug!("renaming fused {FUSED_DESCRIPTION} column");
    if let Some(description) = table.column_index("KETERANGAN") {
        for row in &mut table.rows {
            let text = join_trimmed(
                [row[description].as_deref(), row[fused].as_deref()]
                    .into_iter()
                    .flatten(),
            );
            row[description] = Some(text);
        }
        let keep = (0..table.headers.len())
            .filter(|&index| index != fused)
            .collect::<Vec<_>>();
        *table = keep_columns(std::mem::take(table), &keep);
    } else {
        table.headers[fused] = "KETERANGAN".to_string();
    }

    match table.column_index("CBG") {
        Some(branch) => {
            for row in &mut table.rows {
                row[branch] = Some(String::new());
            }
        }
        None => {
            table.headers.push("CBG".to_string());
            for row in &mut table.rows {
                row.push(Some(String::new()));
            }
        }
    }
}

#[must_use]
pub fn reassemble_old_rows(table: &LabeledTable) -> Vec<OldFormatRow> {
    let column = |name: &str| table.column_index(name);
    let (tanggal, keterangan, cbg, mutasi, saldo) = (
        column("TANGGAL"),
        column("KETERANGAN"),
        column("CBG"),
        column("MUTASI"),
        column("SALDO"),
    );
    let cell = |row: &Row, index: Option<usize>| {
        non_blank(index.and_then(|index| row.get(index)?.as_ref()))
    };

    let group_ids = table
        .rows
        .iter()
        .map(|row| {
            [tanggal, cbg, saldo]
                .iter()
                .any(|&index| cell(row, index).is_some())
        })
        .scan(0_usize, |count, is_main| {
            *count += usize::from(is_main);
            Some(*count)
        })
        .collect::<Vec<_>>();
    let numbered = group_ids.iter().zip(&table.rows).collect::<Vec<_>>();

    numbered
        .chunk_by(|(left, _), (right, _)| left == right)
        .map(|group| {
            let first = group[0].1;
            let description = group
                .iter()
                .filter_map(|(_, row)| cell(row, keterangan))
                .collect::<Vec<_>>()
                .join(" ");
            OldFormatRow {
                tanggal: cell(first, tanggal),
                keterangan: description.trim().to_string(),
                cbg: cell(first, cbg),
                mutasi: cell(first, mutasi),
                saldo: Amount::from_cell(cell(first, saldo)),
                debet: 0.0,
                kredit: 0.0,
            }
        })
        .collect()
}

#[must_use]
pub fn repair_old_format(mut table: LabeledTable) -> Vec<OldFormatRow> {
    for header in &mut table.headers {
        *header = compact(header);
    }
    let table = combine_adjacent_columns(table, &MERGE_TARGETS);
    reassemble_old_rows(&table)
}

/// New-format repair. A row whose only filled field is the description is a
/// wrapped description line: its text goes to the nearest fully populated row,
/// searching backward first and then forward, and the row is removed.
#[must_use]
pub fn repair_new_format(table: &LabeledTable) -> Vec<NewFormatRow> {
    let columns = NEW_FORMAT_COLUMNS.map(|name| table.column_index(name));
    let mut rows = table
        .rows
        .iter()
        .map(|row| {
            columns.map(|index| non_blank(index.and_then(|index| row.get(index)?.as_ref())))
        })
        .collect::<Vec<_>>();

    let is_populated =
        |row: &[Option<String>; 6]| NEW_FORMAT_FIELDS.iter().all(|&field| row[field].is_some());
    let is_continuation =
        |row: &[Option<String>; 6]| NEW_FORMAT_FIELDS.iter().all(|&field| row[field].is_none());

    for index in 0..rows.len() {
        if !is_continuation(&rows[index]) {
            continue;
        }
        let target = (0..index)
            .rev()
            .find(|&candidate| is_populated(&rows[candidate]))
            .or_else(|| {
                (index + 1..rows.len()).find(|&candidate| is_populated(&rows[candidate]))
            });
        let Some(target) = target else {
            continue;
        };

        let text = rows[index][DESCRIPTION].take();
        let merged = join_trimmed(
            [rows[target][DESCRIPTION].as_deref(), text.as_deref()]
                .into_iter()
                .flatten(),
        );
        rows[target][DESCRIPTION] = (!merged.is_empty()).then_some(merged);
    }
    rows.retain(|row| !is_continuation(row));

    rows.into_iter()
        .map(|[tanggal, uraian, teller, debet, kredit, saldo]| NewFormatRow {
            tanggal_transaksi: tanggal,
            uraian_transaksi: uraian,
            teller,
            debet: Amount::from_cell(debet),
            kredit: Amount::from_cell(kredit),
            saldo: Amount::from_cell(saldo),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{combine_adjacent_columns, repair_new_format, repair_old_format};
    use crate::classify::LabeledTable;

    fn labeled(headers: &[&str], rows: &[&[&str]]) -> LabeledTable {
        LabeledTable::new(
            headers.iter().map(ToString::to_string).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| Some((*cell).to_string())).collect())
                .collect(),
        )
    }

    #[test]
    fn merges_blank_neighbors_into_targets() {
        let table = labeled(
            &["TANGGAL", "", "KETERANGAN", "", "MUTASI", "SALDO"],
            &[&["01/02", "TRSF", " E-BANKING ", "CR", "100.00", "1,000.00"]],
        );
        let merged = combine_adjacent_columns(table, &["KETERANGAN", "MUTASI"]);
        assert_eq!(merged.headers, vec!["TANGGAL", "KETERANGAN", "MUTASI", "SALDO"]);
        assert_eq!(merged.rows[0][1].as_deref(), Some("TRSF E-BANKING CR"));
        assert_eq!(merged.rows[0][2].as_deref(), Some("CR 100.00"));
    }

    #[test]
    fn renames_fused_description_and_adds_branch() {
        let table = labeled(
            &["TANGGAL", "KETERANGANCBG", "MUTASI", "SALDO"],
            &[&["01/02", "SETORAN 0123", "5.00", "5.00"]],
        );
        let merged = combine_adjacent_columns(table, &["KETERANGAN", "MUTASI"]);
        assert_eq!(
            merged.headers,
            vec!["TANGGAL", "KETERANGAN", "MUTASI", "SALDO", "CBG"]
        );
        assert_eq!(merged.rows[0][1].as_deref(), Some("SETORAN 0123"));
        assert_eq!(merged.rows[0][4].as_deref(), Some(""));
    }

    #[test]
    fn fused_description_joins_existing_description() {
        let table = labeled(
            &["TANGGAL", "KETERANGAN", "KETERANGANCBG", "CBG", "MUTASI", "SALDO"],
            &[&["01/02", "TRSF", "KE 123", "0998", "5.00", "5.00"]],
        );
        let merged = combine_adjacent_columns(table, &["KETERANGAN", "MUTASI"]);
        assert_eq!(
            merged.headers,
            vec!["TANGGAL", "KETERANGAN", "CBG", "MUTASI", "SALDO"]
        );
        assert_eq!(merged.rows[0][1].as_deref(), Some("TRSF KE 123"));
        assert_eq!(merged.rows[0][2].as_deref(), Some(""));
    }

    #[test]
    fn reassembles_continuation_rows() {
        let table = labeled(
            &["TANGGAL", "KETERANGAN", "CBG", "MUTASI", "SALDO"],
            &[
                &["01/02", "TRSF E-BANKING", "0998", "50,000.00 DB", "950,000.00"],
                &["", "KE ANDI", "", "", " "],
                &["", "REF 8812", "", "", ""],
                &["02/02", "BUNGA", "", "1,200.00", "951,200.00"],
            ],
        );
        let rows = repair_old_format(table);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].keterangan, "TRSF E-BANKING KE ANDI REF 8812");
        assert_eq!(rows[0].mutasi.as_deref(), Some("50,000.00 DB"));
        assert_eq!(rows[1].cbg, None);
        assert_eq!(rows[1].keterangan, "BUNGA");
    }

    #[test]
    fn leading_continuation_rows_form_their_own_record() {
        let table = labeled(
            &["TANGGAL", "KETERANGAN", "CBG", "MUTASI", "SALDO"],
            &[
                &["", "SALDO AWAL", "", "", ""],
                &["01/02", "SETORAN", "", "10.00", "10.00"],
            ],
        );
        let rows = repair_old_format(table);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tanggal, None);
        assert_eq!(rows[0].keterangan, "SALDO AWAL");
    }

    #[test]
    fn attaches_wrapped_description_backward_then_forward() {
        let table = labeled(
            &NEW_HEADERS,
            &[
                &["", "PEMBAYARAN", "", "", "", ""],
                &["01/02/24", "TRF", "0001", "0.00", "5.00", "10.00"],
                &["", "DARI BUDI", "", "", "", ""],
                &["02/02/24", "ADM", "0001", "1.00", "0.00", "9.00"],
            ],
        );
        let rows = repair_new_format(&table);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].uraian_transaksi.as_deref(),
            Some("TRF PEMBAYARAN DARI BUDI")
        );
        assert_eq!(rows[1].uraian_transaksi.as_deref(), Some("ADM"));
    }

    #[test]
    fn skips_partially_filled_rows_when_searching() {
        let table = labeled(
            &NEW_HEADERS,
            &[
                &["01/02/24", "TRF", "0001", "0.00", "5.00", "10.00"],
                &["02/02/24", "SETOR", "", "", "5.00", "15.00"],
                &["", "TUNAI", "", "", "", ""],
            ],
        );
        let rows = repair_new_format(&table);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].uraian_transaksi.as_deref(), Some("TRF TUNAI"));
        assert_eq!(rows[1].teller, None);
    }

    const NEW_HEADERS: [&str; 6] = [
        "Tanggal Transaksi",
        "Uraian Transaksi",
        "Teller",
        "Debet",
        "Kredit",
        "Saldo",
    ];
}

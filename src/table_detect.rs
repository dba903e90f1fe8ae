use crate::model::{DetectedTable, PageText, RawTable};
use crate::options::ExtractOptions;
use crate::table_parse::{CellSpan, align_spans, column_anchors, split_line_into_spans};

#[derive(Debug, Default)]
struct BlockBuilder {
    rows: Vec<Vec<CellSpan>>,
    pending: Vec<Vec<CellSpan>>,
    gap: usize,
}

impl BlockBuilder {
    fn is_open(&self) -> bool {
        !self.rows.is_empty()
    }

    fn push_wide(&mut self, spans: Vec<CellSpan>) {
        self.rows.append(&mut self.pending);
        self.rows.push(spans);
        self.gap = 0;
    }

    fn push_short(&mut self, spans: Vec<CellSpan>) {
        if !spans.is_empty() {
            self.pending.push(spans);
        }
        self.gap += 1;
    }

    fn finish(&mut self, page: u32, tables: &mut Vec<DetectedTable>) {
        self.pending.clear();
        self.gap = 0;
        let rows = std::mem::take(&mut self.rows);
        if rows.len() < 2 {
            return;
        }

        let anchors = column_anchors(&rows);
        let grid = rows.iter().map(|spans| align_spans(spans, &anchors)).collect();
        tables.push(DetectedTable {
            page,
            table: RawTable::new(grid),
        });
    }
}

pub(crate) fn detect_tables_in_page(
    page: &PageText,
    min_cols: usize,
    max_gap: usize,
) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    let mut block = BlockBuilder::default();

    for line in page.text.lines() {
        let spans = split_line_into_spans(line);
        if spans.len() >= min_cols {
            block.push_wide(spans);
            continue;
        }
        if !block.is_open() {
            continue;
        }

        block.push_short(spans);
        if block.gap > max_gap {
            block.finish(page.page_number, &mut tables);
        }
    }

    block.finish(page.page_number, &mut tables);
    tables
}

pub(crate) fn detect_tables(pages: &[PageText], options: &ExtractOptions) -> Vec<DetectedTable> {
    pages
        .iter()
        .flat_map(|page| detect_tables_in_page(page, options.min_cols, options.max_gap))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

pub(crate) fn split_line_into_spans(line: &str) -> Vec<CellSpan> {
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut start = 0_usize;
    let mut whitespace_run = 0_usize;

    let mut flush = |current: &mut String, start: usize, end: usize| {
        let text = current.trim();
        if !text.is_empty() {
            spans.push(CellSpan {
                start,
                end,
                text: text.to_string(),
            });
        }
        current.clear();
    };

    for (offset, ch) in line.chars().enumerate() {
        if ch == '\t' || (ch.is_whitespace() && whitespace_run >= 1) {
            if !current.trim().is_empty() {
                let end = offset - whitespace_run;
                flush(&mut current, start, end);
            }
            whitespace_run += 1;
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            continue;
        }

        if current.is_empty() {
            start = offset;
        } else if whitespace_run == 1 {
            current.push(' ');
        }
        whitespace_run = 0;
        current.push(ch);
    }

    let end = line.chars().count() - whitespace_run;
    flush(&mut current, start, end);
    spans
}

pub(crate) fn column_anchors(rows: &[Vec<CellSpan>]) -> Vec<(usize, usize)> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    rows.iter()
        .find(|row| row.len() == width)
        .map(|row| row.iter().map(|span| (span.start, span.end)).collect())
        .unwrap_or_default()
}

fn overlap(span: &CellSpan, anchor: (usize, usize)) -> usize {
    span.end.min(anchor.1).saturating_sub(span.start.max(anchor.0))
}

fn center_distance(span: &CellSpan, anchor: (usize, usize)) -> usize {
    (span.start + span.end).abs_diff(anchor.0 + anchor.1)
}

/// Places every span in the anchor column it overlaps most, or the one with
/// the nearest center when it overlaps none. Cells landing in the same
/// column are joined with a space; columns nothing lands in stay missing.
pub(crate) fn align_spans(spans: &[CellSpan], anchors: &[(usize, usize)]) -> Vec<Option<String>> {
    let mut row: Vec<Option<String>> = vec![None; anchors.len()];
    for span in spans {
        let best_overlap = anchors
            .iter()
            .enumerate()
            .map(|(index, anchor)| (index, overlap(span, *anchor)))
            .filter(|(_, amount)| *amount > 0)
            .max_by_key(|(index, amount)| (*amount, std::cmp::Reverse(*index)))
            .map(|(index, _)| index);
        let column = best_overlap.or_else(|| {
            anchors
                .iter()
                .enumerate()
                .min_by_key(|(_, anchor)| center_distance(span, **anchor))
                .map(|(index, _)| index)
        });
        let Some(column) = column else {
            continue;
        };

        match &mut row[column] {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(&span.text);
            }
            None => row[column] = Some(span.text.clone()),
        }
    }
    row
}

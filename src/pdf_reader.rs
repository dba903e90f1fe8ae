use std::path::Path;
use std::sync::LazyLock;

use lopdf::Document;
use regex::Regex;
use tracing::debug;

use crate::error::ExtractError;
use crate::model::PageText;
use crate::options::PageSelection;
use crate::table_parse::split_line_into_spans;

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{3})*\.\d{2}\b").expect("hardcoded amount regex is valid")
});

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn statement_quality_score(text: &str) -> i64 {
    let mut score = 0_i64;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        score += 1;
        if split_line_into_spans(line).len() >= 3 {
            score += 50;
        }
        if AMOUNT_RE.is_match(line) {
            score += 15;
        }
    }
    score
}

fn choose_best_text(candidates: Vec<String>) -> String {
    candidates
        .into_iter()
        .max_by_key(|text| statement_quality_score(text))
        .unwrap_or_default()
}

fn collect_pages(
    document: &Document,
    whole_text: Result<String, String>,
    selection: &PageSelection,
) -> Result<Vec<PageText>, ExtractError> {
    let pages_map = document.get_pages();
    let (extracted_pages, extract_error) = match whole_text {
        Ok(text) => {
            let pages = split_text_into_pages(&text);
            if pages.len() == pages_map.len() {
                (Some(pages), None)
            } else {
                debug!(
                    found = pages.len(),
                    expected = pages_map.len(),
                    "pdf-extract page count mismatch; using lopdf text only"
                );
                (None, None)
            }
        }
        Err(error) => (None, Some(error)),
    };

    let mut pages = Vec::new();
    for (index, (page_no, _)) in pages_map.iter().enumerate() {
        if !selection.contains(*page_no) {
            continue;
        }

        let mut candidates = Vec::new();
        if let Some(text) = extracted_pages
            .as_ref()
            .and_then(|pages| pages.get(index).cloned())
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }
        if let Some(text) = document
            .extract_text(&[*page_no])
            .ok()
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }

        pages.push(PageText {
            page_number: *page_no,
            text: choose_best_text(candidates),
        });
    }

    if pages.is_empty() {
        return Err(ExtractError::NoPagesSelected);
    }
    if let Some(error) = extract_error {
        if pages.iter().all(|page| page.text.trim().is_empty()) {
            return Err(ExtractError::PdfExtract(error));
        }
    }

    Ok(pages)
}

pub(crate) fn read_pdf_pages(
    input_pdf: &Path,
    selection: &PageSelection,
) -> Result<Vec<PageText>, ExtractError> {
    let document = Document::load(input_pdf)?;
    let whole_text = pdf_extract::extract_text(input_pdf).map_err(|error| format!("{error:?}"));
    collect_pages(&document, whole_text, selection)
}

#[cfg(test)]
mod tests {
    use super::{choose_best_text, split_text_into_pages, statement_quality_score};

    #[test]
    fn splits_form_feed_delimited_pages() {
        let pages = split_text_into_pages("p1\u{000C}p2\u{000C}");
        assert_eq!(pages, vec!["p1", "p2"]);
    }

    #[test]
    fn prefers_columnar_text_with_amounts() {
        let columnar = "01/02  SETORAN  1,000.00\n02/02  ADM  5.00".to_string();
        let flat = "01/02 SETORAN 1000\n02/02 ADM 5".to_string();
        assert!(statement_quality_score(&columnar) > statement_quality_score(&flat));
        assert_eq!(choose_best_text(vec![flat, columnar.clone()]), columnar);
    }
}

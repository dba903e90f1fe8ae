use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::ExtractError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    #[default]
    All,
    Pages(BTreeSet<u32>),
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        match self {
            Self::All => true,
            Self::Pages(pages) => pages.contains(&page),
        }
    }
}

fn page_number(text: &str, token: &str) -> Result<u32, ExtractError> {
    match text.trim().parse::<u32>() {
        Ok(0) => Err(ExtractError::InvalidPageSelection(format!(
            "'{token}': page numbers start at 1"
        ))),
        Ok(page) => Ok(page),
        Err(_) => Err(ExtractError::InvalidPageSelection(format!(
            "'{token}': expected 'all' or page numbers such as 1,2,5"
        ))),
    }
}

fn pages_in_token(token: &str) -> Result<std::ops::RangeInclusive<u32>, ExtractError> {
    let Some((first, last)) = token.split_once('-') else {
        let page = page_number(token, token)?;
        return Ok(page..=page);
    };
    let (first, last) = (page_number(first, token)?, page_number(last, token)?);
    if last < first {
        return Err(ExtractError::InvalidPageSelection(format!(
            "'{token}': range runs backwards"
        )));
    }
    Ok(first..=last)
}

impl FromStr for PageSelection {
    type Err = ExtractError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let mut pages = BTreeSet::new();
        for token in input.split(',').map(str::trim).filter(|token| !token.is_empty()) {
            pages.extend(pages_in_token(token)?);
        }
        if pages.is_empty() {
            return Err(ExtractError::InvalidPageSelection(
                "no pages listed; use 'all' or page numbers such as 1,2,5".to_string(),
            ));
        }
        Ok(Self::Pages(pages))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub pages: PageSelection,
    pub min_cols: usize,
    pub max_gap: usize,
    pub delimiter: u8,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: PageSelection::All,
            min_cols: 3,
            max_gap: 3,
            delimiter: b',',
        }
    }
}

impl ExtractOptions {
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.min_cols < 2 {
            return Err(ExtractError::InvalidOption(
                "min_cols must be at least 2".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() {
            return Err(ExtractError::InvalidOption(
                "delimiter must be a single ASCII character".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtractOptions, PageSelection};
    use crate::error::ExtractError;
    use std::str::FromStr;

    #[test]
    fn parse_all_pages() {
        let selection = PageSelection::from_str(" ALL ").expect("selection should parse");
        assert_eq!(selection, PageSelection::All);
        assert!(selection.contains(42));
    }

    #[test]
    fn parse_comma_separated_pages() {
        let selection = PageSelection::from_str("1, 2,5").expect("selection should parse");
        assert!(selection.contains(1));
        assert!(selection.contains(2));
        assert!(selection.contains(5));
        assert!(!selection.contains(3));
    }

    #[test]
    fn parse_page_selection_range() {
        let selection = PageSelection::from_str("2-4").expect("selection should parse");
        assert!(selection.contains(3));
        assert!(!selection.contains(1));
    }

    #[test]
    fn reject_invalid_page_selection() {
        let err = PageSelection::from_str("3-1").expect_err("invalid range should fail");
        assert!(err.to_string().contains("range runs backwards"));

        let err = PageSelection::from_str("0").expect_err("page zero should fail");
        assert!(err.to_string().contains("start at 1"));

        let err = PageSelection::from_str(" , ").expect_err("empty list should fail");
        assert!(matches!(err, ExtractError::InvalidPageSelection(_)));
    }

    #[test]
    fn rejects_small_min_cols() {
        let options = ExtractOptions {
            min_cols: 1,
            ..ExtractOptions::default()
        };
        assert!(options.validate().is_err());
        assert!(ExtractOptions::default().validate().is_ok());
    }
}

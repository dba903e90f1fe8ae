use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    UnrecognizedTable,
    MalformedAmount,
    MixedFormats,
    NoTablesDetected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineWarning {
    pub code: WarningCode,
    pub message: String,
    pub table_index: Option<usize>,
    pub row_index: Option<usize>,
}

impl PipelineWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            table_index: None,
            row_index: None,
        }
    }

    #[must_use]
    pub fn with_table_index(mut self, table_index: usize) -> Self {
        self.table_index = Some(table_index);
        self
    }

    #[must_use]
    pub fn with_row_index(mut self, row_index: usize) -> Self {
        self.row_index = Some(row_index);
        self
    }
}

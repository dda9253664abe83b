#[derive(Debug, thiserror::Error)]
pub enum FundscanError {
    #[error("failed to parse page XML: {0}")]
    PageXml(String),

    #[error("expected {element} not found on page {page}")]
    ExpectedBlockNotFound { element: String, page: u32 },

    #[error("invalid extraction offsets: {0}")]
    InvalidOffsets(String),

    #[error("unknown currency code '{0}'")]
    UnknownCurrency(String),

    #[error("could not convert '{0}' to a number")]
    ParseNumber(String),

    #[error("number '{0}' has a nonzero fractional part")]
    NonIntegerNumber(String),

    #[error("date string '{0}' is not in a recognized format")]
    ParseDate(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("unknown format '{0}'. Available: {1}")]
    UnknownFormat(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

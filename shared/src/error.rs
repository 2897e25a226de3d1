use thiserror::Error;

/// Errors raised by the editor models when an operation addresses
/// something that is not on the page or when page data cannot be loaded.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("formset '{prefix}' has no form with index {index}")]
    UnknownForm { prefix: String, index: usize },

    #[error("position {position} is out of range for {len} items")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("no transaction row with index {0}")]
    UnknownRow(i64),

    #[error("'{0}' is not one of the available categories")]
    UnknownCategory(String),

    #[error("a category is required")]
    EmptyCategory,

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("rule formset '{0}' already has forms; only an empty new category starts at index 0")]
    RulesAlreadyStarted(String),

    #[error("unknown match type '{0}'")]
    UnknownMatchType(String),

    #[error("invalid page data: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;

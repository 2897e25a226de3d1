//! Models behind the budget editor pages: the category/rule formset editor
//! and the bulk transaction table. Nothing here touches the DOM.

use serde::{Deserialize, Serialize};

pub mod category_rules;
pub mod dates;
pub mod error;
pub mod formset;
pub mod matching;
pub mod transactions;

pub use category_rules::{CategoryForm, CategoryRulesEditor, CategoryRulesPayload, PreviewMatch, RuleForm};
pub use error::{EditorError, Result};
pub use formset::{FormInstance, Formset, ItemState};
pub use matching::MatchType;
pub use transactions::{
    CancelRequest, CategoryChange, CategoryKey, CategoryOptions, ChangeSet, Column, GridRow,
    SortDirection, TableData, TransactionGrid, TransactionRow,
};

/// Console verbosity of the frontend logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Settings for the editor pages. The server may override any of them
/// through `data-*` attributes on the page root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorConfig {
    /// Endpoint for data requests and saves; empty means the current page.
    pub page_url: String,
    /// Zone the date column is shown in.
    pub timezone: String,
    /// Query parameter that asks the page for table data instead of HTML.
    pub data_param: (String, String),
    /// Header text of the row-selection column.
    pub row_select_title: String,
    pub csrf_header: String,
    pub log_level: LogLevel,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            page_url: String::new(),
            timezone: dates::DEFAULT_TIMEZONE.to_string(),
            data_param: ("getTxnData".to_string(), "True".to_string()),
            row_select_title: "Delete".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            log_level: LogLevel::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.timezone, "America/Los_Angeles");
        assert_eq!(config.data_param, ("getTxnData".to_string(), "True".to_string()));
        assert_eq!(config.csrf_header, "X-CSRFToken");
        assert!(dates::parse_timezone(&config.timezone).is_ok());
    }

    #[test]
    fn test_log_level_parsing_and_order() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Debug < LogLevel::Error);
    }
}

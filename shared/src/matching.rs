use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// How a rule's pattern is compared against a transaction description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Equals,
    #[default]
    Contains,
    Regex,
    StartsWith,
    EndsWith,
}

impl MatchType {
    pub const ALL: [MatchType; 5] = [
        MatchType::Equals,
        MatchType::Contains,
        MatchType::Regex,
        MatchType::StartsWith,
        MatchType::EndsWith,
    ];

    /// Value sent in the form submission.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Equals => "equals",
            MatchType::Contains => "contains",
            MatchType::Regex => "regex",
            MatchType::StartsWith => "starts_with",
            MatchType::EndsWith => "ends_with",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchType::Equals => "Equals",
            MatchType::Contains => "Contains",
            MatchType::Regex => "Regex",
            MatchType::StartsWith => "Starts with",
            MatchType::EndsWith => "Ends with",
        }
    }

    /// Text comparisons ignore case; regex patterns are searched as written.
    /// A pattern that does not compile never matches.
    pub fn matches(self, pattern: &str, text: &str) -> bool {
        let pattern_lower = pattern.to_lowercase();
        let text_lower = text.to_lowercase();
        match self {
            MatchType::Equals => pattern_lower == text_lower,
            MatchType::Contains => text_lower.contains(&pattern_lower),
            MatchType::StartsWith => text_lower.starts_with(&pattern_lower),
            MatchType::EndsWith => text_lower.ends_with(&pattern_lower),
            MatchType::Regex => Regex::new(pattern)
                .map(|re| re.is_match(text))
                .unwrap_or(false),
        }
    }

    /// Checks the pattern can be used with this match type.
    pub fn validate(self, pattern: &str) -> Option<String> {
        match self {
            MatchType::Regex => Regex::new(pattern)
                .err()
                .map(|e| format!("Invalid regular expression: {}", e)),
            _ => None,
        }
    }
}

impl FromStr for MatchType {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchType::ALL
            .into_iter()
            .find(|match_type| match_type.as_str() == s)
            .ok_or_else(|| EditorError::UnknownMatchType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_modes_ignore_case() {
        assert!(MatchType::Equals.matches("Netflix", "NETFLIX"));
        assert!(!MatchType::Equals.matches("Netflix", "NETFLIX.COM"));
        assert!(MatchType::Contains.matches("safeway", "SAFEWAY #1234 OAKLAND"));
        assert!(MatchType::StartsWith.matches("amzn", "AMZN Mktp US"));
        assert!(MatchType::EndsWith.matches("payroll", "ACME Corp PAYROLL"));
        assert!(!MatchType::StartsWith.matches("payroll", "ACME Corp PAYROLL"));
    }

    #[test]
    fn test_regex_mode() {
        assert!(MatchType::Regex.matches(r"^UBER\s+\*TRIP", "UBER   *TRIP 8821"));
        assert!(!MatchType::Regex.matches(r"^uber", "UBER *TRIP"));
        assert!(!MatchType::Regex.matches("(unclosed", "(unclosed"));
    }

    #[test]
    fn test_validate_only_checks_regex() {
        assert!(MatchType::Regex.validate("(unclosed").is_some());
        assert!(MatchType::Regex.validate("ok.*").is_none());
        assert!(MatchType::Contains.validate("(unclosed").is_none());
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(MatchType::default(), MatchType::Contains);
        assert_eq!("starts_with".parse::<MatchType>().unwrap(), MatchType::StartsWith);
        assert!("fuzzy".parse::<MatchType>().is_err());
        assert_eq!(serde_json::to_string(&MatchType::EndsWith).unwrap(), "\"ends_with\"");
    }
}

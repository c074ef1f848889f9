//! Flash-style notices shown above a node.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Info,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Parse a level name; anything unknown is informational.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" | "error" => Self::Warning,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A one-shot message carried to the next rendered node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_names() {
        assert_eq!(NoticeLevel::parse("success"), NoticeLevel::Success);
        assert_eq!(NoticeLevel::parse(" Warning "), NoticeLevel::Warning);
        assert_eq!(NoticeLevel::parse("error"), NoticeLevel::Warning);
        assert_eq!(NoticeLevel::parse("whatever"), NoticeLevel::Info);
    }

    #[test]
    fn serializes_level_lowercase() {
        let json = serde_json::to_value(Notice::success("ok")).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["message"], "ok");
    }
}

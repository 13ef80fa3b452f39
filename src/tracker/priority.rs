use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Urgency tag attached to a running task. Ordering follows urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// All priorities, least urgent first.
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent];

    pub fn emoji(self) -> &'static str {
        match self {
            Priority::Low => "🟦",
            Priority::Medium => "🟨",
            Priority::High => "🟥",
            Priority::Urgent => "⚡",
        }
    }

    /// Storage and callback code.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

impl FromStr for Priority {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" | "1" | "низкий" => Ok(Priority::Low),
            "medium" | "med" | "m" | "2" | "средний" => Ok(Priority::Medium),
            "high" | "h" | "3" | "высокий" => Ok(Priority::High),
            "urgent" | "u" | "4" | "срочный" => Ok(Priority::Urgent),
            _ => Err(TrackerError::InvalidPriority(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert!(Priority::High < Priority::Urgent);
        assert_eq!(Priority::ALL.iter().max(), Some(&Priority::Urgent));
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!("HIGH".parse::<Priority>().ok(), Some(Priority::High));
        assert_eq!("u".parse::<Priority>().ok(), Some(Priority::Urgent));
        assert_eq!(" 1 ".parse::<Priority>().ok(), Some(Priority::Low));
        assert_eq!("Средний".parse::<Priority>().ok(), Some(Priority::Medium));
        assert!("critical".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_storage_code_is_parseable() {
        for priority in Priority::ALL {
            assert_eq!(priority.as_str().parse::<Priority>().ok(), Some(priority));
        }
    }
}

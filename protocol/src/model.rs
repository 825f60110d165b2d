//! Case and thread enums as they appear on the wire.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a case, shown as a badge on the investigator dashboard.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    #[default]
    New,
    InReview,
    Closed,
}

impl CaseStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::InReview => "IN_REVIEW",
            Self::Closed => "CLOSED",
        }
    }

    /// Closed cases no longer accept thread items.
    #[must_use]
    pub const fn accepts_messages(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// Classification attached to a case by an external model.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MlLabel {
    #[serde(rename = "abusive", alias = "ABUSIVE")]
    Abusive,
    #[serde(rename = "non_abusive", alias = "NON_ABUSIVE")]
    NonAbusive,
    #[default]
    #[serde(
        rename = "unknown",
        alias = "UNKNOWN",
        alias = "uncategorized",
        alias = "UNCATEGORIZED"
    )]
    Unknown,
}

impl MlLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Abusive => "abusive",
            Self::NonAbusive => "non_abusive",
            Self::Unknown => "unknown",
        }
    }
}

/// Origin of a thread item.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ThreadItemSender {
    #[serde(rename = "WB", alias = "WHISTLEBLOWER")]
    Whistleblower,
    #[serde(rename = "INV", alias = "INVESTIGATOR")]
    Investigator,
}

/// Kind of thread item. The first item of every case is the report itself.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ThreadItemType {
    Report,
    Message,
    Attachment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_cases_reject_messages() {
        assert!(CaseStatus::New.accepts_messages());
        assert!(CaseStatus::InReview.accepts_messages());
        assert!(!CaseStatus::Closed.accepts_messages());
    }

    #[test]
    fn as_str_matches_serde_names() {
        assert_eq!(CaseStatus::InReview.as_str(), "IN_REVIEW");
        assert_eq!(MlLabel::NonAbusive.as_str(), "non_abusive");
        assert_eq!(MlLabel::default(), MlLabel::Unknown);
        assert_eq!(CaseStatus::default(), CaseStatus::New);
    }
}

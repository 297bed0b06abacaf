//! Domain labels assigned to documents by the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed set of categories a document can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    Finance,
    Education,
    Legal,
    Technical,
    Medical,
    General,
}

/// Returned when a label does not name a known domain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown domain '{0}' (expected one of: Finance, Education, Legal, Technical, Medical, General)")]
pub struct UnknownDomain(pub String);

impl Domain {
    /// Every domain, in declaration order.
    pub const ALL: [Domain; 6] = [
        Domain::Finance,
        Domain::Education,
        Domain::Legal,
        Domain::Technical,
        Domain::Medical,
        Domain::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finance => "Finance",
            Self::Education => "Education",
            Self::Legal => "Legal",
            Self::Technical => "Technical",
            Self::Medical => "Medical",
            Self::General => "General",
        }
    }

    /// Lowercase slug used in URLs and CSS classes.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Education => "education",
            Self::Legal => "legal",
            Self::Technical => "technical",
            Self::Medical => "medical",
            Self::General => "general",
        }
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::General
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

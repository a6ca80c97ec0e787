//! Activity categories reported by the time-tracking service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the developer was doing when a heartbeat was sent.
///
/// Only `Coding`, `Debugging` and `CodeReviewing` drive session
/// reconstruction; the rest are carried so that other heartbeats sharing a
/// pull-request entity still count toward review time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Coding,
    Building,
    Indexing,
    Debugging,
    Browsing,
    RunningTests,
    WritingTests,
    ManualTesting,
    WritingDocs,
    CodeReviewing,
    Communicating,
    Researching,
    Learning,
    Designing,
    AiCoding,
    /// Any category this build does not know about.
    Other,
}

impl Category {
    /// The wire string used by the tracking service.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Coding => "coding",
            Self::Building => "building",
            Self::Indexing => "indexing",
            Self::Debugging => "debugging",
            Self::Browsing => "browsing",
            Self::RunningTests => "running tests",
            Self::WritingTests => "writing tests",
            Self::ManualTesting => "manual testing",
            Self::WritingDocs => "writing docs",
            Self::CodeReviewing => "code reviewing",
            Self::Communicating => "communicating",
            Self::Researching => "researching",
            Self::Learning => "learning",
            Self::Designing => "designing",
            Self::AiCoding => "ai coding",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coding" => Ok(Self::Coding),
            "building" => Ok(Self::Building),
            "indexing" => Ok(Self::Indexing),
            "debugging" => Ok(Self::Debugging),
            "browsing" => Ok(Self::Browsing),
            "running tests" => Ok(Self::RunningTests),
            "writing tests" => Ok(Self::WritingTests),
            "manual testing" => Ok(Self::ManualTesting),
            "writing docs" => Ok(Self::WritingDocs),
            "code reviewing" => Ok(Self::CodeReviewing),
            "communicating" => Ok(Self::Communicating),
            "researching" => Ok(Self::Researching),
            "learning" => Ok(Self::Learning),
            "designing" => Ok(Self::Designing),
            "ai coding" => Ok(Self::AiCoding),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// Lenient: the service adds categories over time and an unknown one must not
// reject the whole heartbeat feed.
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|err: UnknownCategory| {
            tracing::debug!(%err, "treating heartbeat category as other");
            Self::Other
        }))
    }
}

/// Error type for unknown category strings.
#[derive(Debug, Clone)]
pub struct UnknownCategory(String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

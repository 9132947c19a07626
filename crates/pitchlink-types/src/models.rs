use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Account role. A user owns at most one profile, of the kind matching its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Startup,
    Investor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Investor => "investor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startup" => Ok(Self::Startup),
            "investor" => Ok(Self::Investor),
            other => Err(UnknownVariant { kind: "role", value: other.to_string() }),
        }
    }
}

/// Lifecycle of a pitch-deck application.
///
/// Only `Sent` is produced today. The remaining states are reserved for
/// investor-side transitions that have no workflow yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Sent,
    Viewed,
    Interested,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Interested => "interested",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "viewed" => Ok(Self::Viewed),
            "interested" => Ok(Self::Interested),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant { kind: "application status", value: other.to_string() }),
        }
    }
}

/// An investor's signal toward a startup, independent of any application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestLevel {
    Interested,
    NotInterested,
}

impl InterestLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interested => "interested",
            Self::NotInterested => "not_interested",
        }
    }
}

impl FromStr for InterestLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interested" => Ok(Self::Interested),
            "not_interested" => Ok(Self::NotInterested),
            other => Err(UnknownVariant { kind: "interest status", value: other.to_string() }),
        }
    }
}

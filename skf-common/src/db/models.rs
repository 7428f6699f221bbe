//! Database models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Closed set of report categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pay,
    Policy,
    InterviewVsReality,
    Management,
    Exit,
    Culture,
    Benefits,
    Other,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 8] = [
        Category::Pay,
        Category::Policy,
        Category::InterviewVsReality,
        Category::Management,
        Category::Exit,
        Category::Culture,
        Category::Benefits,
        Category::Other,
    ];

    /// Stable string form used in the database and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pay => "pay",
            Category::Policy => "policy",
            Category::InterviewVsReality => "interview_vs_reality",
            Category::Management => "management",
            Category::Exit => "exit",
            Category::Culture => "culture",
            Category::Benefits => "benefits",
            Category::Other => "other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pay" => Ok(Category::Pay),
            "policy" => Ok(Category::Policy),
            "interview_vs_reality" => Ok(Category::InterviewVsReality),
            "management" => Ok(Category::Management),
            "exit" => Ok(Category::Exit),
            "culture" => Ok(Category::Culture),
            "benefits" => Ok(Category::Benefits),
            "other" => Ok(Category::Other),
            other => Err(Error::InvalidCategory(other.to_string())),
        }
    }
}

/// Direction of a report vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }
}

impl std::str::FromStr for VoteDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            other => Err(Error::InvalidInput(format!("invalid vote direction: {}", other))),
        }
    }
}

/// Organization record
///
/// `sketch_score` and `total_reports` are derived from the report set and
/// written only by the scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub sketch_score: i64,
    pub total_reports: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Report record as stored in the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub category: Category,
    pub title: String,
    pub body: String,
    pub severity: i64,
    pub is_anonymous: bool,
    pub upvotes: i64,
    pub created_at: String,
}

/// A single voter's vote on a report (latest direction wins)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportVote {
    pub id: Uuid,
    pub report_id: Uuid,
    pub user_id: Uuid,
    pub vote_type: VoteDirection,
    pub created_at: String,
}

/// Identity record
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub password_hash: Option<String>,
    pub password_salt: Option<String>,
    pub totp_secret: Option<String>,
    pub totp_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Bearer session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_round_trips_through_string_form() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = Category::from_str("vibes").unwrap_err();
        assert!(matches!(err, Error::InvalidCategory(_)));
    }

    #[test]
    fn category_serde_uses_snake_case() {
        let json = serde_json::to_string(&Category::InterviewVsReality).unwrap();
        assert_eq!(json, "\"interview_vs_reality\"");
    }

    #[test]
    fn vote_direction_parses() {
        assert_eq!(VoteDirection::from_str("up").unwrap(), VoteDirection::Up);
        assert_eq!(VoteDirection::from_str("down").unwrap(), VoteDirection::Down);
        assert!(VoteDirection::from_str("sideways").is_err());
    }
}

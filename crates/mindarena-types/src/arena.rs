//! Arena session types
//!
//! A session is one attempt at one problem. It starts `active` and ends
//! either `completed` (on submit) or `abandoned`.

use crate::{ArchetypeXp, IdempotencyKey, ProblemId, SessionId, UserId, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an arena session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

impl SessionStatus {
    /// Completed and abandoned sessions accept no further commands
    pub fn is_closed(&self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// A session as reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Body of `POST /arena/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub user_id: UserId,
    pub problem_id: ProblemId,
}

/// Body of `POST /arena/submit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitSolutionRequest {
    pub session_id: SessionId,
    pub solution: String,
    pub time_elapsed: u32,
    pub idempotency_key: IdempotencyKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Scoring outcome of one submission. Lives only as long as the result view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub xp_earned: u32,
    #[serde(default)]
    pub xp_breakdown: ArchetypeXp,
    #[serde(default)]
    pub level_up_achieved: bool,
    #[serde(default)]
    pub criteria_met: Vec<String>,
    #[serde(default)]
    pub evaluation: String,
    #[serde(default)]
    pub insight: String,
    /// Seconds spent on the problem
    #[serde(default)]
    pub time_elapsed: u32,
}

/// Response of `POST /arena/submit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub result: SubmissionResult,
    #[serde(default, alias = "profile", skip_serializing_if = "Option::is_none")]
    pub updated_profile: Option<UserProfile>,
}

/// Body of `POST /arena/abandon`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbandonSessionRequest {
    pub session_id: SessionId,
}

/// What an abandon call amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonOutcome {
    /// The server moved the session to `abandoned`
    Abandoned,
    /// The session was already closed; nothing changed
    AlreadyClosed,
    /// The request did not complete; the server may still hold the session open
    Unconfirmed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_response_flattened() {
        let resp: SubmitResponse = serde_json::from_value(serde_json::json!({
            "xp_earned": 30,
            "xp_breakdown": { "builder": 20, "analyst": 10 },
            "level_up_achieved": true,
            "criteria_met": ["clarity", "feasibility"],
            "evaluation": "Solid plan",
            "insight": "Consider costs",
            "time_elapsed": 610,
            "profile": {
                "user_id": "ada@example.com",
                "current_difficulty": 5,
                "calibration_completed": true
            }
        }))
        .unwrap();

        assert_eq!(resp.result.xp_earned, 30);
        assert!(resp.result.level_up_achieved);
        assert_eq!(resp.result.criteria_met.len(), 2);
        assert_eq!(resp.updated_profile.unwrap().current_difficulty, 5);
    }

    #[test]
    fn test_session_status_wire_names() {
        let s: SessionStatus = serde_json::from_str("\"abandoned\"").unwrap();
        assert_eq!(s, SessionStatus::Abandoned);
        assert!(s.is_closed());
        assert!(!SessionStatus::Active.is_closed());
    }
}

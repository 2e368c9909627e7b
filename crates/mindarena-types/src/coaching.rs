//! Real-time coaching telemetry
//!
//! Keystroke activity is mirrored to the server, which answers with
//! suggested next actions and mentor interventions. All of it is best-effort.

use crate::{InterventionId, ProblemId, SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `POST /arena/init-session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitSessionRequest {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub problem_id: ProblemId,
}

/// Body of `POST /arena/track`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    pub session_id: SessionId,
    pub keystrokes: u32,
    pub chars_typed: u32,
    /// Milliseconds since the session started
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

/// Kind of nudge the coach proposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextActionKind {
    Continue,
    Hint,
    Intervention,
    Break,
    #[serde(other)]
    Unknown,
}

/// Response of `GET /arena/next-action/{session_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    pub action: NextActionKind,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub intervention_id: Option<InterventionId>,
}

/// Body of `POST /arena/intervention-response`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionResponse {
    pub session_id: SessionId,
    pub intervention_id: InterventionId,
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Response of `GET /arena/metrics/{session_id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    #[serde(default)]
    pub typing_speed: f64,
    #[serde(default)]
    pub pause_count: u32,
    #[serde(default)]
    pub edit_count: u32,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_next_action_kind() {
        let action: NextAction = serde_json::from_value(serde_json::json!({
            "action": "celebrate"
        }))
        .unwrap();
        assert_eq!(action.action, NextActionKind::Unknown);
        assert!(action.message.is_none());
    }

    #[test]
    fn test_metrics_keep_extra_fields() {
        let m: SessionMetrics = serde_json::from_value(serde_json::json!({
            "typing_speed": 3.5,
            "focus_score": 0.8
        }))
        .unwrap();
        assert_eq!(m.pause_count, 0);
        assert!(m.extra.contains_key("focus_score"));
    }
}

//! Problem types and the difficulty window used to pick playable problems

use crate::{Archetype, ProblemId, UserId, UserProfile};
use serde::{Deserialize, Serialize};

/// Lowest difficulty the backend assigns
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest difficulty the backend assigns
pub const MAX_DIFFICULTY: u8 = 10;

/// A generated problem. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub problem_id: ProblemId,
    pub difficulty: u8,
    pub title: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Estimated solving time in minutes
    #[serde(default)]
    pub estimated_time: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_focus: Option<Archetype>,
}

fn default_active() -> bool {
    true
}

/// Query for `GET /problems`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemFilter {
    pub difficulty_min: Option<u8>,
    pub difficulty_max: Option<u8>,
    pub is_active: Option<bool>,
    pub user_id: Option<UserId>,
}

impl ProblemFilter {
    /// Filter for the active problems a player can attempt at their level
    pub fn for_profile(profile: &UserProfile) -> Self {
        let window = DifficultyWindow::around(profile.current_difficulty);
        Self {
            difficulty_min: Some(window.min),
            difficulty_max: Some(window.max),
            is_active: Some(true),
            user_id: Some(profile.user_id.clone()),
        }
    }

    /// Query-string pairs in a stable order; unset fields are omitted
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(min) = self.difficulty_min {
            query.push(("difficulty_min", min.to_string()));
        }
        if let Some(max) = self.difficulty_max {
            query.push(("difficulty_max", max.to_string()));
        }
        if let Some(active) = self.is_active {
            query.push(("is_active", active.to_string()));
        }
        if let Some(user) = &self.user_id {
            query.push(("user_id", user.to_string()));
        }
        query
    }
}

/// Inclusive difficulty range `[current - 1, current + 2]`, clamped to the
/// backend's scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyWindow {
    pub min: u8,
    pub max: u8,
}

impl DifficultyWindow {
    pub fn around(current: u8) -> Self {
        let current = current.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        Self {
            min: current.saturating_sub(1).max(MIN_DIFFICULTY),
            max: current.saturating_add(2).min(MAX_DIFFICULTY),
        }
    }

    pub fn contains(&self, difficulty: u8) -> bool {
        (self.min..=self.max).contains(&difficulty)
    }

    /// Keep the active problems inside the window, preserving server order
    pub fn apply(&self, problems: Vec<Problem>) -> Vec<Problem> {
        problems
            .into_iter()
            .filter(|p| p.is_active && self.contains(p.difficulty))
            .collect()
    }
}

/// Optional knobs for `POST /problems/generate`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemCustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_focus: Option<Archetype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
}

/// Body of `POST /problems/generate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateProblemRequest {
    pub user_profile: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization: Option<ProblemCustomization>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(id: &str, difficulty: u8, active: bool) -> Problem {
        Problem {
            problem_id: ProblemId::from(id),
            difficulty,
            title: format!("Problem {}", id),
            context: String::new(),
            objective: String::new(),
            constraints: vec![],
            estimated_time: 15,
            is_active: active,
            archetype_focus: None,
        }
    }

    #[test]
    fn test_window_bounds() {
        assert_eq!(DifficultyWindow::around(5), DifficultyWindow { min: 4, max: 7 });
        assert_eq!(DifficultyWindow::around(1), DifficultyWindow { min: 1, max: 3 });
        assert_eq!(DifficultyWindow::around(9), DifficultyWindow { min: 8, max: 10 });
        assert_eq!(DifficultyWindow::around(0), DifficultyWindow { min: 1, max: 3 });
    }

    #[test]
    fn test_window_filters_unfiltered_list() {
        let list: Vec<Problem> = (1..=10).map(|d| problem(&format!("P{}", d), d, true)).collect();
        let kept = DifficultyWindow::around(4).apply(list);

        let difficulties: Vec<u8> = kept.iter().map(|p| p.difficulty).collect();
        assert_eq!(difficulties, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_window_drops_inactive() {
        let kept = DifficultyWindow::around(4).apply(vec![problem("A", 4, false), problem("B", 4, true)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].problem_id.as_str(), "B");
    }

    #[test]
    fn test_filter_query_omits_unset_fields() {
        let filter = ProblemFilter {
            difficulty_min: Some(2),
            is_active: Some(true),
            ..Default::default()
        };
        assert_eq!(
            filter.to_query(),
            vec![("difficulty_min", "2".to_string()), ("is_active", "true".to_string())]
        );
    }

    #[test]
    fn test_problem_defaults() {
        let p: Problem = serde_json::from_value(serde_json::json!({
            "problem_id": "P1",
            "difficulty": 3,
            "title": "Bridge"
        }))
        .unwrap();
        assert!(p.is_active);
        assert!(p.constraints.is_empty());
    }
}

//! Player profile types
//!
//! A profile is created by calibration and afterwards only ever changed by
//! the backend (profile update, arena submission). The client treats it as a
//! read-only snapshot.

use crate::{TypesError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Behavioral category used to bucket experience points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    RiskTaker,
    Analyst,
    Builder,
    Strategist,
}

impl Archetype {
    /// All archetypes in display order
    pub const ALL: [Archetype; 4] = [
        Archetype::RiskTaker,
        Archetype::Analyst,
        Archetype::Builder,
        Archetype::Strategist,
    ];

    /// Wire name of the archetype
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::RiskTaker => "risk_taker",
            Archetype::Analyst => "analyst",
            Archetype::Builder => "builder",
            Archetype::Strategist => "strategist",
        }
    }

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            Archetype::RiskTaker => "Risk Taker",
            Archetype::Analyst => "Analyst",
            Archetype::Builder => "Builder",
            Archetype::Strategist => "Strategist",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Archetype {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "risk_taker" => Ok(Archetype::RiskTaker),
            "analyst" => Ok(Archetype::Analyst),
            "builder" => Ok(Archetype::Builder),
            "strategist" => Ok(Archetype::Strategist),
            other => Err(TypesError::UnknownArchetype(other.to_string())),
        }
    }
}

/// Experience counters, one per archetype
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeXp {
    #[serde(default)]
    pub risk_taker: u32,
    #[serde(default)]
    pub analyst: u32,
    #[serde(default)]
    pub builder: u32,
    #[serde(default)]
    pub strategist: u32,
}

impl ArchetypeXp {
    pub fn new(risk_taker: u32, analyst: u32, builder: u32, strategist: u32) -> Self {
        Self {
            risk_taker,
            analyst,
            builder,
            strategist,
        }
    }

    /// XP held in one archetype
    pub fn get(&self, archetype: Archetype) -> u32 {
        match archetype {
            Archetype::RiskTaker => self.risk_taker,
            Archetype::Analyst => self.analyst,
            Archetype::Builder => self.builder,
            Archetype::Strategist => self.strategist,
        }
    }

    /// Sum over all archetypes
    pub fn total(&self) -> u64 {
        Archetype::ALL.iter().map(|a| u64::from(self.get(*a))).sum()
    }

    /// Field-wise saturating addition
    pub fn saturating_add(&self, other: &ArchetypeXp) -> ArchetypeXp {
        ArchetypeXp {
            risk_taker: self.risk_taker.saturating_add(other.risk_taker),
            analyst: self.analyst.saturating_add(other.analyst),
            builder: self.builder.saturating_add(other.builder),
            strategist: self.strategist.saturating_add(other.strategist),
        }
    }

    /// Copy with `amount` added to one archetype (saturating)
    pub fn credit(&self, archetype: Archetype, amount: u32) -> ArchetypeXp {
        let mut xp = *self;
        let slot = match archetype {
            Archetype::RiskTaker => &mut xp.risk_taker,
            Archetype::Analyst => &mut xp.analyst,
            Archetype::Builder => &mut xp.builder,
            Archetype::Strategist => &mut xp.strategist,
        };
        *slot = slot.saturating_add(amount);
        xp
    }

    /// Field-wise maximum
    pub fn max(&self, other: &ArchetypeXp) -> ArchetypeXp {
        ArchetypeXp {
            risk_taker: self.risk_taker.max(other.risk_taker),
            analyst: self.analyst.max(other.analyst),
            builder: self.builder.max(other.builder),
            strategist: self.strategist.max(other.strategist),
        }
    }

    /// Archetypes whose counter is lower in `self` than in `before`
    pub fn regressions_from(&self, before: &ArchetypeXp) -> Vec<Archetype> {
        Archetype::ALL
            .iter()
            .copied()
            .filter(|a| self.get(*a) < before.get(*a))
            .collect()
    }

    /// The archetype with the most XP (first one wins on ties)
    pub fn dominant(&self) -> Archetype {
        let mut best = Archetype::RiskTaker;
        for a in Archetype::ALL {
            if self.get(a) > self.get(best) {
                best = a;
            }
        }
        best
    }
}

/// Cached copy of a player's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub current_difficulty: u8,
    #[serde(default)]
    pub calibration_completed: bool,
    #[serde(default)]
    pub xp: ArchetypeXp,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_language() -> String {
    "en".to_string()
}

impl UserProfile {
    /// Total XP across archetypes
    pub fn total_xp(&self) -> u64 {
        self.xp.total()
    }
}

/// Partial profile update (`PUT /profiles/{user_id}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_difficulty: Option<u8>,
}

impl ProfileUpdate {
    /// True if the update would change nothing
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.current_difficulty.is_none()
    }
}

/// One answered calibration question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationAnswer {
    pub question_id: String,
    pub answer: String,
}

/// Onboarding questionnaire answers (`POST /profiles/calibrate`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationAnswers {
    pub user_id: UserId,
    pub answers: Vec<CalibrationAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// The identity the client persists locally after login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl AuthUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            id: None,
        }
    }

    /// Profiles are keyed by email
    pub fn user_id(&self) -> UserId {
        UserId::new(self.email.clone())
    }
}

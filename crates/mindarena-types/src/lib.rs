//! MindArena Types - Canonical domain types for the MindArena client
//!
//! This crate holds the wire and domain types shared by the SDK and the CLI,
//! with zero dependencies on other mindarena crates:
//!
//! - Identity types (UserId, ProblemId, SessionId, IdempotencyKey)
//! - Player profiles, archetypes and experience counters
//! - Problems, problem filters and the playable difficulty window
//! - Arena sessions and submission results
//! - Coaching telemetry and gamification read models
//!
//! # Arena Flow
//!
//! ```text
//! selection → battle → result → selection
//!                └── abandon ──────┘
//! ```

pub mod identity;
pub mod profile;
pub mod problem;
pub mod arena;
pub mod coaching;
pub mod gamification;
pub mod error;

pub use identity::*;
pub use profile::*;
pub use problem::*;
pub use arena::*;
pub use coaching::*;
pub use gamification::*;
pub use error::*;

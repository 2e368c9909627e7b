//! MindArena SDK - client for the MindArena problem-solving arena
//!
//! The SDK wraps the MindArena HTTP API behind a typed facade and drives the
//! arena page flow: pick a problem, solve it, see the score.
//!
//! # Quick Start
//!
//! ```ignore
//! use mindarena_sdk::{ArenaClient, ArenaFlow, ArenaView, ClientConfig, SessionContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let session = SessionContext::restore(config.credential_store())?;
//!     let client = ArenaClient::new(config, session)?;
//!
//!     let mut flow = ArenaFlow::new(client);
//!     flow.load().await?;
//!
//!     if let ArenaView::Selection(selection) = flow.view() {
//!         let first = selection.problems[0].problem_id.clone();
//!         flow.start(&first).await?;
//!         flow.submit("Build it in phases", 600, None).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Layout
//!
//! - [`ArenaClient`]: one method per API operation, bearer auth, 401 handling
//! - [`ArenaFlow`]: the `selection → battle → result` view state machine
//! - [`TelemetryQueue`]: fire-and-forget coaching events
//! - [`Transport`]: the wire seam; [`HttpTransport`] in production

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod flow;
pub mod navigation;
pub mod session;
pub mod telemetry;
pub mod transport;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use mindarena_types::*;

pub use client::{ArenaClient, IDEMPOTENCY_HEADER};
pub use config::ClientConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredentials};
pub use error::{SdkError, SdkResult};
pub use flow::{
    ArenaFlow, ArenaView, BattleView, PendingSubmission, ResultView, SelectionView, SubmitOutcome,
    ViewKind,
};
pub use navigation::{LogNavigator, Navigator, Route};
pub use session::SessionContext;
pub use telemetry::{TelemetryEvent, TelemetryQueue, TelemetrySender};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

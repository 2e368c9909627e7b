//! Arena flow: the `selection → battle → result` state machine
//!
//! The view is a tagged enum; each variant owns exactly the data it needs,
//! so a battle without a session or a result without a payload cannot be
//! built. Every change of variant goes through the transition table in
//! [`ViewKind::can_transition_to`] and bumps the flow epoch.
//!
//! Load failures never escape as errors: they become [`ArenaView::LoadFailed`]
//! so the caller can offer a retry.

use crate::client::ArenaClient;
use crate::error::{SdkError, SdkResult};
use crate::navigation::Route;
use crate::telemetry::{TelemetryEvent, TelemetrySender};
use mindarena_types::{
    AbandonOutcome, ArenaSession, DifficultyWindow, IdempotencyKey, InitSessionRequest,
    InterventionId, InterventionResponse, KeystrokeEvent, NextAction, Problem,
    ProblemCustomization, ProblemFilter, ProblemId, SessionId, SubmissionResult, SubmitResponse,
    UserProfile,
};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Discriminant of [`ArenaView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Loading,
    Selection,
    Battle,
    Result,
    Redirect,
    LoadFailed,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Loading => "loading",
            ViewKind::Selection => "selection",
            ViewKind::Battle => "battle",
            ViewKind::Result => "result",
            ViewKind::Redirect => "redirect",
            ViewKind::LoadFailed => "load_failed",
        }
    }

    /// The allowed-transition table
    pub fn can_transition_to(self, next: ViewKind) -> bool {
        use ViewKind::*;
        matches!(
            (self, next),
            (Loading, Selection)
                | (Loading, Redirect)
                | (Loading, LoadFailed)
                | (Selection, Loading)
                | (Selection, Battle)
                | (Battle, Result)
                | (Battle, Loading)
                | (Result, Loading)
                | (LoadFailed, Loading)
                | (Redirect, Loading)
        )
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problem picking
#[derive(Debug, Clone)]
pub struct SelectionView {
    pub profile: UserProfile,
    pub problems: Vec<Problem>,
    /// A generation request is in flight; the generate control is disabled
    pub generating: bool,
}

/// An active attempt
#[derive(Debug, Clone)]
pub struct BattleView {
    pub profile: UserProfile,
    pub problem: Problem,
    pub session: ArenaSession,
    /// Reused by every retry of this attempt's submission
    pub attempt_key: IdempotencyKey,
    pub started: Instant,
}

impl BattleView {
    pub fn elapsed_seconds(&self) -> u32 {
        u32::try_from(self.started.elapsed().as_secs()).unwrap_or(u32::MAX)
    }
}

/// Scoring outcome of the last attempt
#[derive(Debug, Clone)]
pub struct ResultView {
    pub profile: UserProfile,
    pub problem: Problem,
    pub result: SubmissionResult,
    pub xp_total_before: u64,
    pub xp_total_after: u64,
}

impl ResultView {
    pub fn xp_gained(&self) -> u64 {
        self.xp_total_after.saturating_sub(self.xp_total_before)
    }

    pub fn leveled_up(&self) -> bool {
        self.result.level_up_achieved
    }
}

/// Current page state
#[derive(Debug, Clone)]
pub enum ArenaView {
    Loading,
    Selection(SelectionView),
    Battle(BattleView),
    Result(ResultView),
    Redirect(Route),
    LoadFailed { message: String },
}

impl ArenaView {
    pub fn kind(&self) -> ViewKind {
        match self {
            ArenaView::Loading => ViewKind::Loading,
            ArenaView::Selection(_) => ViewKind::Selection,
            ArenaView::Battle(_) => ViewKind::Battle,
            ArenaView::Result(_) => ViewKind::Result,
            ArenaView::Redirect(_) => ViewKind::Redirect,
            ArenaView::LoadFailed { .. } => ViewKind::LoadFailed,
        }
    }
}

/// A submission captured in one epoch, to be applied only if the view has
/// not moved on by the time the response arrives
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    epoch: u64,
    pub session_id: SessionId,
    pub attempt_key: IdempotencyKey,
    pub solution: String,
    pub time_elapsed_seconds: u32,
    pub metadata: Option<serde_json::Value>,
}

impl PendingSubmission {
    /// Perform the network call for this submission
    pub async fn send(&self, client: &ArenaClient) -> SdkResult<SubmitResponse> {
        client
            .submit_solution_with_key(
                &self.session_id,
                &self.solution,
                self.time_elapsed_seconds,
                self.metadata.clone(),
                self.attempt_key,
            )
            .await
    }
}

/// What happened to a completed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Result view entered
    Applied,
    /// The view changed while the request was in flight; response ignored
    Discarded,
}

/// Page-level controller owning the view state
pub struct ArenaFlow {
    client: ArenaClient,
    telemetry: Option<TelemetrySender>,
    view: ArenaView,
    epoch: u64,
}

impl ArenaFlow {
    pub fn new(client: ArenaClient) -> Self {
        Self {
            client,
            telemetry: None,
            view: ArenaView::Loading,
            epoch: 0,
        }
    }

    /// Mirror battle activity to the coaching stream
    pub fn with_telemetry(mut self, telemetry: TelemetrySender) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn view(&self) -> &ArenaView {
        &self.view
    }

    pub fn kind(&self) -> ViewKind {
        self.view.kind()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn client(&self) -> &ArenaClient {
        &self.client
    }

    fn transition(&mut self, next: ArenaView) -> SdkResult<()> {
        let from = self.view.kind();
        let to = next.kind();
        if !from.can_transition_to(to) {
            return Err(SdkError::InvalidTransition {
                from: from.as_str(),
                to: to.as_str(),
            });
        }
        self.epoch += 1;
        info!(%from, %to, epoch = self.epoch, "arena view transition");
        self.view = next;
        Ok(())
    }

    fn redirect(&mut self, route: Route) -> SdkResult<()> {
        self.client.navigate(route);
        self.transition(ArenaView::Redirect(route))
    }

    /// The client already cleared credentials and navigated; mirror it
    fn expire(&mut self) -> SdkResult<()> {
        if self.view.kind() != ViewKind::Loading {
            self.transition(ArenaView::Loading)?;
        }
        self.transition(ArenaView::Redirect(Route::Login))
    }

    fn expire_on_unauthorized<T>(&mut self, result: SdkResult<T>) -> SdkResult<T> {
        if let Err(SdkError::Unauthorized) = &result {
            self.expire()?;
        }
        result
    }

    fn fail_load(&mut self, error: SdkError) -> SdkResult<()> {
        warn!(error = %error, "arena load failed");
        self.transition(ArenaView::LoadFailed {
            message: error.to_string(),
        })
    }

    // ========================================================================
    // Entering selection
    // ========================================================================

    /// Enter selection: re-fetch profile and problems. Not allowed from
    /// battle; leave it with `submit` or `abandon` first.
    pub async fn load(&mut self) -> SdkResult<()> {
        if self.view.kind() == ViewKind::Battle {
            return Err(SdkError::InvalidTransition {
                from: ViewKind::Battle.as_str(),
                to: ViewKind::Loading.as_str(),
            });
        }
        if self.view.kind() != ViewKind::Loading {
            self.transition(ArenaView::Loading)?;
        }

        let user_id = match self.client.current_user() {
            Ok(user) => user.user_id(),
            Err(_) => return self.redirect(Route::Login),
        };

        let profile = match self.client.fetch_profile(&user_id).await {
            Ok(profile) => profile,
            Err(SdkError::ProfileNotFound { .. }) => return self.redirect(Route::Calibration),
            Err(SdkError::Unauthorized) => return self.expire(),
            Err(e) => return self.fail_load(e),
        };

        if !profile.calibration_completed {
            debug!(user = %user_id, "profile not calibrated");
            return self.redirect(Route::Calibration);
        }

        let problems = match self.client.list_problems(&ProblemFilter::for_profile(&profile)).await {
            Ok(list) => DifficultyWindow::around(profile.current_difficulty).apply(list),
            Err(SdkError::Unauthorized) => return self.expire(),
            Err(e) => return self.fail_load(e),
        };

        self.transition(ArenaView::Selection(SelectionView {
            profile,
            problems,
            generating: false,
        }))
    }

    /// Reload after a failed load
    pub async fn retry(&mut self) -> SdkResult<()> {
        self.require_view(ViewKind::LoadFailed, ViewKind::Loading)?;
        self.load().await
    }

    /// Leave the result view for a fresh selection
    pub async fn continue_to_selection(&mut self) -> SdkResult<()> {
        self.require_view(ViewKind::Result, ViewKind::Loading)?;
        self.load().await
    }

    /// Re-fetch profile and problems while picking
    pub async fn refresh(&mut self) -> SdkResult<()> {
        self.require_view(ViewKind::Selection, ViewKind::Loading)?;
        self.load().await
    }

    fn require_view(&self, required: ViewKind, target: ViewKind) -> SdkResult<()> {
        if self.view.kind() != required {
            return Err(SdkError::InvalidTransition {
                from: self.view.kind().as_str(),
                to: target.as_str(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Ask the server for a new problem and put it at the top of the list.
    /// On failure the list is left unchanged and generation is re-enabled.
    pub async fn generate(&mut self, customization: Option<ProblemCustomization>) -> SdkResult<Problem> {
        let profile = match &mut self.view {
            ArenaView::Selection(selection) if !selection.generating => {
                selection.generating = true;
                selection.profile.clone()
            }
            ArenaView::Selection(_) => {
                return Err(SdkError::InvalidTransition {
                    from: ViewKind::Selection.as_str(),
                    to: ViewKind::Selection.as_str(),
                })
            }
            other => {
                return Err(SdkError::InvalidTransition {
                    from: other.kind().as_str(),
                    to: ViewKind::Selection.as_str(),
                })
            }
        };

        let outcome = self.client.generate_problem(&profile, customization).await;

        if let ArenaView::Selection(selection) = &mut self.view {
            selection.generating = false;
            if let Ok(problem) = &outcome {
                selection.problems.insert(0, problem.clone());
            }
        }

        self.expire_on_unauthorized(outcome)
    }

    /// Open a session on `problem_id` and enter battle
    pub async fn start(&mut self, problem_id: &ProblemId) -> SdkResult<()> {
        let (profile, listed) = match &self.view {
            ArenaView::Selection(selection) => (
                selection.profile.clone(),
                selection
                    .problems
                    .iter()
                    .find(|p| &p.problem_id == problem_id)
                    .cloned(),
            ),
            other => {
                return Err(SdkError::InvalidTransition {
                    from: other.kind().as_str(),
                    to: ViewKind::Battle.as_str(),
                })
            }
        };

        let problem = match listed {
            Some(problem) => problem,
            None => {
                let fetched = self.client.get_problem(problem_id).await;
                self.expire_on_unauthorized(fetched)?
            }
        };
        if !problem.is_active {
            return Err(SdkError::ProblemUnavailable {
                problem_id: problem_id.to_string(),
                message: "problem is not active".to_string(),
            });
        }

        let started = self.client.start_session(problem_id).await;
        let session = self.expire_on_unauthorized(started)?;

        if let Some(telemetry) = &self.telemetry {
            telemetry.enqueue(TelemetryEvent::InitSession(InitSessionRequest {
                session_id: session.session_id.clone(),
                user_id: session.user_id.clone(),
                problem_id: session.problem_id.clone(),
            }));
        }

        self.transition(ArenaView::Battle(BattleView {
            profile,
            problem,
            session,
            attempt_key: IdempotencyKey::new(),
            started: Instant::now(),
        }))
    }

    // ========================================================================
    // Battle
    // ========================================================================

    /// Submit the battle's solution and enter the result view
    pub async fn submit(
        &mut self,
        solution: &str,
        time_elapsed_seconds: u32,
        metadata: Option<serde_json::Value>,
    ) -> SdkResult<SubmitOutcome> {
        let pending = self.prepare_submit(solution, time_elapsed_seconds, metadata)?;
        let response = pending.send(&self.client).await;
        self.complete_submit(pending, response)
    }

    /// Capture a submission for the current battle without sending it
    pub fn prepare_submit(
        &self,
        solution: &str,
        time_elapsed_seconds: u32,
        metadata: Option<serde_json::Value>,
    ) -> SdkResult<PendingSubmission> {
        match &self.view {
            ArenaView::Battle(battle) => Ok(PendingSubmission {
                epoch: self.epoch,
                session_id: battle.session.session_id.clone(),
                attempt_key: battle.attempt_key,
                solution: solution.to_string(),
                time_elapsed_seconds,
                metadata,
            }),
            other => Err(SdkError::InvalidTransition {
                from: other.kind().as_str(),
                to: ViewKind::Result.as_str(),
            }),
        }
    }

    /// Apply the response of a prepared submission. Responses that arrive
    /// after the view moved on are discarded.
    pub fn complete_submit(
        &mut self,
        pending: PendingSubmission,
        response: SdkResult<SubmitResponse>,
    ) -> SdkResult<SubmitOutcome> {
        if pending.epoch != self.epoch {
            debug!(
                session = %pending.session_id,
                prepared = pending.epoch,
                current = self.epoch,
                "discarding stale submission response"
            );
            return Ok(SubmitOutcome::Discarded);
        }

        let response = match response {
            Ok(response) => response,
            Err(SdkError::Unauthorized) => {
                self.expire()?;
                return Err(SdkError::Unauthorized);
            }
            // Stay in battle; a retry reuses the attempt key
            Err(e) => return Err(e),
        };

        let (before, problem) = match &self.view {
            ArenaView::Battle(battle) => (battle.profile.clone(), battle.problem.clone()),
            other => {
                return Err(SdkError::InvalidTransition {
                    from: other.kind().as_str(),
                    to: ViewKind::Result.as_str(),
                })
            }
        };

        let profile = reconcile_profile(&before, &problem, &response);
        let view = ResultView {
            xp_total_before: before.total_xp(),
            xp_total_after: profile.total_xp(),
            profile,
            problem,
            result: response.result,
        };

        self.transition(ArenaView::Result(view))?;
        Ok(SubmitOutcome::Applied)
    }

    /// Give up on the battle and go back to selection. The battle is left
    /// even if the server call fails, in which case the outcome is
    /// `Unconfirmed`.
    pub async fn abandon(&mut self) -> SdkResult<AbandonOutcome> {
        let session_id = match &self.view {
            ArenaView::Battle(battle) => battle.session.session_id.clone(),
            other => {
                return Err(SdkError::InvalidTransition {
                    from: other.kind().as_str(),
                    to: ViewKind::Selection.as_str(),
                })
            }
        };

        let outcome = match self.client.abandon_session(&session_id).await {
            Ok(outcome) => outcome,
            Err(SdkError::Unauthorized) => {
                self.expire()?;
                return Err(SdkError::Unauthorized);
            }
            Err(e) => {
                warn!(session = %session_id, error = %e, "abandon failed, leaving battle anyway");
                AbandonOutcome::Unconfirmed
            }
        };

        self.transition(ArenaView::Loading)?;
        self.load().await?;
        Ok(outcome)
    }

    /// Report typing activity for the current battle (best-effort)
    pub fn track_keystrokes(&self, keystrokes: u32, chars_typed: u32, snapshot: Option<String>) -> bool {
        let (Some(telemetry), ArenaView::Battle(battle)) = (&self.telemetry, &self.view) else {
            return false;
        };
        let timestamp_ms = u64::try_from(battle.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        telemetry.enqueue(TelemetryEvent::Keystroke(KeystrokeEvent {
            session_id: battle.session.session_id.clone(),
            keystrokes,
            chars_typed,
            timestamp_ms,
            snapshot,
        }))
    }

    /// Answer a mentor intervention (best-effort)
    pub fn respond_to_intervention(
        &self,
        intervention_id: InterventionId,
        accepted: bool,
        comment: Option<String>,
    ) -> bool {
        let (Some(telemetry), ArenaView::Battle(battle)) = (&self.telemetry, &self.view) else {
            return false;
        };
        telemetry.enqueue(TelemetryEvent::Intervention(InterventionResponse {
            session_id: battle.session.session_id.clone(),
            intervention_id,
            accepted,
            comment,
        }))
    }

    /// Coach's suggestion for the current battle; failures yield `None`
    pub async fn next_action(&self) -> Option<NextAction> {
        let ArenaView::Battle(battle) = &self.view else {
            return None;
        };
        match self.client.next_action(&battle.session.session_id).await {
            Ok(action) => Some(action),
            Err(e) => {
                debug!(error = %e, "next action unavailable");
                None
            }
        }
    }
}

/// Profile to show after a submission. Counters never go below the
/// pre-submit profile. Without a server profile the breakdown is added
/// locally, and any part of `xp_earned` the breakdown does not cover goes
/// to the problem's focus archetype (or the player's dominant one).
fn reconcile_profile(
    before: &UserProfile,
    problem: &Problem,
    response: &SubmitResponse,
) -> UserProfile {
    let mut after = match &response.updated_profile {
        Some(profile) => profile.clone(),
        None => {
            let result = &response.result;
            let mut profile = before.clone();
            profile.xp = before.xp.saturating_add(&result.xp_breakdown);

            let covered = u32::try_from(result.xp_breakdown.total()).unwrap_or(u32::MAX);
            let unassigned = result.xp_earned.saturating_sub(covered);
            if unassigned > 0 {
                let archetype = problem.archetype_focus.unwrap_or_else(|| before.xp.dominant());
                debug!(%archetype, unassigned, "crediting XP missing from breakdown");
                profile.xp = profile.xp.credit(archetype, unassigned);
            }
            profile
        }
    };

    let regressions = after.xp.regressions_from(&before.xp);
    if !regressions.is_empty() {
        warn!(?regressions, "server profile lost XP, keeping previous counters");
        after.xp = after.xp.max(&before.xp);
    }
    after
}

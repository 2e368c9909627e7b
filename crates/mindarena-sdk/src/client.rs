//! Arena API facade
//!
//! Every operation builds an `ApiRequest`, attaches the bearer token from the
//! session context, and normalizes the response into a typed value or an
//! `SdkError`. A 401 on any call clears credentials and redirects to login.

use crate::config::ClientConfig;
use crate::error::{SdkError, SdkResult};
use crate::navigation::{LogNavigator, Navigator, Route};
use crate::session::SessionContext;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use mindarena_types::{
    AbandonOutcome, AbandonSessionRequest, Achievement, ArenaSession, Artifact, AuthUser,
    CalibrationAnswers, GenerateProblemRequest, IdempotencyKey, InitSessionRequest,
    InterventionResponse, KeystrokeEvent, NextAction, Problem, ProblemCustomization,
    ProblemFilter, ProblemId, ProfileUpdate, SessionId, SessionMetrics, StartSessionRequest,
    SubmitResponse, SubmitSolutionRequest, UserId, UserProfile,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Header carrying the per-attempt idempotency key
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Statuses `POST /arena/start` uses to reject an unplayable problem
const PROBLEM_REJECTION_STATUSES: [u16; 5] = [400, 404, 409, 410, 422];

/// Statuses `POST /arena/abandon` uses for a session that is already closed
const ALREADY_CLOSED_STATUSES: [u16; 3] = [404, 409, 410];

/// Closed sessions remembered for idempotent abandon before the set is reset
const MAX_CLOSED_SESSIONS: usize = 1024;

/// Main MindArena client
///
/// Cheap to clone; clones share transport, session and bookkeeping.
#[derive(Clone)]
pub struct ArenaClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    session: SessionContext,
    navigator: Arc<dyn Navigator>,
    closed_sessions: Arc<Mutex<HashSet<SessionId>>>,
}

impl ArenaClient {
    /// Client over HTTP using `config`
    pub fn new(config: ClientConfig, session: SessionContext) -> SdkResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport), session))
    }

    /// Client over an arbitrary transport
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: SessionContext,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            session,
            navigator: Arc::new(LogNavigator),
            closed_sessions: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Replace the navigator that receives redirects
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }

    /// Clear credentials and forget which sessions were closed
    pub fn logout(&self) -> SdkResult<()> {
        self.closed_sessions.lock().clear();
        self.session.logout()
    }

    fn mark_closed(&self, session_id: &SessionId) {
        let mut closed = self.closed_sessions.lock();
        if closed.len() >= MAX_CLOSED_SESSIONS {
            debug!(size = closed.len(), "closed session cache full, resetting");
            closed.clear();
        }
        closed.insert(session_id.clone());
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    async fn execute(&self, mut request: ApiRequest) -> SdkResult<ApiResponse> {
        request.bearer = self.session.token();
        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "sending request");

        let resp = self.transport.send(request).await?;
        debug!(%method, %path, status = resp.status, "received response");

        if resp.status == 401 {
            self.handle_unauthorized();
            return Err(SdkError::Unauthorized);
        }
        Ok(resp)
    }

    fn handle_unauthorized(&self) {
        warn!("server rejected credentials, clearing session");
        if let Err(e) = self.logout() {
            warn!(error = %e, "failed to clear stored credentials");
        }
        self.navigator.navigate(Route::Login);
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> SdkResult<T> {
        let resp = self.execute(request).await?;
        if !resp.is_success() {
            return Err(resp.into_error());
        }
        resp.json()
    }

    // ========================================================================
    // Identity & profile
    // ========================================================================

    /// The locally persisted identity. Never calls the network.
    pub fn current_user(&self) -> SdkResult<AuthUser> {
        self.session.current_user()
    }

    /// `GET /profiles/{user_id}`; 404 means calibration never completed
    pub async fn fetch_profile(&self, user_id: &UserId) -> SdkResult<UserProfile> {
        let resp = self
            .execute(ApiRequest::get(format!("/profiles/{}", user_id)))
            .await?;

        match resp.status {
            404 => Err(SdkError::ProfileNotFound {
                user_id: user_id.to_string(),
            }),
            _ if resp.is_success() => resp.json(),
            _ => Err(resp.into_error()),
        }
    }

    /// `PUT /profiles/{user_id}`
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
    ) -> SdkResult<UserProfile> {
        self.call(ApiRequest::put(format!("/profiles/{}", user_id)).json(update)?)
            .await
    }

    /// `POST /profiles/calibrate`: create the profile from onboarding answers
    pub async fn calibrate(&self, answers: &CalibrationAnswers) -> SdkResult<UserProfile> {
        self.call(ApiRequest::post("/profiles/calibrate").json(answers)?)
            .await
    }

    // ========================================================================
    // Problems
    // ========================================================================

    /// `GET /problems?{filters}`. No pagination; order is the server's.
    pub async fn list_problems(&self, filter: &ProblemFilter) -> SdkResult<Vec<Problem>> {
        let problems: Option<Vec<Problem>> = self
            .call(ApiRequest::get("/problems").query(filter.to_query()))
            .await?;
        Ok(problems.unwrap_or_default())
    }

    /// `GET /problems/{id}`
    pub async fn get_problem(&self, problem_id: &ProblemId) -> SdkResult<Problem> {
        self.call(ApiRequest::get(format!("/problems/{}", problem_id)))
            .await
    }

    /// `POST /problems/generate`. Server-side generation can take seconds.
    pub async fn generate_problem(
        &self,
        profile: &UserProfile,
        customization: Option<ProblemCustomization>,
    ) -> SdkResult<Problem> {
        let body = GenerateProblemRequest {
            user_profile: profile.clone(),
            customization,
        };

        match self
            .call::<Problem>(ApiRequest::post("/problems/generate").json(&body)?)
            .await
        {
            Ok(problem) => Ok(problem),
            Err(SdkError::Unauthorized) => Err(SdkError::Unauthorized),
            Err(e) => Err(SdkError::GenerationFailed(e.to_string())),
        }
    }

    // ========================================================================
    // Arena sessions
    // ========================================================================

    /// `POST /arena/start`: open an `active` session for the current user
    pub async fn start_session(&self, problem_id: &ProblemId) -> SdkResult<ArenaSession> {
        let body = StartSessionRequest {
            user_id: self.session.user_id()?,
            problem_id: problem_id.clone(),
        };

        let resp = self
            .execute(ApiRequest::post("/arena/start").json(&body)?)
            .await?;

        if PROBLEM_REJECTION_STATUSES.contains(&resp.status) {
            return Err(SdkError::ProblemUnavailable {
                problem_id: problem_id.to_string(),
                message: resp.error_message(),
            });
        }
        if !resp.is_success() {
            return Err(resp.into_error());
        }
        resp.json()
    }

    /// `POST /arena/submit` with a fresh idempotency key
    pub async fn submit_solution(
        &self,
        session_id: &SessionId,
        solution: &str,
        time_elapsed_seconds: u32,
        metadata: Option<serde_json::Value>,
    ) -> SdkResult<SubmitResponse> {
        self.submit_solution_with_key(
            session_id,
            solution,
            time_elapsed_seconds,
            metadata,
            IdempotencyKey::new(),
        )
        .await
    }

    /// `POST /arena/submit` for a given attempt. Retrying after an ambiguous
    /// failure must reuse the same key.
    pub async fn submit_solution_with_key(
        &self,
        session_id: &SessionId,
        solution: &str,
        time_elapsed_seconds: u32,
        metadata: Option<serde_json::Value>,
        key: IdempotencyKey,
    ) -> SdkResult<SubmitResponse> {
        let body = SubmitSolutionRequest {
            session_id: session_id.clone(),
            solution: solution.to_string(),
            time_elapsed: time_elapsed_seconds,
            idempotency_key: key,
            metadata,
        };

        let request = ApiRequest::post("/arena/submit")
            .header(IDEMPOTENCY_HEADER, key.to_string())
            .json(&body)?;

        let response: SubmitResponse = self.call(request).await?;
        self.mark_closed(session_id);
        Ok(response)
    }

    /// `POST /arena/abandon`. Idempotent: repeat calls and sessions the
    /// server reports as already closed succeed without error.
    pub async fn abandon_session(&self, session_id: &SessionId) -> SdkResult<AbandonOutcome> {
        if self.closed_sessions.lock().contains(session_id) {
            debug!(session = %session_id, "session already closed locally, skipping abandon");
            return Ok(AbandonOutcome::AlreadyClosed);
        }

        let body = AbandonSessionRequest {
            session_id: session_id.clone(),
        };
        let resp = self
            .execute(ApiRequest::post("/arena/abandon").json(&body)?)
            .await?;

        let outcome = if resp.is_success() {
            AbandonOutcome::Abandoned
        } else if ALREADY_CLOSED_STATUSES.contains(&resp.status) {
            debug!(session = %session_id, status = resp.status, "server reports session already closed");
            AbandonOutcome::AlreadyClosed
        } else {
            return Err(resp.into_error());
        };

        self.mark_closed(session_id);
        Ok(outcome)
    }

    /// `GET /arena/user/{user_id}`
    pub async fn user_sessions(&self, user_id: &UserId) -> SdkResult<Vec<ArenaSession>> {
        let sessions: Option<Vec<ArenaSession>> = self
            .call(ApiRequest::get(format!("/arena/user/{}", user_id)))
            .await?;
        Ok(sessions.unwrap_or_default())
    }

    // ========================================================================
    // Coaching telemetry
    // ========================================================================

    /// `POST /arena/init-session`
    pub async fn init_session(&self, request: &InitSessionRequest) -> SdkResult<()> {
        self.send_ignoring_body(ApiRequest::post("/arena/init-session").json(request)?)
            .await
    }

    /// `POST /arena/track`
    pub async fn track_keystroke(&self, event: &KeystrokeEvent) -> SdkResult<()> {
        self.send_ignoring_body(ApiRequest::post("/arena/track").json(event)?)
            .await
    }

    /// `POST /arena/intervention-response`
    pub async fn respond_to_intervention(&self, response: &InterventionResponse) -> SdkResult<()> {
        self.send_ignoring_body(ApiRequest::post("/arena/intervention-response").json(response)?)
            .await
    }

    /// `GET /arena/next-action/{session_id}`
    pub async fn next_action(&self, session_id: &SessionId) -> SdkResult<NextAction> {
        self.call(ApiRequest::get(format!("/arena/next-action/{}", session_id)))
            .await
    }

    /// `GET /arena/metrics/{session_id}`
    pub async fn metrics(&self, session_id: &SessionId) -> SdkResult<SessionMetrics> {
        self.call(ApiRequest::get(format!("/arena/metrics/{}", session_id)))
            .await
    }

    async fn send_ignoring_body(&self, request: ApiRequest) -> SdkResult<()> {
        let resp = self.execute(request).await?;
        if !resp.is_success() {
            return Err(resp.into_error());
        }
        Ok(())
    }

    // ========================================================================
    // Gamification
    // ========================================================================

    /// `GET /user/achievements/{user_id}`
    pub async fn achievements(&self, user_id: &UserId) -> SdkResult<Vec<Achievement>> {
        let list: Option<Vec<Achievement>> = self
            .call(ApiRequest::get(format!("/user/achievements/{}", user_id)))
            .await?;
        Ok(list.unwrap_or_default())
    }

    /// `GET /user/artifacts/{user_id}`
    pub async fn artifacts(&self, user_id: &UserId) -> SdkResult<Vec<Artifact>> {
        let list: Option<Vec<Artifact>> = self
            .call(ApiRequest::get(format!("/user/artifacts/{}", user_id)))
            .await?;
        Ok(list.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::mock::{MockTransport, RecordingNavigator};
    use crate::transport::Method;
    use serde_json::json;

    fn logged_in_client() -> (ArenaClient, Arc<MockTransport>, Arc<RecordingNavigator>) {
        let session = SessionContext::new(Arc::new(MemoryCredentialStore::new()));
        session.login("tok-1", AuthUser::new("ada@example.com")).unwrap();

        let transport = Arc::new(MockTransport::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let client = ArenaClient::with_transport(ClientConfig::default(), transport.clone(), session)
            .with_navigator(navigator.clone());
        (client, transport, navigator)
    }

    fn profile_json(xp: serde_json::Value) -> serde_json::Value {
        json!({
            "user_id": "ada@example.com",
            "current_difficulty": 4,
            "calibration_completed": true,
            "xp": xp
        })
    }

    #[tokio::test]
    async fn test_current_user_is_local() {
        let (client, transport, _) = logged_in_client();
        assert_eq!(client.current_user().unwrap().email, "ada@example.com");
        assert!(transport.requests().is_empty());

        client.session().logout().unwrap();
        assert!(matches!(client.current_user(), Err(SdkError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Get, "/profiles/ada@example.com", 200, profile_json(json!({})));

        client.fetch_profile(&UserId::from("ada@example.com")).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].bearer.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_fetch_profile_404_is_profile_not_found() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Get, "/profiles/ada@example.com", 404, json!({"detail": "Profile not found"}));

        let err = client.fetch_profile(&UserId::from("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, SdkError::ProfileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_401_clears_credentials_and_redirects() {
        let (client, transport, navigator) = logged_in_client();
        transport.on(Method::Get, "/arena/user/ada@example.com", 401, json!({"detail": "expired"}));

        let err = client.user_sessions(&UserId::from("ada@example.com")).await.unwrap_err();

        assert!(matches!(err, SdkError::Unauthorized));
        assert!(!client.session().is_authenticated());
        assert_eq!(navigator.last(), Some(Route::Login));
        assert_eq!(Route::Login.path(), "/login");
    }

    #[tokio::test]
    async fn test_list_problems_sends_filters() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Get, "/problems", 200, json!([]));

        let filter = ProblemFilter {
            difficulty_min: Some(3),
            difficulty_max: Some(6),
            is_active: Some(true),
            user_id: Some(UserId::from("ada@example.com")),
        };
        let problems = client.list_problems(&filter).await.unwrap();

        assert!(problems.is_empty());
        let query = &transport.requests()[0].query;
        assert!(query.contains(&("difficulty_min".to_string(), "3".to_string())));
        assert!(query.contains(&("user_id".to_string(), "ada@example.com".to_string())));
    }

    #[tokio::test]
    async fn test_generate_failure_maps_to_generation_failed() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Post, "/problems/generate", 500, json!({"detail": "LLM timeout"}));

        let profile: UserProfile = serde_json::from_value(profile_json(json!({}))).unwrap();
        let err = client.generate_problem(&profile, None).await.unwrap_err();

        match err {
            SdkError::GenerationFailed(msg) => assert!(msg.contains("LLM timeout")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_start_inactive_problem_is_unavailable() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Post, "/arena/start", 400, json!({"detail": "Problem is not active"}));

        let err = client.start_session(&ProblemId::from("P9")).await.unwrap_err();
        match err {
            SdkError::ProblemUnavailable { problem_id, message } => {
                assert_eq!(problem_id, "P9");
                assert_eq!(message, "Problem is not active");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_start_requires_login() {
        let (client, transport, _) = logged_in_client();
        client.session().logout().unwrap();

        let err = client.start_session(&ProblemId::from("P1")).await.unwrap_err();
        assert!(matches!(err, SdkError::NotAuthenticated));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_submit_carries_idempotency_key() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Post, "/arena/submit", 200, json!({"xp_earned": 10}));

        let key = IdempotencyKey::new();
        client
            .submit_solution_with_key(&SessionId::from("s1"), "plan", 90, None, key)
            .await
            .unwrap();

        let req = &transport.requests()[0];
        assert_eq!(req.header_value(IDEMPOTENCY_HEADER), Some(key.to_string().as_str()));
        let body = req.body.as_ref().unwrap();
        assert_eq!(body["idempotency_key"], json!(key.to_string()));
        assert_eq!(body["time_elapsed"], json!(90));
    }

    #[tokio::test]
    async fn test_abandon_twice_is_noop() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Post, "/arena/abandon", 200, json!({"status": "abandoned"}));

        let session = SessionId::from("s1");
        assert_eq!(client.abandon_session(&session).await.unwrap(), AbandonOutcome::Abandoned);
        assert_eq!(client.abandon_session(&session).await.unwrap(), AbandonOutcome::AlreadyClosed);
        assert_eq!(transport.count(Method::Post, "/arena/abandon"), 1);
    }

    #[tokio::test]
    async fn test_logout_forgets_closed_sessions() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Post, "/arena/abandon", 200, json!({"status": "abandoned"}));

        let session = SessionId::from("s1");
        client.abandon_session(&session).await.unwrap();
        assert_eq!(client.abandon_session(&session).await.unwrap(), AbandonOutcome::AlreadyClosed);

        client.logout().unwrap();
        assert!(!client.session().is_authenticated());
        assert!(client.closed_sessions.lock().is_empty());

        client.session().login("tok-2", AuthUser::new("ada@example.com")).unwrap();
        assert_eq!(client.abandon_session(&session).await.unwrap(), AbandonOutcome::Abandoned);
        assert_eq!(transport.count(Method::Post, "/arena/abandon"), 2);
    }

    #[tokio::test]
    async fn test_unauthorized_forgets_closed_sessions() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Post, "/arena/abandon", 200, json!({"status": "abandoned"}));
        transport.on(Method::Get, "/arena/user/ada@example.com", 401, json!({"detail": "expired"}));

        client.abandon_session(&SessionId::from("s1")).await.unwrap();
        assert_eq!(client.closed_sessions.lock().len(), 1);

        let err = client.user_sessions(&UserId::from("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, SdkError::Unauthorized));
        assert!(client.closed_sessions.lock().is_empty());
    }

    #[test]
    fn test_closed_session_cache_is_bounded() {
        let (client, _, _) = logged_in_client();
        for i in 0..MAX_CLOSED_SESSIONS {
            client.mark_closed(&SessionId::new(format!("s{}", i)));
        }
        assert_eq!(client.closed_sessions.lock().len(), MAX_CLOSED_SESSIONS);

        client.mark_closed(&SessionId::from("overflow"));
        let closed = client.closed_sessions.lock();
        assert_eq!(closed.len(), 1);
        assert!(closed.contains(&SessionId::from("overflow")));
    }

    #[tokio::test]
    async fn test_abandon_already_closed_on_server() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Post, "/arena/abandon", 409, json!({"detail": "Session already completed"}));

        let outcome = client.abandon_session(&SessionId::from("s7")).await.unwrap();
        assert_eq!(outcome, AbandonOutcome::AlreadyClosed);
    }

    #[tokio::test]
    async fn test_abandon_after_submit_skips_network() {
        let (client, transport, _) = logged_in_client();
        transport.on(Method::Post, "/arena/submit", 200, json!({"xp_earned": 5}));

        let session = SessionId::from("s2");
        client.submit_solution(&session, "done", 30, None).await.unwrap();
        let outcome = client.abandon_session(&session).await.unwrap();

        assert_eq!(outcome, AbandonOutcome::AlreadyClosed);
        assert_eq!(transport.count(Method::Post, "/arena/abandon"), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_request_failed() {
        let (client, transport, _) = logged_in_client();
        transport.fail(Method::Get, "/problems/P1", "connection reset");

        let err = client.get_problem(&ProblemId::from("P1")).await.unwrap_err();
        assert!(matches!(err, SdkError::RequestFailed { status: None, .. }));
    }
}

//! Scripted transport and recording navigator
//!
//! Enabled for unit tests and with the `mock` feature. Replies are keyed by
//! method and path (query excluded). Each route holds a queue of replies; the
//! last reply repeats once the queue is down to one entry.

use crate::error::{SdkError, SdkResult};
use crate::navigation::{Navigator, Route};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
enum MockReply {
    Respond(ApiResponse),
    Fail(String),
}

/// In-memory `Transport` that replays scripted replies and records requests
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockReply>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply for `method path`
    pub fn on(&self, method: Method, path: &str, status: u16, body: serde_json::Value) -> &Self {
        let bytes = serde_json::to_vec(&body).unwrap_or_default();
        self.push(method, path, MockReply::Respond(ApiResponse::new(status, bytes)))
    }

    /// Queue a transport-level failure (no HTTP status) for `method path`
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, MockReply::Fail(message.to_string()))
    }

    fn push(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Every request sent so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests sent to `method path`
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> SdkResult<ApiResponse> {
        let key = (request.method, request.path.clone());
        self.requests.lock().push(request);

        let reply = {
            let mut routes = self.routes.lock();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(MockReply::Respond(resp)) => Ok(resp),
            Some(MockReply::Fail(message)) => Err(SdkError::transport(message)),
            None => Ok(ApiResponse::new(
                404,
                format!(r#"{{"detail":"no mock route for {} {}"}}"#, key.0, key.1),
            )),
        }
    }
}

/// Navigator that remembers every redirect
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.routes.lock().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

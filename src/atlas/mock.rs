//! Scripted HTTP client for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Mock HTTP client answering from per-path response queues.
///
/// Responses are matched on the URL path. Once a path's queue has a
/// single entry left, that entry is repeated. Unknown paths get a 404.
#[derive(Debug, Default)]
pub struct MockClient {
    routes: Mutex<HashMap<String, VecDeque<Result<HttpResponse, HttpError>>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for a URL path.
    #[must_use]
    pub fn route(self, path: &str, response: Result<HttpResponse, HttpError>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Queues a 200 response with a body.
    #[must_use]
    pub fn ok(self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.route(path, Ok(HttpResponse::ok(body)))
    }

    /// Queues a response with the given status and empty body.
    #[must_use]
    pub fn status(self, path: &str, status: u16) -> Self {
        let status = http::StatusCode::from_u16(status).unwrap();
        self.route(path, Ok(HttpResponse::new(status, Vec::new())))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn clone_result(result: &Result<HttpResponse, HttpError>) -> Result<HttpResponse, HttpError> {
    match result {
        Ok(r) => Ok(r.clone()),
        Err(HttpError::Timeout) => Err(HttpError::Timeout),
        Err(HttpError::InvalidUrl(s)) => Err(HttpError::InvalidUrl(s.clone())),
        Err(HttpError::Connection(e)) => Err(HttpError::Connection(e.to_string().into())),
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let path = req.url.path().to_string();
        self.requests.lock().unwrap().push(req);

        let mut routes = self.routes.lock().unwrap();
        let Some(queue) = routes.get_mut(&path) else {
            return Ok(HttpResponse::new(http::StatusCode::NOT_FOUND, Vec::new()));
        };
        if queue.len() > 1 {
            return queue.pop_front().unwrap();
        }
        queue.front().map_or_else(
            || Ok(HttpResponse::new(http::StatusCode::NOT_FOUND, Vec::new())),
            clone_result,
        )
    }
}

//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::ApiClient;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::MemorySessionStore;
use crate::transport::{Transport, TransportError};

/// Replays queued responses in order and records every request. With an
/// empty queue it answers `200 {}`, or echoes the request body in echo mode.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    echo: bool,
    queue: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub(crate) fn push_json(&self, status: u16, body: &str) {
        self.queue.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }));
    }

    pub(crate) fn push_failure(&self, message: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(message)));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = if self.echo {
            request.body.clone().unwrap_or_else(|| "null".to_string())
        } else {
            "{}".to_string()
        };
        self.requests.lock().unwrap().push(request);

        if let Some(next) = self.queue.lock().unwrap().pop_front() {
            return next;
        }
        Ok(HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        })
    }
}

/// Client over a scripted transport rooted at `http://api.test`.
pub(crate) fn client_with(transport: &Arc<ScriptedTransport>, session: MemorySessionStore) -> ApiClient {
    ApiClient::new("http://api.test", Arc::new(session), Arc::clone(transport) as Arc<dyn Transport>)
}

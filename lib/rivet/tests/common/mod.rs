//! Shared models and test doubles.

#![allow(dead_code, missing_docs)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use rivet::prelude::*;
use rivet::{Request, Response, StatusCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[model(path = "/users", after_materialize = "mark_loaded")]
pub struct User {
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip)]
    pub loads: u32,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            email: None,
            loads: 0,
        }
    }

    pub fn with_id(id: u64, name: &str) -> Self {
        Self {
            id: Some(id),
            ..Self::new(name)
        }
    }

    fn mark_loaded(&mut self) {
        self.loads += 1;
    }
}

/// Changed fields of a [`User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Identified)]
pub struct UserPatch {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// In-memory transport recording every request.
///
/// Answers with the queued responses in order, then with `200 {}`.
#[derive(Debug, Clone, Default)]
pub struct RecordingClient {
    requests: Arc<Mutex<Vec<Request>>>,
    responses: Arc<Mutex<VecDeque<Response>>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Response::new(
                StatusCode::from_u16(status).expect("valid status"),
                HashMap::new(),
                body.to_string(),
            ));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn last(&self) -> Request {
        self.requests().pop().expect("at least one request")
    }
}

impl HttpClient for RecordingClient {
    async fn execute(&self, request: Request) -> rivet::Result<Response> {
        self.requests.lock().expect("requests lock").push(request);
        let response = self.responses.lock().expect("responses lock").pop_front();
        Ok(response.unwrap_or_else(|| Response::new(StatusCode::OK, HashMap::new(), "{}")))
    }
}

pub fn users(client: RecordingClient) -> ResourceService<User, RecordingClient> {
    ResourceService::with_api_url("http://api.test/users", client)
}

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response};

use crate::fetch::HttpClient;

/// A request as seen by [`ScriptedHttpClient`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// `None` for streaming bodies such as multipart forms.
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_json(&self) -> serde_json::Value {
        let body = self.body.as_deref().unwrap_or_default();
        serde_json::from_slice(body).unwrap()
    }
}

/// Replays queued responses in order. Once the queue is exhausted every
/// request gets a `500` naming the unexpected URL.
#[derive(Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<(u16, Vec<u8>)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.push(status, body);
        self
    }

    pub fn push(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .unwrap()
            .push_back((status, body.into()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        let url = req.url().to_string();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: req.method().clone(),
            url: url.clone(),
            headers: req.headers().clone(),
            body: req.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec),
        });

        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| (500, format!("unscripted request to {url}").into_bytes()));

        let resp = ::http::Response::builder()
            .status(status)
            .body(body)
            .unwrap();
        Ok(Response::from(resp))
    }
}

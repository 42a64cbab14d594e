//! Scripted transport for unit tests

use super::{HttpRequest, HttpResponse, HttpTransport, Method};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

struct Rule {
    method: Method,
    url_contains: String,
    responses: Vec<HttpResponse>,
}

/// Serves canned responses matched by method and URL substring, recording
/// every request so tests can assert on the exact call sequence.
#[derive(Default)]
pub struct ScriptedTransport {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, url_contains: &str, response: HttpResponse) {
        self.respond_seq(method, url_contains, vec![response]);
    }

    /// Register responses consumed in order; the last one repeats.
    pub fn respond_seq(&self, method: Method, url_contains: &str, responses: Vec<HttpResponse>) {
        self.rules.lock().unwrap().push(Rule {
            method,
            url_contains: url_contains.to_string(),
            responses,
        });
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|request| request.url)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(request.clone());

        let mut rules = self.rules.lock().unwrap();
        for rule in rules.iter_mut() {
            if rule.method == request.method && request.url.contains(&rule.url_contains) {
                let response = if rule.responses.len() > 1 {
                    rule.responses.remove(0)
                } else {
                    rule.responses[0].clone()
                };
                return Ok(response);
            }
        }

        anyhow::bail!("no scripted response for {:?} {}", request.method, request.url)
    }
}

pub fn response(status: u16) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: Vec::new(),
    }
}

pub fn response_with_header(status: u16, name: &str, value: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![(name.to_string(), value.to_string())],
        body: Vec::new(),
    }
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: body.as_bytes().to_vec(),
    }
}

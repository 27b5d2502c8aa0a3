//! Test doubles: a recording mock provider and an HTTP stub server

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::TranslationRequest;
use crate::providers::{demo_placeholders, TranslationProvider};

/// One request seen by the stub server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_lowercase()).cloned()
    }
}

type Responder = dyn Fn(&RecordedRequest, &str) -> (StatusCode, Value) + Send + Sync;

#[derive(Clone)]
struct StubState {
    base_url: String,
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Local HTTP server answering every path with a scripted JSON response
pub struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        Self::start_with_base(move |req, _| responder(req)).await
    }

    /// Like `start`, but the responder also receives the server's base URL
    pub async fn start_with_base<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest, &str) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = StubState {
            base_url: base_url.clone(),
            responder: Arc::new(responder),
            requests: requests.clone(),
        };
        let app = Router::new().fallback(record).with_state(state);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            requests,
            handle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record(
    State(state): State<StubState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = RecordedRequest {
        path: uri.path().to_string(),
        query: uri.query().map(|q| q.to_string()),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    let (status, value) = (state.responder)(&request, &state.base_url);
    state.requests.lock().unwrap().push(request);
    (status, Json(value))
}

/// In-process provider translating `text` to `"{lang}:{text}"` and recording every call
#[derive(Debug)]
pub struct MockProvider {
    batch_size: usize,
    configured: bool,
    delay: Duration,
    failing_langs: HashSet<String>,
    misconfigured_langs: HashSet<String>,
    drop_last: bool,
    calls: Mutex<Vec<(Instant, TranslationRequest)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProvider {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            configured: true,
            delay: Duration::ZERO,
            failing_langs: HashSet::new(),
            misconfigured_langs: HashSet::new(),
            drop_last: false,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Behave like a provider without credentials
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Hold every call open for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every batch for `lang` with an HTTP 500
    pub fn failing(mut self, lang: &str) -> Self {
        self.failing_langs.insert(lang.to_string());
        self
    }

    /// Fail every batch for `lang` as if endpoint discovery broke
    pub fn misconfigured(mut self, lang: &str) -> Self {
        self.misconfigured_langs.insert(lang.to_string());
        self
    }

    /// Return one translation fewer than requested
    pub fn dropping_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.calls.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn requests_for(&self, lang: &str) -> Vec<TranslationRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.target_lang == lang)
            .collect()
    }

    pub fn call_times_for(&self, lang: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, r)| r.target_lang == lang)
            .map(|(at, _)| *at)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn try_translate_batch(&self, request: &TranslationRequest) -> Result<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));

        if !self.configured {
            return Ok(demo_placeholders(&request.texts, &request.target_lang));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.misconfigured_langs.contains(&request.target_lang) {
            return Err(TranslationError::configuration("No inference endpoint received"));
        }
        if self.failing_langs.contains(&request.target_lang) {
            return Err(TranslationError::BatchTranslationError {
                status: 500,
                message: "provider unavailable".to_string(),
            });
        }

        let mut out: Vec<String> = request
            .texts
            .iter()
            .map(|t| format!("{}:{}", request.target_lang, t))
            .collect();
        if self.drop_last {
            out.pop();
        }
        Ok(out)
    }
}

use crate::api::transport::{
    Method, Transport, TransportError, TransportResponse, TransportResult,
};
use crate::core::library::{LibraryDraft, LibraryPatch, LibraryResource};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::{oneshot, Notify};

pub const TEST_BASE_URL: &str = "http://backend.test";

pub fn sample_resource(id: i64, name: &str) -> LibraryResource {
    LibraryResource::from_draft(
        id,
        &LibraryDraft::content(name, format!("{name} reference notes")),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

/// Replays queued results in order and records every request.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<TransportResult>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: TransportResult) -> &Self {
        self.responses.lock().unwrap().push_back(result);
        self
    }

    pub fn push_ok(&self, json: Value) -> &Self {
        self.push(Ok(TransportResponse { status: 200, json }))
    }

    pub fn push_status(&self, status: u16, body: &str) -> &Self {
        self.push(Err(TransportError::Status {
            status,
            body: body.to_string(),
        }))
    }

    pub fn push_no_response(&self) -> &Self {
        self.push(Err(TransportError::NoResponse(
            "connection refused".to_string(),
        )))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> TransportResult {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::NoResponse("no scripted response".into())))
    }
}

#[derive(Default)]
struct FakeState {
    rows: BTreeMap<i64, LibraryResource>,
    next_id: i64,
    injected: VecDeque<TransportError>,
    calls: Vec<RecordedCall>,
}

/// In-memory stand-in for the backend's library table and chat endpoints.
///
/// Chat endpoints echo `"<endpoint>: <prompt>"` so tests can see where a
/// submission was routed.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().next_id = 1;
        backend
    }

    pub fn seed(&self, draft: LibraryDraft) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.rows.insert(id, LibraryResource::from_draft(id, &draft));
        id
    }

    /// Removes a row behind the client's back.
    pub fn delete_row(&self, id: i64) {
        self.state.lock().unwrap().rows.remove(&id);
    }

    /// The next request fails with `err` instead of being served.
    pub fn fail_next(&self, err: TransportError) {
        self.state.lock().unwrap().injected.push_back(err);
    }

    pub fn rows(&self) -> Vec<LibraryResource> {
        self.state.lock().unwrap().rows.values().cloned().collect()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn not_found() -> TransportError {
        TransportError::Status {
            status: 404,
            body: r#"{"detail":"Library not found"}"#.to_string(),
        }
    }

    fn ok(status: u16, json: Value) -> TransportResult {
        Ok(TransportResponse { status, json })
    }

    fn serve(state: &mut FakeState, method: Method, path: &str, body: Option<&Value>) -> TransportResult {
        let collection = path.strip_prefix("db/libraries/");
        match (method, collection) {
            (Method::Get, Some("")) => {
                let rows: Vec<&LibraryResource> = state.rows.values().collect();
                Self::ok(200, json!(rows))
            }
            (Method::Post, Some("")) => {
                let mut fields = body.cloned().unwrap_or_else(|| json!({}));
                if let Some(obj) = fields.as_object_mut() {
                    obj.insert("id".into(), json!(state.next_id));
                }
                let created: LibraryResource =
                    serde_json::from_value(fields).map_err(|err| TransportError::Status {
                        status: 422,
                        body: err.to_string(),
                    })?;
                state.next_id += 1;
                state.rows.insert(created.id, created.clone());
                Self::ok(200, json!(created))
            }
            (_, Some(id)) => {
                let id: i64 = id.parse().map_err(|_| Self::not_found())?;
                match method {
                    Method::Get => state
                        .rows
                        .get(&id)
                        .map(|row| Self::ok(200, json!(row)))
                        .unwrap_or_else(|| Err(Self::not_found())),
                    Method::Put => {
                        let patch: LibraryPatch = body
                            .map(|b| LibraryPatch {
                                name: b.get("name").and_then(Value::as_str).map(str::to_owned),
                                description: b
                                    .get("description")
                                    .and_then(Value::as_str)
                                    .map(str::to_owned),
                                source_mode: b.get("isContent").and_then(Value::as_bool).map(Into::into),
                                content: b.get("content").and_then(Value::as_str).map(str::to_owned),
                                url: b.get("url").and_then(Value::as_str).map(str::to_owned),
                            })
                            .unwrap_or_default();
                        let row = state.rows.get_mut(&id).ok_or_else(Self::not_found)?;
                        row.apply_patch(&patch);
                        Self::ok(200, json!(row))
                    }
                    Method::Delete => {
                        if state.rows.remove(&id).is_some() {
                            Self::ok(204, Value::Null)
                        } else {
                            Err(Self::not_found())
                        }
                    }
                    Method::Post => Err(TransportError::Status {
                        status: 405,
                        body: String::new(),
                    }),
                }
            }
            (Method::Post, None) if path.starts_with("api/chat") => {
                let prompt = body
                    .and_then(|b| b.get("prompt"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Self::ok(200, json!({"response": format!("{path}: {prompt}")}))
            }
            _ => Err(TransportError::Status {
                status: 404,
                body: r#"{"detail":"Not Found"}"#.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> TransportResult {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });
        if let Some(err) = state.injected.pop_front() {
            return Err(err);
        }
        let path = url
            .strip_prefix(TEST_BASE_URL)
            .unwrap_or(url)
            .trim_start_matches('/');
        Self::serve(&mut state, method, path, body)
    }
}

/// Wraps a [`FakeBackend`] and holds every reply until the test releases it.
///
/// The backend serves each request as it arrives; only delivery is delayed,
/// so tests choose the order in which responses land.
pub struct GatedTransport {
    backend: FakeBackend,
    pending: Mutex<Vec<(RecordedCall, oneshot::Sender<()>)>>,
    arrived: Notify,
}

impl GatedTransport {
    pub fn new(backend: FakeBackend) -> Self {
        Self {
            backend,
            pending: Mutex::new(Vec::new()),
            arrived: Notify::new(),
        }
    }

    pub fn backend(&self) -> &FakeBackend {
        &self.backend
    }

    /// Requests waiting for release, in arrival order.
    pub fn pending_calls(&self) -> Vec<RecordedCall> {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    pub async fn wait_for_pending(&self, count: usize) {
        while self.pending.lock().unwrap().len() < count {
            self.arrived.notified().await;
        }
    }

    /// Delivers the reply of the `index`-th waiting request.
    pub fn release_nth(&self, index: usize) {
        let (_, release) = self.pending.lock().unwrap().remove(index);
        let _ = release.send(());
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> TransportResult {
        let result = self.backend.send(method, url, body).await;
        let (release, released) = oneshot::channel();
        self.pending.lock().unwrap().push((
            RecordedCall {
                method,
                url: url.to_string(),
                body: body.cloned(),
            },
            release,
        ));
        self.arrived.notify_one();
        let _ = released.await;
        result
    }
}

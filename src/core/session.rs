//! Session-local settings and the pieces a chat surface talks to.
//!
//! Everything here lives only as long as the process. The backend URL, model
//! and strategy can change mid-session; none of it is written back to the
//! config file.

use crate::api::transport::Transport;
use crate::api::ChatReply;
use crate::core::constants::{DEFAULT_BACKEND_URL, DEFAULT_MODEL, RECOMMENDED_MODELS};
use crate::core::dispatcher::{RequestDispatcher, SubmissionRequest};
use crate::core::error::ClientError;
use crate::core::library_store::LibraryStore;
use crate::core::version::VersionToken;
use crate::utils::logging::TranscriptLog;
use crate::utils::url::validate_base_url;
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub backend_url: String,
    pub model: String,
    pub version: VersionToken,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            version: VersionToken::default(),
        }
    }
}

/// Tag handed out per submission. Submissions are not serialized, so a
/// caller that wants "latest wins" compares its ticket with
/// [`ChatSession::is_latest`] before showing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubmissionTicket(u64);

impl SubmissionTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Exchange {
    pub at: DateTime<Local>,
    pub request: SubmissionRequest,
    pub outcome: Result<ChatReply, ClientError>,
}

pub struct ChatSession {
    transport: Arc<dyn Transport>,
    settings: SessionSettings,
    store: LibraryStore,
    dispatcher: RequestDispatcher,
    latest_submission: AtomicU64,
    history: Vec<Exchange>,
    model_choices: Vec<String>,
    pub logging: TranscriptLog,
}

impl ChatSession {
    pub fn new(
        transport: Arc<dyn Transport>,
        settings: SessionSettings,
        logging: TranscriptLog,
    ) -> Self {
        let store = LibraryStore::new(transport.clone(), &settings.backend_url);
        let dispatcher = RequestDispatcher::new(transport.clone(), &settings.backend_url);
        Self {
            transport,
            settings,
            store,
            dispatcher,
            latest_submission: AtomicU64::new(0),
            history: Vec::new(),
            model_choices: RECOMMENDED_MODELS.iter().map(|m| m.to_string()).collect(),
            logging,
        }
    }

    /// Replaces the built-in recommendations, e.g. with the config's
    /// `model_choices()` so configured extras count as known.
    pub fn with_model_choices<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_choices = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn model_choices(&self) -> &[String] {
        &self.model_choices
    }

    pub fn is_known_model(&self, model: &str) -> bool {
        self.model_choices.iter().any(|m| m == model)
    }

    pub fn backend_url(&self) -> &str {
        &self.settings.backend_url
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn version(&self) -> VersionToken {
        self.settings.version
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    /// Returns whether the model is one of the session's known models. Any
    /// non-empty name is accepted.
    pub fn set_model(&mut self, model: &str) -> Result<bool, String> {
        let model = model.trim();
        if model.is_empty() {
            return Err("Model name must not be empty".to_string());
        }
        self.settings.model = model.to_string();
        let known = self.is_known_model(model);
        if !known {
            warn!(model, "Model is not on the known model list");
        }
        Ok(known)
    }

    pub fn set_version(&mut self, version: VersionToken) {
        self.settings.version = version;
    }

    /// Points the session at another backend. Its libraries are a different
    /// set, so the store starts over with an empty snapshot and selection.
    pub fn set_backend_url(&mut self, url: &str) -> Result<(), String> {
        let backend_url = validate_base_url(url)?;
        info!(backend_url = %backend_url, "Switching backend");
        self.store = LibraryStore::new(self.transport.clone(), &backend_url);
        self.dispatcher = RequestDispatcher::new(self.transport.clone(), &backend_url);
        self.settings.backend_url = backend_url;
        Ok(())
    }

    /// Snapshot of prompt, model, selection and strategy at this instant.
    pub fn build_submission(&self, prompt: &str) -> SubmissionRequest {
        SubmissionRequest {
            prompt: prompt.to_string(),
            model: self.settings.model.clone(),
            selected_library_ids: self.store.selected_ids(),
            version: self.settings.version,
        }
    }

    pub fn begin_submission(&self) -> SubmissionTicket {
        SubmissionTicket(self.latest_submission.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: SubmissionTicket) -> bool {
        self.latest_submission.load(Ordering::SeqCst) == ticket.0
    }

    /// Dispatches `request` under a fresh ticket.
    pub async fn submit(
        &self,
        request: &SubmissionRequest,
    ) -> (SubmissionTicket, Result<ChatReply, ClientError>) {
        let ticket = self.begin_submission();
        let outcome = self.dispatcher.submit_detailed(request).await;
        (ticket, outcome)
    }

    /// Keeps a finished exchange for `/dump` and writes it to the transcript
    /// when logging is on.
    pub fn record_exchange(&mut self, request: SubmissionRequest, outcome: Result<ChatReply, ClientError>) {
        let answer = match &outcome {
            Ok(reply) => reply.response.clone(),
            Err(err) => format!("[error] {err}"),
        };
        if let Err(err) = self
            .logging
            .log_exchange(request.version, &request.prompt, &answer)
        {
            warn!(error = %err, "Could not write transcript");
        }
        self.history.push(Exchange {
            at: Local::now(),
            request,
            outcome,
        });
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }
}

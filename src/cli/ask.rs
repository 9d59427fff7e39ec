//! Interface-less "ask" command

use std::error::Error;
use std::sync::Arc;

use tracing::warn;

use crate::api::transport::Transport;
use crate::core::session::{ChatSession, SessionSettings};
use crate::utils::logging::TranscriptLog;

pub async fn run_ask(
    transport: Arc<dyn Transport>,
    settings: SessionSettings,
    models: Vec<String>,
    log_file: Option<String>,
    prompt: Vec<String>,
    libraries: Vec<i64>,
    show_analysis: bool,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err("Usage: local-reason ask <prompt>".into());
    }

    let mut session = ChatSession::new(transport, settings, TranscriptLog::new(log_file)?)
        .with_model_choices(models);
    if !session.is_known_model(session.model()) {
        warn!(model = session.model(), "Model is not on the known model list");
    }

    if !libraries.is_empty() {
        if !session.version().supports_grounding() {
            eprintln!(
                "⚠️  The {} strategy ignores libraries; --library has no effect.",
                session.version().label()
            );
        } else {
            session.store().refresh().await?;
            let dropped = session.store().set_selected(libraries);
            if !dropped.is_empty() {
                warn!(?dropped, "Ignoring unknown library ids");
                eprintln!("⚠️  Unknown library ids ignored: {dropped:?}");
            }
        }
    }

    let request = session.build_submission(&prompt);
    let (_, outcome) = session.submit(&request).await;
    session.record_exchange(request, outcome.clone());

    let reply = outcome?;
    if show_analysis {
        if let Some(analysis) = reply.analysis.as_deref() {
            println!("🔎 Analysis:\n{analysis}\n");
        }
    }
    println!("{}", reply.response);
    Ok(())
}

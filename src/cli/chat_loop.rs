//! Line-based interactive chat.

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::api::transport::Transport;
use crate::commands::{process_input, CommandResult};
use crate::core::session::{ChatSession, SessionSettings};
use crate::utils::logging::TranscriptLog;

pub async fn run_chat(
    transport: Arc<dyn Transport>,
    settings: SessionSettings,
    models: Vec<String>,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let logging = TranscriptLog::new(log_file)?;
    let mut session = ChatSession::new(transport, settings, logging).with_model_choices(models);

    eprintln!("🚀 Starting local-reason");
    eprintln!("📡 Backend: {}", session.backend_url());
    eprintln!("🤖 Model: {}", session.model());
    eprintln!("🧭 Strategy: {}", session.version().label());
    eprintln!("📝 Log: {}", session.logging.get_status_string());
    eprintln!("💡 Type /help for commands, /quit to leave");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match session.store().refresh().await {
        Ok(()) => eprintln!("📚 {} libraries loaded", session.store().len()),
        Err(e) => eprintln!("⚠️  Could not load libraries: {e}"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&session)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        if !handle_line(&mut session, &line).await {
            break;
        }
    }
    debug!(exchanges = session.history().len(), "Chat ended");
    Ok(())
}

fn print_prompt(session: &ChatSession) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    let selected = session.store().selected_ids().len();
    if session.version().supports_grounding() && selected > 0 {
        write!(stdout, "{} [{selected}]> ", session.version())?;
    } else {
        write!(stdout, "{}> ", session.version())?;
    }
    stdout.flush()
}

/// Runs one line of input. Returns `false` when the user asked to quit.
pub async fn handle_line(session: &mut ChatSession, line: &str) -> bool {
    match process_input(session, line) {
        CommandResult::Continue => {}
        CommandResult::Status(text) => println!("{text}"),
        CommandResult::ProcessAsMessage(prompt) => send_prompt(session, &prompt).await,
        CommandResult::Refresh => match session.store().refresh().await {
            Ok(()) => println!(
                "📚 {} libraries loaded, {} selected",
                session.store().len(),
                session.store().selected_ids().len()
            ),
            Err(e) => println!("❌ Refresh failed: {e}"),
        },
        CommandResult::Remove(ids) => {
            for (id, result) in session.store().remove_many(&ids).await {
                match result {
                    Ok(()) => println!("🗑️  Removed library {id}"),
                    Err(e) => println!("❌ Could not remove library {id}: {e}"),
                }
            }
        }
        CommandResult::Quit => return false,
    }
    true
}

async fn send_prompt(session: &mut ChatSession, prompt: &str) {
    let request = session.build_submission(prompt);
    let (ticket, outcome) = session.submit(&request).await;

    if session.is_latest(ticket) {
        match &outcome {
            Ok(reply) => println!("{}\n", reply.response),
            Err(e) => println!("❌ {e}\n"),
        }
    } else {
        debug!(ticket = ticket.id(), "Dropping superseded reply");
    }
    session.record_exchange(request, outcome);
}

mod registry;

pub use registry::{all_commands, find_command, CommandInvocation};

use crate::core::library::LibraryResource;
use crate::core::session::ChatSession;
use crate::core::version::VersionToken;
use chrono::Local;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// What the chat loop should do after a line of input.
///
/// Handlers run synchronously against the session; anything that needs the
/// network comes back as a variant for the loop to await.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Status(String),
    ProcessAsMessage(String),
    Refresh,
    Remove(Vec<i64>),
    Quit,
}

pub fn process_input(session: &mut ChatSession, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = find_command(command_name) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        (command.handler)(session, invocation)
    } else {
        CommandResult::Status(format!(
            "Unknown command: /{command_name} (try /help)"
        ))
    }
}

/// Accepts ids separated by spaces and/or commas.
pub fn parse_ids(args: &str) -> Result<Vec<i64>, String> {
    args.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| format!("Not a library id: {part}"))
        })
        .collect()
}

pub fn format_library_line(resource: &LibraryResource, selected: bool) -> String {
    let marker = if selected { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{marker} {:>4}  {} ({})",
        resource.id, resource.name, resource.source_mode
    );
    if let Some(description) = resource.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(" - ");
        line.push_str(description);
    }
    line
}

pub(super) fn handle_help(_session: &mut ChatSession, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut help = String::from("Commands:\n");
    for command in all_commands() {
        help.push_str(&format!("  {:<38} {}\n", command.usage, command.help));
    }
    help.push_str("Anything else is sent as a prompt.");
    CommandResult::Status(help)
}

pub(super) fn handle_libraries(session: &mut ChatSession, _invocation: CommandInvocation<'_>) -> CommandResult {
    let resources = session.store().list();
    if resources.is_empty() {
        return CommandResult::Status("No libraries loaded. Try /refresh.".to_string());
    }
    let lines: Vec<String> = resources
        .iter()
        .map(|resource| format_library_line(resource, session.store().is_selected(resource.id)))
        .collect();
    CommandResult::Status(lines.join("\n"))
}

pub(super) fn handle_refresh(_session: &mut ChatSession, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Refresh
}

pub(super) fn handle_select(session: &mut ChatSession, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        return CommandResult::Status(selection_status(session));
    }
    let ids = match parse_ids(invocation.args) {
        Ok(ids) => ids,
        Err(e) => return CommandResult::Status(e),
    };
    let dropped = session.store().set_selected(ids);
    let mut status = selection_status(session);
    if !dropped.is_empty() {
        status.push_str(&format!(" (ignored unknown: {})", join_ids(&dropped)));
    }
    CommandResult::Status(status)
}

pub(super) fn handle_toggle(session: &mut ChatSession, invocation: CommandInvocation<'_>) -> CommandResult {
    let id = match parse_ids(invocation.args).as_deref() {
        Ok([id]) => *id,
        _ => return CommandResult::Status("Usage: /toggle <id>".to_string()),
    };
    match session.store().toggle_selected(id) {
        Some(true) => CommandResult::Status(format!("Selected library {id}")),
        Some(false) => CommandResult::Status(format!("Deselected library {id}")),
        None => CommandResult::Status(format!("Library {id} not found")),
    }
}

pub(super) fn handle_clear(session: &mut ChatSession, _invocation: CommandInvocation<'_>) -> CommandResult {
    session.store().clear_selection();
    CommandResult::Status("Selection cleared".to_string())
}

pub(super) fn handle_remove(_session: &mut ChatSession, invocation: CommandInvocation<'_>) -> CommandResult {
    match parse_ids(invocation.args) {
        Ok(ids) if !ids.is_empty() => CommandResult::Remove(ids),
        Ok(_) => CommandResult::Status("Usage: /remove <ids>".to_string()),
        Err(e) => CommandResult::Status(e),
    }
}

pub(super) fn handle_strategy(session: &mut ChatSession, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        let current = session.version();
        let lines: Vec<String> = VersionToken::ALL
            .iter()
            .map(|token| {
                let marker = if *token == current { "*" } else { " " };
                format!("{marker} {:<9} {}", token.as_str(), token.description())
            })
            .collect();
        return CommandResult::Status(lines.join("\n"));
    }
    match invocation.args.parse::<VersionToken>() {
        Ok(token) => {
            session.set_version(token);
            CommandResult::Status(format!("Strategy set: {}", token.label()))
        }
        Err(e) => CommandResult::Status(e.to_string()),
    }
}

pub(super) fn handle_model(session: &mut ChatSession, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        let current = session.model().to_string();
        let mut lines: Vec<String> = session
            .model_choices()
            .iter()
            .map(|model| {
                let marker = if *model == current { "*" } else { " " };
                format!("{marker} {model}")
            })
            .collect();
        if !session.is_known_model(&current) {
            lines.push(format!("* {current} (custom)"));
        }
        return CommandResult::Status(lines.join("\n"));
    }
    match session.set_model(invocation.args) {
        Ok(true) => CommandResult::Status(format!("Model set: {}", session.model())),
        Ok(false) => CommandResult::Status(format!(
            "Model set: {} (not a known model)",
            session.model()
        )),
        Err(e) => CommandResult::Status(e),
    }
}

pub(super) fn handle_backend(session: &mut ChatSession, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        return CommandResult::Status(format!("Backend: {}", session.backend_url()));
    }
    match session.set_backend_url(invocation.args) {
        Ok(()) => CommandResult::Refresh,
        Err(e) => CommandResult::Status(format!("Backend error: {e}")),
    }
}

pub(super) fn handle_log(session: &mut ChatSession, invocation: CommandInvocation<'_>) -> CommandResult {
    let parts: Vec<&str> = invocation.input.split_whitespace().collect();

    match parts.len() {
        1 => match session.logging.toggle_logging("Logging paused") {
            Ok(message) => CommandResult::Status(message),
            Err(e) => CommandResult::Status(format!("Log error: {e}")),
        },
        2 => match session.logging.set_log_file(parts[1].to_string()) {
            Ok(message) => CommandResult::Status(message),
            Err(e) => CommandResult::Status(format!("Logfile error: {e}")),
        },
        _ => CommandResult::Status("Usage: /log [filename]".to_string()),
    }
}

pub(super) fn handle_dump(session: &mut ChatSession, invocation: CommandInvocation<'_>) -> CommandResult {
    let parts: Vec<&str> = invocation.input.split_whitespace().collect();

    let filename = match parts.len() {
        1 => format!(
            "local-reason-log-{}.txt",
            Local::now().format("%Y-%m-%d-%H%M%S")
        ),
        2 => parts[1].to_string(),
        _ => return CommandResult::Status("Usage: /dump [filename]".to_string()),
    };
    match dump_history(session, Path::new(&filename)) {
        Ok(()) => CommandResult::Status(format!("Dumped: {filename}")),
        Err(e) => CommandResult::Status(format!("Dump error: {e}")),
    }
}

pub(super) fn handle_quit(_session: &mut ChatSession, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}

/// Writes every exchange to `path`; an existing file is never overwritten.
pub fn dump_history(session: &ChatSession, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if session.history().is_empty() {
        return Err("No conversation to dump - the chat history is empty.".into());
    }

    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    let temp_file = match parent {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new_in(".")?,
    };
    let mut writer = BufWriter::new(temp_file);

    for exchange in session.history() {
        let request = &exchange.request;
        writeln!(
            writer,
            "[{}] You ({}, {}): {}",
            exchange.at.format("%Y-%m-%d %H:%M:%S"),
            request.version.label(),
            request.model,
            request.prompt
        )?;
        if request.version.supports_grounding() {
            writeln!(writer, "Libraries: {}", join_ids(&request.selected_library_ids))?;
        }
        match &exchange.outcome {
            Ok(reply) => {
                if let Some(analysis) = reply.analysis.as_deref() {
                    writeln!(writer, "Analysis: {analysis}")?;
                }
                writeln!(writer, "{}", reply.response)?;
            }
            Err(err) => writeln!(writer, "Error: {err}")?,
        }
        writeln!(writer)?;
    }

    let mut temp_file = writer.into_inner().map_err(|err| err.into_error())?;
    temp_file.flush()?;
    temp_file.as_file_mut().sync_all()?;
    temp_file
        .persist_noclobber(path)
        .map_err(|err| -> Box<dyn std::error::Error> {
            if err.error.kind() == std::io::ErrorKind::AlreadyExists {
                format!(
                    "File '{}' already exists. Please specify a different filename with /dump <filename>.",
                    path.display()
                )
                .into()
            } else {
                Box::new(err)
            }
        })?;
    Ok(())
}

fn selection_status(session: &ChatSession) -> String {
    let ids = session.store().selected_ids();
    if ids.is_empty() {
        "No libraries selected".to_string()
    } else {
        format!("Selected: {}", join_ids(&ids))
    }
}

fn join_ids(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

use super::CommandResult;
use crate::core::session::ChatSession;

pub type CommandHandler = fn(&mut ChatSession, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
        .or_else(|| match name.to_ascii_lowercase().as_str() {
            "exit" => find_command("quit"),
            "libs" => find_command("libraries"),
            _ => None,
        })
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "libraries",
        usage: "/libraries",
        help: "List known libraries; selected ones are marked.",
        handler: super::handle_libraries,
    },
    Command {
        name: "refresh",
        usage: "/refresh",
        help: "Reload libraries from the backend.",
        handler: super::handle_refresh,
    },
    Command {
        name: "select",
        usage: "/select [ids]",
        help: "Replace the selection, or show it when no ids are given.",
        handler: super::handle_select,
    },
    Command {
        name: "toggle",
        usage: "/toggle <id>",
        help: "Add or drop one library from the selection.",
        handler: super::handle_toggle,
    },
    Command {
        name: "clear",
        usage: "/clear",
        help: "Deselect every library.",
        handler: super::handle_clear,
    },
    Command {
        name: "remove",
        usage: "/remove <ids>",
        help: "Delete libraries on the backend.",
        handler: super::handle_remove,
    },
    Command {
        name: "strategy",
        usage: "/strategy [plain|pipeline|rag|rag-2]",
        help: "Switch the answering strategy, or list them.",
        handler: super::handle_strategy,
    },
    Command {
        name: "model",
        usage: "/model [name]",
        help: "Switch models, or list the known ones.",
        handler: super::handle_model,
    },
    Command {
        name: "backend",
        usage: "/backend [url]",
        help: "Point the session at another backend.",
        handler: super::handle_backend,
    },
    Command {
        name: "log",
        usage: "/log [file]",
        help: "Toggle transcript logging or set the log file.",
        handler: super::handle_log,
    },
    Command {
        name: "dump",
        usage: "/dump [file]",
        help: "Write this session's exchanges to a file.",
        handler: super::handle_dump,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];

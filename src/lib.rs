//! local-reason is a terminal client for a local retrieval-augmented chat
//! backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the transport seam, its reqwest implementation, and the
//!   chat payloads exchanged with the backend.
//! - [`core`] owns the library snapshot and selection, strategy routing,
//!   prompt dispatch, session settings and configuration.
//! - [`commands`] implements slash-command parsing and execution for the chat
//!   loop.
//! - [`cli`] parses arguments and runs the interactive chat or one-shot
//!   commands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod utils;

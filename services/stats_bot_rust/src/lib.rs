//! Signal chat bot answering NBA stat questions.
//!
//! - `commands`: message text -> `Command`
//! - `dispatcher`: `Command` -> reply text, through a `StatsProvider`
//! - `signal_client`: signal-cli-rest-api receive/send
//! - `config`: environment configuration

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod signal_client;

pub use commands::{parse_command, Command, UsageError};
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use signal_client::{chunk_reply, IncomingMessage, ReplyTarget, SignalClient};

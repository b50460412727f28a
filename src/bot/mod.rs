//! Chat-facing side of the bot: command handling and the Discord adapter.

mod console;
mod discord;
mod handler;
pub mod messages;

pub use console::ConsoleResponder;
pub use discord::{build_command, parse_invocation, Bot, InteractionResponder};
pub use handler::{CommandHandler, Invocation, ReplyError, Responder};

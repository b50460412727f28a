//! Terminal responder for the `generate` subcommand.

use async_trait::async_trait;

use super::handler::{ReplyError, Responder};

/// Prints the acknowledgment and follow-up to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleResponder;

#[async_trait]
impl Responder for ConsoleResponder {
    async fn acknowledge(&self, content: &str) -> Result<(), ReplyError> {
        println!("{}", content);
        Ok(())
    }

    async fn follow_up(&self, content: &str) -> Result<(), ReplyError> {
        println!("{}", content);
        Ok(())
    }
}

//! Interactive code entry on the terminal.

use async_trait::async_trait;
use osnap_core::{CodeInput, InputError};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reads the one-time code from stdin. The whole flow suspends here until
/// the operator responds; that is the point.
#[derive(Default)]
pub struct StdinCodeInput;

impl StdinCodeInput {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CodeInput for StdinCodeInput {
    async fn prompt(&mut self, message: &str) -> Result<String, InputError> {
        print!("{message}");
        std::io::stdout()
            .flush()
            .map_err(|e| InputError(e.to_string()))?;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| InputError(e.to_string()))?;
        Ok(line.trim().to_string())
    }
}

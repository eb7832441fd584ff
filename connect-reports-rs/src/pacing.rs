//! Pacing between rendered diagnostic logs
//!
//! The diagnostics pipeline calls its `Pacer` once before each log so an
//! operator can read one callstack at a time. Automated runs swap in
//! `NoPacer` or `DelayPacer`.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::PacingMode;
use crate::error::{Result, ServiceError};
use crate::ui::green;

/// Called by the diagnostics pipeline between log renders
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Block until the next log may be rendered
    async fn pause(&self, prompt: &str) -> Result<()>;
}

/// Prints the prompt and waits for Enter on stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPacer;

#[async_trait]
impl Pacer for StdinPacer {
    async fn pause(&self, prompt: &str) -> Result<()> {
        println!("{}", green(prompt));

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| ServiceError::internal(format!("Failed to read from stdin: {}", e)))?;
        Ok(())
    }
}

/// Continues immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self, _prompt: &str) -> Result<()> {
        Ok(())
    }
}

/// Sleeps for a fixed delay
#[derive(Debug, Clone, Copy)]
pub struct DelayPacer(pub Duration);

#[async_trait]
impl Pacer for DelayPacer {
    async fn pause(&self, _prompt: &str) -> Result<()> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

/// Pacer for a configured mode
pub fn pacer_for(mode: &PacingMode) -> Box<dyn Pacer> {
    match mode {
        PacingMode::Interactive => Box::new(StdinPacer),
        PacingMode::None => Box::new(NoPacer),
        PacingMode::Delay(delay) => Box::new(DelayPacer(*delay)),
    }
}

#[async_trait]
impl<P: Pacer + ?Sized> Pacer for Box<P> {
    async fn pause(&self, prompt: &str) -> Result<()> {
        (**self).pause(prompt).await
    }
}

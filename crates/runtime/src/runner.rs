//! Fixed-period tick loop binding a [`Bot`] to a [`Transport`].
use std::future::Future;
use std::time::Instant;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::api::{Result, RuntimeError};
use crate::bot::Bot;
use crate::transport::Transport;

/// Owns a bot and its transport for the lifetime of a session.
///
/// Every loop period all buffered events are drained into the bot; once per
/// action period the bot steps. Commands are flushed after each tick. Errors
/// are counted, and once more than `max_errors` pile up the runner logs out
/// and gives up.
pub struct Runner<T: Transport> {
    bot: Bot,
    transport: T,
    errors: u32,
    last_action: Option<Instant>,
}

impl<T: Transport> Runner<T> {
    pub fn new(bot: Bot, transport: T) -> Self {
        Self {
            bot,
            transport,
            errors: 0,
            last_action: None,
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn bot_mut(&mut self) -> &mut Bot {
        &mut self.bot
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn into_bot(self) -> Bot {
        self.bot
    }

    /// Drains pending events, steps the bot when an action tick is due and
    /// flushes its commands.
    pub async fn tick(&mut self, now: Instant) -> Result<()> {
        while let Some(event) = self.transport.try_next_event()? {
            self.bot.handle_event(event);
        }

        let due = self
            .last_action
            .is_none_or(|last| now.duration_since(last) >= self.bot.config().action_period);
        if due {
            self.last_action = Some(now);
            self.bot.step(now);
        }

        self.flush().await
    }

    async fn flush(&mut self) -> Result<()> {
        for command in self.bot.drain_commands() {
            self.transport.send(command).await?;
        }
        Ok(())
    }

    /// Logs out and pushes the final commands, ignoring a dead transport.
    async fn shutdown(&mut self) {
        if !self.bot.is_logging_out() {
            self.bot.logout();
        }
        if let Err(e) = self.flush().await {
            debug!("could not deliver logout: {}", e);
        }
    }

    /// Runs until `shutdown` resolves, the bot logs out, or too many errors
    /// occur. Returns the bot so callers can inspect or reuse it.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<Bot>
    where
        F: Future<Output = ()>,
    {
        let max_errors = self.bot.config().max_errors;
        let mut interval = time::interval(self.bot.config().loop_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("{} running", self.bot.name());
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    self.shutdown().await;
                    break;
                }

                _ = interval.tick() => {
                    if let Err(e) = self.tick(Instant::now()).await {
                        self.errors += 1;
                        if self.errors > max_errors {
                            error!("{}: giving up after {} errors", e, self.errors);
                            self.shutdown().await;
                            return Err(RuntimeError::TooManyErrors {
                                count: self.errors,
                                max: max_errors,
                            });
                        }
                        warn!("{} (error {} of {})", e, self.errors, max_errors);
                    }
                    if self.bot.is_logging_out() && self.bot.pending_commands().is_empty() {
                        info!("{} logged out", self.bot.name());
                        break;
                    }
                }
            }
        }
        Ok(self.bot)
    }

    /// Runs until the bot logs out or fails.
    pub async fn run(self) -> Result<Bot> {
        self.run_until(std::future::pending()).await
    }
}

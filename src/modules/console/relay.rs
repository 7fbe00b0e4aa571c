use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use std::{fmt, sync::Arc};
use thiserror::Error;
use tokio::{
    sync::{oneshot, Mutex},
    time::timeout,
};
use tracing::{debug, info, warn};

use super::channel::{ConsoleChannel, ConsoleMessage};
use crate::config::RelayOptions;

/// Substrings (lowercase) that mark a console line as a whitelist response.
const RESPONSE_MARKERS: [&str; 2] = ["whitelist", "that player does not exist"];

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),
    #[error("exchange has no console commands")]
    Empty,
}

/// Correlation token for one in-flight exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(u64);

impl ExchangeId {
    fn random() -> Self {
        Self(fastrand::u64(..))
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug)]
struct Pending {
    /// Id of the first command message this exchange sent.
    after: u64,
    reply: oneshot::Sender<String>,
}

/// Sends commands to the console channel and collects the console's answer.
#[derive(Debug)]
pub struct ConsoleRelay {
    channel: Arc<dyn ConsoleChannel>,
    options: RelayOptions,
    pending: DashMap<ExchangeId, Pending>,
    gate: Mutex<()>,
}

impl ConsoleRelay {
    pub fn new(channel: Arc<dyn ConsoleChannel>, options: RelayOptions) -> Self {
        Self {
            channel,
            options,
            pending: DashMap::new(),
            gate: Mutex::new(()),
        }
    }

    pub fn channel_id(&self) -> u64 {
        self.channel.id()
    }

    /// Sends `commands` in order and returns the first matching console line
    /// posted after the first of them, or `None` if nothing matched within the
    /// response window and the history scan.
    pub async fn exchange(&self, commands: &[String]) -> Result<Option<String>, RelayError> {
        let Some((first, rest)) = commands.split_first() else {
            return Err(RelayError::Empty);
        };

        // One exchange per console at a time, otherwise answers can cross.
        let _turn = self.gate.lock().await;
        let id = ExchangeId::random();

        debug!("exchange {}: sending `{}`", id, first);
        let after = self.channel.send(first).await?;

        // Registered before the rest is sent, so an answer to the first
        // command that lands in between is still picked up by `observe`.
        let (reply, answer) = oneshot::channel();
        self.pending.insert(id, Pending { after, reply });

        for command in rest {
            debug!("exchange {}: sending `{}`", id, command);
            if let Err(e) = self.channel.send(command).await {
                self.pending.remove(&id);
                return Err(e);
            }
        }

        let line = match timeout(self.options.window, answer).await {
            Ok(Ok(line)) => {
                debug!("exchange {}: answered by gateway event", id);
                Some(line)
            }
            _ => {
                self.pending.remove(&id);
                debug!("exchange {}: no event within window, scanning history", id);
                self.scan(after).await?
            }
        };

        match &line {
            Some(line) => info!("exchange {}: console replied `{}`", id, line),
            None => warn!("exchange {}: no console response found", id),
        }
        Ok(line)
    }

    /// Feeds a freshly posted console channel message to the waiting exchange.
    /// Returns true if it answered one.
    ///
    /// Live messages answer in arrival order, so the first matching reply
    /// wins and the exchange returns at once. `scan` reads history newest
    /// first instead; it only runs once the window is over, when the latest
    /// console output is the most relevant.
    pub fn observe(&self, message: &ConsoleMessage) -> bool {
        if message.from_self {
            return false;
        }
        let Some(line) = matching_line(&message.content) else {
            return false;
        };

        let waiting = self
            .pending
            .iter()
            .find(|entry| entry.after < message.id)
            .map(|entry| *entry.key());

        match waiting.and_then(|id| self.pending.remove(&id)) {
            Some((id, pending)) => {
                if pending.reply.send(line.to_string()).is_err() {
                    debug!("exchange {}: answer arrived after the window closed", id);
                    return false;
                }
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_waiting(&self) -> bool {
        !self.pending.is_empty()
    }

    async fn scan(&self, after: u64) -> Result<Option<String>, RelayError> {
        let history = self.channel.recent(self.options.history_limit).await?;
        Ok(history
            .iter()
            .filter(|message| !message.from_self && message.id > after)
            .find_map(|message| matching_line(&message.content))
            .map(str::to_string))
    }
}

/// First line of `content` that looks like a whitelist response.
pub fn matching_line(content: &str) -> Option<&str> {
    content.lines().find(|line| {
        let line = line.to_lowercase();
        RESPONSE_MARKERS.iter().any(|marker| line.contains(marker))
    })
}

use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude::{Context, FullEvent, UserId};
use tracing::trace;

use super::{ConsoleMessage, ConsoleRelay};
use crate::events::EventHandler;

/// Forwards new console channel messages to the relay so waiting exchanges
/// are answered as soon as the console speaks.
#[derive(Debug, Clone)]
pub struct ConsoleWatcher {
    relay: Arc<ConsoleRelay>,
    bot_id: UserId,
}

impl ConsoleWatcher {
    pub fn new(relay: Arc<ConsoleRelay>, bot_id: UserId) -> Self {
        Self { relay, bot_id }
    }

    /// Passes `message` on if it was posted in the console channel.
    /// Returns true if it answered a pending exchange.
    pub fn forward(&self, channel_id: u64, message: &ConsoleMessage) -> bool {
        channel_id == self.relay.channel_id() && self.relay.observe(message)
    }
}

#[async_trait]
impl EventHandler for ConsoleWatcher {
    fn name(&self) -> &str {
        "ConsoleWatcher"
    }

    async fn handle(
        &self,
        _ctx: &Context,
        event: &FullEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let FullEvent::Message { new_message } = event else {
            return Ok(());
        };
        let message = ConsoleMessage::from_discord(new_message, self.bot_id);
        if self.forward(new_message.channel_id.get(), &message) {
            trace!("console message {} answered a pending exchange", message.id);
        }
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn EventHandler> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::console::relay::tests::{relay, FakeConsole};

    #[tokio::test(start_paused = true)]
    async fn only_console_channel_messages_answer() {
        let console = Arc::new(FakeConsole::silent());
        let relay = Arc::new(relay(&console));
        let watcher = ConsoleWatcher::new(relay.clone(), UserId::new(1));

        let waiter = tokio::spawn({
            let relay = relay.clone();
            async move { relay.exchange(&["whitelist list".to_string()]).await }
        });
        while !relay.is_waiting() {
            tokio::task::yield_now().await;
        }

        let elsewhere = console.post("Added Alex to the whitelist");
        assert!(!watcher.forward(relay.channel_id() + 1, &elsewhere));
        assert!(relay.is_waiting());

        let answer = console.post("There are 0 whitelisted player(s):");
        assert!(watcher.forward(relay.channel_id(), &answer));
        assert!(!relay.is_waiting());

        let line = waiter.await.unwrap().unwrap();
        assert_eq!(line.as_deref(), Some("There are 0 whitelisted player(s):"));
    }
}

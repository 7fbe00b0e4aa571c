pub mod channel;
pub mod handler;
pub mod relay;

pub use channel::{ConsoleMessage, DiscordConsole};
pub use relay::{ConsoleRelay, RelayError};

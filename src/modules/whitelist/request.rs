use serde::Serialize;

use crate::modules::console::{ConsoleRelay, RelayError};

pub const MISSING_USERNAME: &str = "You need to specify the name of the user to add first!";
pub const REMOVE_DISABLED: &str = "Nope, you can't remove people from the whitelist";
pub const UNKNOWN_OPERATION: &str = "Unknown operation";
pub const INVALID_USERNAME: &str = "Usernames can't contain line breaks or control characters.";
pub const LIST_FALLBACK: &str = "Could not read console response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum Operation {
    #[name = "add"]
    Add,
    #[name = "remove"]
    Remove,
    #[name = "list"]
    List,
}

/// A validated whitelist request that will be relayed to the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhitelistRequest {
    Add { username: String },
    List,
}

#[derive(Serialize)]
struct Tellraw<'a> {
    text: &'a str,
    italic: bool,
    color: &'a str,
}

impl WhitelistRequest {
    /// Checks the invocation without touching the console. The error is the
    /// reply to send back as-is.
    pub fn parse(operation: Operation, username: Option<&str>) -> Result<Self, String> {
        match operation {
            Operation::Add => {
                let username = username.map(str::trim).unwrap_or_default();
                if username.is_empty() {
                    return Err(MISSING_USERNAME.to_string());
                }
                // Each command is one chat message, so a line break would smuggle in a second one.
                if username.chars().any(char::is_control) {
                    return Err(INVALID_USERNAME.to_string());
                }
                Ok(Self::Add {
                    username: username.to_string(),
                })
            }
            Operation::Remove => Err(REMOVE_DISABLED.to_string()),
            Operation::List => Ok(Self::List),
        }
    }

    /// Console lines to send, in order.
    pub fn commands(&self) -> Vec<String> {
        match self {
            Self::Add { username } => {
                let announcement = format!("Server: Added {} to the whitelist", username);
                let payload = Tellraw {
                    text: &announcement,
                    italic: true,
                    color: "gray",
                };
                // Serializing a struct of strings and bools cannot fail.
                let json = serde_json::to_string(&payload).unwrap_or_default();
                vec![
                    format!("whitelist add {}", username),
                    format!("tellraw @a {}", json),
                ]
            }
            Self::List => vec!["whitelist list".to_string()],
        }
    }

    /// Reply used when the console answer could not be found.
    pub fn fallback(&self) -> String {
        match self {
            Self::Add { username } => format!(
                "Added {} to the whitelist (could not read console response).",
                username
            ),
            Self::List => LIST_FALLBACK.to_string(),
        }
    }

    /// Runs the request against the console and picks the reply for the user.
    pub async fn run(&self, relay: &ConsoleRelay) -> Result<String, RelayError> {
        let line = relay.exchange(&self.commands()).await?;
        Ok(line.unwrap_or_else(|| self.fallback()))
    }
}

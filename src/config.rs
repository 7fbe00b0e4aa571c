use poise::serenity_prelude::{ApplicationId, ChannelId, GuildId};
use std::{str::FromStr, time::Duration};
use thiserror::Error;

const DEFAULT_WINDOW_SECS: u64 = 2;
const DEFAULT_HISTORY_LIMIT: u8 = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// How long a console exchange waits and how much history it scans afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOptions {
    pub window: Duration,
    pub history_limit: u8,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub application_id: ApplicationId,
    pub console_channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub relay: RelayOptions,
}

// Keep the token out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("application_id", &self.application_id)
            .field("console_channel_id", &self.console_channel_id)
            .field("guild_id", &self.guild_id)
            .field("relay", &self.relay)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let discord_token = required("DISCORD_TOKEN")?;
        let application_id = parse::<u64>("APPLICATION_ID", required("APPLICATION_ID")?)?;
        let console_channel_id = parse::<u64>(
            "DISCORDSRV_CONSOLE_CHANNEL_ID",
            required("DISCORDSRV_CONSOLE_CHANNEL_ID")?,
        )?;
        let guild_id = lookup("GUILD_ID")
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse::<u64>("GUILD_ID", value))
            .transpose()?;

        let window = lookup("CONSOLE_RESPONSE_WINDOW_SECS")
            .map(|value| parse::<u64>("CONSOLE_RESPONSE_WINDOW_SECS", value))
            .transpose()?
            .unwrap_or(DEFAULT_WINDOW_SECS);

        // Discord returns at most 100 messages per history request.
        let history_limit = match lookup("CONSOLE_HISTORY_LIMIT") {
            Some(value) => match parse::<u8>("CONSOLE_HISTORY_LIMIT", value.clone())? {
                limit @ 1..=100 => limit,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "CONSOLE_HISTORY_LIMIT",
                        value,
                    })
                }
            },
            None => DEFAULT_HISTORY_LIMIT,
        };

        Ok(Self {
            discord_token,
            application_id: ApplicationId::new(nonzero("APPLICATION_ID", application_id)?),
            console_channel_id: ChannelId::new(nonzero(
                "DISCORDSRV_CONSOLE_CHANNEL_ID",
                console_channel_id,
            )?),
            guild_id: guild_id
                .map(|id| nonzero("GUILD_ID", id).map(GuildId::new))
                .transpose()?,
            relay: RelayOptions {
                window: Duration::from_secs(window),
                history_limit,
            },
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

// Snowflake ids are never zero and serenity panics on a zero id.
fn nonzero(key: &'static str, id: u64) -> Result<u64, ConfigError> {
    if id == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: id.to_string(),
        });
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("DISCORD_TOKEN", "token"),
        ("APPLICATION_ID", "1234"),
        ("DISCORDSRV_CONSOLE_CHANNEL_ID", "5678"),
    ];

    #[test]
    fn loads_required_values_with_defaults() {
        let config = Config::from_lookup(env(&BASE)).unwrap();
        assert_eq!(config.discord_token, "token");
        assert_eq!(config.application_id, ApplicationId::new(1234));
        assert_eq!(config.console_channel_id, ChannelId::new(5678));
        assert_eq!(config.guild_id, None);
        assert_eq!(config.relay, RelayOptions::default());
        assert_eq!(config.relay.window, Duration::from_secs(2));
        assert_eq!(config.relay.history_limit, 3);
    }

    #[test]
    fn reports_first_missing_key() {
        let err = Config::from_lookup(env(&BASE[..1])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("APPLICATION_ID"));

        let err = Config::from_lookup(env(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_TOKEN"));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let mut pairs = BASE.to_vec();
        pairs[0] = ("DISCORD_TOKEN", "  ");
        let err = Config::from_lookup(env(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_TOKEN"));
    }

    #[test]
    fn reads_optional_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.push(("GUILD_ID", "42"));
        pairs.push(("CONSOLE_RESPONSE_WINDOW_SECS", "5"));
        pairs.push(("CONSOLE_HISTORY_LIMIT", "10"));
        let config = Config::from_lookup(env(&pairs)).unwrap();
        assert_eq!(config.guild_id, Some(GuildId::new(42)));
        assert_eq!(config.relay.window, Duration::from_secs(5));
        assert_eq!(config.relay.history_limit, 10);
    }

    #[test]
    fn rejects_unparsable_and_out_of_range_values() {
        let mut pairs = BASE.to_vec();
        pairs[2] = ("DISCORDSRV_CONSOLE_CHANNEL_ID", "console");
        assert!(matches!(
            Config::from_lookup(env(&pairs)),
            Err(ConfigError::Invalid { key: "DISCORDSRV_CONSOLE_CHANNEL_ID", .. })
        ));

        let mut pairs = BASE.to_vec();
        pairs.push(("CONSOLE_HISTORY_LIMIT", "0"));
        assert!(matches!(
            Config::from_lookup(env(&pairs)),
            Err(ConfigError::Invalid { key: "CONSOLE_HISTORY_LIMIT", .. })
        ));

        let mut pairs = BASE.to_vec();
        pairs[1] = ("APPLICATION_ID", "0");
        assert!(matches!(
            Config::from_lookup(env(&pairs)),
            Err(ConfigError::Invalid { key: "APPLICATION_ID", .. })
        ));
    }

    #[test]
    fn debug_output_hides_token() {
        let config = Config::from_lookup(env(&BASE)).unwrap();
        assert!(!format!("{config:?}").contains("token\""));
    }
}

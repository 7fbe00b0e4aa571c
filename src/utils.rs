use poise::serenity_prelude::GuildId;

/// Where a command was used, for log lines.
pub fn location(guild_id: Option<GuildId>) -> String {
    guild_id.map_or_else(|| "DM".to_string(), |id| id.to_string())
}

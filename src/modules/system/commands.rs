use crate::{Context, Error};

/// Register or unregister the bot's slash commands
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx).await?;
    Ok(())
}

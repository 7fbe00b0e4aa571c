use poise::command;
use tracing::info;

use super::request::{Operation, WhitelistRequest};
use crate::{Context, Error};

/// MC Server -- whitelist add/remove <username>
#[command(slash_command, guild_only)]
pub async fn whitelist(
    ctx: Context<'_>,
    #[description = "Which action to perform"] operation: Operation,
    #[description = "The Minecraft username to add/remove from the whitelist (case-insensitive)"]
    username: Option<String>,
) -> Result<(), Error> {
    let request = match WhitelistRequest::parse(operation, username.as_deref()) {
        Ok(request) => request,
        Err(reply) => {
            ctx.say(reply).await?;
            return Ok(());
        }
    };

    // The console can take a while, so keep the interaction alive first.
    ctx.defer().await?;

    info!(
        "{} requested {:?} via console channel {}",
        ctx.author().tag(),
        request,
        ctx.data().config.console_channel_id
    );
    let reply = request.run(&ctx.data().relay).await?;
    ctx.say(reply).await?;
    Ok(())
}

use poise::{command, CreateReply};

use crate::{Context, Error};

pub const MAP_MESSAGE: &str =
    "The server map is available at [nottmap.geog.uk](https://nottmap.geog.uk).";
pub const IP_MESSAGE: &str = "The server IP is `nott.geog.uk`.\nIf this doesn't work, the secondary IP is `oci.ibaguette.com`.";
pub const MODS_MESSAGE: &str = "A zipfile of the recommended mods for performance is available at [this link](https://cdn.ibaguette.com/1.21.4-mods.zip).";

/// View the server map
#[command(slash_command, guild_only)]
pub async fn map(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(MAP_MESSAGE).await?;
    Ok(())
}

/// Get the server IP
#[command(slash_command, guild_only)]
pub async fn ip(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(IP_MESSAGE).await?;
    Ok(())
}

/// View recommended mods
#[command(slash_command, guild_only)]
pub async fn mods(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(CreateReply::default().content(MODS_MESSAGE).ephemeral(true))
        .await?;
    Ok(())
}

use config::Config;
use events::EventManager;
use modules::{
    console::{handler::ConsoleWatcher, ConsoleRelay, DiscordConsole},
    info::{ip, map, mods},
    system::{events::ReadyHandler, register},
    whitelist::{request::UNKNOWN_OPERATION, whitelist},
};
use poise::serenity_prelude::{self as serenity, CreateAllowedMentions};
use std::sync::Arc;
use tracing::{error, info, trace, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod events;
mod modules;
mod utils;

const COMMAND_FAILED: &str = "Something went wrong while talking to the server console.";

#[derive(Clone, Debug)]
pub struct Data {
    pub config: Arc<Config>,
    pub relay: Arc<ConsoleRelay>,
    pub event_manager: Arc<EventManager>,
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                "Command {} failed for {} in {}: {:?}",
                ctx.command().qualified_name,
                ctx.author().tag(),
                utils::location(ctx.guild_id()),
                error
            );
            if let Err(e) = ctx.say(COMMAND_FAILED).await {
                warn!("Could not report failure to {}: {}", ctx.author().tag(), e);
            }
        }
        // Choice parameters are validated by Discord, so this only fires on
        // stale command registrations.
        poise::FrameworkError::ArgumentParse {
            error, input, ctx, ..
        } => {
            warn!(
                "Command {} got unparsable input {:?}: {}",
                ctx.command().qualified_name,
                input,
                error
            );
            if let Err(e) = ctx.say(UNKNOWN_OPERATION).await {
                warn!("Could not report failure to {}: {}", ctx.author().tag(), e);
            }
        }
        err => {
            if let Err(e) = poise::builtins::on_error(err).await {
                error!("Error while handling framework error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!("starting consolebot");

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    info!("loaded {:?}", config);

    // Console output is read from message content, which is privileged.
    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let setup_config = config.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions::<Data, Error> {
            allowed_mentions: Some(CreateAllowedMentions::new().empty_roles().empty_users()),
            commands: vec![register(), whitelist(), map(), ip(), mods()],
            pre_command: |ctx| {
                Box::pin(async move {
                    trace!(
                        "Command {} used by {} in {}",
                        ctx.command().qualified_name,
                        ctx.author().tag(),
                        utils::location(ctx.guild_id())
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command {} completed for {} in {}",
                        ctx.command().qualified_name,
                        ctx.author().tag(),
                        utils::location(ctx.guild_id())
                    );
                })
            },
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    data.event_manager.handle_event(ctx, event).await;
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                let config = setup_config;
                let commands = &framework.options().commands;
                match config.guild_id {
                    Some(guild_id) => {
                        info!("registering commands in guild {}", guild_id);
                        poise::builtins::register_in_guild(ctx, commands, guild_id).await?;
                    }
                    None => {
                        info!("registering commands globally");
                        poise::builtins::register_globally(ctx, commands).await?;
                    }
                }

                let console = DiscordConsole::new(
                    ctx.http.clone(),
                    config.console_channel_id,
                    ready.user.id,
                );
                let relay = Arc::new(ConsoleRelay::new(Arc::new(console), config.relay));

                let event_manager = Arc::new(EventManager::new());
                event_manager.add_handler(ReadyHandler).await;
                event_manager
                    .add_handler(ConsoleWatcher::new(relay.clone(), ready.user.id))
                    .await;

                Ok(Data {
                    config,
                    relay,
                    event_manager,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .application_id(config.application_id)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("could not listen for Ctrl-C: {}", e);
            return;
        }
        info!("shutting down");
        shard_manager.shutdown_all().await;
    });

    client.start().await?;
    Ok(())
}

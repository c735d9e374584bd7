//! Poise framework setup - command registration, error replies and the client loop.

use crate::{
    bot::{BotData, cache::spawn_roster_sync, commands},
    config::settings::Settings,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument, warn};

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            // Domain failures are expected; anything else is worth a louder log
            match &error {
                Error::Validation { .. }
                | Error::DuplicateViolation { .. }
                | Error::StudentNotFound { .. }
                | Error::ClassNotFound { .. }
                | Error::ViolationNotFound { .. }
                | Error::Import { .. } => {
                    warn!("Command `{}` rejected: {error}", ctx.command().name);
                }
                _ => error!("Error in command `{}`: {error:?}", ctx.command().name),
            }
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Every slash command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::mark(),
        commands::late(),
        commands::records(),
        commands::audit(),
        commands::student(),
        commands::dashboard(),
        commands::manage(),
        commands::ping(),
        commands::help(),
    ]
}

/// Connects to Discord and serves commands until the client stops.
///
/// Commands are registered in `settings.bot.dev_guild_id` when set (instant updates
/// while developing) and globally otherwise.
#[instrument(skip_all)]
pub async fn run_bot(
    token: String,
    settings: Settings,
    database: DatabaseConnection,
) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                if let Some(guild_id) = settings.bot.dev_guild_id {
                    let guild_id = serenity::GuildId::new(guild_id);
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        guild_id,
                    )
                    .await?;
                    info!("Registered commands in guild {guild_id}");
                } else {
                    info!("Registering commands globally...");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }

                let data = BotData::new(database, settings);
                data.roster.refresh(&data.database).await?;
                spawn_roster_sync(&data.feed, data.database.clone(), data.roster.clone());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await.inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

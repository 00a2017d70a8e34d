pub mod survey;

use crate::handlers::{HandlerResult, Reply};
use crate::survey::SurveyService;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use log::info;

/// Registers the slash commands on one guild when given (updates show up
/// immediately), globally otherwise.
pub async fn register_commands(ctx: &Context, guild_id: Option<GuildId>) -> Result<(), serenity::Error> {
    match guild_id {
        Some(guild_id) => {
            guild_id
                .set_application_commands(&ctx.http, |commands| {
                    commands.create_application_command(|command| survey::create_survey_command(command))
                })
                .await?;
            info!("Registered commands for guild {}", guild_id);
        }
        None => {
            Command::set_global_application_commands(&ctx.http, |commands| {
                commands.create_application_command(|command| survey::create_survey_command(command))
            })
            .await?;
            info!("Registered global commands");
        }
    }

    Ok(())
}

pub async fn handle_command(
    service: &SurveyService,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
) -> HandlerResult {
    info!("Received command: {}", command.data.name);
    match command.data.name.as_str() {
        "survey" => survey::handle_survey_command(service, ctx, command).await?,
        _ => Reply::Command(command).notice(ctx, "Unknown command").await?,
    }

    Ok(())
}

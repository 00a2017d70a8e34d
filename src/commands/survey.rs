use crate::handlers::{answer, results, HandlerResult, Reply};
use crate::survey::SurveyService;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::*;

pub fn create_survey_command(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("survey")
        .description("Answer the survey and see how you compare")
        .create_option(|option| {
            option
                .name("take")
                .description("Answer the survey questions")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("results")
                .description("See everyone's answers and your majority score")
                .kind(CommandOptionType::SubCommand)
        })
}

pub async fn handle_survey_command(
    service: &SurveyService,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
) -> HandlerResult {
    let reply = Reply::Command(command);

    match command.data.options.first().map(|option| option.name.as_str()) {
        Some("take") => answer::start_form(service, ctx, reply).await?,
        Some("results") => results::show_results(service, ctx, reply).await?,
        Some(_) => reply.notice(ctx, "Unknown subcommand").await?,
        None => reply.notice(ctx, "No subcommand provided").await?,
    }

    Ok(())
}

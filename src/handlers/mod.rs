pub mod answer;
pub mod results;

use crate::survey::SurveyService;
use serenity::builder::CreateInteractionResponseData;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::prelude::*;
use log::{info, warn, error};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// What a message component asks for, decoded from its custom_id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyAction {
    // survey_pick_<page>_<question index>
    Pick { page: usize, question: usize },
    // survey_page_<page>
    Page(usize),
    Submit,
    Results,
}

impl SurveyAction {
    pub fn custom_id(&self) -> String {
        match self {
            SurveyAction::Pick { page, question } => format!("survey_pick_{}_{}", page, question),
            SurveyAction::Page(page) => format!("survey_page_{}", page),
            SurveyAction::Submit => "survey_submit".to_string(),
            SurveyAction::Results => "survey_results".to_string(),
        }
    }

    pub fn parse(custom_id: &str) -> Option<Self> {
        let parts: Vec<&str> = custom_id.split('_').collect();
        match parts.as_slice() {
            ["survey", "pick", page, question] => Some(SurveyAction::Pick {
                page: page.parse().ok()?,
                question: question.parse().ok()?,
            }),
            ["survey", "page", page] => Some(SurveyAction::Page(page.parse().ok()?)),
            ["survey", "submit"] => Some(SurveyAction::Submit),
            ["survey", "results"] => Some(SurveyAction::Results),
            _ => None,
        }
    }
}

/// Either kind of interaction we answer, so replies can be built once.
#[derive(Clone, Copy)]
pub enum Reply<'a> {
    Command(&'a ApplicationCommandInteraction),
    Component(&'a MessageComponentInteraction),
}

impl Reply<'_> {
    pub fn user_id(&self) -> String {
        match self {
            Reply::Command(command) => command.user.id.to_string(),
            Reply::Component(component) => component.user.id.to_string(),
        }
    }

    pub async fn send<F>(&self, ctx: &Context, kind: InteractionResponseType, f: F) -> Result<(), serenity::Error>
    where
        F: for<'b> FnOnce(&'b mut CreateInteractionResponseData<'static>) -> &'b mut CreateInteractionResponseData<'static>,
    {
        match self {
            Reply::Command(command) => {
                command
                    .create_interaction_response(&ctx.http, |response| {
                        response.kind(kind).interaction_response_data(f)
                    })
                    .await
            }
            Reply::Component(component) => {
                component
                    .create_interaction_response(&ctx.http, |response| {
                        response.kind(kind).interaction_response_data(f)
                    })
                    .await
            }
        }
    }

    /// Sends a short private message in a new response.
    pub async fn notice(&self, ctx: &Context, text: &str) -> Result<(), serenity::Error> {
        self.send(ctx, InteractionResponseType::ChannelMessageWithSource, |message| {
            message.content(text).ephemeral(true)
        })
        .await
    }
}

/// Shortens text to at most `max_chars` characters, marking the cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

// Main component handler that routes on the decoded custom_id
pub async fn handle_component(
    service: &SurveyService,
    ctx: &Context,
    component: &MessageComponentInteraction,
) -> HandlerResult {
    let custom_id = &component.data.custom_id;
    info!("Received component interaction: {}", custom_id);

    match SurveyAction::parse(custom_id) {
        Some(SurveyAction::Pick { page, question }) => {
            answer::handle_pick(service, ctx, component, page, question).await?
        }
        Some(SurveyAction::Page(page)) => answer::handle_page(service, ctx, component, page).await?,
        Some(SurveyAction::Submit) => answer::handle_submit(service, ctx, component).await?,
        Some(SurveyAction::Results) => results::show_results(service, ctx, Reply::Component(component)).await?,
        None => {
            warn!("Unhandled component custom_id: {}", custom_id);
            Reply::Component(component).notice(ctx, "Unknown button action.").await?;
        }
    }

    Ok(())
}

pub async fn handle_interaction(service: &SurveyService, ctx: &Context, interaction: Interaction) {
    let result = match interaction {
        Interaction::ApplicationCommand(command) => {
            crate::commands::handle_command(service, ctx, &command).await
        }
        Interaction::MessageComponent(component) => handle_component(service, ctx, &component).await,
        _ => {
            warn!("Unhandled interaction type: {:?}", interaction.kind());
            Ok(())
        }
    };

    if let Err(why) = result {
        error!("Interaction handler error: {:?}", why);
    }
}

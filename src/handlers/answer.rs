use crate::error::SurveyError;
use crate::handlers::{truncate, HandlerResult, Reply, SurveyAction};
use crate::models::{AnswerSet, Question};
use crate::survey::{Progress, SurveyService};
use serenity::builder::CreateInteractionResponseData;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::*;
use log::{info, warn, error};
use std::ops::Range;

pub const QUESTIONS_PER_PAGE: usize = 4;

// Discord limits
const OPTION_LABEL_LIMIT: usize = 100;
const QUESTION_TEXT_LIMIT: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectRow {
    pub custom_id: String,
    pub placeholder: String,
    pub choices: Vec<Choice>,
}

/// Everything one page of the answer form shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub content: String,
    pub rows: Vec<SelectRow>,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub can_submit: bool,
}

pub fn page_count(total_questions: usize) -> usize {
    total_questions.div_ceil(QUESTIONS_PER_PAGE).max(1)
}

pub fn page_range(page: usize, total_questions: usize) -> Range<usize> {
    let start = (page * QUESTIONS_PER_PAGE).min(total_questions);
    let end = (start + QUESTIONS_PER_PAGE).min(total_questions);
    start..end
}

pub fn form_view(questions: &[Question], draft: &AnswerSet, progress: Progress, page: usize) -> FormView {
    let pages = page_count(questions.len());
    let page = page.min(pages - 1);
    let range = page_range(page, questions.len());

    let mut content = format!(
        "**Survey** - page {} of {}\nAnswered {} of {} ({:.0}%)\n",
        page + 1,
        pages,
        progress.answered,
        progress.total,
        progress.percent()
    );

    let mut rows = Vec::new();
    for index in range {
        let question = &questions[index];
        let current = draft.get(&question.id);

        content.push_str(&format!(
            "\n**Q{}.** {}",
            index + 1,
            truncate(&question.text, QUESTION_TEXT_LIMIT)
        ));

        rows.push(SelectRow {
            custom_id: SurveyAction::Pick { page, question: index }.custom_id(),
            placeholder: format!("Q{}. Pick an answer", index + 1),
            choices: question
                .options
                .iter()
                .enumerate()
                .map(|(i, option)| Choice {
                    label: truncate(option, OPTION_LABEL_LIMIT),
                    value: i.to_string(),
                    selected: current == Some(option.as_str()),
                })
                .collect(),
        });
    }

    if !progress.is_complete() {
        content.push_str("\n\nAnswer every question to submit.");
    }

    FormView {
        content,
        rows,
        previous: page.checked_sub(1),
        next: (page + 1 < pages).then_some(page + 1),
        can_submit: progress.is_complete(),
    }
}

fn build_form<'a, 'b>(
    message: &'a mut CreateInteractionResponseData<'b>,
    view: &FormView,
) -> &'a mut CreateInteractionResponseData<'b> {
    message
        .ephemeral(true)
        .content(&view.content)
        .components(|c| {
            for row in &view.rows {
                c.create_action_row(|action_row| {
                    action_row.create_select_menu(|menu| {
                        menu.custom_id(&row.custom_id)
                            .placeholder(&row.placeholder)
                            .options(|opts| {
                                for choice in &row.choices {
                                    opts.create_option(|opt| {
                                        opt.label(&choice.label)
                                            .value(&choice.value)
                                            .default_selection(choice.selected)
                                    });
                                }
                                opts
                            })
                    })
                });
            }
            c.create_action_row(|action_row| {
                if let Some(previous) = view.previous {
                    action_row.create_button(|btn| {
                        btn.custom_id(SurveyAction::Page(previous).custom_id())
                            .label("◀ Previous")
                            .style(ButtonStyle::Secondary)
                    });
                }
                action_row.create_button(|btn| {
                    btn.custom_id(SurveyAction::Submit.custom_id())
                        .label("Submit")
                        .style(ButtonStyle::Success)
                        .disabled(!view.can_submit)
                });
                if let Some(next) = view.next {
                    action_row.create_button(|btn| {
                        btn.custom_id(SurveyAction::Page(next).custom_id())
                            .label("Next ▶")
                            .style(ButtonStyle::Secondary)
                    });
                }
                action_row
            });
            c
        })
}

fn build_done<'a, 'b>(
    message: &'a mut CreateInteractionResponseData<'b>,
    text: &str,
) -> &'a mut CreateInteractionResponseData<'b> {
    message
        .ephemeral(true)
        .content(text)
        .components(|c| {
            c.create_action_row(|action_row| {
                action_row.create_button(|btn| {
                    btn.custom_id(SurveyAction::Results.custom_id())
                        .label("See how everyone answered")
                        .style(ButtonStyle::Primary)
                })
            })
        })
}

async fn render_page(service: &SurveyService, user_id: &str, page: usize) -> FormView {
    let draft = service.drafts().get(user_id).await;
    form_view(service.questions(), &draft, service.progress(&draft), page)
}

/// Entry point for `/survey take`.
pub async fn start_form(service: &SurveyService, ctx: &Context, reply: Reply<'_>) -> HandlerResult {
    let user_id = reply.user_id();

    let submitted = match service.has_submitted(&user_id).await {
        Ok(submitted) => submitted,
        Err(e) => {
            error!("Failed to check submission for {}: {}", user_id, e);
            reply.notice(ctx, "Couldn't reach the survey right now. Please try again.").await?;
            return Ok(());
        }
    };

    if submitted {
        reply
            .send(ctx, InteractionResponseType::ChannelMessageWithSource, |message| {
                build_done(message, "You've already answered this survey.")
            })
            .await?;
        return Ok(());
    }

    let view = render_page(service, &user_id, 0).await;
    reply
        .send(ctx, InteractionResponseType::ChannelMessageWithSource, |message| {
            build_form(message, &view)
        })
        .await?;
    Ok(())
}

pub async fn handle_pick(
    service: &SurveyService,
    ctx: &Context,
    component: &MessageComponentInteraction,
    page: usize,
    question_index: usize,
) -> HandlerResult {
    let user_id = component.user.id.to_string();

    let picked = service.questions().get(question_index).and_then(|question| {
        component
            .data
            .values
            .first()
            .and_then(|value| value.parse::<usize>().ok())
            .and_then(|i| question.options.get(i))
            .map(|option| (question, option))
    });

    let Some((question, option)) = picked else {
        warn!(
            "Invalid selection for question index {} by {}: {:?}",
            question_index, user_id, component.data.values
        );
        Reply::Component(component)
            .notice(ctx, "That answer is no longer available. Please start again with /survey take.")
            .await?;
        return Ok(());
    };

    info!("User {} picked '{}' for {}", user_id, option, question.id);
    service.drafts().choose(&user_id, &question.id, option).await;

    let view = render_page(service, &user_id, page).await;
    Reply::Component(component)
        .send(ctx, InteractionResponseType::UpdateMessage, |message| {
            build_form(message, &view)
        })
        .await?;
    Ok(())
}

pub async fn handle_page(
    service: &SurveyService,
    ctx: &Context,
    component: &MessageComponentInteraction,
    page: usize,
) -> HandlerResult {
    let view = render_page(service, &component.user.id.to_string(), page).await;
    Reply::Component(component)
        .send(ctx, InteractionResponseType::UpdateMessage, |message| {
            build_form(message, &view)
        })
        .await?;
    Ok(())
}

pub async fn handle_submit(
    service: &SurveyService,
    ctx: &Context,
    component: &MessageComponentInteraction,
) -> HandlerResult {
    let user_id = component.user.id.to_string();
    let reply = Reply::Component(component);

    match service.submit_draft(&user_id).await {
        Ok(()) => {
            reply
                .send(ctx, InteractionResponseType::UpdateMessage, |message| {
                    build_done(message, "**Thanks!** Your answers are in.")
                })
                .await?;
        }
        Err(SurveyError::AlreadySubmitted(_)) => {
            service.drafts().discard(&user_id).await;
            reply
                .send(ctx, InteractionResponseType::UpdateMessage, |message| {
                    build_done(message, "You've already answered this survey.")
                })
                .await?;
        }
        Err(SurveyError::Incomplete { answered, total }) => {
            reply
                .notice(ctx, &format!("Please answer every question first ({} of {} done).", answered, total))
                .await?;
        }
        Err(e) if e.is_retryable() => {
            error!("Submission for {} failed: {}", user_id, e);
            reply
                .notice(ctx, "Couldn't save your answers right now. Your choices are kept, please press Submit again.")
                .await?;
        }
        Err(e) => {
            warn!("Submission for {} rejected: {}", user_id, e);
            reply.notice(ctx, &format!("Your answers couldn't be accepted: {}", e)).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question::new(&format!("q{}", i), &format!("Question {}", i), &["Yes", "No"]))
            .collect()
    }

    fn progress(answered: usize, total: usize) -> Progress {
        Progress { answered, total }
    }

    #[test]
    fn test_paging() {
        assert_eq!(page_count(0), 1);
        assert_eq!(page_count(4), 1);
        assert_eq!(page_count(5), 2);
        assert_eq!(page_range(0, 6), 0..4);
        assert_eq!(page_range(1, 6), 4..6);
        assert_eq!(page_range(3, 6), 6..6);
    }

    #[test]
    fn test_first_page_of_many() {
        let questions = questions(6);
        let view = form_view(&questions, &AnswerSet::new(), progress(0, 6), 0);

        assert_eq!(view.rows.len(), 4);
        assert_eq!(view.rows[0].custom_id, "survey_pick_0_0");
        assert_eq!(view.previous, None);
        assert_eq!(view.next, Some(1));
        assert!(!view.can_submit);
        assert!(view.content.contains("page 1 of 2"));
        assert!(view.content.contains("**Q4.** Question 3"));
        assert!(view.content.contains("Answer every question"));
    }

    #[test]
    fn test_last_page_and_out_of_range_page() {
        let questions = questions(6);
        let view = form_view(&questions, &AnswerSet::new(), progress(0, 6), 7);

        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[1].custom_id, "survey_pick_1_5");
        assert_eq!(view.previous, Some(0));
        assert_eq!(view.next, None);
    }

    #[test]
    fn test_draft_choices_are_preselected() {
        let questions = questions(2);
        let draft: AnswerSet = [("q0", "No"), ("q1", "Yes")].into_iter().collect();
        let view = form_view(&questions, &draft, progress(2, 2), 0);

        let selected: Vec<Vec<bool>> = view
            .rows
            .iter()
            .map(|row| row.choices.iter().map(|c| c.selected).collect())
            .collect();
        assert_eq!(selected, vec![vec![false, true], vec![true, false]]);
        assert_eq!(view.rows[0].choices[1].value, "1");
        assert!(view.can_submit);
        assert!(!view.content.contains("Answer every question"));
    }

    #[test]
    fn test_long_option_labels_are_shortened() {
        let long = "x".repeat(150);
        let questions = vec![Question::new("q0", "Long", &[long.as_str()])];
        let view = form_view(&questions, &AnswerSet::new(), progress(0, 1), 0);
        assert_eq!(view.rows[0].choices[0].label.chars().count(), OPTION_LABEL_LIMIT);
    }
}

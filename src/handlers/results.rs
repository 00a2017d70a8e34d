use crate::error::SurveyError;
use crate::handlers::{truncate, HandlerResult, Reply};
use crate::results::distribution::{bucket_index, DistributionPoint};
use crate::results::QuestionBreakdown;
use crate::survey::{SurveyService, UserResults};
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::*;
use log::{info, error};

// Discord embed limits
const FIELD_LIMIT: usize = 25;
const FIELD_NAME_LIMIT: usize = 256;
const FIELD_VALUE_LIMIT: usize = 1024;
const EMBED_TOTAL_LIMIT: usize = 6000;

const BAR_WIDTH: usize = 10;
const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const ACCENT: u32 = 0x22d3ee;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub title: String,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub footer: String,
}

/// One character per real bucket, scaled against the fullest bucket.
pub fn sparkline(distribution: &[DistributionPoint]) -> String {
    // drop the two axis anchors
    let buckets: &[DistributionPoint] = if distribution.len() > 2 {
        &distribution[1..distribution.len() - 1]
    } else {
        &[]
    };
    let max = buckets.iter().map(|p| p.users).max().unwrap_or(0);

    buckets
        .iter()
        .map(|p| {
            if max == 0 || p.users == 0 {
                LEVELS[0]
            } else {
                let level = (p.users * 8).div_ceil(max) as usize;
                LEVELS[level.clamp(1, 8)]
            }
        })
        .collect()
}

fn vote_bar(votes: u64, total: u64) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((votes as f64 / total as f64) * BAR_WIDTH as f64).round() as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)))
}

fn question_field(number: usize, question: &QuestionBreakdown) -> (String, String) {
    let total: u64 = question.options.iter().map(|o| o.votes).sum();
    let lines: Vec<String> = question
        .options
        .iter()
        .map(|o| {
            let marker = if o.chosen { "  ◀ you" } else { "" };
            format!("`{}` {} {}{}", vote_bar(o.votes, total), o.votes, o.option, marker)
        })
        .collect();

    (
        truncate(&format!("Q{}. {}", number, question.text), FIELD_NAME_LIMIT),
        truncate(&lines.join("\n"), FIELD_VALUE_LIMIT),
    )
}

fn distribution_block(results: &UserResults) -> String {
    let summary = &results.summary;
    if summary.total == 0 || !summary.user_score.is_finite() {
        return "_The distribution appears once enough answers are in._".to_string();
    }

    let line = sparkline(&summary.distribution);
    let buckets = line.chars().count();
    let you = bucket_index(summary.user_score, buckets);
    let marker = format!("{}^ you", " ".repeat(you));
    let axis = format!("minor{}major", " ".repeat(buckets.saturating_sub(10)));

    format!("```\n{}\n{}\n{}\n```", line, marker, axis)
}

pub fn render(results: &UserResults) -> ResultsView {
    let summary = &results.summary;
    let title = "Survey results".to_string();
    let footer = format!("{} respondents", summary.total);

    let description = format!(
        "**{}** people have answered.\nYour majority score: **{:.1}** / 100\n{}",
        summary.total,
        summary.user_score,
        distribution_block(results)
    );

    let mut budget = EMBED_TOTAL_LIMIT
        .saturating_sub(title.chars().count() + footer.chars().count() + description.chars().count());
    let mut fields = Vec::new();
    let mut omitted = 0;

    for (i, question) in results.questions.iter().enumerate() {
        let (name, value) = question_field(i + 1, question);
        let size = name.chars().count() + value.chars().count();
        // keep one slot and some room for the overflow note
        if fields.len() + 1 >= FIELD_LIMIT || size + 64 > budget {
            omitted = results.questions.len() - i;
            break;
        }
        budget -= size;
        fields.push((name, value));
    }

    if omitted > 0 {
        fields.push(("…".to_string(), format!("{} more questions not shown", omitted)));
    }

    ResultsView {
        title,
        description,
        fields,
        footer,
    }
}

/// Shared by `/survey results` and the results button.
pub async fn show_results(service: &SurveyService, ctx: &Context, reply: Reply<'_>) -> HandlerResult {
    let user_id = reply.user_id();

    let results = match service.results_for(&user_id).await {
        Ok(results) => results,
        Err(SurveyError::NotFound(_)) => {
            reply
                .notice(ctx, "Answer the survey first with `/survey take`, then come back for the results.")
                .await?;
            return Ok(());
        }
        Err(e) => {
            error!("Failed to compute results for {}: {}", user_id, e);
            reply.notice(ctx, "Couldn't load the results right now. Please try again.").await?;
            return Ok(());
        }
    };

    let view = render(&results);
    info!("Showing results to {} ({} fields)", user_id, view.fields.len());

    reply
        .send(ctx, InteractionResponseType::ChannelMessageWithSource, |message| {
            message.ephemeral(true).embed(|e| {
                e.title(&view.title)
                    .description(&view.description)
                    .colour(ACCENT);
                for (name, value) in &view.fields {
                    e.field(name, value, false);
                }
                e.footer(|f| f.text(&view.footer))
            })
        })
        .await?;
    Ok(())
}

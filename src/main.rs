mod commands;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod questions;
mod results;
mod survey;
mod tasks;

use config::Config;
use db::memory::MemoryStore;
use db::{Database, SubmissionStore};
use error::StoreError;
use survey::SurveyService;
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use log::{info, warn, error};

// DATABASE_URL value that selects the in-memory store
const MEMORY_STORE_URL: &str = "memory";

struct Bot {
    service: Arc<SurveyService>,
    guild_id: Option<GuildId>,
    draft_ttl_minutes: i64,
    sweeper_started: AtomicBool,
}

#[async_trait]
impl EventHandler for Bot {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let service = Arc::clone(&self.service);

        // Spawn a task to handle the interaction concurrently
        tokio::spawn(async move {
            handlers::handle_interaction(&service, &ctx, interaction).await;
        });
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        if let Err(why) = commands::register_commands(&ctx, self.guild_id).await {
            error!("Failed to register slash commands: {:?}", why);
        }

        // ready fires again on reconnect; only one sweeper should run
        if !self.sweeper_started.swap(true, Ordering::SeqCst) {
            let service = Arc::clone(&self.service);
            let ttl = self.draft_ttl_minutes;
            tokio::spawn(async move {
                tasks::draft_sweeper::sweep_stale_drafts_task(service, ttl).await;
            });
        }
    }
}

/// Picks the submission store named by `DATABASE_URL`.
async fn open_store(database_url: &str) -> Result<Arc<dyn SubmissionStore>, StoreError> {
    if database_url == MEMORY_STORE_URL {
        warn!("Using the in-memory store, submissions are lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(Database::new(database_url).await?))
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env()?;

    // The form can't render without questions, so load them before connecting
    let questions = questions::load(&config.questions_path)?;

    let store = open_store(&config.database_url)
        .await
        .map_err(|e| format!("Failed to initialize database: {}", e))?;

    let service = Arc::new(SurveyService::new(questions, store));

    let intents = GatewayIntents::GUILDS;

    let bot = Bot {
        service,
        guild_id: config.guild_id.map(GuildId),
        draft_ttl_minutes: config.draft_ttl_minutes,
        sweeper_started: AtomicBool::new(false),
    };

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(bot)
        .await?;

    client.start().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_is_selected_by_name() {
        let store = open_store(MEMORY_STORE_URL).await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_database_is_an_error() {
        let result = open_store("sqlite:/nonexistent-survey-dir/nested/survey.db").await;
        assert!(result.is_err());
    }
}

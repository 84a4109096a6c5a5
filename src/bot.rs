//! Discord client construction and event dispatch.

use std::error::Error as StdError;

use log::{debug, info};
use poise::{
    Framework, FrameworkOptions,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents},
};
use tokio::sync::Mutex;

use crate::chatbot;
use crate::config::Config;
use crate::error::Result;
use crate::gemini::GeminiClient;
use crate::history::{self, HistoryStore};
use crate::presence;

type EventResult = std::result::Result<(), Box<dyn StdError + Send + Sync>>;

/// Shared state handed to every event invocation by the framework.
pub struct Data {
    gemini: GeminiClient,
    history: Mutex<HistoryStore>,
}

impl Data {
    pub fn gemini(&self) -> &GeminiClient {
        &self.gemini
    }

    pub fn history(&self) -> &Mutex<HistoryStore> {
        &self.history
    }
}

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Initializing Gemini client");
    let gemini = GeminiClient::new(config.gemini_api_key);

    let history_path = history::default_path();
    debug!("Loading chat history from {}", history_path.display());
    let history = Mutex::new(HistoryStore::load(history_path));

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                presence::spawn_rotator(ctx.clone());
                Ok(Data { gemini, history })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> EventResult {
    if let FullEvent::Message { new_message } = event {
        chatbot::handle_message(ctx, new_message, data).await?;
    }
    Ok(())
}

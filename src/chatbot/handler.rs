//! Per-message pipeline: record, persist, reply on mention.

use chrono::Utc;
use log::{error, info};
use poise::serenity_prelude::{Context, Mentionable, Message as SerenityMessage};

use crate::bot::Data;
use crate::error::Result;
use crate::history::MessageRecord;
use crate::prompt::build_prompt;

/// Handle one inbound message.
///
/// Every user message is recorded and persisted, mention or not. A reply
/// is attempted only when the bot is mentioned and the message has
/// non-whitespace content; recording always happens before the reply.
pub async fn handle_message(
    ctx: &Context,
    new_message: &SerenityMessage,
    data: &Data,
) -> Result<()> {
    let (bot_id, bot_name) = {
        let me = ctx.cache.current_user();
        (me.id, me.name.clone())
    };

    // Never record or answer our own messages.
    if new_message.author.id == bot_id {
        return Ok(());
    }

    let user_id = new_message.author.id.to_string();
    let record = MessageRecord {
        message: new_message.content.clone(),
        timestamp: Utc::now().to_rfc3339(),
        user_name: new_message.author.tag(),
        user_id: user_id.clone(),
        bot_id: bot_id.to_string(),
        bot_name,
    };

    let replying =
        new_message.mentions_user_id(bot_id) && !new_message.content.trim().is_empty();

    // One lock scope covers the append, the save, and the history read for
    // the prompt, so the record is on disk before any reply is attempted.
    let history_lines = {
        let mut store = data.history().lock().await;
        store.append(&user_id, record);
        store.save();
        if replying {
            store.messages_for(&user_id)
        } else {
            Vec::new()
        }
    };

    if !replying {
        return Ok(());
    }

    info!(
        "Received mention from {} in channel {}: {}",
        new_message.author.tag(),
        new_message.channel_id,
        new_message.content
    );

    let mention = new_message.author.mention().to_string();
    let prompt = build_prompt(&history_lines, &mention, &new_message.content);

    // A failed send falls through to the apology path along with
    // generation errors; only a failure to send the apology itself
    // escapes to the event handler.
    let sent = match generate_reply(data, prompt).await {
        Ok(reply) => send_reply(ctx, new_message, &mention, &reply).await,
        Err(e) => Err(e),
    };

    match sent {
        Ok(()) => {
            info!(
                "Replied to {} in channel {}",
                new_message.author.tag(),
                new_message.channel_id
            );
        }
        Err(e) => {
            error!(
                "Error processing message from {}: {}",
                new_message.author.tag(),
                e
            );
            new_message
                .channel_id
                .say(&ctx.http, format!("{mention} {}", e.user_message()))
                .await?;
        }
    }

    Ok(())
}

async fn send_reply(
    ctx: &Context,
    new_message: &SerenityMessage,
    mention: &str,
    reply: &str,
) -> Result<()> {
    new_message
        .channel_id
        .say(&ctx.http, format!("{mention} {reply}"))
        .await?;
    Ok(())
}

/// Run the generation call on a worker task so a slow API response does
/// not block event delivery.
async fn generate_reply(data: &Data, prompt: String) -> Result<String> {
    let gemini = data.gemini().clone();
    let reply = tokio::spawn(async move { gemini.ask(&prompt).await }).await?;
    Ok(reply)
}

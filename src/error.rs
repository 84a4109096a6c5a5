use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Gemini API error ({status}): {message}")]
    GeminiApi {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Gemini response error: {0}")]
    GeminiResponse(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Reply task error: {0}")]
    ReplyTask(#[from] tokio::task::JoinError),
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl BotError {
    /// Returns the message sent to the channel when reply handling fails.
    ///
    /// Every failure surfaces to the user as the same localized apology;
    /// the specific cause only reaches the logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        "Bir hata oluştu. Lütfen daha sonra tekrar deneyin."
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    const APOLOGY: &str = "Bir hata oluştu. Lütfen daha sonra tekrar deneyin.";

    #[test]
    fn send_failure_maps_to_apology() {
        let err = BotError::from(poise::serenity_prelude::Error::Other("send failed"));
        assert_eq!(err.user_message(), APOLOGY);
    }

    #[test]
    fn generation_failure_maps_to_apology() {
        let err = BotError::GeminiResponse("no candidates".to_string());
        assert_eq!(err.user_message(), APOLOGY);
    }
}

//! Gemini API client.
//!
//! One attempt per invocation, no retry, no backoff. [`GeminiClient::ask`]
//! absorbs every failure into a fixed default reply so callers never
//! observe generation errors.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Reply used whenever the API fails or returns nothing usable.
pub const DEFAULT_REPLY: &str = "Sorry, I couldn't answer this question.";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Ask the model for a completion of `prompt`.
    ///
    /// Never fails from the caller's point of view: any API error or a
    /// response without extractable text is logged and replaced with
    /// [`DEFAULT_REPLY`].
    pub async fn ask(&self, prompt: &str) -> String {
        match self.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("Gemini API call failed: {}", e);
                DEFAULT_REPLY.to_string()
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Sending request to Gemini API ({} chars)", prompt.len());

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(GEMINI_API_URL)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
            return Err(BotError::GeminiApi { status, message });
        }

        let api_response: GenerateResponse = response.json().await?;

        match extract_text(&api_response) {
            Some(text) => {
                debug!("Received response from Gemini API");
                Ok(text)
            }
            None => {
                info!("Gemini response contained no text: {:?}", api_response);
                Err(BotError::GeminiResponse(
                    "No text in response candidates".to_string(),
                ))
            }
        }
    }
}

/// Pull the reply text out of a generation response, if there is any.
fn extract_text(response: &GenerateResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

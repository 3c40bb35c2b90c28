// Gemini client - asks a text-generation model for two rhyme lists
// Structured output (JSON schema) keeps the answer machine-readable

use super::{is_queryable, RhymeError, RhymeProvider, RhymeSet};
use crate::config::RhymeConfig;
use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const SYSTEM_INSTRUCTION: &str = "You are a songwriting assistant for rap, trap and MPB. \
Be creative with the phonetic rhymes.";

pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    language: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &RhymeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("${} is not set - rhyme suggestions will come back empty", config.api_key_env);
        }

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            language: config.language.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key,
        })
    }

    /// Override the key picked up from the environment.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// JSON body for a `generateContent` call about `word`.
    pub fn request_body(&self, word: &str) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt_for(word, &self.language) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "perfect": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "phonetic": { "type": "ARRAY", "items": { "type": "STRING" } }
                    }
                }
            }
        })
    }

    async fn try_fetch(&self, word: &str) -> Result<RhymeSet, RhymeError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RhymeError::MissingApiKey(self.api_key_env.clone()))?;

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(word))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RhymeError::Status(status));
        }

        let body = response.text().await?;
        parse_response_body(&body)
    }
}

impl RhymeProvider for GeminiClient {
    fn fetch_rhymes<'a>(&'a self, word: &'a str) -> BoxFuture<'a, RhymeSet> {
        async move {
            if !is_queryable(word) {
                return RhymeSet::default();
            }

            match self.try_fetch(word).await {
                Ok(rhymes) => {
                    debug!(
                        "Rhymes for '{}': {} perfect, {} phonetic",
                        word,
                        rhymes.perfect.len(),
                        rhymes.phonetic.len()
                    );
                    rhymes
                }
                Err(e) => {
                    warn!("Error fetching rhymes for '{}': {}", word, e);
                    RhymeSet::default()
                }
            }
        }
        .boxed()
    }
}

/// The user-turn instruction sent with every request.
pub fn prompt_for(word: &str, language: &str) -> String {
    format!(
        "Generate a list of rhymes for the word \"{word}\" in {language}.\n\
         Split them into two categories:\n\
         1. \"perfect\": consonant or rich rhymes (identical ending).\n\
         2. \"phonetic\": assonant or slant rhymes, slang, or words that sound good together \
         in the flow (assonance/alliteration), even if they are spelled differently.\n\
         \n\
         Return a JSON object."
    )
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the model's JSON answer out of a raw `generateContent` response body.
pub fn parse_response_body(body: &str) -> Result<RhymeSet, RhymeError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let text = strip_code_fence(&text);
    if text.is_empty() {
        return Err(RhymeError::EmptyResponse);
    }

    Ok(serde_json::from_str(text)?)
}

// Models occasionally wrap JSON in a markdown fence even in JSON mode
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RhymeConfig {
        RhymeConfig {
            api_key_env: "LYRICPAD_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            api_base: "http://127.0.0.1:9/v1beta/".to_string(),
            model: "test-model".to_string(),
            language: "Portuguese".to_string(),
            timeout_secs: 1,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let client = GeminiClient::new(&test_config()).unwrap();
        let body = client.request_body("amor");

        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("\"amor\""));
        assert!(prompt.contains("Portuguese"));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        let properties = &body["generationConfig"]["responseSchema"]["properties"];
        assert_eq!(properties["perfect"]["type"], "ARRAY");
        assert_eq!(properties["phonetic"]["items"]["type"], "STRING");
        assert!(body["systemInstruction"]["parts"][0]["text"].is_string());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(&test_config()).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/v1beta/models/test-model:generateContent"
        );
    }

    #[test]
    fn test_parse_response_body() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "{\"perfect\": [\"flor\", \"dor\"], \"phonetic\": [\"amo\"]}" }]
                }
            }]
        }"#;
        let rhymes = parse_response_body(body).unwrap();
        assert_eq!(rhymes.perfect, vec!["flor", "dor"]);
        assert_eq!(rhymes.phonetic, vec!["amo"]);
    }

    #[test]
    fn test_parse_response_body_joins_parts_and_strips_fence() {
        let body = r#"{"candidates": [{"content": {"parts": [
            {"text": "```json\n{\"perfect\": [\"sol\"],"},
            {"text": " \"phonetic\": []}\n```"}
        ]}}]}"#;
        let rhymes = parse_response_body(body).unwrap();
        assert_eq!(rhymes.perfect, vec!["sol"]);
        assert!(rhymes.phonetic.is_empty());
    }

    #[test]
    fn test_parse_response_body_failures() {
        assert!(matches!(
            parse_response_body(r#"{"candidates": []}"#),
            Err(RhymeError::EmptyResponse)
        ));
        assert!(matches!(parse_response_body("not json"), Err(RhymeError::Parse(_))));
        assert!(matches!(
            parse_response_body(r#"{"candidates": [{"content": {"parts": [{"text": "rhymes!"}]}}]}"#),
            Err(RhymeError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_yields_empty_set() {
        let client = GeminiClient::new(&test_config()).unwrap();
        assert!(!client.has_api_key());
        assert!(client.fetch_rhymes("amor").await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_yields_empty_set() {
        // nothing listens on the discard port
        let client = GeminiClient::new(&test_config()).unwrap().with_api_key("test");
        assert!(client.fetch_rhymes("amor").await.is_empty());
    }

    #[tokio::test]
    async fn test_short_words_skip_the_request() {
        let client = GeminiClient::new(&test_config()).unwrap().with_api_key("test");
        assert!(client.fetch_rhymes("a").await.is_empty());
    }
}

//! OpenAI chat-completions classifier. Requires an API key (see
//! `config/classifier.json`, `"api_key": "ENV"` reads `OPENAI_API_KEY`).
//!
//! The model is asked for a single JSON object
//! `{"emotion": "<label>", "confidence": <0..1>}`. Anything else is an error.

use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};

use super::{validate_text, ClassificationResult, EmotionClassifier};
use crate::emotion::Emotion;
use crate::error::ClassifyError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = "You classify diary entries into exactly one emotion: \
joy, sadness, anger, fear, surprise, disgust or neutral. \
Reply with a JSON object {\"emotion\": <label>, \"confidence\": <number between 0 and 1>} and nothing else.";

pub struct OpenAiClassifier {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClassifier {
    /// `model_override`: defaults to gpt-4o-mini.
    pub fn new(api_key: String, model_override: Option<&str>) -> anyhow::Result<Self> {
        if api_key.trim().is_empty() {
            bail!("openai classifier requires an API key");
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("diary-mood-status/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            api_key,
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point at another endpoint (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch(&self, text: &str) -> anyhow::Result<ClassificationResult> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            kind: &'static str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
            response_format: ResponseFormat,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
            max_tokens: 40,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai request")?
            .error_for_status()
            .context("openai non-2xx")?;

        let body: Resp = resp.json().await.context("openai response body")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| anyhow!("openai response has no choices"))?;
        parse_label(content)
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for OpenAiClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        let text = validate_text(text)?;
        Ok(self.fetch(text).await?)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Parse the model's JSON answer. Confidence outside `[0, 1]` is rejected
/// rather than clamped; it means the model ignored the instructions.
pub fn parse_label(content: &str) -> anyhow::Result<ClassificationResult> {
    #[derive(Deserialize)]
    struct Label {
        emotion: String,
        confidence: f64,
    }
    let l: Label = serde_json::from_str(content.trim())
        .with_context(|| format!("unexpected classifier output: {content:?}"))?;
    let emotion: Emotion = l.emotion.parse()?;
    if !(0.0..=1.0).contains(&l.confidence) {
        bail!("confidence out of range: {}", l.confidence);
    }
    Ok(ClassificationResult::new(emotion, l.confidence))
}

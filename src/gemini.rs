use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::Config;
use crate::content::GroundingSource;
use crate::http_client::http_client_with_timeout;

pub const MISSING_KEY_MESSAGE: &str =
    "Gemini API Key is not configured. Please ensure the API_KEY environment variable is set.";
pub const API_FAILURE_MESSAGE: &str =
    "An unexpected error occurred with the Gemini API. Please try again later.";
pub const EMPTY_RESPONSE_FALLBACK: &str = "No information could be generated at this time.";
const DEFAULT_SOURCE_TITLE: &str = "Match Source";
const JSON_MIME: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    pub response_mime_type: Option<String>,
    pub response_schema: Option<Value>,
    pub google_search: bool,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_mime_type: Some(JSON_MIME.to_string()),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_search(mut self) -> Self {
        self.google_search = true;
        self
    }

    fn body(&self) -> Value {
        let mut generation = serde_json::Map::new();
        if let Some(mime) = &self.response_mime_type {
            generation.insert("responseMimeType".to_string(), json!(mime));
        }
        if let Some(schema) = &self.response_schema {
            generation.insert("responseSchema".to_string(), schema.clone());
        }
        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": self.prompt }] }],
        });
        if !generation.is_empty() {
            body["generationConfig"] = Value::Object(generation);
        }
        if self.google_search {
            body["tools"] = json!([{ "googleSearch": {} }]);
        }
        body
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Generated {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// Anything that can turn a request into generated text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, req: &GenerateRequest) -> Result<Generated>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    cfg: Config,
}

impl GeminiClient {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.cfg.base_url, self.cfg.model
        )
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, req: &GenerateRequest) -> Result<Generated> {
        let Some(api_key) = self.cfg.api_key.as_deref() else {
            return Err(anyhow!(MISSING_KEY_MESSAGE));
        };
        let client = http_client_with_timeout(self.cfg.request_timeout)?;
        debug!(
            model = %self.cfg.model,
            json = req.response_mime_type.is_some(),
            search = req.google_search,
            "gemini request"
        );
        let resp = client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&req.body())
            .send()
            .context("gemini request failed")
            .context(API_FAILURE_MESSAGE)?;
        let status = resp.status();
        let body = resp
            .text()
            .context("failed reading gemini body")
            .context(API_FAILURE_MESSAGE)?;
        if !status.is_success() {
            let snippet = body
                .trim()
                .replace(['\n', '\r'], " ")
                .chars()
                .take(220)
                .collect::<String>();
            warn!(%status, "gemini http error");
            return Err(anyhow!("gemini http {status}: {snippet}").context(API_FAILURE_MESSAGE));
        }
        parse_generate_response(&body).context(API_FAILURE_MESSAGE)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

/// Decodes a `generateContent` response body. Blank text becomes
/// [`EMPTY_RESPONSE_FALLBACK`]; sources are unique by URI, first title kept.
pub fn parse_generate_response(body: &str) -> Result<Generated> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).context("invalid gemini response json")?;
    let Some(first) = parsed.candidates.into_iter().next() else {
        return Ok(Generated {
            text: EMPTY_RESPONSE_FALLBACK.to_string(),
            sources: Vec::new(),
        });
    };

    let text: String = first
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = if text.trim().is_empty() {
        EMPTY_RESPONSE_FALLBACK.to_string()
    } else {
        text
    };

    let mut sources: Vec<GroundingSource> = Vec::new();
    let chunks = first
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default();
    for web in chunks.into_iter().filter_map(|c| c.web) {
        let Some(uri) = web.uri.filter(|u| !u.trim().is_empty()) else {
            continue;
        };
        if sources.iter().any(|s| s.uri == uri) {
            continue;
        }
        let title = web
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE_TITLE.to_string());
        sources.push(GroundingSource { title, uri });
    }

    Ok(Generated { text, sources })
}

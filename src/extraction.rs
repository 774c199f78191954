//! Extraction collaborator boundary.
//!
//! The language model that turns free text into entity mentions is an
//! external collaborator behind the [`EntityExtractor`] trait: text plus
//! roster hints in, `ExtractionResult` out. Prompt construction and
//! response parsing live here as pure functions; `ChatExtractor` is the
//! production implementation over an OpenAI-compatible chat-completions
//! endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ExtractedEntity;

// ============================================================================
// Hint and result types
// ============================================================================

/// Roster hint: an existing person the extractor can match partial
/// names against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownPerson {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Roster hint: an existing organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownOrganization {
    pub name: String,
}

/// What the collaborator returns for one piece of text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(default)]
    pub entities: Vec<ExtractedEntity>,
    #[serde(default)]
    pub summary: String,
}

/// Errors from the extraction collaborator.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Extraction service returned status {0}")]
    Status(u16),

    #[error("Empty response from extraction service")]
    EmptyResponse,

    #[error("Failed to parse extraction response: {0}")]
    Parse(String),
}

impl ExtractionError {
    /// True when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractionError::Network(_) => true,
            ExtractionError::Status(code) => *code == 429 || *code >= 500,
            ExtractionError::EmptyResponse | ExtractionError::Parse(_) => false,
        }
    }
}

/// The extraction collaborator seam.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        known_people: &[KnownPerson],
        known_orgs: &[KnownOrganization],
    ) -> Result<ExtractionResult, ExtractionError>;
}

// ============================================================================
// Prompt construction
// ============================================================================

const EXTRACTION_PROMPT: &str = r#"You are an entity extraction system for a professional relationship manager.

Analyze the following notes or conversation transcript and extract:
1. People - names of individuals mentioned (including partial names and nicknames)
2. Organizations - companies, institutions, or groups mentioned
3. Topics - key discussion topics or themes

For each entity provide:
- type: "person", "organization", or "topic"
- name: the name as mentioned (preserve the original form)
- context: a brief phrase explaining the role or relevance in this text
- confidence: 0.0-1.0 score that this is a real, specific entity
- alternativeNames: for partial person names, possible full-name expansions
- title: for people, the role or job title if one is mentioned
- organization: for people, the organization they are mentioned in association with

Also produce a one- or two-sentence summary of the interaction.

Rules:
- Partial names (e.g. just "John") get lower confidence (0.5-0.7) and suggested expansions
- Full names or clearly identified entities get higher confidence (0.8-1.0)
- Ignore generic words that are not specific entities

Respond ONLY with valid JSON in this shape:
{
  "entities": [
    {
      "type": "person",
      "name": "John",
      "context": "discussed the roadmap",
      "confidence": 0.6,
      "alternativeNames": ["John Smith"],
      "title": "CTO",
      "organization": "Acme Corp"
    }
  ],
  "summary": "Brief summary of the interaction"
}"#;

/// Build the full extraction prompt: instructions, roster hints, text.
pub fn build_extraction_prompt(
    text: &str,
    known_people: &[KnownPerson],
    known_orgs: &[KnownOrganization],
) -> String {
    let mut prompt = String::from(EXTRACTION_PROMPT);

    if !known_people.is_empty() {
        prompt.push_str("\n\nKnown people in this workspace (use for matching partial names):\n");
        for person in known_people {
            match &person.title {
                Some(title) => prompt.push_str(&format!("- {} ({})\n", person.full_name, title)),
                None => prompt.push_str(&format!("- {}\n", person.full_name)),
            }
        }
    }

    if !known_orgs.is_empty() {
        prompt.push_str("\nKnown organizations in this workspace:\n");
        for org in known_orgs {
            prompt.push_str(&format!("- {}\n", org.name));
        }
    }

    prompt.push_str("\nText to analyze:\n");
    prompt.push_str(text);
    prompt
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parse the collaborator's JSON reply, tolerating markdown code fences.
pub fn parse_extraction_response(raw: &str) -> Result<ExtractionResult, ExtractionError> {
    let cleaned = strip_code_fences(raw.trim());
    serde_json::from_str(cleaned).map_err(|e| ExtractionError::Parse(e.to_string()))
}

/// Strip a surrounding ```...``` fence if present.
fn strip_code_fences(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    // Drop the fence line (which may carry a language tag) and the
    // closing fence.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

// ============================================================================
// Chat-completions implementation
// ============================================================================

/// Entity extractor backed by an OpenAI-compatible chat-completions API.
pub struct ChatExtractor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatExtractor {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        ChatExtractor {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl EntityExtractor for ChatExtractor {
    async fn extract(
        &self,
        text: &str,
        known_people: &[KnownPerson],
        known_orgs: &[KnownOrganization],
    ) -> Result<ExtractionResult, ExtractionError> {
        let prompt = build_extraction_prompt(text, known_people, known_orgs);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.3,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Status(status.as_u16()));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ExtractionError::EmptyResponse)?;

        parse_extraction_response(&content)
    }
}

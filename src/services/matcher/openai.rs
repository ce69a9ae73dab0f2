//! OpenAI-backed suggestion provider.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::ai::{AiSuggestion, SuggestionBatch, SuggestionProvider};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo-1106";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Confidence recorded for accepted model suggestions. The API reports no
/// numeric confidence, so accepted answers all carry this fixed value.
pub const SUGGESTION_CONFIDENCE: f32 = 0.9;

pub struct HttpSuggestionProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl HttpSuggestionProvider {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn fetch_content(&self, prompt: String) -> Result<String, anyhow::Error> {
        let payload = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let res = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().unwrap_or_default();
            anyhow::bail!("API error {}: {}", status, text);
        }

        let chat_res: ChatResponse = res.json()?;
        let content = chat_res
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No choices in OpenAI response"))?
            .message
            .content;
        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

impl SuggestionProvider for HttpSuggestionProvider {
    fn suggest(&self, batch: &SuggestionBatch) -> Result<HashMap<String, AiSuggestion>, String> {
        if batch.queries.is_empty() {
            return Ok(HashMap::new());
        }

        let prompt = build_prompt(batch);
        let content = self.fetch_content(prompt).map_err(|e| e.to_string())?;
        parse_suggestions(&content, batch)
    }
}

/// Build the single user-role prompt for one batch.
fn build_prompt(batch: &SuggestionBatch) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are an expert at matching car catalog data between two regional markets. ",
    );
    prompt.push_str(&format!(
        "Each entry below is a {} name for brand \"{}\"; pick its counterpart from the {} candidate list. ",
        batch.source_market, batch.brand, batch.target_market
    ));
    prompt.push_str("Be tolerant of small regional differences and treat these as EQUAL:\n");
    prompt.push_str("- Accents: \"Coupé\" = \"Coupe\"\n");
    prompt.push_str("- Trim suffixes: \"Scouty\" = \"Scouty R\" (R is just a specific version)\n");
    prompt.push_str("- Hyphens/spacing: \"A-Class\" = \"A Class\" = \"AClass\"\n");
    prompt.push_str("- Casing: \"GTI\" = \"gti\"\n\n");

    prompt.push_str(&format!("## Entries ({} level)\n", batch.level));
    for query in &batch.queries {
        match &query.parent_model {
            Some(parent) => prompt.push_str(&format!(
                "- \"{}\" (submodel of \"{}\"), candidates: {:?}\n",
                query.source_name, parent, query.target_names
            )),
            None => prompt.push_str(&format!(
                "- \"{}\", candidates: {:?}\n",
                query.source_name, query.target_names
            )),
        }
    }

    prompt.push_str(
        "\nOutput ONLY a pure JSON object where the keys are the entry names exactly as \
         given and the values are the chosen candidate name, or null when no candidate \
         corresponds. Never invent names outside the candidate lists.",
    );
    prompt
}

/// Decode the model's JSON answer into per-source suggestions.
///
/// Unknown source names, null answers and candidates outside the query's own
/// list are dropped rather than treated as errors.
fn parse_suggestions(
    content: &str,
    batch: &SuggestionBatch,
) -> Result<HashMap<String, AiSuggestion>, String> {
    let answers: HashMap<String, Option<String>> = serde_json::from_str(content)
        .map_err(|e| format!("Failed to parse suggestion map from LLM: {}", e))?;

    let mut result = HashMap::new();
    for (source_name, answer) in answers {
        let Some(target_name) = answer else {
            continue;
        };
        let Some(query) = batch
            .queries
            .iter()
            .find(|query| query.source_name == source_name)
        else {
            continue;
        };
        if !query.target_names.contains(&target_name) {
            continue;
        }
        result.insert(
            source_name,
            AiSuggestion {
                target_name,
                confidence: Some(SUGGESTION_CONFIDENCE),
            },
        );
    }
    Ok(result)
}

#[cfg(test)]
#[path = "tests/openai_tests.rs"]
mod tests;

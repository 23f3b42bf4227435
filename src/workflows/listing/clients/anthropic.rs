use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::workflows::listing::collaborators::{
    ImageComparison, TextAnalysisGateway, TextModelError, VisionError, VisionGateway,
};
use crate::workflows::listing::domain::{RedFlag, RiskLevel, TextAnalysis};

const MESSAGES_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct VisionReply {
    confidence: u8,
    #[serde(default)]
    discrepancies: Vec<String>,
    #[serde(default)]
    verdict: String,
}

#[derive(Debug, Deserialize)]
struct TextReply {
    confidence: u8,
    #[serde(rename = "redFlags", default)]
    red_flags: Vec<RedFlag>,
    #[serde(default)]
    recommendations: Vec<String>,
}

/// The model is asked for JSON but sometimes wraps it in a code fence;
/// accept either form.
fn extract_json(reply: &str) -> &str {
    if let Some(fence_start) = reply.find("```") {
        let body = &reply[fence_start + 3..];
        let body = body.strip_prefix("json").unwrap_or(body);
        if let Some(fence_end) = body.find("```") {
            return body[..fence_end].trim();
        }
    }
    reply.trim()
}

async fn send_message(
    client: &Client,
    api_key: &str,
    model: &str,
    content: Value,
) -> Result<String, reqwest::Error> {
    let response: MessagesResponse = client
        .post(MESSAGES_ENDPOINT)
        .header("x-api-key", api_key)
        .header("anthropic-version", API_VERSION)
        .json(&json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": content }]
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response
        .content
        .into_iter()
        .next()
        .map(|block| block.text)
        .unwrap_or_default())
}

fn vision_prompt() -> &'static str {
    "Compare these two images of the same property exterior.\n\n\
     Image 1: Real estate listing photo\n\
     Image 2: Street-level reference photo\n\n\
     ANALYZE FOR:\n\
     - Structural differences (added/removed features like porches, garages, windows)\n\
     - Color changes (paint, materials, siding)\n\
     - Architectural mismatches\n\
     - Signs of photo manipulation or enhancement\n\n\
     RESPOND IN JSON FORMAT ONLY:\n\
     {\"confidence\": <number 0-100>, \"riskLevel\": \"<low|medium|high>\", \
     \"discrepancies\": [\"<specific difference>\"], \"verdict\": \"<brief summary>\"}\n\n\
     Risk level guidelines:\n\
     - low (0-40): minor differences likely due to seasonal changes, angles, or time of day\n\
     - medium (41-70): notable differences that should be verified\n\
     - high (71-100): major structural mismatches or obvious manipulation\n\n\
     BE SPECIFIC. Use evidence from the images. If images are very similar, say so."
}

fn text_prompt(description: &str) -> String {
    format!(
        "Analyze this real estate listing description for misleading language.\n\n\
         DESCRIPTION:\n\"\"\"\n{description}\n\"\"\"\n\n\
         Flag euphemisms that hide problems (\"cozy\" = very small, \"charming\" = \
         old/outdated, \"needs TLC\" = major repairs needed, \"as-is\" = seller won't \
         fix anything, and similar phrases).\n\n\
         RESPOND IN JSON FORMAT ONLY:\n\
         {{\"confidence\": <number 0-100>, \"riskLevel\": \"<low|medium|high>\", \
         \"redFlags\": [{{\"phrase\": \"<exact phrase from listing>\", \
         \"translation\": \"<honest meaning>\"}}], \
         \"recommendations\": [\"<question to ask landlord/agent>\"]}}\n\n\
         Risk level guidelines: low (0-40) for 0-1 red flags, medium (41-70) for 2-3, \
         high (71-100) for 4 or more or very serious concerns.\n\n\
         Only flag ACTUALLY misleading language. Standard real estate terms are fine."
    )
}

/// Vision collaborator: two image blocks plus the comparison prompt. The
/// risk level is re-banded from the returned confidence so the reply cannot
/// break the confidence/level invariant.
pub struct ClaudeVisionClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl ClaudeVisionClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        }
    }
}

impl VisionGateway for ClaudeVisionClient {
    async fn compare(
        &self,
        listing_photo: &str,
        reference_photo: &str,
    ) -> Result<ImageComparison, VisionError> {
        let api_key = self.api_key.as_deref().ok_or(VisionError::NotConfigured)?;

        let content = json!([
            { "type": "image", "source": { "type": "url", "url": listing_photo } },
            { "type": "image", "source": { "type": "url", "url": reference_photo } },
            { "type": "text", "text": vision_prompt() }
        ]);

        let reply = send_message(&self.client, api_key, &self.model, content).await?;
        let parsed: VisionReply = serde_json::from_str(extract_json(&reply))
            .map_err(|err| VisionError::MalformedReply(err.to_string()))?;

        Ok(ImageComparison {
            confidence: parsed.confidence.min(100),
            risk_level: RiskLevel::from_confidence(parsed.confidence.min(100)),
            discrepancies: parsed.discrepancies,
            verdict: parsed.verdict,
        })
    }
}

/// Text collaborator: single prompt carrying the description. Same
/// re-banding rule as the vision client.
pub struct ClaudeTextClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl ClaudeTextClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        }
    }
}

impl TextAnalysisGateway for ClaudeTextClient {
    async fn analyze(&self, description: &str) -> Result<TextAnalysis, TextModelError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TextModelError::NotConfigured)?;

        let content = Value::String(text_prompt(description));
        let reply = send_message(&self.client, api_key, &self.model, content).await?;
        let parsed: TextReply = serde_json::from_str(extract_json(&reply))
            .map_err(|err| TextModelError::MalformedReply(err.to_string()))?;

        let confidence = parsed.confidence.min(100);
        Ok(TextAnalysis {
            confidence,
            risk_level: RiskLevel::from_confidence(confidence),
            red_flags: parsed.red_flags,
            recommendations: parsed.recommendations,
        })
    }
}

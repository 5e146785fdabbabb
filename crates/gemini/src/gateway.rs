//! The AI edit gateway.
//!
//! [`AiGateway`] is the seam between the editor session and the remote
//! model. Every call is single-shot and stateless; retrying is safe and
//! left to the caller. [`GeminiGateway`] implements it over
//! [`GeminiApi`].

use async_trait::async_trait;
use canvas_core::image::split_data_url;
use serde_json::json;

use crate::api::{GeminiApi, GeminiApiError};
use crate::config::GeminiConfig;
use crate::messages::{
    parse_coaching, parse_suggestions, GenerateContentRequest, GenerationConfig, Part,
};

/// Number of edit ideas requested from the suggestion prompt.
pub const SUGGESTION_COUNT: usize = 3;

/// A refined prompt plus one short piece of advice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coaching {
    pub refined_prompt: String,
    pub tip: String,
}

/// Image edit failed.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Failed to generate image: {0}")]
    Api(#[from] GeminiApiError),

    #[error("Failed to generate image: {0}")]
    InvalidInput(String),

    #[error("Failed to generate image: No image data found in the Gemini API response.")]
    NoImage,
}

/// Suggestion request failed or returned the wrong shape.
#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error("Failed to get suggestions: {0}")]
    Api(#[from] GeminiApiError),

    #[error("Failed to get suggestions: {0}")]
    InvalidInput(String),

    #[error("Failed to get suggestions: the response contained no text")]
    Empty,

    #[error("Failed to get suggestions: Invalid response format ({0})")]
    Malformed(#[source] serde_json::Error),
}

/// Coaching request failed or returned the wrong shape.
#[derive(Debug, thiserror::Error)]
pub enum CoachingError {
    #[error("Failed to get coaching: {0}")]
    Api(#[from] GeminiApiError),

    #[error("Failed to get coaching: the response contained no text")]
    Empty,

    #[error("Failed to get coaching: Invalid response format ({0})")]
    Malformed(#[source] serde_json::Error),
}

/// Remote operations the editor needs from a generative model.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Apply `instruction` to the image and return the result as a data URL.
    ///
    /// `image_data` is a data URL; `mime_type` describes its payload.
    async fn edit_image(
        &self,
        image_data: &str,
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, GenerationError>;

    /// Short edit ideas for the image.
    async fn suggestions(
        &self,
        image_data: &str,
        mime_type: &str,
    ) -> Result<Vec<String>, SuggestionError>;

    /// Rewrite a draft prompt into a stronger one.
    async fn coach_prompt(&self, draft: &str) -> Result<Coaching, CoachingError>;
}

/// [`AiGateway`] backed by the Gemini REST API.
pub struct GeminiGateway {
    api: GeminiApi,
    image_model: String,
    text_model: String,
}

impl GeminiGateway {
    pub fn new(api: GeminiApi, image_model: String, text_model: String) -> Self {
        Self {
            api,
            image_model,
            text_model,
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self, GeminiApiError> {
        Ok(Self::new(
            GeminiApi::from_config(config)?,
            config.image_model.clone(),
            config.text_model.clone(),
        ))
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn edit_image(
        &self,
        image_data: &str,
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, GenerationError> {
        let (_, payload) =
            split_data_url(image_data).map_err(|e| GenerationError::InvalidInput(e.to_string()))?;

        let request = GenerateContentRequest::new(vec![
            Part::inline(mime_type, payload),
            Part::text(instruction),
        ])
        .with_config(GenerationConfig::image_output());

        let response = self.api.generate_content(&self.image_model, &request).await?;

        match response.first_inline_data() {
            Some(inline) => {
                tracing::info!(model = %self.image_model, mime_type = %inline.mime_type, "Image edit generated");
                Ok(format!("data:{};base64,{}", inline.mime_type, inline.data))
            }
            None => {
                tracing::warn!(
                    model = %self.image_model,
                    reason = response.block_reason().unwrap_or("unknown"),
                    "Image model returned no image"
                );
                Err(GenerationError::NoImage)
            }
        }
    }

    async fn suggestions(
        &self,
        image_data: &str,
        mime_type: &str,
    ) -> Result<Vec<String>, SuggestionError> {
        let (_, payload) =
            split_data_url(image_data).map_err(|e| SuggestionError::InvalidInput(e.to_string()))?;

        let request = GenerateContentRequest::new(vec![
            Part::inline(mime_type, payload),
            Part::text(suggestions_prompt()),
        ])
        .with_config(GenerationConfig::json_output(json!({
            "type": "ARRAY",
            "items": {
                "type": "STRING",
                "description": "A creative prompt suggestion for editing the image."
            }
        })));

        let response = self.api.generate_content(&self.text_model, &request).await?;
        let text = response.text().ok_or(SuggestionError::Empty)?;
        let suggestions = parse_suggestions(&text).map_err(SuggestionError::Malformed)?;

        tracing::debug!(count = suggestions.len(), "Received prompt suggestions");
        Ok(suggestions)
    }

    async fn coach_prompt(&self, draft: &str) -> Result<Coaching, CoachingError> {
        let request = GenerateContentRequest::new(vec![Part::text(coaching_prompt(draft))])
            .with_config(GenerationConfig::json_output(json!({
                "type": "OBJECT",
                "properties": {
                    "suggestion": {
                        "type": "STRING",
                        "description": "An improved, more vivid version of the user's prompt."
                    },
                    "tip": {
                        "type": "STRING",
                        "description": "One short tip explaining what made the prompt stronger."
                    }
                },
                "required": ["suggestion", "tip"]
            })));

        let response = self.api.generate_content(&self.text_model, &request).await?;
        let text = response.text().ok_or(CoachingError::Empty)?;
        let payload = parse_coaching(&text).map_err(CoachingError::Malformed)?;

        Ok(Coaching {
            refined_prompt: payload.suggestion,
            tip: payload.tip,
        })
    }
}

fn suggestions_prompt() -> String {
    format!(
        "Analyze this image. You are a creative assistant for a visual design tool called \
         \"canvas\". Provide {SUGGESTION_COUNT} distinct, creative, and actionable ideas for how \
         a user could edit this image with an AI. The ideas should be formatted as short, \
         inspiring prompts that another AI can execute. Your response must be a valid JSON array \
         of strings. For example: [\"Transform the background into a vibrant, futuristic \
         cityscape at night.\", \"Apply a vintage, 1970s film photo style with warm tones and \
         grain.\", \"Add a majestic, mythical creature interacting with the main subject.\"]"
    )
}

fn coaching_prompt(draft: &str) -> String {
    format!(
        "You are a friendly prompt coach for an AI image editing tool called \"canvas\". \
         The user wrote this draft prompt: \"{}\". Rewrite it as a single, vivid, specific \
         prompt an image model can execute, and give one short tip that explains what made it \
         stronger. Respond with a JSON object with the keys \"suggestion\" and \"tip\".",
        draft.trim()
    )
}

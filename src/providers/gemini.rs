use super::gemini_types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
};
use super::{GarmentClassifier, OutfitRenderer, build_provider_client};
use crate::error::{ClassifyError, GenerationError};
use crate::media::EncodedImage;
use crate::security::sanitize_api_error;
use crate::wardrobe::Category;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Google generative-language API, speaking both
/// collaborator contracts: multimodal outfit-image generation and
/// single-label garment classification.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    generation_model: String,
    classifier_model: String,
    temperature: f64,
    client: Client,
}

/// Transport-level call failure, before mapping onto the typed service
/// errors.
enum CallError {
    Request(String),
    Api { status: u16, message: String },
}

impl From<CallError> for GenerationError {
    fn from(e: CallError) -> Self {
        match e {
            CallError::Request(message) => Self::Request(message),
            CallError::Api { status, message } => Self::Api { status, message },
        }
    }
}

impl From<CallError> for ClassifyError {
    fn from(e: CallError) -> Self {
        match e {
            CallError::Request(message) => Self::Request(message),
            CallError::Api { status, message } => Self::Api { status, message },
        }
    }
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        generation_model: &str,
        classifier_model: &str,
        temperature: f64,
    ) -> Self {
        Self::with_base_url(
            api_key,
            generation_model,
            classifier_model,
            temperature,
            DEFAULT_BASE_URL,
        )
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(
        api_key: &str,
        generation_model: &str,
        classifier_model: &str,
        temperature: f64,
        base_url: &str,
    ) -> Self {
        Self {
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            generation_model: generation_model.to_string(),
            classifier_model: classifier_model.to_string(),
            temperature,
            client: build_provider_client(),
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent?key={}",
            self.base_url, self.api_key
        )
    }

    async fn call_api(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CallError> {
        let response = self
            .client
            .post(self.generate_url(model))
            .json(request)
            .send()
            .await
            .map_err(|e| CallError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallError::Api {
                status: status.as_u16(),
                message: sanitize_api_error(&body),
            });
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CallError::Request(e.to_string()))?;

        if let Some(err) = result.error.as_ref() {
            return Err(CallError::Api {
                status: status.as_u16(),
                message: sanitize_api_error(&err.message),
            });
        }

        Ok(result)
    }

    fn user_content(prompt: &str, images: &[EncodedImage]) -> Content {
        let mut parts = vec![Part::text(prompt.to_string())];
        parts.extend(images.iter().map(|image| {
            Part::inline_data(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            })
        }));
        Content {
            role: Some("user".to_string()),
            parts,
        }
    }

    /// Take the first inline image part of the first candidate.
    fn extract_image(result: &GenerateContentResponse) -> Result<EncodedImage, GenerationError> {
        result
            .candidates
            .iter()
            .flatten()
            .flat_map(|candidate| candidate.content.parts.iter())
            .find_map(|part| part.inline_data.as_ref())
            .map(|inline| EncodedImage {
                mime_type: inline.mime_type.clone(),
                data: inline.data.clone(),
            })
            .ok_or(GenerationError::NoImageReturned)
    }

    /// Take the first line of text of the first candidate as the label.
    fn extract_label(result: &GenerateContentResponse) -> Result<String, ClassifyError> {
        let label = result
            .candidates
            .iter()
            .flatten()
            .flat_map(|candidate| candidate.content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .flat_map(str::lines)
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(ToString::to_string);

        label.ok_or(ClassifyError::EmptyLabel)
    }
}

#[async_trait]
impl OutfitRenderer for GeminiClient {
    async fn render_outfit(
        &self,
        prompt: &str,
        images: &[EncodedImage],
    ) -> Result<EncodedImage, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Self::user_content(prompt, images)],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: 8192,
                response_modalities: Some(vec!["TEXT", "IMAGE"]),
            },
        };

        debug!(model = %self.generation_model, images = images.len(), "requesting outfit render");
        let result = self.call_api(&self.generation_model, &request).await?;
        Self::extract_image(&result)
    }
}

#[async_trait]
impl GarmentClassifier for GeminiClient {
    async fn classify_garment(&self, image: &EncodedImage) -> Result<String, ClassifyError> {
        let request = GenerateContentRequest {
            contents: vec![Self::user_content(
                &Category::classifier_prompt(),
                std::slice::from_ref(image),
            )],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 64,
                response_modalities: None,
            },
        };

        debug!(model = %self.classifier_model, "requesting garment classification");
        let result = self.call_api(&self.classifier_model, &request).await?;
        Self::extract_label(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from_json(json: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn extract_image_takes_first_inline_part() {
        let response = response_from_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your outfit:" },
                        { "inlineData": { "mimeType": "image/png", "data": "Zmlyc3Q=" } },
                        { "inlineData": { "mimeType": "image/png", "data": "c2Vjb25k" } }
                    ]
                }
            }]
        }));

        let image = GeminiClient::extract_image(&response).unwrap();
        assert_eq!(image.data, "Zmlyc3Q=");
    }

    #[test]
    fn text_only_response_is_no_image_returned() {
        let response = response_from_json(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I cannot generate that image." }] }
            }]
        }));

        assert!(matches!(
            GeminiClient::extract_image(&response),
            Err(GenerationError::NoImageReturned)
        ));
    }

    #[test]
    fn candidate_less_response_is_no_image_returned() {
        let response = response_from_json(serde_json::json!({}));
        assert!(matches!(
            GeminiClient::extract_image(&response),
            Err(GenerationError::NoImageReturned)
        ));
    }

    #[test]
    fn extract_label_takes_first_nonempty_line() {
        let response = response_from_json(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "\n  Top  \nextra commentary" }] }
            }]
        }));

        assert_eq!(GeminiClient::extract_label(&response).unwrap(), "Top");
    }

    #[test]
    fn extract_label_rejects_empty_responses() {
        let response = response_from_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "   \n  " }] } }]
        }));

        assert!(matches!(
            GeminiClient::extract_label(&response),
            Err(ClassifyError::EmptyLabel)
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client =
            GeminiClient::with_base_url("k", "gen-model", "cls-model", 0.7, "http://x.test/");
        assert_eq!(
            client.generate_url("gen-model"),
            "http://x.test/v1beta/models/gen-model:generateContent?key=k"
        );
    }
}

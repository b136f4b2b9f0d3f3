use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{InlineImage, LLMConfig};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::{snippet, strip_code_fence, RAW_SNIPPET_LIMIT};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Priority order used when no configuration overrides it. The repeated
/// flash entry is the final fallback.
pub const DEFAULT_MODELS: [&str; 7] = [
    "models/gemini-2.5-flash",
    "models/gemini-2.5-pro",
    "models/gemini-2.5-flash-image",
    "models/gemini-3-pro-image-preview",
    "models/gemini-flash-latest",
    "models/gemini-2.0-flash",
    "models/gemini-2.5-flash",
];

/// Ordered candidate model ids, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPolicy {
    candidates: Vec<String>,
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS.iter().map(|model| model.to_string()).collect())
    }
}

impl ModelPolicy {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The override goes first and is removed from the rest of the list.
    pub fn try_order(&self, override_model: Option<&str>) -> Vec<String> {
        match override_model.map(str::trim).filter(|model| !model.is_empty()) {
            Some(preferred) => std::iter::once(preferred.to_string())
                .chain(
                    self.candidates
                        .iter()
                        .filter(|model| model.as_str() != preferred)
                        .cloned(),
                )
                .collect(),
            None => self.candidates.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub items: Vec<Value>,
    pub used_model: String,
    pub used_fallback: bool,
    pub raw_text: String,
}

pub struct ModelFallbackInvoker {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
}

impl ModelFallbackInvoker {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>) -> Self {
        Self { llm_client }
    }

    /// Tries each candidate once, in order, until one returns a non-empty JSON array.
    pub async fn invoke(
        &self,
        config: &LLMConfig,
        prompt: &str,
        image: &InlineImage,
        policy: &ModelPolicy,
        override_model: Option<&str>,
    ) -> Result<Generation> {
        let mut last_raw: Option<String> = None;

        for (idx, model_id) in policy.try_order(override_model).into_iter().enumerate() {
            info!(model = %model_id, attempt = idx + 1, "Attempting generation");

            let raw = match self
                .llm_client
                .generate(&config.with_model(&model_id), prompt, Some(image))
                .await
            {
                Ok(text) => text.trim().to_string(),
                Err(err) => {
                    error!(model = %model_id, error = %err, "Model failed");
                    continue;
                }
            };
            last_raw = Some(raw.clone());

            let raw_text = strip_code_fence(&raw);
            match serde_json::from_str::<Value>(&raw_text) {
                Ok(Value::Array(items)) if !items.is_empty() => {
                    info!(
                        model = %model_id,
                        count = items.len(),
                        "Model succeeded"
                    );
                    return Ok(Generation {
                        items,
                        used_model: model_id,
                        used_fallback: idx != 0,
                        raw_text,
                    });
                }
                Ok(_) => {
                    warn!(
                        model = %model_id,
                        "Model returned JSON but not a non-empty list. Trying next model."
                    );
                }
                Err(err) => {
                    error!(model = %model_id, error = %err, "Model output is not valid JSON");
                }
            }
        }

        Err(AppError::GenerationExhausted(
            last_raw
                .filter(|raw| !raw.is_empty())
                .map(|raw| snippet(&raw, RAW_SNIPPET_LIMIT))
                .unwrap_or_else(|| "none".to_string()),
        ))
    }
}

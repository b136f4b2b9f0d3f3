use crate::application::use_cases::model_fallback::{ModelFallbackInvoker, ModelPolicy};
use crate::application::use_cases::normalizer::{normalize_test_cases, BatchInfo};
use crate::application::use_cases::prompt_builder::build_prompt;
use crate::domain::error::Result;
use crate::domain::llm_config::{InlineImage, LLMConfig};
use crate::domain::test_case::{Session, TestCase};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::session_store::SessionStore;
use base64::Engine as _;
use chrono::Local;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct GenerateTestsRequest {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub release_version: String,
    pub tester_name: String,
    pub run_dates: Vec<String>,
    #[validate(range(min = 1, message = "expected_count must be a positive integer"))]
    pub expected_count: u32,
    pub model_override: Option<String>,
    #[validate(length(min = 1, message = "Screenshot file required"))]
    pub image_bytes: Vec<u8>,
    #[validate(length(min = 1, message = "No file selected"))]
    pub image_filename: String,
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub session_id: String,
    pub test_cases: Vec<TestCase>,
    pub used_model: String,
    pub used_fallback: bool,
}

/// MIME type guessed from the upload's file name; first substring match wins.
pub fn infer_image_mime(filename: &str) -> &'static str {
    let name = filename.to_lowercase();
    if name.contains("png") {
        "image/png"
    } else if name.contains("gif") {
        "image/gif"
    } else if name.contains("webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

pub struct GenerateTestsUseCase {
    invoker: ModelFallbackInvoker,
    store: Arc<dyn SessionStore>,
    llm_config: LLMConfig,
    policy: ModelPolicy,
}

impl GenerateTestsUseCase {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        store: Arc<dyn SessionStore>,
        llm_config: LLMConfig,
        policy: ModelPolicy,
    ) -> Self {
        Self {
            invoker: ModelFallbackInvoker::new(llm_client),
            store,
            llm_config,
            policy,
        }
    }

    pub async fn execute(&self, mut request: GenerateTestsRequest) -> Result<GenerationResult> {
        request.description = request.description.trim().to_string();
        request.validate()?;

        let image = InlineImage {
            mime_type: infer_image_mime(&request.image_filename).to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(&request.image_bytes),
        };
        let prompt = build_prompt(&request.description, request.expected_count);

        let generation = self
            .invoker
            .invoke(
                &self.llm_config,
                &prompt,
                &image,
                &self.policy,
                request.model_override.as_deref(),
            )
            .await?;

        let date_generated = Local::now().format("%Y-%m-%d").to_string();
        let test_cases = normalize_test_cases(
            &generation.items,
            &BatchInfo {
                run_dates: &request.run_dates,
                release_version: &request.release_version,
                tester_name: &request.tester_name,
                date_generated: &date_generated,
            },
        );

        let session_id = self.store.create(Session {
            session_id: String::new(),
            test_cases: test_cases.clone(),
            release_version: request.release_version,
            tester_name: request.tester_name,
            description: request.description,
            run_dates: request.run_dates,
            used_model: generation.used_model.clone(),
        });

        info!(
            session_id = %session_id,
            count = test_cases.len(),
            used_model = %generation.used_model,
            used_fallback = generation.used_fallback,
            "Generated test cases"
        );

        Ok(GenerationResult {
            session_id,
            test_cases,
            used_model: generation.used_model,
            used_fallback: generation.used_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::model_fallback::tests::ScriptedClient;
    use crate::domain::error::AppError;
    use crate::infrastructure::session_store::InMemorySessionStore;

    fn request(description: &str) -> GenerateTestsRequest {
        GenerateTestsRequest {
            description: description.to_string(),
            release_version: "v1.0.0".to_string(),
            tester_name: "Tester".to_string(),
            run_dates: vec!["17/10/2025".to_string(), "29/10/2025".to_string()],
            expected_count: 8,
            model_override: None,
            image_bytes: vec![0x89, 0x50, 0x4e, 0x47],
            image_filename: "Login.PNG".to_string(),
        }
    }

    fn use_case(client: Arc<ScriptedClient>, store: Arc<InMemorySessionStore>) -> GenerateTestsUseCase {
        GenerateTestsUseCase::new(
            client,
            store,
            LLMConfig::default(),
            ModelPolicy::new(vec!["A".to_string(), "B".to_string()]),
        )
    }

    #[test]
    fn test_infer_image_mime() {
        assert_eq!(infer_image_mime("shot.PNG"), "image/png");
        assert_eq!(infer_image_mime("anim.gif"), "image/gif");
        assert_eq!(infer_image_mime("pic.webp"), "image/webp");
        assert_eq!(infer_image_mime("photo.jpg"), "image/jpeg");
        assert_eq!(infer_image_mime("png-export.gif"), "image/png");
    }

    #[tokio::test]
    async fn test_execute_stores_normalized_session() {
        let client = Arc::new(ScriptedClient::new(&[
            ("A", Err("unavailable")),
            ("B", Ok(r#"```json
[{"tc_id":"TC001","scenario":"Valid login"},{}]
```"#)),
        ]));
        let store = Arc::new(InMemorySessionStore::new());

        let result = use_case(client, store.clone())
            .execute(request("  Login form  "))
            .await
            .unwrap();

        assert_eq!(result.used_model, "B");
        assert!(result.used_fallback);
        assert_eq!(result.test_cases.len(), 2);
        assert_eq!(result.test_cases[1].tc_id, "TC002");

        let session = store.get(&result.session_id).unwrap();
        assert_eq!(session.description, "Login form");
        assert_eq!(session.used_model, "B");
        assert_eq!(session.test_cases[0].runs.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected_before_generation() {
        let client = Arc::new(ScriptedClient::new(&[]));
        let store = Arc::new(InMemorySessionStore::new());

        let err = use_case(client.clone(), store.clone())
            .execute(request("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(client.calls().is_empty());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_missing_screenshot_is_rejected() {
        let client = Arc::new(ScriptedClient::new(&[]));
        let mut req = request("Login");
        req.image_bytes.clear();

        let err = use_case(client, Arc::new(InMemorySessionStore::new()))
            .execute(req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_expected_count_has_no_upper_bound() {
        let client = Arc::new(ScriptedClient::new(&[("A", Ok(r#"[{"tc_id":"TC001"}]"#))]));
        let mut req = request("Login");
        req.expected_count = 60;

        let result = use_case(client, Arc::new(InMemorySessionStore::new()))
            .execute(req)
            .await
            .unwrap();
        assert_eq!(result.used_model, "A");
    }

    #[tokio::test]
    async fn test_zero_expected_count_is_rejected() {
        let client = Arc::new(ScriptedClient::new(&[("A", Ok(r#"[{"tc_id":"TC001"}]"#))]));
        let mut req = request("Login");
        req.expected_count = 0;

        let err = use_case(client.clone(), Arc::new(InMemorySessionStore::new()))
            .execute(req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_exhaustion_creates_no_session() {
        let client = Arc::new(ScriptedClient::new(&[("A", Ok("{}")), ("B", Ok("[]"))]));
        let store = Arc::new(InMemorySessionStore::new());

        let err = use_case(client, store.clone())
            .execute(request("Login"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::GenerationExhausted(ref raw) if raw == "[]"));
        assert_eq!(store.len(), 0);
    }
}

use crate::application::{ExportUseCase, GenerateTestsUseCase, LogResultsUseCase};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::llm_clients::LLMClient;
use std::sync::Arc;

/// Fallbacks for optional fields of a generation request.
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub release_version: String,
    pub tester_name: String,
    pub run_dates: Vec<String>,
    pub expected_count: u32,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            release_version: "v1.0.0".to_string(),
            tester_name: "Tester".to_string(),
            run_dates: ["17/10/2025", "29/10/2025", "31/10/2025", "21/11/2025"]
                .iter()
                .map(|date| date.to_string())
                .collect(),
            expected_count: 8,
        }
    }
}

pub struct AppState {
    pub generate_use_case: GenerateTestsUseCase,
    pub log_results_use_case: LogResultsUseCase,
    pub export_use_case: ExportUseCase,
    pub llm_client: Arc<dyn LLMClient + Send + Sync>,
    pub llm_config: LLMConfig,
    pub defaults: RequestDefaults,
}

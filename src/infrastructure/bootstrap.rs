use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, info};

use crate::application::use_cases::model_fallback::ModelPolicy;
use crate::application::{ExportUseCase, GenerateTestsUseCase, LogResultsUseCase};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::config::{api_key_from_env, AppConfig};
use crate::infrastructure::llm_clients::{GeminiClient, LLMClient};
use crate::infrastructure::session_store::{InMemorySessionStore, SessionStore};
use crate::interfaces::http::{add_log, start_server, LogEntry};
use crate::interfaces::state::{AppState, RequestDefaults};

/// Wires use cases around one backend client and one session store.
pub fn build_state(
    config: &AppConfig,
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    llm_config: LLMConfig,
    store: Arc<dyn SessionStore>,
) -> AppState {
    let policy = ModelPolicy::new(config.models.clone());

    AppState {
        generate_use_case: GenerateTestsUseCase::new(
            llm_client.clone(),
            store.clone(),
            llm_config.clone(),
            policy,
        ),
        log_results_use_case: LogResultsUseCase::new(store.clone()),
        export_use_case: ExportUseCase::new(store),
        llm_client,
        llm_config,
        defaults: RequestDefaults {
            run_dates: config.default_run_dates.clone(),
            expected_count: config.default_expected_count,
            ..RequestDefaults::default()
        },
    }
}

pub async fn serve(config: AppConfig) -> std::io::Result<()> {
    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));

    let llm_config = config.llm_config(api_key_from_env());
    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(GeminiClient::new(
        Duration::from_secs(config.request_timeout_secs),
    ));
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    info!(
        models = ?config.models,
        base_url = %config.gemini_base_url,
        "Model fallback policy loaded"
    );

    let state = Arc::new(build_state(&config, llm_client, llm_config, store));

    let server = start_server(state, logs.clone(), &config.host, config.port).map_err(|err| {
        error!(error = %err, host = %config.host, port = config.port, "Failed to bind HTTP server");
        err
    })?;

    add_log(
        &logs,
        "INFO",
        "System",
        &format!("HTTP server started on {}:{}", config.host, config.port),
    );

    server.await
}

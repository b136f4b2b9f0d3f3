mod multipart;

use crate::application::use_cases::generate_tests::GenerationResult;
use crate::domain::error::AppError;
use crate::domain::test_case::{ResultUpdate, TestCase};
use crate::infrastructure::excel::XLSX_MIME;
use crate::interfaces::state::AppState;
use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::dev::Server;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::{error, get, post, web, App, HttpResponse, HttpServer, Responder, ResponseError};
use chrono::Local;
use multipart::GenerateForm;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub app_state: Arc<AppState>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

#[derive(Serialize)]
struct GenerateErrorBody {
    success: bool,
    error: String,
    session_id: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    success: bool,
    session_id: String,
    count: usize,
    test_cases: Vec<TestCase>,
    used_model: String,
    used_fallback_model: bool,
}

impl From<GenerationResult> for GenerateResponse {
    fn from(result: GenerationResult) -> Self {
        Self {
            success: true,
            session_id: result.session_id,
            count: result.test_cases.len(),
            test_cases: result.test_cases,
            used_model: result.used_model,
            used_fallback_model: result.used_fallback,
        }
    }
}

#[derive(Serialize)]
struct SuccessBody {
    success: bool,
}

#[derive(Deserialize)]
pub struct LogResultsRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub results: Vec<ResultUpdate>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::SessionNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: self.to_string(),
        })
    }
}

#[post("/generate-tests")]
async fn generate_tests(data: web::Data<HttpState>, payload: Multipart) -> impl Responder {
    let outcome = match GenerateForm::read(payload).await {
        Ok(form) => form.into_request(&data.app_state.defaults),
        Err(e) => Err(e),
    };
    let request = match outcome {
        Ok(request) => request,
        Err(e) => return generate_error(&data, e),
    };

    add_log(
        &data.logs,
        "INFO",
        "Generate",
        &format!(
            "Generating {} test cases (release={} runs={} override={:?})",
            request.expected_count,
            request.release_version,
            request.run_dates.len(),
            request.model_override
        ),
    );

    match data.app_state.generate_use_case.execute(request).await {
        Ok(result) => {
            add_log(
                &data.logs,
                "INFO",
                "Generate",
                &format!(
                    "Session {} created with {} test cases via {}",
                    result.session_id,
                    result.test_cases.len(),
                    result.used_model
                ),
            );
            HttpResponse::Ok().json(GenerateResponse::from(result))
        }
        Err(e) => generate_error(&data, e),
    }
}

fn generate_error(data: &HttpState, err: AppError) -> HttpResponse {
    let level = if err.status_code().is_server_error() {
        "ERROR"
    } else {
        "WARN"
    };
    add_log(
        &data.logs,
        level,
        "Generate",
        &format!("generate-tests failed: {}", err),
    );
    HttpResponse::build(err.status_code()).json(GenerateErrorBody {
        success: false,
        error: err.to_string(),
        session_id: None,
    })
}

#[post("/log-results")]
async fn log_results(
    data: web::Data<HttpState>,
    req: web::Json<LogResultsRequest>,
) -> impl Responder {
    let req = req.into_inner();
    let Some(session_id) = req.session_id.filter(|id| !id.is_empty()) else {
        return AppError::SessionNotFound(String::new()).error_response();
    };

    match data
        .app_state
        .log_results_use_case
        .execute(&session_id, &req.results)
    {
        Ok(outcome) => {
            add_log(
                &data.logs,
                "INFO",
                "Results",
                &format!(
                    "Session {}: {} result(s) applied, {} skipped",
                    session_id, outcome.applied, outcome.skipped
                ),
            );
            HttpResponse::Ok().json(SuccessBody { success: true })
        }
        Err(e) => {
            add_log(
                &data.logs,
                "WARN",
                "Results",
                &format!("log-results failed for {}: {}", session_id, e),
            );
            e.error_response()
        }
    }
}

#[get("/export-excel/{session_id}")]
async fn export_excel(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let session_id = path.into_inner();

    match data.app_state.export_use_case.execute(&session_id) {
        Ok(workbook) => {
            add_log(
                &data.logs,
                "INFO",
                "Export",
                &format!("Exported session {} as {}", session_id, workbook.filename),
            );
            HttpResponse::Ok()
                .content_type(XLSX_MIME)
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(workbook.filename)],
                })
                .body(workbook.bytes)
        }
        Err(e) => {
            add_log(
                &data.logs,
                "WARN",
                "Export",
                &format!("export-excel failed for {}: {}", session_id, e),
            );
            e.error_response()
        }
    }
}

#[get("/models")]
async fn list_models(data: web::Data<HttpState>) -> impl Responder {
    add_log(&data.logs, "INFO", "Models", "Fetching available models");

    match data
        .app_state
        .llm_client
        .list_models(&data.app_state.llm_config)
        .await
    {
        Ok(models) => HttpResponse::Ok().json(models),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Models",
                &format!("Failed to list models: {}", e),
            );
            e.error_response()
        }
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data
        .logs
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    HttpResponse::Ok().json(&*logs)
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    match level {
        "ERROR" => tracing::error!(source, "{}", message),
        "WARN" => tracing::warn!(source, "{}", message),
        _ => tracing::info!(source, "{}", message),
    }

    let mut logs = logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.push(LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    });
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorBody {
            success: false,
            error: format!("Invalid JSON body: {}", err),
        });
        error::InternalError::from_response(err, response).into()
    })
}

/// Routes and extractor config shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(generate_tests)
        .service(log_results)
        .service(export_excel)
        .service(list_models)
        .service(get_logs);
}

pub fn start_server(
    app_state: Arc<AppState>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
    host: &str,
    port: u16,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState { app_state, logs });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

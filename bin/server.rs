// SLM Command Center - Web Server
// Serves the rendered pages and a JSON API over one shared session

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slm_command_center::modules::data_sovereignty::DataSovereignty;
use slm_command_center::modules::infra_recommender::{Field, InfraRecommender};
use slm_command_center::modules::model_lab::TrainingConfig;
use slm_command_center::modules::Run;
use slm_command_center::pages;
use slm_command_center::typing::script_duration;
use slm_command_center::{CommandCenterError, Config, Fragment, Keyframe, Module, Notice, Session};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "slm-server")]
#[command(version)]
#[command(about = "Web server for the SLM Command Center demo")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "slm-command-center.toml")]
    config: PathBuf,

    /// Overrides the configured listen address
    #[arg(short, long)]
    addr: Option<String>,

    /// Directory served under /css
    #[arg(long, default_value = "web/css")]
    assets: PathBuf,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Session>>,
}

impl AppState {
    fn new(session: Session) -> Self {
        AppState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> std::result::Result<MutexGuard<'_, Session>, Response> {
        self.session.lock().map_err(|_| {
            tracing::error!("session lock poisoned");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "session unavailable")
        })
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::error(message))).into_response()
}

fn status_for(err: &CommandCenterError) -> StatusCode {
    match err {
        CommandCenterError::UnknownKey { .. } => StatusCode::NOT_FOUND,
        CommandCenterError::Busy(_) => StatusCode::CONFLICT,
        CommandCenterError::InvalidInput(_)
        | CommandCenterError::Incomplete(_)
        | CommandCenterError::SelectionLimit { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CommandCenterError> for ApiError {
    fn from(err: CommandCenterError) -> Self {
        ApiError(err)
    }
}

/// Library errors carried out of handlers with `?`
struct ApiError(CommandCenterError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self.0);
        }
        failure(status, self.0.to_string())
    }
}

fn module_param(key: &str) -> std::result::Result<Module, ApiError> {
    Ok(Module::from_key(key)?)
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Serialize)]
struct ModuleInfo {
    key: &'static str,
    title: &'static str,
    icon: &'static str,
    description: &'static str,
    page: String,
}

#[derive(Deserialize, Default)]
struct RunRequest {
    #[serde(default)]
    input: Option<String>,
}

/// The run's outcome plus the keyframes a client replays
#[derive(Serialize)]
struct RunResponse {
    module: &'static str,
    outcome: Value,
    duration_ms: u64,
    script: Vec<Keyframe>,
}

/// A user event on a page: pick, toggle or reset something
#[derive(Deserialize)]
struct SelectRequest {
    kind: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    checked: Option<bool>,
}

#[derive(Serialize)]
struct SelectResponse {
    fragments: Vec<Fragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
}

// ============================================================================
// Pages
// ============================================================================

async fn serve_index(State(state): State<AppState>) -> Response {
    serve_module_page(&state, Module::Dashboard)
}

/// GET /pages/:file - e.g. /pages/cost-ticker.html
async fn serve_page(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    let key = file.strip_suffix(".html").unwrap_or(&file);
    match Module::from_key(key) {
        Ok(module) => serve_module_page(&state, module),
        Err(_) => failure(StatusCode::NOT_FOUND, format!("no page named '{}'", file)),
    }
}

/// Loading a page enters its module, which starts it fresh
fn serve_module_page(state: &AppState, module: Module) -> Response {
    let mut session = match state.lock() {
        Ok(session) => session,
        Err(response) => return response,
    };
    session.navigate(module);
    let surface = pages::page_surface(module, &session.render(module));
    Html(pages::render_page(module, &surface)).into_response()
}

// ============================================================================
// API
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/modules
async fn list_modules() -> impl IntoResponse {
    let modules: Vec<ModuleInfo> = Module::ALL
        .iter()
        .map(|m| ModuleInfo {
            key: m.key(),
            title: m.title(),
            icon: m.icon(),
            description: m.description(),
            page: m.page_path(false),
        })
        .collect();
    Json(ApiResponse::ok(modules))
}

/// GET /api/modules/:module - current fragments
async fn get_fragments(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let module = match module_param(&key) {
        Ok(module) => module,
        Err(err) => return err.into_response(),
    };
    match state.lock() {
        Ok(session) => Json(ApiResponse::ok(session.render(module))).into_response(),
        Err(response) => response,
    }
}

/// POST /api/modules/:module/run
async fn run_module(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Option<Json<RunRequest>>,
) -> Response {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let module = match module_param(&key) {
        Ok(module) => module,
        Err(err) => return err.into_response(),
    };
    let started = match state.lock() {
        Ok(mut session) => session.run(module, request.input.as_deref(), Utc::now()),
        Err(response) => return response,
    };
    match started {
        Ok(run) => respond_with_run(module, run),
        Err(err) => ApiError(err).into_response(),
    }
}

/// POST /api/train - model lab with an explicit configuration
async fn train(State(state): State<AppState>, Json(config): Json<TrainingConfig>) -> Response {
    let started = {
        let mut guard = match state.lock() {
            Ok(session) => session,
            Err(response) => return response,
        };
        let session = &mut *guard;
        session
            .model_lab
            .start_training(config, &mut session.rng, &session.config.animation, Utc::now())
            .and_then(|run| {
                let outcome = serde_json::to_value(&run.outcome)?;
                Ok(run.map(|_| outcome))
            })
    };
    match started {
        Ok(run) => respond_with_run(Module::ModelLab, run),
        Err(err) => ApiError(err).into_response(),
    }
}

/// The module stays busy for as long as the client animates the script
fn respond_with_run(module: Module, run: Run<Value>) -> Response {
    let (outcome, script, ticket) = run.into_script();
    let duration = script_duration(&script);

    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        drop(ticket);
    });

    tracing::info!("{} run: {} keyframes over {:?}", module.key(), script.len(), duration);
    Json(ApiResponse::ok(RunResponse {
        module: module.key(),
        outcome,
        duration_ms: duration.as_millis() as u64,
        script,
    }))
    .into_response()
}

/// POST /api/modules/:module/select
async fn select(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<SelectRequest>,
) -> Response {
    let module = match module_param(&key) {
        Ok(module) => module,
        Err(err) => return err.into_response(),
    };
    let mut session = match state.lock() {
        Ok(session) => session,
        Err(response) => return response,
    };
    if session.is_running(module) {
        return ApiError(CommandCenterError::Busy(module.key())).into_response();
    }

    match apply_selection(&mut session, module, &request) {
        Ok(notice) => Json(ApiResponse::ok(SelectResponse {
            fragments: session.render(module),
            notice,
        }))
        .into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

fn apply_selection(
    session: &mut Session,
    module: Module,
    request: &SelectRequest,
) -> slm_command_center::Result<Option<Notice>> {
    let key = request.key.as_str();
    let checked = request.checked.unwrap_or(true);

    match (module, request.kind.as_str()) {
        (Module::CostTicker, "api-model") => session.cost.select_api_model(key)?,
        (Module::CostTicker, "slm-model") => session.cost.select_slm_model(key)?,
        (Module::CostTicker, "volume") => {
            let volume = key
                .parse()
                .map_err(|_| CommandCenterError::invalid(format!("volume must be a whole number, got '{}'", key)))?;
            session.cost.set_daily_volume(volume);
        }
        (Module::RagCitations, "source") => session.rag.highlight_source(key)?,
        (Module::Guardrails, "industry") => session.guardrails.set_industry(key)?,
        (Module::Guardrails, "rule") => session.guardrails.toggle_rule(key, checked)?,
        (Module::ModelArena, "industry") => session.arena.set_industry(key)?,
        (Module::ModelArena, "model") => session.arena.toggle_model(key, checked)?,
        (Module::ModelArena, "quantization") => session.arena.set_quantization(key)?,
        (Module::FineTuning, "industry") => return session.fine_tuning.select_industry(key).map(Some),
        (Module::FineTuning, "query") => {
            let index = key
                .parse()
                .map_err(|_| CommandCenterError::unknown("query", key))?;
            session.fine_tuning.select_query(index)?;
        }
        (Module::ModelLab, "technique") => {
            session.model_lab.show_technique(key)?;
        }
        (Module::InfraRecommender, "compliance") => session.infra.toggle_compliance(key)?,
        (Module::InfraRecommender, "reset") => session.infra.reset(),
        (Module::InfraRecommender, "schedule-demo") => return Ok(Some(session.infra.schedule_demo())),
        (Module::InfraRecommender, field) => session.infra.select(Field::from_key(field)?, key)?,
        (Module::DataSovereignty, "architecture") => session.sovereignty.set_architecture(key)?,
        (Module::DataSovereignty, "framework") => {
            session.sovereignty.toggle_framework(key)?;
        }
        (_, kind) => {
            return Err(CommandCenterError::invalid(format!(
                "{} has no '{}' selection",
                module.key(),
                kind
            )))
        }
    }
    Ok(None)
}

/// GET /api/modules/:module/export - JSON download
async fn export_module(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let module = match module_param(&key) {
        Ok(module) => module,
        Err(err) => return err.into_response(),
    };
    let exported = match state.lock() {
        Ok(session) => session
            .export(module, Utc::now())
            .and_then(|doc| Ok((doc.to_pretty_json()?, doc.file_name))),
        Err(response) => return response,
    };

    match exported {
        Ok((body, file_name)) => {
            let notice = match module {
                Module::DataSovereignty => DataSovereignty::exported_notice(),
                Module::InfraRecommender => InfraRecommender::generated_notice(),
                _ => Notice::success(format!("Exported {}", file_name)),
            };
            tracing::info!("{}", notice);
            (
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => ApiError(err).into_response(),
    }
}

fn app(state: AppState, assets: PathBuf) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/train", post(train))
        .route("/modules", get(list_modules))
        .route("/modules/:module", get(get_fragments))
        .route("/modules/:module/run", post(run_module))
        .route("/modules/:module/select", post(select))
        .route("/modules/:module/export", get(export_module))
        .with_state(state.clone());

    // Build main router
    Router::new()
        .route("/", get(serve_index))
        .route("/index.html", get(serve_index))
        .route("/pages/:file", get(serve_page))
        .with_state(state)
        .nest("/api", api_routes)
        .nest_service("/css", ServeDir::new(assets))
        .layer(CorsLayer::permissive())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    println!("🌐 SLM Command Center - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    let addr = cli.addr.clone().unwrap_or_else(|| config.server.addr.clone());
    println!("✓ Configuration loaded: {:?}", cli.config);

    // Create shared state
    let session = match cli.seed {
        Some(seed) => Session::with_seed(config, seed),
        None => Session::new(config),
    };
    let router = app(AppState::new(session), cli.assets);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/modules", addr);
    println!("   UI:  http://{}/", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, router).await.context("Server stopped")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app(animated: bool) -> Router {
        let mut config = Config::default();
        config.animation.enabled = animated;
        app(AppState::new(Session::with_seed(config, 5)), PathBuf::from("web/css"))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, String, Option<String>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap(), disposition)
    }

    fn json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_health_and_modules() {
        let app = test_app(false);
        let (status, body, _) = call(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["data"], "OK");

        let (_, body, _) = call(&app, "GET", "/api/modules", None).await;
        let modules = json(&body);
        assert_eq!(modules["data"].as_array().unwrap().len(), 9);
        assert_eq!(modules["data"][1]["page"], "pages/cost-ticker.html");
    }

    #[tokio::test]
    async fn test_pages_render() {
        let app = test_app(false);
        let (status, body, _) = call(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("module-cards"));

        let (status, body, _) = call(&app, "GET", "/pages/guardrails.html", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"id="guardrails-grid""#));

        let (status, _, _) = call(&app, "GET", "/pages/nope.html", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_returns_script_and_holds_module() {
        let app = test_app(true);
        let (status, body, _) = call(&app, "POST", "/api/modules/fine-tuning/run", Some("{}")).await;
        assert_eq!(status, StatusCode::OK);
        let run = json(&body);
        assert!(run["data"]["duration_ms"].as_u64().unwrap() > 1_000);
        assert!(!run["data"]["script"].as_array().unwrap().is_empty());

        // still animating on the client
        let (status, body, _) = call(&app, "POST", "/api/modules/fine-tuning/run", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json(&body)["success"], false);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let app = test_app(false);
        let (status, _, _) = call(&app, "POST", "/api/modules/warp-drive/run", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = call(&app, "POST", "/api/modules/dashboard/run", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // the form is empty
        let (status, body, _) = call(&app, "POST", "/api/modules/infra-recommender/run", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["error"].as_str().unwrap().contains("incomplete"));

        let (status, _, _) = call(
            &app,
            "POST",
            "/api/modules/guardrails/select",
            Some(r#"{"kind":"industry","key":"aerospace"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_infra_form_flow() {
        let app = test_app(false);
        for (kind, key) in [
            ("industry", "healthcare"),
            ("useCase", "rag"),
            ("volume", "medium"),
            ("latency", "interactive"),
            ("budget", "growth"),
        ] {
            let body = format!(r#"{{"kind":"{}","key":"{}"}}"#, kind, key);
            let (status, _, _) = call(&app, "POST", "/api/modules/infra-recommender/select", Some(&body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body, _) = call(&app, "POST", "/api/modules/infra-recommender/run", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["data"]["outcome"]["model"]["id"], "mistral-7b");
    }

    #[tokio::test]
    async fn test_select_returns_notice() {
        let app = test_app(false);
        let (status, body, _) = call(
            &app,
            "POST",
            "/api/modules/fine-tuning/select",
            Some(r#"{"kind":"industry","key":"legal"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = &json(&body)["data"];
        assert_eq!(data["notice"]["level"], "info");
        assert!(!data["fragments"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_train_with_config() {
        let app = test_app(false);
        let (status, body, _) = call(
            &app,
            "POST",
            "/api/train",
            Some(r#"{"baseModel":"phi-3.5","domain":"legal","technique":"qlora","examples":1000}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(json(&body)["data"]["outcome"]["config"]["domain"], "legal");
    }

    #[tokio::test]
    async fn test_export_download() {
        let app = test_app(false);
        let (status, body, disposition) = call(&app, "GET", "/api/modules/guardrails/export", None).await;
        assert_eq!(status, StatusCode::OK);
        let disposition = disposition.unwrap();
        assert!(disposition.starts_with("attachment; filename=\"guardrails-config-"));
        assert!(json(&body).is_object());

        // nothing trained yet
        let (status, _, _) = call(&app, "GET", "/api/modules/model-lab/export", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

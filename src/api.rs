//! REST API and page server for the BI dashboard
//!
//! Serves the HTML pages and the JSON endpoints the page script calls.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::charts;
use crate::config::DashboardConfig;
use crate::dashboard::{self, Page, PageContext};
use crate::error::DashboardError;
use crate::history::{ChatHistoryStore, ChatTurn};
use crate::models::Domain;
use crate::orchestrator::LeadOrchestrator;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub query: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
    pub session: Option<String>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn fail(err: DashboardError) -> ApiResult {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ApiResponse::error(err.to_string())))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<LeadOrchestrator>,
    pub history: Arc<ChatHistoryStore>,
    pub config: Arc<DashboardConfig>,
}

impl ApiState {
    pub fn new(config: DashboardConfig, orchestrator: LeadOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            history: Arc::new(ChatHistoryStore::new(config.chat_history_limit)),
            config: Arc::new(config),
        }
    }
}

/// =============================
/// Session Ids
/// =============================

fn stable_uuid_from_string(input: &str) -> uuid::Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    uuid::Uuid::from_bytes(bytes)
}

/// Free-form session names map to a stable id; absent ones start a new session
fn session_uuid(value: Option<&str>) -> uuid::Uuid {
    match value {
        Some(v) if !v.trim().is_empty() => {
            uuid::Uuid::parse_str(v).unwrap_or_else(|_| stable_uuid_from_string(v))
        }
        _ => uuid::Uuid::new_v4(),
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Pages
/// =============================

async fn index(State(state): State<ApiState>) -> Html<String> {
    Html(render(&state, Page::Overview, None).await)
}

async fn page(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> (StatusCode, Html<String>) {
    match slug.parse::<Page>() {
        Ok(page) => (
            StatusCode::OK,
            Html(render(&state, page, params.session.as_deref()).await),
        ),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Html(format!("<h1>Not found</h1><p>{}</p>", dashboard::escape(&e.to_string()))),
        ),
    }
}

async fn render(state: &ApiState, page: Page, session: Option<&str>) -> String {
    let executive_summary = match page {
        Page::Overview => Some(state.orchestrator.executive_summary().await),
        _ => None,
    };

    let (session_id, chat_turns) = match (page, session) {
        (Page::Chat, Some(raw)) if !raw.trim().is_empty() => {
            let id = session_uuid(Some(raw));
            (Some(id.to_string()), state.history.turns(id).await)
        }
        _ => (None, Vec::new()),
    };

    let ctx = PageContext {
        orchestrator: &state.orchestrator,
        masked_key: state.config.llm.masked_key(),
        executive_summary,
        session_id,
        chat_turns,
    };
    dashboard::render_page(page, &ctx)
}

/// =============================
/// KPI & Chart Endpoints
/// =============================

async fn kpis(State(state): State<ApiState>, Path(domain): Path<String>) -> ApiResult {
    let domain = match domain.parse::<Domain>() {
        Ok(d) => d,
        Err(e) => return fail(e),
    };
    let store = state.orchestrator.kpis();

    ok(serde_json::json!({
        "domain": domain,
        "status": store.status(domain),
        "missing_keys": store.missing_keys(domain),
        "record": store.record(domain),
    }))
}

async fn domain_charts(State(state): State<ApiState>, Path(domain): Path<String>) -> ApiResult {
    match domain.parse::<Domain>() {
        Ok(domain) => ok(charts::domain_charts(domain, state.orchestrator.kpis().record(domain))),
        Err(e) => fail(e),
    }
}

/// =============================
/// Chat Endpoints
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => {
            warn!("Rejected chat request: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!(
                    "Invalid chat request: {}",
                    rejection.body_text()
                ))),
            );
        }
    };

    let query = req.query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Query must not be empty".into())),
        );
    }

    let session_id = session_uuid(req.session_id.as_deref());
    info!(session_id = %session_id, "Received chat query");

    let result = state.orchestrator.process_query(query).await;
    if !result.success {
        warn!(routed_to = %result.routed_to, "Agent returned an error: {}", result.response);
    }
    state
        .history
        .append(session_id, ChatTurn::from_result(&result))
        .await;

    ok(serde_json::json!({
        "session_id": session_id,
        "routed_to": result.routed_to,
        "agent_id": result.agent_response.agent_id,
        "success": result.success,
        "response": result.response,
    }))
}

async fn chat_history(State(state): State<ApiState>, Path(session_id): Path<String>) -> ApiResult {
    let id = session_uuid(Some(&session_id));
    ok(serde_json::json!({
        "session_id": id,
        "turns": state.history.turns(id).await,
    }))
}

async fn clear_chat_history(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> ApiResult {
    let id = session_uuid(Some(&session_id));
    state.history.clear(id).await;
    info!(session_id = %id, "Cleared chat history");
    ok(serde_json::json!({ "session_id": id, "cleared": true }))
}

/// =============================
/// Agent Endpoints
/// =============================

async fn run_analysis(
    State(state): State<ApiState>,
    Path((domain, analysis)): Path<(String, String)>,
) -> ApiResult {
    let domain = match domain.parse::<Domain>() {
        Ok(d) => d,
        Err(e) => return fail(e),
    };

    match state.orchestrator.domain_agent(domain).run_analysis(&analysis).await {
        Ok(response) => ok(response),
        Err(e) => fail(e),
    }
}

async fn executive_summary(State(state): State<ApiState>) -> ApiResult {
    let summary = state.orchestrator.executive_summary().await;
    ok(serde_json::json!({ "summary": summary }))
}

async fn status(State(state): State<ApiState>) -> ApiResult {
    let orchestrator = &state.orchestrator;
    let store = orchestrator.kpis();

    let kpi_status: serde_json::Map<String, serde_json::Value> = Domain::ALL
        .iter()
        .map(|d| {
            (
                d.as_str().to_string(),
                serde_json::to_value(store.status(*d)).unwrap_or_default(),
            )
        })
        .collect();

    ok(serde_json::json!({
        "ai_enabled": orchestrator.ai_enabled(),
        "model": orchestrator.model(),
        "api_key": state.config.llm.masked_key(),
        "data_dir": store.data_dir().display().to_string(),
        "kpis": kpi_status,
        "agents": orchestrator.agent_statuses(),
    }))
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .route("/pages/:page", get(page))
        .route("/api/kpis/:domain", get(kpis))
        .route("/api/charts/:domain", get(domain_charts))
        .route("/api/chat", post(chat_handler))
        .route(
            "/api/chat/:session_id",
            get(chat_history).delete(clear_chat_history),
        )
        .route("/api/agents/:domain/analyses/:analysis", post(run_analysis))
        .route("/api/executive-summary", get(executive_summary))
        .route("/api/status", get(status))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(state: ApiState, port: u16) -> crate::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Dashboard listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::{handle, sample_store, MockCompletionClient};
    use crate::kpi::KpiStore;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    fn state_with(orchestrator: LeadOrchestrator) -> ApiState {
        let config = DashboardConfig::from_lookup(|_| None).unwrap();
        ApiState::new(config, orchestrator)
    }

    async fn send(router: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json(bytes: &[u8]) -> ApiResponse {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_session_ids() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(session_uuid(Some(&id.to_string())), id);
        assert_eq!(session_uuid(Some("alice")), session_uuid(Some("alice")));
        assert_ne!(session_uuid(None), session_uuid(None));
    }

    #[tokio::test]
    async fn test_health() {
        let router = create_router(state_with(LeadOrchestrator::new(sample_store(), None)));
        let (status, body) = send(router, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_chat_routes_and_records_history() {
        let client = MockCompletionClient::ok("Headcount is 290.");
        let router = create_router(state_with(LeadOrchestrator::new(sample_store(), handle(&client))));

        let (status, body) = send(
            router.clone(),
            Method::POST,
            "/api/chat",
            Some(serde_json::json!({"session_id": "demo", "query": "How many employees do we have?"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = json(&body).data.unwrap();
        assert_eq!(data["routed_to"], "hr");
        assert_eq!(data["response"], "Headcount is 290.");

        let (_, body) = send(router.clone(), Method::GET, "/api/chat/demo", None).await;
        let turns = json(&body).data.unwrap()["turns"].as_array().unwrap().len();
        assert_eq!(turns, 1);

        send(router.clone(), Method::DELETE, "/api/chat/demo", None).await;
        let (_, body) = send(router, Method::GET, "/api/chat/demo", None).await;
        assert!(json(&body).data.unwrap()["turns"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_without_api_key_reports_error_text() {
        let router = create_router(state_with(LeadOrchestrator::new(sample_store(), None)));

        let (status, body) = send(
            router,
            Method::POST,
            "/api/chat",
            Some(serde_json::json!({"query": "random unrelated text"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = json(&body).data.unwrap();
        assert_eq!(data["routed_to"], "general");
        assert_eq!(data["success"], false);
        assert!(data["response"].as_str().unwrap().contains("AI features are disabled"));
    }

    #[tokio::test]
    async fn test_empty_chat_query_is_rejected() {
        let router = create_router(state_with(LeadOrchestrator::new(sample_store(), None)));
        let (status, _) = send(
            router,
            Method::POST,
            "/api/chat",
            Some(serde_json::json!({"query": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_chat_body_uses_error_envelope() {
        let router = create_router(state_with(LeadOrchestrator::new(sample_store(), None)));

        let (status, body) = send(
            router.clone(),
            Method::POST,
            "/api/chat",
            Some(serde_json::json!({"session_id": "x"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let response = json(&body);
        assert!(!response.success);
        assert!(response.error.unwrap().contains("query"));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/chat")
            .body(Body::from("not json"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!json(&bytes).success);
    }

    #[tokio::test]
    async fn test_unknown_domain_and_analysis_are_not_found() {
        let router = create_router(state_with(LeadOrchestrator::new(sample_store(), None)));

        let (status, body) = send(router.clone(), Method::GET, "/api/kpis/marketing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!json(&body).success);

        let (status, _) = send(router.clone(), Method::POST, "/api/agents/hr/analyses/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(router, Method::GET, "/pages/admin", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pages_render_without_kpi_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(KpiStore::load(dir.path()));
        let router = create_router(state_with(LeadOrchestrator::new(store, None)));

        for uri in ["/", "/pages/chat", "/pages/sales", "/pages/hr", "/pages/finance", "/pages/settings"] {
            let (status, body) = send(router.clone(), Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert!(String::from_utf8(body).unwrap().contains("Data files not found"));
        }

        let (status, body) = send(router, Method::GET, "/api/charts/finance", None).await;
        assert_eq!(status, StatusCode::OK);
        let charts = json(&body).data.unwrap();
        assert!(charts.as_array().unwrap().iter().all(|c| c["placeholder"] == true));
    }

    #[tokio::test]
    async fn test_status_reports_configuration() {
        let router = create_router(state_with(LeadOrchestrator::new(sample_store(), None)));
        let (_, body) = send(router, Method::GET, "/api/status", None).await;
        let data = json(&body).data.unwrap();

        assert_eq!(data["ai_enabled"], false);
        assert_eq!(data["api_key"], "Not set");
        assert_eq!(data["kpis"]["sales"]["state"], "loaded");
        assert_eq!(data["agents"].as_array().unwrap().len(), 3);
    }
}

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::auth::{AuthService, AuthUser};
use crate::chart::{ChartKind, ChartSpec, PaletteName, RenderSequencer};
use crate::config::Config;
use crate::error::AppError;
use crate::history::RecordStore;
use crate::insight::{
    fallback_response, prompt_document, InFlightGuard, InsightClient, InsightSource, PromptKind,
    SessionRegistry,
};
use crate::profile::column_summary;
use crate::render2d;
use crate::render3d::Bar3dScene;
use crate::table::{validate_upload, SpreadsheetTable, MAX_UPLOAD_BYTES};

/// Header carrying the client's per-tab insight session id
const SESSION_HEADER: &str = "x-session-id";

/// Shared state behind every handler
pub struct AppState {
    auth: AuthService,
    records: RecordStore,
    insight_client: Option<InsightClient>,
    insights: SessionRegistry,
    sequencer: RenderSequencer,
}

#[derive(Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct UpdateProfileRequest {
    name: String,
    email: String,
}

#[derive(Deserialize)]
struct SaveAnalysisRequest {
    filename: String,
    #[serde(rename = "chartType")]
    chart_type: String,
    #[serde(rename = "excelData")]
    excel_data: serde_json::Value,
}

#[derive(Deserialize)]
struct ChartRequest {
    table: SpreadsheetTable,
    #[serde(rename = "xColumn")]
    x_column: String,
    #[serde(rename = "yColumn")]
    y_column: String,
    kind: ChartKind,
    palette: PaletteName,
}

#[derive(Deserialize)]
struct InsightRequest {
    table: SpreadsheetTable,
    #[serde(rename = "datasetName")]
    dataset_name: String,
    #[serde(flatten)]
    prompt: PromptKind,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let insight_client = match &config.hf_api_key {
            Some(key) => Some(InsightClient::new(config.hf_api_url.clone(), key.clone())?),
            None => None,
        };

        Ok(AppState {
            auth: AuthService::new(&config.data_dir, &config.jwt_secret)?,
            records: RecordStore::open(&config.data_dir)?,
            insight_client,
            insights: SessionRegistry::new(),
            sequencer: RenderSequencer::new(),
        })
    }
}

/// Build the full route table over a shared state
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/auth/update-profile", put(update_profile))
        .route("/analysis/save", post(save_analysis))
        .route("/analysis/history", get(analysis_history))
        .route("/analysis/:id", delete(delete_analysis))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/api/upload", post(upload))
        .route("/api/chart", post(render_chart))
        .route("/api/chart/export", post(export_chart))
        .route("/api/insights", post(generate_insight).get(list_insights))
        .route("/api/insights/transcript", get(insight_transcript))
        .merge(protected)
        // Accept workbooks up to the advisory ceiling; the margin covers
        // multipart framing. The size rule itself lives in validate_upload.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        // The browser client is served from a different origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(&config)?);
    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind).await?;
    log::info!("listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Token middleware for the protected routes
///
/// The Authorization header carries the raw token value, no scheme prefix.
/// A verified token attaches an [`AuthUser`] extension for the handler.
async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Auth("Unauthorized, JWT token wrong or expired".to_string())
        })?;

    let user = state.auth.verify_token(token)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.signup(&body.name, &body.email, &body.password)?;
    log::info!("new account registered: {}", body.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "User registered successfully" })),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let success = state.auth.login(&body.email, &body.password)?;
    let mut response = serde_json::to_value(&success)
        .map_err(|e| AppError::internal("serialize login response", e))?;
    response["success"] = json!(true);
    Ok(Json(response))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.auth.update_profile(&user.id, &body.name, &body.email)?;
    Ok(Json(json!({ "success": true, "user": updated })))
}

async fn save_analysis(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Json(body): Json<SaveAnalysisRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.records.create(
        &user.id,
        &body.filename,
        &body.chart_type,
        body.excel_data,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Analysis saved successfully",
            "analysis": record,
        })),
    ))
}

async fn analysis_history(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "history": state.records.list(&user.id),
    }))
}

async fn delete_analysis(
    State(state): State<Arc<AppState>>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.records.delete(&user.id, id)?;
    Ok(Json(json!({
        "success": true,
        "message": "Analysis deleted successfully"
    })))
}

/// Accept an .xlsx/.xls upload and answer with the parsed table
///
/// The response carries the table itself plus a per-column sample profile,
/// so the client can populate the axis pickers and the stats sidebar from
/// one round trip.
async fn upload(mut multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Upload failed: {}", e)))?;

        validate_upload(&filename, bytes.len())?;
        let table = SpreadsheetTable::from_xlsx(&bytes)?;
        log::info!(
            "parsed upload {} ({} rows x {} columns)",
            filename,
            table.row_count(),
            table.column_count()
        );

        // BTreeMap keeps profile output in a stable order.
        let profiles: BTreeMap<&String, String> = table
            .headers
            .iter()
            .map(|h| (h, column_summary(&table, h)))
            .collect();

        return Ok(Json(json!({
            "success": true,
            "filename": filename,
            "rowCount": table.row_count(),
            "columnCount": table.column_count(),
            "profiles": profiles,
            "table": table,
        })));
    }

    Err(AppError::Validation("No file field in upload".to_string()))
}

/// Render a chart as PNG
///
/// Specs are sequenced so a stale render never overwrites a newer one when
/// the client fires overlapping recomputations.
async fn render_chart(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChartRequest>,
) -> Result<Response, AppError> {
    let ticket = state.sequencer.begin();
    let spec = ChartSpec::build(
        &body.table,
        &body.x_column,
        &body.y_column,
        body.kind,
        body.palette,
    )?;

    let png = match spec.kind {
        ChartKind::Bar3d => Bar3dScene::from_spec(&spec).render_png()?,
        _ => render2d::render_png(&spec)?,
    };

    if !state.sequencer.commit(ticket) {
        log::debug!("discarding stale chart render (ticket {})", ticket);
        return Err(AppError::Validation(
            "Chart request superseded by a newer one".to_string(),
        ));
    }

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn export_chart(
    Json(body): Json<ChartRequest>,
) -> Result<impl IntoResponse, AppError> {
    let spec = ChartSpec::build(
        &body.table,
        &body.x_column,
        &body.y_column,
        body.kind,
        body.palette,
    )?;
    let data_url = render2d::export_base64(&spec)?;
    Ok(Json(json!({ "success": true, "dataUrl": data_url })))
}

/// Insight session key for a request; absent ids share one anonymous bucket
fn session_key(headers: &HeaderMap) -> &str {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anonymous")
}

/// Run an analysis question against the AI collaborator
///
/// Any collaborator failure (or a missing API key) degrades to the offline
/// fallback generator; the response then carries a `warning` and its
/// `source` reads `fallback` instead of `ai`. The in-flight flag is held by
/// a guard, so a requester disconnecting mid-call cannot wedge the session.
async fn generate_insight(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<InsightRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.insights.session(session_key(&headers));
    let _guard = InFlightGuard::begin(&session)?;

    let document = prompt_document(&body.table, &body.dataset_name);
    let attempted = match &state.insight_client {
        Some(client) => Some(client.analyze(&document, &body.prompt).await),
        None => None,
    };

    let (response_text, source, warning) = match attempted {
        Some(Ok(text)) => (text, InsightSource::Ai, None),
        Some(Err(err)) => {
            log::warn!("insight request degraded to fallback: {}", err);
            (
                fallback_response(&body.prompt, &body.table),
                InsightSource::Fallback,
                Some("AI service unavailable; showing an offline analysis".to_string()),
            )
        }
        None => (
            fallback_response(&body.prompt, &body.table),
            InsightSource::Fallback,
            Some("AI service not configured; showing an offline analysis".to_string()),
        ),
    };

    let insight = session
        .lock()
        .unwrap()
        .record(body.prompt.prompt_text(), response_text, source)
        .clone();

    Ok(Json(json!({
        "success": true,
        "insight": insight,
        "warning": warning,
    })))
}

async fn list_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session = state.insights.session(session_key(&headers));
    let insights = session.lock().unwrap().insights().to_vec();
    Json(json!({ "success": true, "insights": insights }))
}

/// Download one session's insights as a plain-text transcript
async fn insight_transcript(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session = state.insights.session(session_key(&headers));
    let transcript = session.lock().unwrap().transcript();
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"ai-insights.txt\"",
            ),
        ],
        transcript,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn test_router(dir: &std::path::Path) -> Router {
        let config = Config {
            bind: "127.0.0.1:0".to_string(),
            data_dir: dir.to_path_buf(),
            jwt_secret: "router-test-secret".to_string(),
            hf_api_url: "http://localhost:1/unused".to_string(),
            hf_api_key: None,
        };
        build_router(Arc::new(AppState::new(&config).unwrap()))
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn signup_and_login(router: &Router) -> String {
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/signup",
                json!({ "name": "Ana", "email": "ana@example.com", "password": "pw123456" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/login",
                json!({ "email": "ana@example.com", "password": "pw123456" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        body["jwtToken"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn signup_login_and_save_flow() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());
        let token = signup_and_login(&router).await;

        let mut save = json_request(
            "POST",
            "/analysis/save",
            json!({ "filename": "q1.xlsx", "chartType": "Bar", "excelData": [] }),
        );
        save.headers_mut()
            .insert(header::AUTHORIZATION, token.parse().unwrap());
        let response = router.clone().oneshot(save).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["analysis"]["filename"], "q1.xlsx");
        assert_eq!(body["analysis"]["chartType"], "Bar");

        let mut history = HttpRequest::builder()
            .method("GET")
            .uri("/analysis/history")
            .body(Body::empty())
            .unwrap();
        history
            .headers_mut()
            .insert(header::AUTHORIZATION, token.parse().unwrap());
        let response = router.clone().oneshot(history).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed["history"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn protected_routes_take_the_raw_token_only() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());
        let token = signup_and_login(&router).await;

        // Missing header
        let response = router
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .method("GET")
                    .uri("/analysis/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // A Bearer prefix makes the value an invalid token.
        let mut prefixed = HttpRequest::builder()
            .method("GET")
            .uri("/analysis/history")
            .body(Body::empty())
            .unwrap();
        prefixed.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        let response = router.clone().oneshot(prefixed).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Unauthorized, JWT token wrong or expired");
    }

    #[tokio::test]
    async fn deleting_a_missing_analysis_is_a_404() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());
        let token = signup_and_login(&router).await;

        let mut request = HttpRequest::builder()
            .method("DELETE")
            .uri(format!("/analysis/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, token.parse().unwrap());
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Analysis not found or you do not have permission to delete it"
        );
    }

    #[tokio::test]
    async fn saving_an_unknown_chart_type_is_rejected() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());
        let token = signup_and_login(&router).await;

        let mut save = json_request(
            "POST",
            "/analysis/save",
            json!({ "filename": "q1.xlsx", "chartType": "Donut", "excelData": [] }),
        );
        save.headers_mut()
            .insert(header::AUTHORIZATION, token.parse().unwrap());
        let response = router.clone().oneshot(save).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_a_403() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());
        signup_and_login(&router).await;

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/login",
                json!({ "email": "ana@example.com", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Authentication failed! Email or Password is wrong");
    }

    #[tokio::test]
    async fn insights_without_an_api_key_degrade_to_fallback() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());

        let table = json!({
            "headers": ["Region", "Sales"],
            "rows": [
                { "Region": "North", "Sales": 120.0 },
                { "Region": "South", "Sales": 80.0 }
            ]
        });
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/insights",
                json!({
                    "table": table,
                    "datasetName": "sales.xlsx",
                    "kind": "summary"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["insight"]["source"], "fallback");
        assert!(body["warning"].as_str().unwrap().contains("offline"));
        assert!(body["insight"]["responseText"]
            .as_str()
            .unwrap()
            .contains("2 rows with 2 columns"));

        // The session list now carries the recorded insight.
        let response = router
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .method("GET")
                    .uri("/api/insights")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["insights"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insight_sessions_are_isolated_per_client() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());

        let table = json!({
            "headers": ["Region"],
            "rows": [{ "Region": "North" }]
        });
        let mut post = json_request(
            "POST",
            "/api/insights",
            json!({ "table": table, "datasetName": "a.xlsx", "kind": "summary" }),
        );
        post.headers_mut()
            .insert(SESSION_HEADER, "tab-alice".parse().unwrap());
        let response = router.clone().oneshot(post).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Another client's list stays empty.
        let mut list = HttpRequest::builder()
            .method("GET")
            .uri("/api/insights")
            .body(Body::empty())
            .unwrap();
        list.headers_mut()
            .insert(SESSION_HEADER, "tab-bob".parse().unwrap());
        let body = body_json(router.clone().oneshot(list).await.unwrap()).await;
        assert!(body["insights"].as_array().unwrap().is_empty());

        // The originating client still sees its own insight.
        let mut list = HttpRequest::builder()
            .method("GET")
            .uri("/api/insights")
            .body(Body::empty())
            .unwrap();
        list.headers_mut()
            .insert(SESSION_HEADER, "tab-alice".parse().unwrap());
        let body = body_json(router.clone().oneshot(list).await.unwrap()).await;
        assert_eq!(body["insights"].as_array().unwrap().len(), 1);
    }

    fn multipart_upload(filename: &str, payload: &[u8]) -> HttpRequest<Body> {
        let boundary = "insightxl-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        HttpRequest::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn mid_sized_uploads_reach_the_workbook_parser() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());

        // 3MB of junk: large enough to exceed a default body cap, small
        // enough to pass size validation, so the failure must come from the
        // parser and not from request framing.
        let payload = vec![0u8; 3 * 1024 * 1024];
        let response = router
            .clone()
            .oneshot(multipart_upload("big.xlsx", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to parse Excel file.");
    }

    #[tokio::test]
    async fn oversized_uploads_fail_size_validation_not_framing() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());

        let payload = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let response = router
            .clone()
            .oneshot(multipart_upload("huge.xlsx", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "File size must be less than 10MB");
    }

    #[tokio::test]
    async fn chart_export_rejects_the_3d_mode() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/chart/export",
                json!({
                    "table": {
                        "headers": ["Label", "Value"],
                        "rows": [{ "Label": "A", "Value": 1.0 }]
                    },
                    "xColumn": "Label",
                    "yColumn": "Value",
                    "kind": "3d",
                    "palette": "blue"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "3D chart export is not supported");
    }

    #[tokio::test]
    async fn chart_with_an_unknown_column_is_rejected() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/chart",
                json!({
                    "table": {
                        "headers": ["Label", "Value"],
                        "rows": [{ "Label": "A", "Value": 1.0 }]
                    },
                    "xColumn": "Nope",
                    "yColumn": "Value",
                    "kind": "bar",
                    "palette": "blue"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Unknown X-axis column"));
    }
}

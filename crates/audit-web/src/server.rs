//! Axum server and routes.

use crate::error::AppError;
use crate::pages;
use audit_types::{
    AuditField, AuditRecord, DashboardStats, DeadlineItem, ExportFormat, RegulationId,
};
use audit_view::{
    compliance_chart, risk_chart, AuditSession, ChartSlice, FilterOptions, FilterState,
    Notification, Page, SearchOutcome, SessionSnapshot, Settings, SettingsPatch,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub session: AuditSession,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/refresh", post(pages::refresh_dashboard))
        .route("/search", get(pages::search))
        .route("/search/rows/:id", post(pages::save_row))
        .route("/settings", get(pages::settings).post(pages::save_settings))
        .route("/view/state", get(handle_state))
        .route("/view/navigate", post(handle_navigate))
        .route("/view/filters/query", post(handle_filter_query))
        .route("/view/filters/domain", post(handle_filter_domain))
        .route("/view/filters/title", post(handle_filter_title))
        .route("/view/search", post(handle_search))
        .route("/view/results/:id/field", post(handle_set_field))
        .route("/view/results/:id/save", post(handle_save))
        .route("/view/dashboard", get(handle_dashboard))
        .route("/view/dashboard/refresh", post(handle_dashboard_refresh))
        .route("/view/dashboard/export", get(handle_export))
        .route(
            "/view/settings",
            get(handle_get_settings).post(handle_update_settings),
        )
        .route("/view/notification", get(handle_notification))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Success envelope of the JSON view API.
#[derive(Debug, Serialize)]
pub struct ViewResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ViewResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Self::with_message("Success", data)
    }

    fn with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            code: 200,
            message: message.into(),
            data: Some(data),
        })
    }
}

type ApiResult<T> = Result<Json<ViewResponse<T>>, AppError>;

async fn handle_state(State(state): State<Arc<AppState>>) -> Json<ViewResponse<SessionSnapshot>> {
    ViewResponse::ok(state.session.snapshot().await)
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub page: String,
}

async fn handle_navigate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NavigateRequest>,
) -> Json<ViewResponse<SessionSnapshot>> {
    state.session.navigate(Page::from_name(&req.page)).await;
    ViewResponse::ok(state.session.snapshot().await)
}

/// New value of one filter control; an empty value clears it.
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct FilterData {
    pub filters: FilterState,
    pub options: FilterOptions,
}

async fn filter_data(session: &AuditSession) -> Json<ViewResponse<FilterData>> {
    ViewResponse::ok(FilterData {
        filters: session.filter_state().await,
        options: session.filter_options().await,
    })
}

async fn handle_filter_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FilterRequest>,
) -> Json<ViewResponse<FilterData>> {
    state.session.set_query(req.value).await;
    filter_data(&state.session).await
}

async fn handle_filter_domain(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FilterRequest>,
) -> Json<ViewResponse<FilterData>> {
    state.session.set_domain(req.value).await;
    filter_data(&state.session).await
}

async fn handle_filter_title(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FilterRequest>,
) -> Json<ViewResponse<FilterData>> {
    state.session.set_title(req.value).await;
    filter_data(&state.session).await
}

/// Optional body of `/view/search`. A `query` is stored in the filters before searching,
/// like pressing Enter in the search box.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchData {
    /// `applied`, `superseded` or `failed`.
    pub outcome: &'static str,
    pub count: Option<usize>,
    pub results: Vec<AuditRecord>,
    pub notification: Option<Notification>,
}

async fn handle_search(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<SearchData> {
    let req: SearchRequest = if body.is_empty() {
        SearchRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::Validation(e.to_string()))?
    };
    let outcome = match req.query {
        Some(query) => state.session.submit_query(query).await,
        None => state.session.search().await,
    };
    let label = match &outcome {
        SearchOutcome::Applied(_) => "applied",
        SearchOutcome::Superseded => "superseded",
        SearchOutcome::Failed => "failed",
    };
    let data = SearchData {
        outcome: label,
        count: outcome.count(),
        results: state.session.results().await,
        notification: state.session.notification().await,
    };
    Ok(ViewResponse::with_message(label, data))
}

#[derive(Debug, Deserialize)]
pub struct FieldRequest {
    pub field: String,
    #[serde(default)]
    pub value: String,
}

async fn handle_set_field(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RegulationId>,
    Json(req): Json<FieldRequest>,
) -> ApiResult<AuditRecord> {
    let field: AuditField = req
        .field
        .parse()
        .map_err(|e: audit_types::UnknownVariant| AppError::Validation(e.to_string()))?;
    state.session.set_field_str(id, field, &req.value).await?;
    let row = state
        .session
        .results()
        .await
        .into_iter()
        .find(|r| r.id() == id)
        .ok_or_else(|| AppError::NotFound(format!("no result row with id {id}")))?;
    Ok(ViewResponse::ok(row))
}

async fn handle_save(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RegulationId>,
) -> ApiResult<Option<Notification>> {
    state.session.save(id).await?;
    Ok(ViewResponse::ok(state.session.notification().await))
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub stats: Option<DashboardStats>,
    pub compliance_chart: Vec<ChartSlice>,
    pub risk_chart: Vec<ChartSlice>,
    /// Upcoming deadlines inside the alert window.
    pub upcoming: Vec<DeadlineItem>,
    pub refreshing: bool,
}

pub(crate) async fn dashboard_data(session: &AuditSession) -> DashboardData {
    let stats = session.dashboard().stats().await;
    let today = chrono::Local::now().date_naive();
    DashboardData {
        compliance_chart: stats.as_ref().map(compliance_chart).unwrap_or_default(),
        risk_chart: stats.as_ref().map(risk_chart).unwrap_or_default(),
        upcoming: session.upcoming_deadlines(today).await,
        refreshing: session.dashboard().is_refreshing(),
        stats,
    }
}

async fn handle_dashboard(State(state): State<Arc<AppState>>) -> Json<ViewResponse<DashboardData>> {
    ViewResponse::ok(dashboard_data(&state.session).await)
}

async fn handle_dashboard_refresh(State(state): State<Arc<AppState>>) -> ApiResult<DashboardData> {
    state.session.refresh_dashboard().await?;
    Ok(ViewResponse::ok(dashboard_data(&state.session).await))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// Streams the export as an attachment named `audit_export.<format>`. Without `format`
/// the default from the settings is used.
async fn handle_export(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format = match q.format.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        Some(raw) => Some(
            raw.parse::<ExportFormat>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
        None => None,
    };
    let (format, bytes) = state.session.download_export(format).await?;
    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.file_name()),
        ),
    ];
    Ok((headers, bytes).into_response())
}

async fn handle_get_settings(State(state): State<Arc<AppState>>) -> Json<ViewResponse<Settings>> {
    ViewResponse::ok(state.session.settings().await)
}

async fn handle_update_settings(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Settings> {
    let settings = state.session.update_settings(patch).await?;
    Ok(ViewResponse::ok(settings))
}

async fn handle_notification(
    State(state): State<Arc<AppState>>,
) -> Json<ViewResponse<Option<Notification>>> {
    ViewResponse::ok(state.session.notification().await)
}

async fn handle_health() -> &'static str {
    "ok"
}

use std::sync::Arc;

use askama::Template;
use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use tower_http::trace::TraceLayer;

use crate::module::templates::{
    ColumnLayout, DashboardState, DashboardView, ExportError, FilterSelection, TemplateCache,
    CSV_MIME, EMPTY_RESULT_WARNING, export_filename, render, to_csv,
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("page rendering failed: {0}")]
    Render(#[from] askama::Error),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardPage<'a> {
    view: &'a DashboardView,
    has_data: bool,
    error: &'a str,
    warning: &'a str,
}

impl<'a> DashboardPage<'a> {
    fn new(view: &'a DashboardView) -> Self {
        Self {
            view,
            has_data: view.has_data(),
            error: view.error.as_deref().unwrap_or_default(),
            warning: view.warning.as_deref().unwrap_or_default(),
        }
    }
}

/// Shared handler state: the template cache and the configured column layout.
#[derive(Clone)]
pub struct AppState {
    cache: Arc<TemplateCache>,
    layout: Arc<ColumnLayout>,
}

impl AppState {
    pub fn new(cache: TemplateCache, layout: ColumnLayout) -> Self {
        Self {
            cache: Arc::new(cache),
            layout: Arc::new(layout),
        }
    }

    /// One fetch cycle: cached outcome, normalized rows and the request's selection.
    async fn load(&self, query: Option<&str>) -> DashboardState {
        let outcome = self.cache.get().await;
        DashboardState::new(&outcome, selection_from_query(query))
    }
}

/// Decode repeated `field=value` query parameters into a selection.
pub fn selection_from_query(query: Option<&str>) -> FilterSelection {
    let Some(query) = query else {
        return FilterSelection::default();
    };
    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => FilterSelection::from_pairs(pairs),
        Err(e) => {
            tracing::warn!("Ignoring malformed query string {:?}: {}", query, e);
            FilterSelection::default()
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/export.csv", get(export_csv))
        .route("/reset", get(reset))
        .route("/api/templates", get(api_templates))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ServiceError> {
    let dashboard = state.load(query.as_deref()).await;
    let view = render(&dashboard, &state.layout);
    let page = DashboardPage::new(&view).render()?;
    Ok(Html(page))
}

async fn export_csv(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ServiceError> {
    let dashboard = state.load(query.as_deref()).await;
    if dashboard.rows.is_empty() {
        return Ok((StatusCode::NOT_FOUND, EMPTY_RESULT_WARNING).into_response());
    }

    let rows = dashboard.filtered_rows();
    let bytes = to_csv(&rows, &state.layout)?;
    let filename = export_filename(&Local::now());
    tracing::info!("Exporting {} of {} templates as {}", rows.len(), dashboard.rows.len(), filename);

    let headers = [
        (header::CONTENT_TYPE, CSV_MIME.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];
    Ok((headers, bytes).into_response())
}

/// "Clear filters": drop the cached fetch and start over without a selection.
async fn reset(State(state): State<AppState>) -> Redirect {
    state.cache.invalidate().await;
    Redirect::to("/")
}

async fn api_templates(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Json<serde_json::Value> {
    let dashboard = state.load(query.as_deref()).await;
    let view = render(&dashboard, &state.layout);
    Json(serde_json::json!({
        "total": view.summary.total,
        "filtered": view.summary.filtered,
        "error": view.error,
        "warning": view.warning,
        "rows": view.rows,
    }))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::templates::test_support::{ManualClock, StaticSource};
    use crate::module::templates::{CSV_BOM, FetchError, parse_envelope};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    const BODY: &str = r#"{"items":[
        {"name":"welcome","state":"approved","phoneLinesNumbers":["5511999999999","5511888888888"],"botName":"bot1","category":"marketing","requesterEmail":"ana@example.com"},
        {"name":"reminder","state":"rejected","phoneLinesNumbers":["5511777777777"],"botName":"bot2","category":"utility"},
        {"name":"promo <b>","state":"approved","botName":"bot1","category":"marketing"}
    ]}"#;

    fn app_with(source: Arc<StaticSource>) -> Router {
        let cache = TemplateCache::new(source, Arc::new(ManualClock::new()), Duration::from_secs(300));
        router(AppState::new(cache, ColumnLayout::default()))
    }

    async fn get_response(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    #[test]
    fn test_selection_from_query() {
        let selection = selection_from_query(Some("state=approved&state=rejected&phoneLines=111%2C+222&x=1"));
        assert_eq!(selection.state.len(), 2);
        assert!(selection.phone_lines.contains("111, 222"));
        assert_eq!(selection_from_query(None), FilterSelection::default());
    }

    #[tokio::test]
    async fn test_index_renders_counts_and_escapes() {
        let source = Arc::new(StaticSource::ok(parse_envelope(BODY).unwrap()));
        let (status, _, body) = get_response(app_with(source), "/?category=marketing").await;
        let html = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Templates (2 found)"));
        assert!(html.contains("<strong>3</strong>"));
        assert!(html.contains("promo &#60;b&#62;") || html.contains("promo &lt;b&gt;"));
        assert!(!html.contains("promo <b>"));
        assert!(html.contains("/export.csv?category=marketing"));
    }

    #[tokio::test]
    async fn test_index_shows_fetch_error() {
        let source = Arc::new(StaticSource::failing(FetchError::Status {
            status: 401,
            url: "http://upstream/templates".to_string(),
        }));
        let (status, _, body) = get_response(app_with(source), "/").await;
        let html = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Error fetching templates: HTTP error 401"));
        assert!(html.contains(EMPTY_RESULT_WARNING));
        assert!(!html.contains("<table>"));
    }

    #[tokio::test]
    async fn test_export_csv() {
        let source = Arc::new(StaticSource::ok(parse_envelope(BODY).unwrap()));
        let (status, headers, body) = get_response(app_with(source), "/export.csv?state=approved").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], CSV_MIME);
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"botmaker_templates_"));
        assert!(disposition.ends_with(".csv\""));

        assert!(body.starts_with(CSV_BOM));
        let text = String::from_utf8(body[CSV_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "name,state,phoneLinesNumbers,botName,category,requesterEmail");
        assert!(lines[1].starts_with("welcome,approved,\"5511999999999, 5511888888888\""));
    }

    #[tokio::test]
    async fn test_export_without_data() {
        let source = Arc::new(StaticSource::ok(Vec::new()));
        let (status, _, body) = get_response(app_with(source), "/export.csv").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, EMPTY_RESULT_WARNING.as_bytes());
    }

    #[tokio::test]
    async fn test_reset_refetches() {
        let source = Arc::new(StaticSource::ok(parse_envelope(BODY).unwrap()));
        let app = app_with(source.clone());

        get_response(app.clone(), "/").await;
        get_response(app.clone(), "/?name=welcome").await;
        assert_eq!(source.calls(), 1);

        let (status, headers, _) = get_response(app.clone(), "/reset").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/");

        get_response(app, "/").await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_api_templates() {
        let source = Arc::new(StaticSource::ok(parse_envelope(BODY).unwrap()));
        let (status, _, body) = get_response(app_with(source), "/api/templates?name=reminder").await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 3);
        assert_eq!(json["filtered"], 1);
        assert_eq!(json["rows"][0]["phoneLines"], "5511777777777");
        assert_eq!(json["rows"][0]["requesterEmail"], "");
    }

    #[tokio::test]
    async fn test_health() {
        let source = Arc::new(StaticSource::ok(Vec::new()));
        let (status, _, body) = get_response(app_with(source.clone()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
        assert_eq!(source.calls(), 0);
    }
}

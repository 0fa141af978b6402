//! HTTP serving layer: JSON API plus the form-driven report page
//!
//! A thin caller of the pipeline. Handlers hand the URL string to
//! [`crate::analyzer::analyze`] on a blocking worker and marshal the result:
//! the API returns the report (or a structured error with a stable kind) as
//! JSON; the form route renders the same report into an HTML document and
//! keeps the submitted URL in the input on error.

use crate::{analyzer, AnalysisReport, AnalyzerConfig, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use log::error;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: Option<String>,
}

pub fn build_router(config: Arc<AnalyzerConfig>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/analyze", post(analyze_form))
        .route("/api/analyze", post(api_analyze))
        .with_state(config)
}

async fn run_analysis(config: Arc<AnalyzerConfig>, url: String) -> Result<AnalysisReport, Error> {
    tokio::task::spawn_blocking(move || analyzer::analyze(&config, &url))
        .await
        .map_err(|e| Error::Internal(format!("analysis task failed: {}", e)))?
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(status: StatusCode, kind: &str, message: &str) -> Response {
    (status, Json(json!({ "error": message, "kind": kind }))).into_response()
}

async fn api_analyze(
    State(config): State<Arc<AnalyzerConfig>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let url = match request.url.filter(|u| !u.trim().is_empty()) {
        Some(u) => u,
        None => return error_body(StatusCode::BAD_REQUEST, "invalid_url", "URL is required"),
    };

    match run_analysis(config, url).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            if matches!(e, Error::Internal(_)) {
                error!("analysis failed: {}", e);
            }
            error_body(status_for(&e), e.kind(), &e.to_string())
        }
    }
}

async fn home() -> Html<String> {
    Html(render_page("", None, None))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    pub url: Option<String>,
}

async fn analyze_form(
    State(config): State<Arc<AnalyzerConfig>>,
    Form(form): Form<AnalyzeForm>,
) -> Html<String> {
    let url = form.url.unwrap_or_default();
    if url.trim().is_empty() {
        return Html(render_page(&url, Some("URL is required"), None));
    }

    match run_analysis(config, url.clone()).await {
        Ok(report) => Html(render_page(&url, None, Some(&report))),
        Err(e) => {
            if matches!(e, Error::Internal(_)) {
                error!("analysis failed: {}", e);
            }
            Html(render_page(&url, Some(&e.to_string()), None))
        }
    }
}

/// Minimal HTML escaping for values interpolated into the report page.
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const PAGE_STYLE: &str = "\
body { font-family: Arial, sans-serif; max-width: 800px; margin: 20px auto; padding: 0 20px; }\n\
input[type=text] { width: 100%; padding: 8px; margin: 5px 0; }\n\
button { background: #4CAF50; color: white; padding: 10px 20px; border: none; cursor: pointer; }\n\
.success { color: #4CAF50; } .warning { color: #ff9800; } .error { color: red; }\n\
.section { background: #f9f9f9; border-radius: 5px; padding: 15px; margin: 15px 0; }\n\
.card { border: 1px solid #ddd; border-radius: 5px; padding: 10px; margin: 10px 0; }\n\
.card img { max-width: 200px; max-height: 200px; }";

/// Render the report page: form, optional inline error, optional results.
fn render_page(submitted_url: &str, error: Option<&str>, report: Option<&AnalysisReport>) -> String {
    let mut body = String::new();

    body.push_str("<h1>Image Preview Analyzer</h1>\n");
    body.push_str(&format!(
        "<form action=\"/analyze\" method=\"post\">\n\
         <label for=\"url\">URL to analyze:</label>\n\
         <input type=\"text\" id=\"url\" name=\"url\" placeholder=\"https://example.com\" value=\"{}\" required>\n\
         <button type=\"submit\">Analyze</button>\n\
         </form>\n",
        escape_html(submitted_url)
    ));

    if let Some(message) = error {
        body.push_str(&format!(
            "<div class=\"error\"><p>{}</p></div>\n",
            escape_html(message)
        ));
    }

    if let Some(report) = report {
        body.push_str(&render_report(report));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>Image Preview Analyzer</title>\n\
         <meta charset=\"utf-8\">\n<style>\n{}\n</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        PAGE_STYLE, body
    )
}

fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str("<h2>Analysis results</h2>\n");

    out.push_str("<div class=\"section\">\n<h3>Meta robots tag</h3>\n");
    if report.robots_meta.max_image_preview_large_found {
        out.push_str("<p class=\"success\">&#10003; max-image-preview:large directive found</p>\n");
    } else {
        out.push_str(
            "<p class=\"warning\">&#9888; max-image-preview:large directive not found</p>\n\
             <p>Add <code>&lt;meta name=\"robots\" content=\"max-image-preview:large\"&gt;</code> \
             to the page head.</p>\n",
        );
    }
    out.push_str("</div>\n");

    out.push_str("<div class=\"section\">\n<h3>Discover compatibility</h3>\n");
    if report.discover_compatibility.compatible {
        out.push_str("<p class=\"success\">&#10003; Compatible</p>\n");
    } else {
        out.push_str("<p class=\"warning\">&#9888; Not compatible</p>\n");
        if !report.discover_compatibility.has_large_images {
            out.push_str(&format!(
                "<p>No image reaches the required minimum width ({}px).</p>\n",
                report.discover_compatibility.minimum_width_required
            ));
        }
    }
    out.push_str("</div>\n");

    out.push_str("<div class=\"section\">\n<h3>Largest images</h3>\n");
    if report.largest_images.is_empty() {
        out.push_str("<p>No images with known dimensions were found.</p>\n");
    }
    for img in &report.largest_images {
        let url = escape_html(&img.url);
        out.push_str(&format!(
            "<div class=\"card\">\n\
             <a href=\"{url}\" target=\"_blank\"><img src=\"{url}\" alt=\"\"></a>\n\
             <div>{width} &times; {height} ({area} px&sup2;)</div>\n\
             <div><a href=\"{url}\" target=\"_blank\">{url}</a></div>\n\
             </div>\n",
            url = url,
            width = img.width,
            height = img.height,
            area = img.area,
        ));
    }
    out.push_str("</div>\n");

    out
}

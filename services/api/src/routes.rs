use crate::infra::AppState;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Local;
use course_lens::config::AnalysisConfig;
use course_lens::course::report::views::AnalysisSummary;
use course_lens::course::CourseAnalysis;
use course_lens::error::AppError;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const DEFAULT_UPLOAD_NAME: &str = "upload.imscc";

#[derive(Debug, Serialize)]
pub(crate) struct CourseAnalysisResponse {
    pub(crate) file_name: String,
    pub(crate) summary: AnalysisSummary,
    pub(crate) document: String,
}

pub(crate) fn course_routes(max_upload_bytes: usize) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/course/analysis",
            axum::routing::post(course_analysis_endpoint),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Accepts a multipart upload with an `archive` file part and an optional
/// `syllabus` text part. Unknown parts are ignored.
pub(crate) async fn course_analysis_endpoint(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CourseAnalysisResponse>, AppError> {
    let mut archive: Option<(String, Vec<u8>)> = None;
    let mut syllabus = String::new();

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("archive") => {
                let file_name = field
                    .file_name()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(DEFAULT_UPLOAD_NAME)
                    .to_owned();
                let bytes = field.bytes().await.map_err(upload_error)?;
                archive = Some((file_name, bytes.to_vec()));
            }
            Some("syllabus") => {
                syllabus = field.text().await.map_err(upload_error)?;
            }
            _ => {}
        }
    }

    let (file_name, bytes) = archive
        .ok_or_else(|| AppError::Upload("multipart field `archive` is required".to_string()))?;

    info!(
        file_name = %file_name,
        bytes = bytes.len(),
        syllabus_chars = syllabus.len(),
        "analyzing uploaded course export"
    );

    let response = analyze_upload(state.analysis.clone(), file_name, bytes, syllabus).await?;
    Ok(Json(response))
}

/// Runs the pipeline and renderer on the blocking pool; zip inflation and the
/// regex passes must not hold a runtime worker.
pub(crate) async fn analyze_upload(
    config: Arc<AnalysisConfig>,
    file_name: String,
    bytes: Vec<u8>,
    syllabus: String,
) -> Result<CourseAnalysisResponse, AppError> {
    tokio::task::spawn_blocking(move || -> Result<CourseAnalysisResponse, AppError> {
        let analysis = CourseAnalysis::run(&file_name, &bytes, &syllabus, &config)?;
        let document = analysis.render_markdown(Local::now().naive_local());
        Ok(CourseAnalysisResponse {
            file_name,
            summary: analysis.summary(),
            document,
        })
    })
    .await
    .map_err(std::io::Error::from)?
}

fn upload_error(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Upload(err.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::io::{Cursor, Write};
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const BOUNDARY: &str = "course-lens-test-boundary";

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            analysis: Arc::new(AnalysisConfig::default()),
        }
    }

    fn app(ready: bool) -> axum::Router {
        course_routes(1024 * 1024).layer(Extension(app_state(ready)))
    }

    fn sample_archive() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(
                "course_settings/course_settings.xml",
                SimpleFileOptions::default(),
            )
            .expect("member starts");
        writer
            .write_all(
                b"<course><title>Intro to Statistics</title><course_code>STA2023</course_code></course>",
            )
            .expect("member written");
        writer.finish().expect("archive finishes").into_inner()
    }

    /// (field name, optional file name, contents)
    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, contents) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/zip\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(contents);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/course/analysis")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request builds")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_is_unavailable_until_bound() {
        let response = app(false)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "initializing");
    }

    #[tokio::test]
    async fn upload_returns_summary_and_document() {
        let archive = sample_archive();
        let syllabus = b"Course Objectives:\n1. Analyze descriptive statistics for real data sets and report the results";
        let body = multipart_body(&[
            ("archive", Some("sta2023.imscc"), archive.as_slice()),
            ("syllabus", None, syllabus.as_slice()),
        ]);

        let response = app(true)
            .oneshot(upload_request(body))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = json_body(response).await;
        assert_eq!(payload["file_name"], "sta2023.imscc");
        assert_eq!(payload["summary"]["identity"]["title"], "Intro to Statistics");
        assert_eq!(payload["summary"]["syllabus_provided"], true);
        assert_eq!(payload["summary"]["objectives"]["syllabus"], 1);
        let document = payload["document"].as_str().expect("document is text");
        assert!(document.starts_with("# "));
        assert!(document.contains("STA2023"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn analysis_completes_alongside_other_requests() {
        let config = Arc::new(AnalysisConfig::default());
        let analysis = tokio::spawn(analyze_upload(
            config.clone(),
            "sta2023.imscc".to_string(),
            sample_archive(),
            String::new(),
        ));
        let Json(health) = healthcheck().await;
        assert_eq!(health["status"], "ok");

        let response = analysis
            .await
            .expect("analysis task joins")
            .expect("analysis succeeds");
        assert_eq!(response.summary.identity.code, "STA2023");
        assert!(response.document.contains("## SECTION 1: COURSE IDENTITY"));

        let rejected = analyze_upload(
            config,
            "notes.imscc".to_string(),
            b"plain text, not a zip".to_vec(),
            String::new(),
        )
        .await;
        assert!(matches!(rejected, Err(AppError::Archive(_))));
    }

    #[tokio::test]
    async fn upload_without_archive_is_rejected() {
        let body = multipart_body(&[(
            "syllabus",
            None,
            b"Course Objectives:\n1. Explain.\n".as_slice(),
        )]);

        let response = app(true)
            .oneshot(upload_request(body))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_of_non_zip_is_rejected() {
        let body = multipart_body(&[(
            "archive",
            Some("notes.imscc"),
            b"plain text, not a zip".as_slice(),
        )]);

        let response = app(true)
            .oneshot(upload_request(body))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! Upload service
//!
//! `GET /` serves a bare upload form and `POST /upload` runs the pipeline on
//! the submitted file. Every outcome other than success is a 200 response with
//! a short plain-text message.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::convert::OfficeConverter;
use crate::error::{Error, Result};
use crate::pipeline::{upload_file_name, Pipeline, CONVERSION_FAILED};

pub const NO_FILE_PART: &str = "No file part";
pub const INVALID_FORMAT: &str = "Invalid file format";

const UPLOAD_FIELD: &str = "file";

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><title>Journal PDF</title></head>
<body>
<h1>Format a manuscript</h1>
<form method="post" action="/upload" enctype="multipart/form-data">
<input type="file" name="file" accept=".docx,.pdf">
<input type="submit" value="Upload">
</form>
</body>
</html>
"#;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    uploads_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            uploads_dir: Arc::new(uploads_dir.into()),
        }
    }
}

/// Build the service router
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the uploads directory, bind, and serve until Ctrl-C
pub async fn serve(config: ServiceConfig) -> Result<()> {
    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    let pipeline = Pipeline::new(
        OfficeConverter::new(&config.office_program),
        config.assets.clone(),
    );
    let app = router(
        AppState::new(pipeline, config.uploads_dir.clone()),
        config.max_upload_bytes,
    );

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %config.bind,
        uploads = %config.uploads_dir.display(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    match handle_upload(&state, &mut multipart).await {
        Ok(response) => response,
        Err(Error::InvalidFormat(filename)) => {
            tracing::info!(filename = %filename, "rejected upload");
            message(INVALID_FORMAT)
        }
        Err(e) => {
            tracing::error!(error = %e, "upload failed");
            message(format!("An error occurred: {}", e))
        }
    }
}

async fn handle_upload(state: &AppState, multipart: &mut Multipart) -> Result<Response> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::General(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // A part without a filename is a plain form value, not a file
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::General(e.to_string()))?;
        upload = Some((filename, data));
        break;
    }

    let Some((filename, data)) = upload else {
        return Ok(message(NO_FILE_PART));
    };

    let safe_name = upload_file_name(&filename)?;
    let source = state.uploads_dir.join(&safe_name);
    tokio::fs::write(&source, &data).await?;
    tracing::info!(path = %source.display(), bytes = data.len(), "saved upload");

    let pipeline = Arc::clone(&state.pipeline);
    let result = tokio::task::spawn_blocking(move || pipeline.run(&source))
        .await
        .map_err(|e| Error::General(format!("pipeline task failed: {}", e)))?;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(Error::Conversion(detail)) => {
            tracing::error!(detail = %detail, "conversion failed");
            return Ok(message(CONVERSION_FAILED));
        }
        Err(e) => return Err(e),
    };

    let bytes = tokio::fs::read(&outcome.final_pdf).await?;
    let download_name = outcome
        .final_pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "final.pdf".to_string());

    tracing::info!(
        file = %download_name,
        pages = outcome.report.page_count,
        figure = outcome.report.body_image_drawn,
        "sending formatted PDF"
    );

    Ok(attachment(bytes, &download_name))
}

fn message(text: impl Into<String>) -> Response {
    (StatusCode::OK, text.into()).into_response()
}

fn attachment(bytes: Vec<u8>, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

use crate::error::CliError;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, FormRejection};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tonelink_core::{wav, ModemConfig, ModemError};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted upload (50 MiB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 10 * 1024 * 1024;

const WAV_CONTENT_TYPES: [&str; 3] = ["audio/wav", "audio/wave", "audio/x-wav"];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ModemConfig>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize)]
pub struct EncodeForm {
    message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeResponse {
    audio_data: String,
    file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeResponse {
    decoded_text: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// Failure half of the HTTP result, rendered as `{"error": .., "kind": ..}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "GenericDecodeError", message)
    }
}

impl From<ModemError> for ApiError {
    fn from(err: ModemError) -> Self {
        match &err {
            ModemError::Container(inner) => Self::new(
                StatusCode::BAD_REQUEST,
                err.kind(),
                format!("Audio Parse Fail: {}", inner),
            ),
            _ => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.kind(),
                format!("Decode Fail: {}", err),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{} ({})", self.message, self.kind);
        } else {
            tracing::warn!("{} ({})", self.message, self.kind);
        }
        let body = ErrorBody {
            error: self.message,
            kind: self.kind,
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/api/encode", post(encode))
        .route("/api/decode", post(decode))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(limit)),
        )
        .with_state(state)
}

pub async fn serve(config: ModemConfig, bind: SocketAddr) -> Result<(), CliError> {
    let state = AppState {
        config: Arc::new(config),
        max_upload_bytes: MAX_UPLOAD_BYTES,
    };

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn encode(
    State(state): State<AppState>,
    form: Result<Form<EncodeForm>, FormRejection>,
) -> Result<Json<EncodeResponse>, ApiError> {
    let message = match form {
        Ok(Form(EncodeForm { message: Some(message) })) if !message.is_empty() => message,
        Ok(_) => return Err(ApiError::bad_request("Message required")),
        Err(rejection) => return Err(ApiError::bad_request(rejection.body_text())),
    };

    tracing::info!("Encoding {} characters", message.chars().count());
    let config = Arc::clone(&state.config);
    let wav_bytes = tokio::task::spawn_blocking(move || tonelink_core::encode_wav(&config, &message))
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "EncodeError",
                format!("Unknown encoding error: {}", e),
            )
        })?;

    Ok(Json(EncodeResponse {
        audio_data: STANDARD.encode(&wav_bytes),
        file_name: format!("encoded_{}.wav", uuid::Uuid::new_v4()),
    }))
}

async fn decode(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DecodeResponse>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !WAV_CONTENT_TYPES.iter().any(|t| content_type.starts_with(t)) {
        return Err(ApiError::bad_request(
            "Please convert audio to WAV format before uploading",
        ));
    }

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "PayloadTooLarge", "File too large.")
        } else {
            ApiError::bad_request(rejection.body_text())
        }
    })?;

    tracing::info!("Decoding {} byte upload", body.len());
    let config = Arc::clone(&state.config);
    let text = tokio::task::spawn_blocking(move || -> Result<String, ModemError> {
        let audio = wav::decode(&body)?;
        tonelink_core::decode_samples(&config, &audio.samples, audio.sample_rate)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Server Error: {}", e)))??;

    let decoded_text = if text.is_empty() {
        "(Empty result)".to_string()
    } else {
        text
    };
    Ok(Json(DecodeResponse { decoded_text }))
}

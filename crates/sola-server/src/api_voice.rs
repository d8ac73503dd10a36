//! Audio handlers: transcription, synthesis and the full talk round trip.

use crate::{api::ApiError, api_roles::generate_role_reply, AppState};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Extension, Json, Multipart},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use sola_persona::parse_history;
use std::sync::Arc;

/// Request body for `POST /speak`.
#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

/// Response body for `POST /speak`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakResponse {
    pub audio_base64: String,
}

/// Response body for `POST /transcribe`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// Response body for `POST /talk`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TalkResponse {
    pub role_id: String,
    pub transcription: String,
    pub reply_text: String,
    pub reply_audio_base64: String,
}

/// Uploaded audio and its declared content type.
struct AudioUpload {
    bytes: Bytes,
    content_type: Option<String>,
}

/// Fields accepted by the audio routes.
#[derive(Default)]
struct AudioForm {
    file: Option<AudioUpload>,
    role_id: Option<String>,
    history: Option<String>,
}

async fn read_audio_form(mut multipart: Multipart) -> Result<AudioForm, ApiError> {
    let mut form = AudioForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read file: {}", e)))?;
                form.file = Some(AudioUpload {
                    bytes,
                    content_type,
                });
            }
            "role_id" | "history" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("invalid {name} field: {e}")))?;
                if name == "role_id" {
                    form.role_id = Some(value);
                } else {
                    form.history = Some(value);
                }
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

/// Stages the upload as WAV and runs transcription. Temporary files are gone
/// when this returns.
async fn transcribe_upload(state: &AppState, upload: &AudioUpload) -> Result<String, ApiError> {
    let staged = state
        .converter
        .stage_wav(&upload.bytes, upload.content_type.as_deref())
        .await?;
    let text = state.stt_service.transcribe(staged.path()).await?;
    Ok(text)
}

/// Handler for `POST /transcribe`.
pub async fn transcribe_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let form = read_audio_form(multipart).await?;
    let upload = form
        .file
        .ok_or_else(|| ApiError::BadRequest("no audio file provided".to_string()))?;

    let text = transcribe_upload(&state, &upload).await?;
    Ok(Json(TranscribeResponse { text }))
}

/// Handler for `POST /speak`.
pub async fn speak_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<SpeakRequest>, JsonRejection>,
) -> Result<Json<SpeakResponse>, ApiError> {
    let Json(payload) = payload?;
    let wav = state.tts_service.synthesize(&payload.text).await?;
    Ok(Json(SpeakResponse {
        audio_base64: STANDARD.encode(wav),
    }))
}

/// Handler for `POST /talk`.
///
/// History and the role are validated before any external program runs.
pub async fn talk_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TalkResponse>, ApiError> {
    let form = read_audio_form(multipart).await?;
    let upload = form
        .file
        .ok_or_else(|| ApiError::BadRequest("no audio file provided".to_string()))?;
    let history = parse_history(form.history.as_deref())?;

    let role_id = form
        .role_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| state.catalog.default_role_id().to_string());
    let role = state.catalog.get_role(&role_id)?;

    let transcription = transcribe_upload(&state, &upload).await?;
    if transcription.trim().is_empty() {
        return Err(ApiError::BadRequest("no speech recognized".to_string()));
    }

    tracing::info!(
        role_id = %role.id,
        transcript_chars = transcription.chars().count(),
        history_len = history.len(),
        "talk turn"
    );

    let reply_text = generate_role_reply(&state, role, &transcription, &history).await?;
    let wav = state.tts_service.synthesize(&reply_text).await?;

    Ok(Json(TalkResponse {
        role_id: role.id.clone(),
        transcription,
        reply_text,
        reply_audio_base64: STANDARD.encode(wav),
    }))
}

//! Role catalog, skill invocation and plain chat handlers.

use crate::{api::ApiError, AppState};
use axum::extract::{rejection::JsonRejection, Extension, Json, Path};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sola_persona::{
    build_conversation_prompt, build_skill_prompt, history_from_value, ConversationMessage,
    PublicRoleInfo, RoleDefinition,
};
use std::sync::Arc;

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response body for `POST /chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

/// Response body for `GET /roles`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RoleListResponse {
    pub roles: Vec<PublicRoleInfo>,
    pub default_role_id: String,
}

/// Request body for `POST /roles/{role_id}/skills/{skill_id}`.
#[derive(Debug, Deserialize)]
pub struct SkillInvokeRequest {
    /// Free text from the caller; required by some skills.
    #[serde(default)]
    pub input_text: Option<String>,
    /// Whether to synthesize the reply as audio.
    #[serde(default)]
    pub speak: bool,
    /// Raw history as sent. Absent is `None`; an explicit `null` is
    /// `Some(Value::Null)` and is rejected with the other non-arrays.
    #[serde(default, deserialize_with = "present")]
    pub history: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Response body for a skill invocation.
#[derive(Debug, Serialize, Deserialize)]
pub struct SkillInvokeResponse {
    pub role_id: String,
    pub skill_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_audio_base64: Option<String>,
}

/// Handler for `POST /chat`: sends the text to the model unchanged.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload?;
    let text = state.generation.generate(&payload.text).await?;
    Ok(Json(ChatResponse { text }))
}

/// Handler for `GET /roles`.
pub async fn list_roles_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<RoleListResponse> {
    let catalog = &state.catalog;
    let roles = catalog
        .list_roles()
        .iter()
        .map(|role| catalog.public_role_info(role))
        .collect();

    Json(RoleListResponse {
        roles,
        default_role_id: catalog.default_role_id().to_string(),
    })
}

/// Handler for `GET /roles/{role_id}`.
pub async fn get_role_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(role_id): Path<String>,
) -> Result<Json<PublicRoleInfo>, ApiError> {
    let role = state.catalog.get_role(&role_id)?;
    Ok(Json(state.catalog.public_role_info(role)))
}

/// Handler for `POST /roles/{role_id}/skills/{skill_id}`.
pub async fn invoke_skill_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((role_id, skill_id)): Path<(String, String)>,
    payload: Result<Json<SkillInvokeRequest>, JsonRejection>,
) -> Result<Json<SkillInvokeResponse>, ApiError> {
    let role = state.catalog.get_role(&role_id)?;
    let skill = state.catalog.get_skill(&skill_id)?;
    let Json(payload) = payload?;
    let history = history_from_value(payload.history)?;
    let prompt = build_skill_prompt(role, skill, payload.input_text.as_deref(), &history)?;

    tracing::info!(
        role_id = %role.id,
        skill_id = %skill.id,
        history_len = history.len(),
        speak = payload.speak,
        "invoking skill"
    );

    let text = state.generation.generate(&prompt).await?;

    let reply_audio_base64 = if payload.speak {
        let wav = state.tts_service.synthesize(&text).await?;
        Some(STANDARD.encode(wav))
    } else {
        None
    };

    Ok(Json(SkillInvokeResponse {
        role_id: role.id.clone(),
        skill_id: skill.id.clone(),
        text,
        reply_audio_base64,
    }))
}

/// Builds the conversation prompt for `role` and asks the model for a reply.
pub(crate) async fn generate_role_reply(
    state: &AppState,
    role: &RoleDefinition,
    user_text: &str,
    history: &[ConversationMessage],
) -> Result<String, ApiError> {
    let prompt = build_conversation_prompt(role, user_text, history);
    tracing::debug!(
        role_id = %role.id,
        history_len = history.len(),
        prompt_chars = prompt.chars().count(),
        "generating role reply"
    );
    Ok(state.generation.generate(&prompt).await?)
}

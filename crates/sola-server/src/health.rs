//! Dependency health reporting.

use crate::AppState;
use axum::extract::{Extension, Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sola_voice::locate_executable;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when every dependency is usable, `"degraded"` otherwise.
    pub status: String,
    /// UTC, seconds precision, `Z` suffix.
    pub timestamp: String,
    pub details: HealthDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDetails {
    #[serde(rename = "ffmpeg")]
    pub converter: ConverterHealth,
    pub piper: SynthesisHealth,
    #[serde(rename = "ollama")]
    pub generation: GenerationHealth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConverterHealth {
    pub available: bool,
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SynthesisHealth {
    pub binary_available: bool,
    pub binary_path: Option<String>,
    pub model_available: bool,
    pub model_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationHealth {
    pub available: bool,
    pub host: String,
    pub model: String,
    pub error: Option<String>,
}

impl HealthDetails {
    fn all_available(&self) -> bool {
        self.converter.available
            && self.piper.binary_available
            && self.piper.model_available
            && self.generation.available
    }
}

/// Handler for `GET /health`. Always answers 200; failures show up as
/// `degraded` with the reason in `details`.
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    let converter_path = locate_executable(state.converter.binary());
    let piper_path = locate_executable(state.tts_service.binary());

    let generation_error = match state.generation.check_reachable().await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(error = %e, "generation server unreachable");
            Some(e.to_string())
        }
    };

    let details = HealthDetails {
        converter: ConverterHealth {
            available: converter_path.is_some(),
            path: converter_path.map(|p| p.display().to_string()),
        },
        piper: SynthesisHealth {
            binary_available: piper_path.is_some(),
            binary_path: piper_path.map(|p| p.display().to_string()),
            model_available: state.tts_service.model_available(),
            model_path: state.tts_service.model_path().display().to_string(),
        },
        generation: GenerationHealth {
            available: generation_error.is_none(),
            host: state.generation.base_url().to_string(),
            model: state.generation.model().to_string(),
            error: generation_error,
        },
    };

    let status = if details.all_available() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        details,
    })
}

//! Tiny-sola server library logic.
//!
//! Wires the persona catalog, the audio adapters and the generation client
//! into one axum router.

pub mod api;
pub mod api_roles;
pub mod api_voice;
pub mod config;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use config::Config;
use sola_llm::{GenerationClient, GenerationError};
use sola_persona::{Catalog, CatalogError};
use sola_voice::{AudioConverter, SttService, TtsService, MAX_AUDIO_INPUT_BYTES};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
///
/// Built once at startup and never mutated; concurrent requests share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    /// Role and skill registry.
    pub catalog: Arc<Catalog>,
    /// Audio format converter (ffmpeg).
    pub converter: Arc<AudioConverter>,
    /// STT service.
    pub stt_service: Arc<SttService>,
    /// TTS service.
    pub tts_service: Arc<TtsService>,
    /// Generation client.
    pub generation: Arc<GenerationClient>,
}

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl AppState {
    /// Builds the state from configuration, loading the catalog from
    /// `catalog.path` when set and using the built-in catalog otherwise.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let catalog = match &config.catalog.path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin(),
        };

        Ok(Self::new(catalog, config)?)
    }

    /// Builds the state around an already-constructed catalog.
    pub fn new(catalog: Catalog, config: &Config) -> Result<Self, GenerationError> {
        Ok(Self {
            catalog: Arc::new(catalog),
            converter: Arc::new(AudioConverter::new(config.converter.binary.clone())),
            stt_service: Arc::new(SttService::new(&config.transcription)),
            tts_service: Arc::new(TtsService::new(&config.synthesis)),
            generation: Arc::new(GenerationClient::new(&config.generation)?),
        })
    }
}

/// Maximum request body size for JSON routes (2 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Headroom for multipart framing and text fields on audio routes.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let audio_routes = Router::new()
        .route("/transcribe", post(api_voice::transcribe_handler))
        .route("/talk", post(api_voice::talk_handler))
        .layer(DefaultBodyLimit::max(
            MAX_AUDIO_INPUT_BYTES + MULTIPART_OVERHEAD_BYTES,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/chat", post(api_roles::chat_handler))
        .route("/speak", post(api_voice::speak_handler))
        .route("/roles", get(api_roles::list_roles_handler))
        .route("/roles/{role_id}", get(api_roles::get_role_handler))
        .route(
            "/roles/{role_id}/skills/{skill_id}",
            post(api_roles::invoke_skill_handler),
        )
        .merge(audio_routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}

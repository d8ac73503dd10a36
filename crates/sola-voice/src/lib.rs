//! Audio adapters for the tiny-sola voice assistant.
//!
//! Wraps the three external audio programs the assistant depends on:
//! ffmpeg for format conversion, the faster-whisper command-line front end
//! for transcription, and piper for speech synthesis. Every adapter runs its
//! program as an async subprocess with a timeout, and every temporary file it
//! creates is owned by a `tempfile` guard so it is removed on all exit paths.

pub mod config;
pub mod convert;
pub mod error;
pub mod locate;
pub mod stt;
pub mod tts;

pub use config::{ConverterConfig, SynthesisConfig, TranscriptionConfig};
pub use convert::{is_wav_content_type, AudioConverter, StagedWav, MAX_AUDIO_INPUT_BYTES};
pub use error::VoiceError;
pub use locate::locate_executable;
pub use stt::SttService;
pub use tts::TtsService;

use serde::Deserialize;
use std::path::PathBuf;

fn default_stt_binary() -> PathBuf {
    PathBuf::from("whisper-ctranslate2")
}

fn default_stt_model() -> String {
    "base".to_string()
}

fn default_stt_device() -> String {
    "cpu".to_string()
}

fn default_stt_compute_type() -> String {
    "int8".to_string()
}

fn default_tts_binary() -> PathBuf {
    PathBuf::from("piper")
}

fn default_tts_model_path() -> PathBuf {
    PathBuf::from("./voices/en_US-ryan-high.onnx")
}

fn default_converter_binary() -> PathBuf {
    PathBuf::from("ffmpeg")
}

/// Settings for the faster-whisper command-line transcriber.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    /// Executable name (looked up on `PATH`) or path.
    #[serde(default = "default_stt_binary")]
    pub binary: PathBuf,
    /// Model size or model directory (e.g. `base`, `small`, `large-v3`).
    #[serde(default = "default_stt_model")]
    pub model: String,
    /// Inference device (`cpu`, `cuda`, `auto`).
    #[serde(default = "default_stt_device")]
    pub device: String,
    /// Quantization / compute precision (`int8`, `float16`, ...).
    #[serde(default = "default_stt_compute_type")]
    pub compute_type: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            binary: default_stt_binary(),
            model: default_stt_model(),
            device: default_stt_device(),
            compute_type: default_stt_compute_type(),
        }
    }
}

/// Settings for the piper speech synthesizer.
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_tts_binary")]
    pub binary: PathBuf,
    /// Voice model (`.onnx`, with its `.onnx.json` alongside).
    #[serde(default = "default_tts_model_path")]
    pub model_path: PathBuf,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            binary: default_tts_binary(),
            model_path: default_tts_model_path(),
        }
    }
}

/// Settings for the audio format converter.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    #[serde(default = "default_converter_binary")]
    pub binary: PathBuf,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            binary: default_converter_binary(),
        }
    }
}

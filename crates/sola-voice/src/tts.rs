use crate::config::SynthesisConfig;
use crate::error::VoiceError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

/// Timeout for TTS process execution.
const TTS_TIMEOUT: Duration = Duration::from_secs(120);

/// Service for generating speech from text with piper.
#[derive(Debug, Clone)]
pub struct TtsService {
    piper_binary: PathBuf,
    model_path: PathBuf,
}

impl TtsService {
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            piper_binary: config.binary.clone(),
            model_path: config.model_path.clone(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.piper_binary
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Whether the configured voice model file exists.
    pub fn model_available(&self) -> bool {
        self.model_path.exists()
    }

    /// Synthesizes speech from the given text.
    ///
    /// Returns a complete WAV file. The intermediate output file is removed on
    /// every path.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        if !self.model_available() {
            return Err(VoiceError::Tts(format!(
                "Model file not found: {:?}",
                self.model_path
            )));
        }

        let out_file = tempfile::Builder::new()
            .prefix("sola-tts-")
            .suffix(".wav")
            .tempfile()?;

        let mut command = Command::new(&self.piper_binary);
        command
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(out_file.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| VoiceError::Tts(format!("Failed to spawn piper: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| VoiceError::Tts("Failed to open stdin".to_string()))?;
        let text_owned = text.to_string();

        // Spawn a task to write to stdin to avoid deadlock if output buffer fills up
        let write_task = tokio::spawn(async move {
            stdin.write_all(text_owned.as_bytes()).await?;
            stdin.shutdown().await
        });

        let output = tokio::time::timeout(TTS_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| {
                VoiceError::Tts(format!(
                    "TTS process timed out after {} seconds",
                    TTS_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| VoiceError::Tts(format!("Failed to wait for piper: {}", e)))?;

        match write_task.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(VoiceError::Tts(format!(
                    "Failed to write to piper stdin: {}",
                    e
                )))
            }
            Err(e) => return Err(VoiceError::Tts(format!("Stdin task failed: {}", e))),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Tts(format!("Piper failed: {}", stderr)));
        }

        let wav = tokio::fs::read(out_file.path())
            .await
            .map_err(|e| VoiceError::Tts(format!("Failed to read piper output: {}", e)))?;
        if wav.is_empty() {
            return Err(VoiceError::Tts("Piper produced no audio".to_string()));
        }

        tracing::debug!(bytes = wav.len(), "speech synthesized");
        Ok(wav)
    }
}

//! Upload staging and conversion to 16 kHz mono WAV.

use crate::error::VoiceError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::Command;

/// Maximum uploaded audio size (25 MiB).
pub const MAX_AUDIO_INPUT_BYTES: usize = 25 * 1024 * 1024;

/// Timeout for a single conversion.
const CONVERT_TIMEOUT: Duration = Duration::from_secs(60);

/// Target sample rate expected by the transcriber.
const TARGET_SAMPLE_RATE: &str = "16000";

/// Whether a declared content type already names an uncompressed WAV payload.
pub fn is_wav_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) => ct.contains("wav") || ct == "audio/wave",
        None => false,
    }
}

/// A WAV file on disk that is removed when dropped.
#[derive(Debug)]
pub struct StagedWav {
    file: NamedTempFile,
}

impl StagedWav {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn temp_file(suffix: &str) -> Result<NamedTempFile, VoiceError> {
    Ok(tempfile::Builder::new()
        .prefix("sola-")
        .suffix(suffix)
        .tempfile()?)
}

/// Wraps the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct AudioConverter {
    binary: PathBuf,
}

impl AudioConverter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Converts `input` to mono 16 kHz WAV at `output`, overwriting it.
    pub async fn convert_to_wav(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-ar")
            .arg(TARGET_SAMPLE_RATE)
            .arg("-ac")
            .arg("1")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| VoiceError::Convert(format!("Failed to spawn ffmpeg: {}", e)))?;

        let status = tokio::time::timeout(CONVERT_TIMEOUT, child.wait())
            .await
            .map_err(|_| {
                VoiceError::Convert(format!(
                    "ffmpeg timed out after {} seconds",
                    CONVERT_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| VoiceError::Convert(format!("Failed to wait for ffmpeg: {}", e)))?;

        if !status.success() {
            return Err(VoiceError::Convert(format!("ffmpeg exited with {}", status)));
        }
        Ok(())
    }

    /// Writes uploaded audio to a scoped temporary file, converting it to WAV
    /// unless the declared content type is already WAV.
    ///
    /// The original upload is removed as soon as conversion finishes; the
    /// returned [`StagedWav`] removes the WAV when dropped. Every error path
    /// leaves no files behind.
    pub async fn stage_wav(
        &self,
        audio: &[u8],
        content_type: Option<&str>,
    ) -> Result<StagedWav, VoiceError> {
        if audio.len() > MAX_AUDIO_INPUT_BYTES {
            return Err(VoiceError::Convert(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio.len(),
                MAX_AUDIO_INPUT_BYTES
            )));
        }

        let upload = temp_file(".upload")?;
        tokio::fs::write(upload.path(), audio).await?;

        if is_wav_content_type(content_type) {
            return Ok(StagedWav { file: upload });
        }

        let converted = temp_file(".wav")?;
        tracing::debug!(
            content_type = content_type.unwrap_or("<none>"),
            bytes = audio.len(),
            "converting upload to 16 kHz mono wav"
        );
        self.convert_to_wav(upload.path(), converted.path()).await?;
        drop(upload);

        Ok(StagedWav { file: converted })
    }
}

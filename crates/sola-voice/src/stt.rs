use crate::config::TranscriptionConfig;
use crate::error::VoiceError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Timeout for STT process execution.
const STT_TIMEOUT: Duration = Duration::from_secs(300);

/// Speech-to-text through the faster-whisper command-line front end.
///
/// Runs `<binary> <wav> --model <m> --device <d> --compute_type <c>
/// --beam_size 1 --output_format txt --output_dir <tmp>` and reads the plain
/// text transcript it writes. The output directory is removed on return.
#[derive(Debug, Clone)]
pub struct SttService {
    binary_path: PathBuf,
    model: String,
    device: String,
    compute_type: String,
}

impl SttService {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            binary_path: config.binary.clone(),
            model: config.model.clone(),
            device: config.device.clone(),
            compute_type: config.compute_type.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Transcribes a WAV file, returning segment texts joined by single spaces.
    pub async fn transcribe(&self, wav_path: &Path) -> Result<String, VoiceError> {
        let output_dir = tempfile::Builder::new().prefix("sola-stt-").tempdir()?;

        let mut command = Command::new(&self.binary_path);
        command
            .arg(wav_path)
            .arg("--model")
            .arg(&self.model)
            .arg("--device")
            .arg(&self.device)
            .arg("--compute_type")
            .arg(&self.compute_type)
            .arg("--beam_size")
            .arg("1")
            .arg("--output_format")
            .arg("txt")
            .arg("--output_dir")
            .arg(output_dir.path())
            .arg("--verbose")
            .arg("False")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| VoiceError::Stt(format!("Failed to spawn STT binary: {}", e)))?;

        let output = tokio::time::timeout(STT_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| {
                VoiceError::Stt(format!(
                    "STT process timed out after {} seconds",
                    STT_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| VoiceError::Stt(format!("Failed to wait for STT binary: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Stt(format!("STT binary failed: {}", stderr)));
        }

        let stem = wav_path
            .file_stem()
            .ok_or_else(|| VoiceError::Stt(format!("Invalid audio path: {:?}", wav_path)))?;
        let mut file_name = stem.to_os_string();
        file_name.push(".txt");
        let transcript_path = output_dir.path().join(file_name);
        let raw = tokio::fs::read_to_string(&transcript_path)
            .await
            .map_err(|e| {
                VoiceError::Stt(format!(
                    "Failed to read transcript {:?}: {}",
                    transcript_path, e
                ))
            })?;

        let text = join_segments(&raw);
        tracing::debug!(chars = text.chars().count(), "transcription finished");
        Ok(text)
    }
}

/// Joins one-segment-per-line transcript text into a single line.
fn join_segments(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sola_persona::Catalog;
use sola_server::{app, config::Config, AppState};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "sola-test-boundary";

/// Bytes the mock synthesizer writes for every request.
pub const MOCK_WAV: &[u8] = b"RIFFmockWAVE";

/// Writes an executable shell script into `dir` and returns its path.
pub async fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let script_path = dir.join(name);
    tokio::fs::write(&script_path, format!("#!/bin/sh\n{body}"))
        .await
        .unwrap();

    let mut perms = tokio::fs::metadata(&script_path)
        .await
        .unwrap()
        .permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(&script_path, perms)
        .await
        .unwrap();

    script_path
}

/// Starts `router` on an ephemeral port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A fully mocked server: generation over a local HTTP stub, audio programs
/// as shell scripts in a temp dir.
pub struct TestServer {
    pub app: Router,
    pub dir: TempDir,
    /// Every prompt the generation stub received, in order.
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Starts the mocks. The transcriber always yields `transcript` and the
    /// model always answers `reply`.
    pub async fn start(transcript: &str, reply: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let prompts: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let captured = prompts.clone();
        let reply = reply.to_string();
        let router = Router::new()
            .route(
                "/api/generate",
                post(move |Json(body): Json<Value>| {
                    let captured = captured.clone();
                    let reply = reply.clone();
                    async move {
                        let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
                        captured.lock().unwrap().push(prompt);
                        Json(json!({ "response": reply, "done": true }))
                    }
                }),
            )
            .route("/api/tags", get(|| async { Json(json!({ "models": [] })) }));
        let host = spawn_server(router).await;

        let whisper = write_script(
            dir.path(),
            "whisper.sh",
            &format!(
                r#"in="$1"; shift
touch "$(dirname "$0")/whisper.called"
while [ $# -gt 0 ]; do
  case "$1" in
    --output_dir) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
name=$(basename "$in")
printf '%s\n' '{transcript}' > "$out/${{name%.*}}.txt"
"#
            ),
        )
        .await;

        let ffmpeg = write_script(
            dir.path(),
            "ffmpeg.sh",
            r#"touch "$(dirname "$0")/ffmpeg.called"
cp "$3" "$8"
"#,
        )
        .await;

        let piper = write_script(
            dir.path(),
            "piper.sh",
            r#"cat > "$(dirname "$0")/piper.stdin"
printf 'RIFFmockWAVE' > "$4"
"#,
        )
        .await;

        let voice_model = dir.path().join("voice.onnx");
        tokio::fs::write(&voice_model, b"onnx").await.unwrap();

        let mut config = Config::default();
        config.transcription.binary = whisper;
        config.converter.binary = ffmpeg;
        config.synthesis.binary = piper;
        config.synthesis.model_path = voice_model;
        config.generation.host = host;
        config.generation.model = "test-model".to_string();
        config.generation.timeout_secs = 5;

        let state = AppState::new(Catalog::builtin(), &config).unwrap();

        Self {
            app: app(state),
            dir,
            prompts,
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Whether the named mock program ran at least once.
    pub fn was_called(&self, program: &str) -> bool {
        self.dir.path().join(format!("{program}.called")).exists()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(&self.app, request).await
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a `multipart/form-data` POST with an optional audio file part
/// followed by plain text fields.
pub fn multipart_request(
    uri: &str,
    file: Option<(&str, &[u8])>,
    fields: &[(&str, &str)],
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();

    if let Some((content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"clip\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

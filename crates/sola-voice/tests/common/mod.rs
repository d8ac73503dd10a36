use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

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

//! Locating external executables for health reporting.

use std::path::{Path, PathBuf};

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Resolves `binary` the way a shell would.
///
/// A path with more than one component is checked directly; a bare name is
/// searched for on `PATH`. Returns `None` when nothing executable is found.
pub fn locate_executable(binary: &Path) -> Option<PathBuf> {
    if binary.as_os_str().is_empty() {
        return None;
    }

    if binary.is_absolute() || binary.components().count() > 1 {
        return is_executable(binary).then(|| binary.to_path_buf());
    }

    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

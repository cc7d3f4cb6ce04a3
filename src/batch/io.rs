//! File access used by batch export, behind a trait so hosts and tests can substitute it.

use std::path::{Path, PathBuf};

use crate::foundation::error::{MockupError, MockupResult};

/// Image extensions picked up by [`HostIo::scan_folder`].
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Result of scanning a folder for images.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderScan {
    pub path: PathBuf,
    /// Image files, sorted by path.
    pub files: Vec<PathBuf>,
}

pub trait HostIo {
    fn load_file_bytes(&mut self, path: &Path) -> MockupResult<Vec<u8>>;

    /// Write all-or-nothing, creating missing parent directories.
    fn write_image_bytes(&mut self, path: &Path, bytes: &[u8]) -> MockupResult<()>;

    fn scan_folder(&mut self, path: &Path) -> MockupResult<FolderScan>;
}

/// [`HostIo`] over the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsHost;

impl HostIo for FsHost {
    fn load_file_bytes(&mut self, path: &Path) -> MockupResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| MockupError::io(format!("read {}: {e}", path.display())))
    }

    fn write_image_bytes(&mut self, path: &Path, bytes: &[u8]) -> MockupResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                MockupError::io(format!("create directory {}: {e}", parent.display()))
            })?;
        }

        let temp_path = temp_path_for(path);
        std::fs::write(&temp_path, bytes).map_err(|e| {
            tracing::error!(path = %temp_path.display(), error = %e, "failed to write temp file");
            MockupError::io(format!("write {}: {e}", temp_path.display()))
        })?;

        std::fs::rename(&temp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            tracing::error!(
                from = %temp_path.display(),
                to = %path.display(),
                error = %e,
                "failed to rename temp file to target"
            );
            MockupError::io(format!("rename to {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote image");
        Ok(())
    }

    fn scan_folder(&mut self, path: &Path) -> MockupResult<FolderScan> {
        let rd = std::fs::read_dir(path)
            .map_err(|e| MockupError::io(format!("scan {}: {e}", path.display())))?;

        let mut files = Vec::new();
        for entry in rd.flatten() {
            let file = entry.path();
            if file.is_file() && is_image_path(&file) {
                files.push(file);
            }
        }
        files.sort();
        Ok(FolderScan {
            path: path.to_path_buf(),
            files,
        })
    }
}

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// File stem used in output names (`"shirt"` for `mockups/shirt.jpg`).
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "../../tests/unit/batch/io.rs"]
mod tests;

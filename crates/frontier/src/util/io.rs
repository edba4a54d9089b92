//! I/O utility functions

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling path used while writing `path`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `content` to `path` via a temporary sibling and a rename, so readers
/// never see a half-written report.
///
/// ```ignore
/// atomic_write(Path::new("report.json"), &json)?;
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp_path = temp_path_for(path);
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)
}

// TuneSift - platform/fs.rs
//
// Small filesystem helpers shared by the app layer.

use std::io;
use std::path::{Path, PathBuf};

/// Sibling temp path used while a file is being replaced.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace `path` with `bytes` atomically (write temp, rename to final).
///
/// Parent directories are created as needed. A crash between write and
/// rename leaves the previous file intact.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes)?;

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        e
    })
}

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a text file that must not exceed `max_size` bytes.
///
/// Returns `Ok(None)` when the file is larger than allowed so the caller can
/// report the limit in its own error type.
pub fn read_capped(path: &Path, max_size: u64) -> io::Result<Option<String>> {
    let size = std::fs::metadata(path)?.len();
    if size > max_size {
        tracing::debug!(path = %path.display(), size, max_size, "File exceeds size limit");
        return Ok(None);
    }
    read_file_lossy(path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("profile.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path(&path).exists(), "temp file must not linger");
    }

    #[test]
    fn test_read_file_lossy_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, [b'o', b'k', 0xFF]).unwrap();
        assert_eq!(read_file_lossy(&path).unwrap(), "ok\u{FFFD}");
    }

    #[test]
    fn test_read_capped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "alpha\nbeta\n").unwrap();

        assert_eq!(read_capped(&path, 100).unwrap().as_deref(), Some("alpha\nbeta\n"));
        assert_eq!(read_capped(&path, 4).unwrap(), None);
        assert!(read_capped(&dir.path().join("missing"), 100).is_err());
    }
}

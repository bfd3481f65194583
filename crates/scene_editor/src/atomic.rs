//! Write-then-rename file output

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::PersistenceError;

/// Replace `path` with `bytes`.
///
/// The data goes to a temporary file in the destination directory first;
/// the destination is only touched by the final rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| PersistenceError::io(file.path(), e))?;
    file.persist(path)
        .map_err(|e| PersistenceError::io(path, e.error))?;

    log::info!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");

        assert!(matches!(
            write_atomic(&path, b"data"),
            Err(PersistenceError::Io { .. })
        ));
        assert!(!path.exists());
    }
}

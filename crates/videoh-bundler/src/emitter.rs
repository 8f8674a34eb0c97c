//! Writes the generated configuration file.

use std::io::Write;
use std::path::Path;
use tracing::info;
use videoh_core::Result;
use videoh_core::generated::GeneratedConfig;

/// Render `config` to `path`, replacing whatever was there.
///
/// With `atomic` the content goes to a temporary file in the same directory
/// which is then renamed over `path`, so a crash never leaves a partial file.
/// An existing file keeps its permissions; a new one is created readable by
/// the owner only. Otherwise the file is truncated and written in place.
pub fn emit(path: &Path, config: &GeneratedConfig, atomic: bool) -> Result<()> {
    let content = config.render();

    if atomic {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        if let Ok(existing) = std::fs::metadata(path) {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
    } else {
        std::fs::write(path, content.as_bytes())?;
    }

    info!(path = %path.display(), keys = ?config.keys(), atomic, "Wrote generated config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> GeneratedConfig {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_emit_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        emit(&path, &pairs(&[("A", "1"), ("B", "2")]), true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\nB=2\n");
    }

    #[test]
    fn test_emit_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let config = pairs(&[("REST_API_BASE_URL", "https://api.example"), ("API_KEY", "abc")]);

        emit(&path, &config, true).unwrap();
        let first = std::fs::read(&path).unwrap();
        emit(&path, &config, true).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_emit_leaves_no_stale_keys() {
        for atomic in [true, false] {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(".env");

            emit(&path, &pairs(&[("OLD", "a-much-longer-value"), ("B", "2")]), atomic).unwrap();
            emit(&path, &pairs(&[("A", "1")]), atomic).unwrap();

            assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\n");
        }
    }

    #[test]
    fn test_atomic_emit_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        emit(&path, &pairs(&[("A", "1")]), true).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(".env")]);
    }

    #[test]
    fn test_emit_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(".env");
        assert!(emit(&path, &pairs(&[("A", "1")]), false).is_err());
        assert!(emit(&path, &pairs(&[("A", "1")]), true).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_emit_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "OLD=1\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        emit(&path, &pairs(&[("A", "1")]), true).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\n");
    }
}

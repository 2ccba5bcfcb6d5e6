//! Atomic file operations.
//!
//! Configuration and unit files are written to a temp path and renamed into
//! place so a crashed run never leaves a half-written file.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::error::InstallerError;

/// Write file atomically to prevent corruption.
pub(super) fn write_file_atomic(path: &Path, content: &str) -> Result<(), InstallerError> {
    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| InstallerError::System(format!("failed to create temp file: {e}")))?;

        file.write_all(content.as_bytes())
            .map_err(|e| InstallerError::System(format!("failed to write temp file: {e}")))?;

        file.sync_all()
            .map_err(|e| InstallerError::System(format!("failed to sync temp file: {e}")))?;
    }

    fs::rename(&temp_path, path)
        .map_err(|e| InstallerError::System(format!("failed to rename temp file: {e}")))?;

    Ok(())
}

/// Set Unix permission bits on an existing file.
pub(super) fn set_mode(path: &Path, mode: u32) -> Result<(), InstallerError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| InstallerError::System(format!("failed to read metadata: {e}")))?
        .permissions();
    perms.set_mode(mode);
    fs::set_permissions(path, perms)
        .map_err(|e| InstallerError::System(format!("failed to set permissions: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn atomic_write_replaces_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.ini");

        write_file_atomic(&path, "first").unwrap();
        write_file_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn mode_is_applied() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("secret");
        write_file_atomic(&path, "x").unwrap();
        set_mode(&path, 0o600).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

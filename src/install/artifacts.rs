//! Directory provisioning and daemon artifact copying.
//!
//! Creates the installation layout if absent, then copies the staged daemon
//! source tree and web assets into the install directory, overwriting any
//! prior copy.

use std::fs;
use std::path::Path;

use log::info;

use super::error::InstallerError;
use super::file_ops;
use super::steps::StepOutcome;
use super::target::InstallationTarget;

/// Create every directory the installation writes into. Idempotent.
pub fn provision_directories(target: &InstallationTarget) -> Result<StepOutcome, InstallerError> {
    let dirs = [
        &target.install_dir,
        &target.log_dir,
        &target.config_dir,
        &target.systemd_user_dir,
        &target.applications_dir,
    ];

    let mut created = false;
    for dir in dirs {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .map_err(|e| InstallerError::System(format!("failed to create {}: {e}", dir.display())))?;
            created = true;
        }
    }

    Ok(if created { StepOutcome::Completed } else { StepOutcome::Skipped })
}

/// Copy the staged `src/` tree and `web/` assets into the install directory
/// and mark the entry point executable.
///
/// The staged tree is expected alongside the installer; a missing tree is a
/// fatal precondition failure.
pub fn copy_artifacts(
    staging_root: &Path,
    target: &InstallationTarget,
) -> Result<StepOutcome, InstallerError> {
    let src_tree = staging_root.join("src");
    if !src_tree.is_dir() {
        return Err(InstallerError::MissingArtifact(src_tree));
    }

    copy_tree(&src_tree, &target.install_dir)?;

    let web_tree = staging_root.join("web");
    if web_tree.is_dir() {
        copy_tree(&web_tree, &target.install_dir.join("web"))?;
    }

    let entry = target.entry_point();
    if !entry.is_file() {
        return Err(InstallerError::MissingArtifact(entry));
    }
    file_ops::set_mode(&entry, 0o755)?;

    info!("daemon tree copied to {}", target.install_dir.display());
    Ok(StepOutcome::Completed)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), InstallerError> {
    fs::create_dir_all(dst)
        .map_err(|e| InstallerError::System(format!("failed to create {}: {e}", dst.display())))?;

    for entry in fs::read_dir(src)
        .map_err(|e| InstallerError::System(format!("failed to read {}: {e}", src.display())))?
    {
        let entry = entry.map_err(InstallerError::Io)?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if entry
            .file_type()
            .map_err(InstallerError::Io)?
            .is_dir()
        {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| {
                InstallerError::System(format!("failed to copy {}: {e}", from.display()))
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn stage_daemon_tree(root: &Path) {
        fs::create_dir_all(root.join("src/core")).unwrap();
        fs::write(root.join("src/daemon.py"), "#!/usr/bin/env python3\n").unwrap();
        fs::write(root.join("src/core/monitor.py"), "x = 1\n").unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(root.join("web/index.html"), "<html></html>").unwrap();
    }

    #[test]
    fn provisioning_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::from_home(tmp.path());

        assert_eq!(provision_directories(&target).unwrap(), StepOutcome::Completed);
        assert_eq!(provision_directories(&target).unwrap(), StepOutcome::Skipped);
        assert!(target.log_dir.is_dir());
    }

    #[test]
    fn copy_places_tree_and_marks_entry_executable() {
        let home = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        stage_daemon_tree(staging.path());

        let target = InstallationTarget::from_home(home.path());
        provision_directories(&target).unwrap();
        copy_artifacts(staging.path(), &target).unwrap();

        assert!(target.entry_point().is_file());
        assert!(target.install_dir.join("core/monitor.py").is_file());
        assert!(target.install_dir.join("web/index.html").is_file());

        let mode = fs::metadata(target.entry_point()).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn missing_staged_tree_is_fatal() {
        let home = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let target = InstallationTarget::from_home(home.path());
        provision_directories(&target).unwrap();

        let err = copy_artifacts(staging.path(), &target).unwrap_err();
        assert!(matches!(err, InstallerError::MissingArtifact(_)));
    }

    #[test]
    fn recopy_overwrites_prior_contents() {
        let home = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        stage_daemon_tree(staging.path());

        let target = InstallationTarget::from_home(home.path());
        provision_directories(&target).unwrap();
        copy_artifacts(staging.path(), &target).unwrap();

        fs::write(staging.path().join("src/daemon.py"), "# v2\n").unwrap();
        copy_artifacts(staging.path(), &target).unwrap();

        assert_eq!(fs::read_to_string(target.entry_point()).unwrap(), "# v2\n");
    }
}

//! Installation target paths.
//!
//! All paths the installer writes to are derived once from the invoking user's
//! home directory (or an explicit target root for isolated installs) and passed
//! to every step. Nothing outside the target root is written by the
//! unprivileged portion of the flow.

use std::path::PathBuf;

use super::error::InstallerError;

/// Application slug used for directories, the service unit, and the launcher.
pub const APP_NAME: &str = "hypr-ai-automator";

/// Name of the systemd user service supervising the daemon.
pub const SERVICE_NAME: &str = "hypr-ai-automator";

/// Local dashboard endpoint served by the daemon.
pub const DASHBOARD_URL: &str = "http://127.0.0.1:8765";

/// Absolute filesystem layout for one installation run.
#[derive(Debug, Clone)]
pub struct InstallationTarget {
    pub home: PathBuf,
    /// Daemon source tree and web assets land here.
    pub install_dir: PathBuf,
    /// Daemon log output directory.
    pub log_dir: PathBuf,
    /// User configuration directory.
    pub config_dir: PathBuf,
    /// Secrets-bearing configuration file.
    pub config_path: PathBuf,
    /// Embedded SQLite store.
    pub db_path: PathBuf,
    /// systemd user unit directory.
    pub systemd_user_dir: PathBuf,
    /// Desktop-entry directory.
    pub applications_dir: PathBuf,
}

impl InstallationTarget {
    /// Derive the full layout from a home directory.
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let install_dir = home.join(".local/share").join(APP_NAME);
        let config_dir = home.join(".config").join(APP_NAME);
        Self {
            log_dir: install_dir.join("logs"),
            config_path: config_dir.join("config.ini"),
            db_path: install_dir.join("automator.db"),
            systemd_user_dir: home.join(".config/systemd/user"),
            applications_dir: home.join(".local/share/applications"),
            home,
            install_dir,
            config_dir,
        }
    }

    /// Derive the layout from the invoking user's home directory.
    pub fn discover() -> Result<Self, InstallerError> {
        let home = dirs::home_dir()
            .ok_or_else(|| InstallerError::System("could not determine home directory".into()))?;
        Ok(Self::from_home(home))
    }

    pub fn unit_path(&self) -> PathBuf {
        self.systemd_user_dir.join(format!("{SERVICE_NAME}.service"))
    }

    pub fn desktop_path(&self) -> PathBuf {
        self.applications_dir.join(format!("{APP_NAME}.desktop"))
    }

    /// Daemon entry point inside the install directory.
    pub fn entry_point(&self) -> PathBuf {
        self.install_dir.join("daemon.py")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn is_subpath(path: &Path, root: &Path) -> bool {
        path.starts_with(root)
    }

    #[test]
    fn layout_is_rooted_in_home() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::from_home(tmp.path());

        for path in [
            &target.install_dir,
            &target.log_dir,
            &target.config_dir,
            &target.config_path,
            &target.db_path,
            &target.systemd_user_dir,
            &target.applications_dir,
            &target.unit_path(),
            &target.desktop_path(),
            &target.entry_point(),
        ] {
            assert!(
                is_subpath(path, tmp.path()),
                "{} escapes target root",
                path.display()
            );
        }
    }

    #[test]
    fn derived_paths_use_app_slug() {
        let target = InstallationTarget::from_home("/home/alice");
        assert_eq!(
            target.install_dir,
            PathBuf::from("/home/alice/.local/share/hypr-ai-automator")
        );
        assert_eq!(
            target.config_path,
            PathBuf::from("/home/alice/.config/hypr-ai-automator/config.ini")
        );
        assert!(target.unit_path().ends_with("hypr-ai-automator.service"));
        assert!(target.desktop_path().ends_with("hypr-ai-automator.desktop"));
        assert_eq!(target.db_path, target.install_dir.join("automator.db"));
    }
}

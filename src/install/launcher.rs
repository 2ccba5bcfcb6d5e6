//! Desktop-entry publication for the dashboard.

use log::info;

use super::error::InstallerError;
use super::file_ops;
use super::steps::StepOutcome;
use super::target::{InstallationTarget, DASHBOARD_URL};

/// Render the static desktop entry pointing at the local dashboard.
pub fn desktop_entry(dashboard_url: &str) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=Hypr AI Automator\n\
         Comment=AI-powered Hyprland automation dashboard\n\
         Exec=xdg-open {dashboard_url}\n\
         Icon=utilities-terminal\n\
         Terminal=false\n\
         Categories=Utility;System;\n"
    )
}

/// Write the launcher, overwriting any prior version, and mark it executable.
pub fn run(target: &InstallationTarget) -> Result<StepOutcome, InstallerError> {
    std::fs::create_dir_all(&target.applications_dir)
        .map_err(|e| InstallerError::System(format!("failed to create applications dir: {e}")))?;

    let path = target.desktop_path();
    file_ops::write_file_atomic(&path, &desktop_entry(DASHBOARD_URL))?;
    file_ops::set_mode(&path, 0o755)?;

    info!("desktop entry written to {}", path.display());
    Ok(StepOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn entry_points_at_dashboard() {
        let body = desktop_entry(DASHBOARD_URL);
        assert!(body.starts_with("[Desktop Entry]"));
        assert!(body.contains("Exec=xdg-open http://127.0.0.1:8765"));
        assert!(body.contains("Type=Application"));
    }

    #[test]
    fn launcher_is_overwritten_and_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::from_home(tmp.path());

        std::fs::create_dir_all(&target.applications_dir).unwrap();
        std::fs::write(target.desktop_path(), "stale").unwrap();

        run(&target).unwrap();

        let body = std::fs::read_to_string(target.desktop_path()).unwrap();
        assert!(body.contains("Hypr AI Automator"));

        let mode = std::fs::metadata(target.desktop_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

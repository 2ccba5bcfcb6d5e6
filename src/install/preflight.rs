//! Host preflight checks.
//!
//! Verifies the platform marker and the Hyprland compositor before any side
//! effect. Both checks are fatal; there is no retry.

use std::path::Path;
use std::process::Command;

use log::info;

use super::error::InstallerError;
use super::steps::StepOutcome;

/// Marker file present on the one supported distribution.
pub const PLATFORM_MARKER: &str = "/etc/arch-release";

/// Compositor control command that must answer a version query.
pub const COMPOSITOR_COMMAND: &str = "hyprctl";

/// Fail unless the platform marker file exists.
pub fn check_platform(marker: &Path) -> Result<(), InstallerError> {
    if marker.exists() {
        Ok(())
    } else {
        Err(InstallerError::Platform(format!(
            "{} not found; this installer supports Arch Linux only",
            marker.display()
        )))
    }
}

/// Fail unless `hyprctl` resolves on PATH and answers `hyprctl version`.
pub fn check_compositor() -> Result<(), InstallerError> {
    which::which(COMPOSITOR_COMMAND).map_err(|_| {
        InstallerError::Dependency(format!(
            "{COMPOSITOR_COMMAND} not found on PATH; Hyprland is required"
        ))
    })?;

    let status = Command::new(COMPOSITOR_COMMAND)
        .arg("version")
        .output()
        .map_err(|e| InstallerError::Command(format!("{COMPOSITOR_COMMAND} version: {e}")))?;

    if !status.status.success() {
        return Err(InstallerError::Dependency(format!(
            "{COMPOSITOR_COMMAND} version query failed; is Hyprland installed?"
        )));
    }

    Ok(())
}

pub fn run(marker: &Path) -> Result<StepOutcome, InstallerError> {
    check_platform(marker)?;
    check_compositor()?;
    info!("preflight passed: Arch Linux with Hyprland");
    Ok(StepOutcome::Completed)
}

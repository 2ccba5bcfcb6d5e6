//! systemd user-service control operations.
//!
//! Everything this installer supervises runs inside the user's session, so all
//! calls go through `systemctl --user`.

use std::process::Command;

use super::error::InstallerError;

fn systemctl_user(args: &[&str]) -> Result<std::process::Output, InstallerError> {
    Command::new("systemctl")
        .arg("--user")
        .args(args)
        .output()
        .map_err(|e| InstallerError::Command(format!("systemctl --user {}: {e}", args.join(" "))))
}

/// Reload the user unit cache to pick up new or rewritten unit files.
pub(super) fn daemon_reload() -> Result<(), InstallerError> {
    let output = systemctl_user(&["daemon-reload"])?;
    if !output.status.success() {
        return Err(InstallerError::Command(format!(
            "failed to reload systemd user daemon: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

/// Enable a user unit without starting it.
pub(super) fn enable_unit(name: &str) -> Result<(), InstallerError> {
    let output = systemctl_user(&["enable", &format!("{name}.service")])?;
    if !output.status.success() {
        return Err(InstallerError::Command(format!(
            "failed to enable {name}.service: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

/// Enable and immediately start a user unit.
pub(super) fn enable_unit_now(name: &str) -> Result<(), InstallerError> {
    let output = systemctl_user(&["enable", "--now", &format!("{name}.service")])?;
    if !output.status.success() {
        return Err(InstallerError::Command(format!(
            "failed to enable --now {name}.service: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

/// Start a user unit.
pub(super) fn start_unit(name: &str) -> Result<(), InstallerError> {
    let output = systemctl_user(&["start", &format!("{name}.service")])?;
    if !output.status.success() {
        return Err(InstallerError::Command(format!(
            "failed to start {name}.service: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

/// Whether a user unit is currently enabled.
///
/// `is-enabled` exits non-zero for a disabled or unknown unit; that is a
/// negative answer, not a command failure.
pub(super) fn unit_enabled(name: &str) -> Result<bool, InstallerError> {
    let output = systemctl_user(&["is-enabled", &format!("{name}.service")])?;
    Ok(output.status.success())
}

/// Whether a user unit is currently active.
pub(super) fn unit_active(name: &str) -> Result<bool, InstallerError> {
    let output = systemctl_user(&["is-active", &format!("{name}.service")])?;
    Ok(output.status.success())
}

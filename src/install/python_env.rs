//! Python runtime package installation.
//!
//! The daemon is a Python program; its library stack is installed with pip
//! into the user site. Failure here is soft: the run continues, but the daemon
//! will not start until the packages are present.

use std::process::Command;

use log::{info, warn};

use super::steps::StepOutcome;

/// Libraries the daemon imports at startup.
pub const RUNTIME_PACKAGES: &[&str] = &[
    "aiohttp",
    "fastapi",
    "uvicorn",
    "websockets",
    "sqlalchemy",
    "cryptography",
    "psutil",
    "python-dotenv",
    "google-generativeai",
];

fn pip_install(args: &[&str]) -> Result<(), String> {
    let output = Command::new("python")
        .args(["-m", "pip", "install", "--user"])
        .args(args)
        .output()
        .map_err(|e| format!("pip: {e}"))?;

    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).into_owned());
    }
    Ok(())
}

/// Upgrade pip itself, then install the fixed package list. Relies on pip's
/// own idempotency rather than per-package presence checks.
///
/// Returns the outcome plus a warning message when the install failed; the
/// warning is surfaced in the run report but never aborts the run.
pub fn run() -> (StepOutcome, Option<String>) {
    if let Err(e) = pip_install(&["--upgrade", "pip"]) {
        warn!("pip self-upgrade failed (continuing): {e}");
    }

    match pip_install(RUNTIME_PACKAGES) {
        Ok(()) => {
            info!("installed {} Python packages", RUNTIME_PACKAGES.len());
            (StepOutcome::Completed, None)
        }
        Err(e) => {
            warn!("Python package installation failed; the daemon will not run until fixed: {e}");
            (
                StepOutcome::Skipped,
                Some(format!("Python package installation failed; the daemon will not run until it succeeds: {e}")),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_list_covers_daemon_stack() {
        // Web server, AI client, and system monitor are the daemon's three
        // import roots.
        for pkg in ["aiohttp", "google-generativeai", "psutil"] {
            assert!(RUNTIME_PACKAGES.contains(&pkg), "{pkg} missing");
        }
    }
}

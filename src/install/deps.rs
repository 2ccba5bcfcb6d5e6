//! System dependency detection and installation.
//!
//! Every command-line tool the daemon shells out to is listed in a static
//! table. Missing tools are installed in one batched pacman invocation;
//! `ydotool` alone has no repo package and falls back to an AUR helper, then to
//! a from-source build.

use std::process::Command;

use log::{info, warn};

use super::error::InstallerError;
use super::source_build;
use super::steps::StepOutcome;

/// One command the daemon depends on and the package(s) providing it.
#[derive(Debug, Clone, Copy)]
pub struct DependencySpec {
    /// Command probed on PATH.
    pub command: &'static str,
    /// Repo packages that provide the command.
    pub packages: &'static [&'static str],
    /// Whether a from-source fallback exists when no package can be installed.
    pub source_fallback: bool,
}

/// Tools the daemon requires at runtime, evaluated once per run.
pub const DEPENDENCIES: &[DependencySpec] = &[
    DependencySpec { command: "python", packages: &["python"], source_fallback: false },
    DependencySpec { command: "pip", packages: &["python-pip"], source_fallback: false },
    DependencySpec { command: "git", packages: &["git"], source_fallback: false },
    DependencySpec { command: "jq", packages: &["jq"], source_fallback: false },
    DependencySpec { command: "curl", packages: &["curl"], source_fallback: false },
    DependencySpec { command: "grim", packages: &["grim"], source_fallback: false },
    DependencySpec { command: "slurp", packages: &["slurp"], source_fallback: false },
    DependencySpec { command: "pactl", packages: &["libpulse"], source_fallback: false },
    DependencySpec { command: "brightnessctl", packages: &["brightnessctl"], source_fallback: false },
    DependencySpec { command: "bluetoothctl", packages: &["bluez", "bluez-utils"], source_fallback: false },
    DependencySpec { command: "playerctl", packages: &["playerctl"], source_fallback: false },
    DependencySpec { command: "ydotool", packages: &["ydotool"], source_fallback: true },
];

/// Input-injection helper whose companion service must end up enabled.
pub const INJECTION_TOOL: &str = "ydotool";
pub const INJECTION_SERVICE: &str = "ydotool";

/// AUR helpers tried for packages missing from the repos, in preference order.
pub const AUR_HELPERS: &[&str] = &["yay", "paru"];

/// Collect package names for every dependency whose command does not resolve.
///
/// Dependencies with a source-build fallback are excluded: their package name
/// may not exist in the repos, and one bad name fails the entire batch. They
/// get their own install attempt afterwards.
pub fn missing_packages<F>(resolves: F) -> Vec<&'static str>
where
    F: Fn(&str) -> bool,
{
    let mut packages = Vec::new();
    for spec in DEPENDENCIES {
        if !spec.source_fallback && !resolves(spec.command) {
            packages.extend_from_slice(spec.packages);
        }
    }
    packages
}

fn command_resolves(command: &str) -> bool {
    which::which(command).is_ok()
}

/// One batched install; a failure here is fatal and partial installs are not
/// rolled back.
fn pacman_install(packages: &[&str]) -> Result<(), InstallerError> {
    info!("installing {} package(s) via pacman: {}", packages.len(), packages.join(" "));
    let output = Command::new("sudo")
        .args(["pacman", "-S", "--noconfirm", "--needed"])
        .args(packages)
        .output()
        .map_err(|e| InstallerError::Command(format!("pacman: {e}")))?;

    if !output.status.success() {
        return Err(InstallerError::Command(format!(
            "pacman batch install failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

/// Try the AUR helpers in preference order. Returns false when no helper is
/// available on this host.
fn aur_install(package: &str) -> Result<bool, InstallerError> {
    for helper in AUR_HELPERS {
        if !command_resolves(helper) {
            continue;
        }
        info!("installing {package} via {helper}");
        let output = Command::new(helper)
            .args(["-S", "--noconfirm", package])
            .output()
            .map_err(|e| InstallerError::Command(format!("{helper}: {e}")))?;

        if !output.status.success() {
            return Err(InstallerError::Command(format!(
                "{helper} failed to install {package}: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        return Ok(true);
    }
    Ok(false)
}

/// Make sure the injection helper's companion service is enabled and running.
///
/// Runs unconditionally, whichever path installed the tool, and is a no-op for
/// an already-enabled service.
fn ensure_injection_service(changed: &mut bool) -> Result<(), InstallerError> {
    if super::service_control::unit_enabled(INJECTION_SERVICE)? {
        info!("{INJECTION_SERVICE}.service already enabled");
        return Ok(());
    }
    super::service_control::enable_unit_now(INJECTION_SERVICE)?;
    info!("enabled {INJECTION_SERVICE}.service");
    *changed = true;
    Ok(())
}

pub fn run() -> Result<StepOutcome, InstallerError> {
    let missing = missing_packages(command_resolves);
    let mut changed = false;

    if missing.is_empty() {
        info!("all dependencies already installed");
    } else {
        pacman_install(&missing)?;
        changed = true;
    }

    // ydotool may not exist in the repos at all. Try pacman on its own so a
    // bad package name cannot fail the main batch, then fall through the
    // helper and source-build paths.
    if !command_resolves(INJECTION_TOOL) {
        if let Err(e) = pacman_install(&[INJECTION_TOOL]) {
            info!("{INJECTION_TOOL} not available from the repos ({e}), trying AUR helpers");
            if !aur_install(INJECTION_TOOL)? {
                warn!("no AUR helper available, building {INJECTION_TOOL} from source");
                source_build::build_ydotool()?;
            }
        }
        changed = true;

        if !command_resolves(INJECTION_TOOL) {
            return Err(InstallerError::Dependency(format!(
                "{INJECTION_TOOL} still unresolved after install attempts"
            )));
        }
    }

    ensure_injection_service(&mut changed)?;

    Ok(if changed { StepOutcome::Completed } else { StepOutcome::Skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_missing_when_everything_resolves() {
        assert!(missing_packages(|_| true).is_empty());
    }

    #[test]
    fn missing_commands_accumulate_all_their_packages() {
        let missing = missing_packages(|cmd| cmd != "bluetoothctl" && cmd != "grim");
        assert_eq!(missing, vec!["grim", "bluez", "bluez-utils"]);
    }

    #[test]
    fn fully_missing_host_lists_every_batchable_package_once() {
        let missing = missing_packages(|_| false);
        let expected: usize = DEPENDENCIES
            .iter()
            .filter(|d| !d.source_fallback)
            .map(|d| d.packages.len())
            .sum();
        assert_eq!(missing.len(), expected);
        assert!(missing.contains(&"python-pip"));
    }

    #[test]
    fn fallback_dependency_stays_out_of_the_batch() {
        let missing = missing_packages(|_| false);
        assert!(!missing.contains(&INJECTION_TOOL));
    }

    #[test]
    fn only_the_injection_tool_has_a_source_fallback() {
        let fallbacks: Vec<_> = DEPENDENCIES
            .iter()
            .filter(|d| d.source_fallback)
            .map(|d| d.command)
            .collect();
        assert_eq!(fallbacks, vec![INJECTION_TOOL]);
    }
}

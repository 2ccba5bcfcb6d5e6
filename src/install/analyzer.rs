//! Best-effort invocation of the external config analyzer.
//!
//! The analyzer ships with the daemon tree; a missing artifact or a non-zero
//! exit is downgraded to a warning and never blocks installation.

use std::process::Command;

use log::{info, warn};

use super::steps::StepOutcome;
use super::target::InstallationTarget;

/// Analyzer artifact location inside the installed daemon tree.
pub const ANALYZER_RELATIVE: &str = "tools/config_analyzer.py";

pub fn run(target: &InstallationTarget) -> StepOutcome {
    let analyzer = target.install_dir.join(ANALYZER_RELATIVE);
    if !analyzer.is_file() {
        warn!("config analyzer not present at {}, skipping analysis", analyzer.display());
        return StepOutcome::Skipped;
    }

    let result = Command::new("python")
        .arg(&analyzer)
        .arg(&target.config_path)
        .output();

    match result {
        Ok(output) if output.status.success() => {
            info!("config analysis passed");
            StepOutcome::Completed
        }
        Ok(output) => {
            warn!(
                "config analyzer reported issues (non-fatal): {}",
                String::from_utf8_lossy(&output.stderr)
            );
            StepOutcome::Skipped
        }
        Err(e) => {
            warn!("failed to invoke config analyzer (non-fatal): {e}");
            StepOutcome::Skipped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_analyzer_is_a_skip_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::from_home(tmp.path());
        assert_eq!(run(&target), StepOutcome::Skipped);
    }
}

//! Installation orchestration for the Hyprland AI Automator daemon.
//!
//! Runs the provisioning steps in a fixed order. Each step resolves to
//! completed, skipped, or failed; the run stops at the first failure and the
//! process exits non-zero. Soft failures (Python packages, config analysis,
//! the final health check) are reported but never abort.

mod analyzer;
mod artifacts;
mod deps;
mod error;
mod file_ops;
mod launcher;
mod preflight;
mod python_env;
mod schema;
mod secrets;
mod service;
mod service_control;
mod source_build;
mod steps;
mod target;

pub use error::InstallerError;
pub use steps::{RunReport, StepOutcome};
pub use target::{InstallationTarget, DASHBOARD_URL, SERVICE_NAME};

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use inquire::Confirm;
use log::warn;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::Cli;

/// Grace period between starting the service and checking its state.
const HEALTH_CHECK_GRACE: Duration = Duration::from_secs(3);

fn status_line(stdout: &mut StandardStream, color: Color, marker: &str, text: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    let _ = writeln!(stdout, "{marker} {text}");
    let _ = stdout.reset();
}

fn show_welcome(stdout: &mut StandardStream) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "\n🔧 Hyprland AI Automator Installation");
    let _ = stdout.reset();
    let _ = writeln!(stdout, "Platform: {}\n", std::env::consts::OS);
}

fn show_completion(stdout: &mut StandardStream, target: &InstallationTarget, report: &RunReport) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "\n✅ Installation complete");
    let _ = stdout.reset();
    let _ = writeln!(
        stdout,
        "   {} step(s) applied, {} skipped\n",
        report.completed_count(),
        report.skipped_count()
    );
    for (name, message) in report.warnings() {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = writeln!(stdout, "⚠ {name}: {message}");
        let _ = stdout.reset();
    }
    let _ = writeln!(stdout, "Install directory: {}", target.install_dir.display());
    let _ = writeln!(stdout, "Configuration:     {}", target.config_path.display());
    let _ = writeln!(stdout, "Service unit:      {}", target.unit_path().display());
    let _ = writeln!(stdout, "Dashboard:         {DASHBOARD_URL}");
    let _ = writeln!(
        stdout,
        "\nManage the daemon with: systemctl --user {{start|stop|status}} {SERVICE_NAME}"
    );
}

/// Record one step's outcome, print its status marker, and stop on failure.
fn finish_step(
    stdout: &mut StandardStream,
    report: &mut RunReport,
    name: &'static str,
    result: Result<StepOutcome, InstallerError>,
) -> Result<()> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => StepOutcome::Failed(e.to_string()),
    };

    match &outcome {
        StepOutcome::Completed => status_line(stdout, Color::Green, "✓", name),
        StepOutcome::Skipped => match report.warning_for(name) {
            Some(warning) => {
                status_line(stdout, Color::Yellow, "⚠", &format!("{name}: {warning} (continuing)"))
            }
            None => status_line(stdout, Color::Yellow, "·", &format!("{name} (skipped)")),
        },
        StepOutcome::Failed(reason) => {
            status_line(stdout, Color::Red, "❌", &format!("{name}: {reason}"))
        }
    }

    report.record(name, outcome);
    match report.failure() {
        Some(failed) => Err(anyhow::anyhow!(
            "installation failed at step '{}': {}",
            failed.name,
            match &failed.outcome {
                StepOutcome::Failed(reason) => reason.as_str(),
                _ => "unknown",
            }
        )),
        None => Ok(()),
    }
}

/// Run the full installation sequence.
pub async fn run(cli: &Cli) -> Result<()> {
    // The whole flow provisions one user's session; root would write
    // root-owned files into the target home.
    if unsafe { libc::getuid() } == 0 {
        anyhow::bail!("run this installer as your regular user, not root");
    }

    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    show_welcome(&mut stdout);

    let target = match &cli.target_root {
        Some(root) => InstallationTarget::from_home(root.clone()),
        None => InstallationTarget::discover()?,
    };
    let staging_root = std::env::current_dir().context("could not determine working directory")?;
    let mut report = RunReport::new();

    finish_step(
        &mut stdout,
        &mut report,
        "preflight checks",
        preflight::run(Path::new(preflight::PLATFORM_MARKER)),
    )?;
    finish_step(&mut stdout, &mut report, "system dependencies", deps::run())?;
    let (py_outcome, py_warning) = python_env::run();
    if let Some(warning) = py_warning {
        report.record_warning("python runtime packages", warning);
    }
    finish_step(&mut stdout, &mut report, "python runtime packages", Ok(py_outcome))?;
    finish_step(
        &mut stdout,
        &mut report,
        "directory provisioning",
        artifacts::provision_directories(&target),
    )?;
    finish_step(
        &mut stdout,
        &mut report,
        "daemon artifacts",
        artifacts::copy_artifacts(&staging_root, &target),
    )?;
    let secret_provider = secrets::provider_from(cli.api_key.clone());
    finish_step(
        &mut stdout,
        &mut report,
        "configuration",
        secrets::run(&target, secret_provider.as_ref()),
    )?;
    finish_step(&mut stdout, &mut report, "database schema", schema::run(&target))?;
    finish_step(
        &mut stdout,
        &mut report,
        "config analysis",
        Ok(analyzer::run(&target)),
    )?;
    finish_step(&mut stdout, &mut report, "service registration", service::run(&target))?;
    finish_step(&mut stdout, &mut report, "desktop launcher", launcher::run(&target))?;

    show_completion(&mut stdout, &target, &report);

    if should_start_now(cli)? {
        start_and_health_check(&mut stdout).await;
    } else {
        let _ = writeln!(
            stdout,
            "\nStart later with: systemctl --user start {SERVICE_NAME}"
        );
    }

    Ok(())
}

fn should_start_now(cli: &Cli) -> Result<bool> {
    if cli.no_start {
        return Ok(false);
    }
    if cli.no_interaction {
        return Ok(true);
    }
    Confirm::new("Start the daemon now?")
        .with_default(true)
        .prompt()
        .map_err(|e| anyhow::anyhow!("prompt cancelled: {e}"))
}

/// Post-start health line for the service manager's reported state.
fn health_line(active: bool) -> (Color, String) {
    if active {
        (
            Color::Green,
            format!("{SERVICE_NAME} is running, dashboard at {DASHBOARD_URL}"),
        )
    } else {
        (
            Color::Yellow,
            format!(
                "{SERVICE_NAME} did not reach active state; inspect logs with: \
                 journalctl --user -u {SERVICE_NAME} -e"
            ),
        )
    }
}

/// Start the service, wait a short grace period, and report its state.
///
/// Installation has already succeeded by this point; a start or query failure
/// here produces the same guidance as an inactive service and never changes
/// the exit code.
async fn start_and_health_check(stdout: &mut StandardStream) {
    let started = match service_control::start_unit(SERVICE_NAME) {
        Ok(()) => true,
        Err(e) => {
            warn!("failed to start {SERVICE_NAME}: {e}");
            false
        }
    };

    let active = if started {
        tokio::time::sleep(HEALTH_CHECK_GRACE).await;
        match service_control::unit_active(SERVICE_NAME) {
            Ok(active) => active,
            Err(e) => {
                warn!("could not query {SERVICE_NAME} state: {e}");
                false
            }
        }
    } else {
        false
    };

    let (color, text) = health_line(active);
    let marker = if active { "✓" } else { "⚠" };
    status_line(stdout, color, marker, &text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_service_yields_guidance_not_failure() {
        let (color, text) = health_line(false);
        assert_eq!(color, Color::Yellow);
        assert!(text.contains("journalctl --user -u hypr-ai-automator -e"));
    }

    #[test]
    fn active_service_reports_dashboard() {
        let (color, text) = health_line(true);
        assert_eq!(color, Color::Green);
        assert!(text.contains(DASHBOARD_URL));
    }
}

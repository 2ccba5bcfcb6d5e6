//! Systemd user unit generation and registration for the daemon.
//!
//! The unit file is regenerated in full on every run: rewriting an identical
//! file and re-enabling an enabled unit are both no-ops for systemd, so the
//! step is idempotent end to end.

use log::info;

use super::error::InstallerError;
use super::file_ops;
use super::service_control;
use super::steps::StepOutcome;
use super::target::{InstallationTarget, SERVICE_NAME};

/// Seconds systemd waits before restarting a failed daemon.
pub const RESTART_DELAY_SECS: u32 = 10;

/// Compositor session-identity variable forwarded into the daemon's
/// environment when the installer itself runs inside a Hyprland session.
pub const SESSION_ENV: &str = "HYPRLAND_INSTANCE_SIGNATURE";

/// Unit description for the supervised daemon process.
pub(super) struct UnitConfig<'a> {
    pub service_name: &'a str,
    pub description: &'a str,
    pub exec_start: String,
    pub env_vars: Vec<(String, String)>,
}

impl<'a> UnitConfig<'a> {
    pub(super) fn for_daemon(target: &InstallationTarget) -> Self {
        let mut env_vars = vec![("PYTHONUNBUFFERED".to_string(), "1".to_string())];
        if let Ok(signature) = std::env::var(SESSION_ENV) {
            if !signature.is_empty() {
                env_vars.push((SESSION_ENV.to_string(), signature));
            }
        }

        Self {
            service_name: SERVICE_NAME,
            description: "Hyprland AI Automator daemon",
            exec_start: format!("/usr/bin/python {}", target.entry_point().display()),
            env_vars,
        }
    }
}

/// Generate the unit file content.
pub(super) fn generate_unit_content(config: &UnitConfig) -> String {
    let mut content = String::with_capacity(1024);

    content.push_str("[Unit]\n");
    content.push_str(&format!("Description={}\n", config.description));
    content.push_str("After=graphical-session.target\n");
    content.push_str("PartOf=graphical-session.target\n");
    content.push('\n');

    content.push_str("[Service]\n");
    content.push_str("Type=simple\n");
    content.push_str(&format!("ExecStart={}\n", config.exec_start));
    content.push_str("Restart=on-failure\n");
    content.push_str(&format!("RestartSec={}s\n", RESTART_DELAY_SECS));

    for (key, value) in &config.env_vars {
        content.push_str(&format!("Environment=\"{key}={value}\"\n"));
    }

    content.push_str("StandardOutput=journal\n");
    content.push_str("StandardError=journal\n");
    content.push_str(&format!("SyslogIdentifier={}\n", config.service_name));
    content.push('\n');

    content.push_str("[Install]\n");
    content.push_str("WantedBy=default.target\n");

    content
}

/// Write the unit file, reload the user unit cache, and enable the service.
pub fn run(target: &InstallationTarget) -> Result<StepOutcome, InstallerError> {
    std::fs::create_dir_all(&target.systemd_user_dir)
        .map_err(|e| InstallerError::System(format!("failed to create systemd user dir: {e}")))?;

    let config = UnitConfig::for_daemon(target);
    let unit_path = target.unit_path();
    file_ops::write_file_atomic(&unit_path, &generate_unit_content(&config))?;
    file_ops::set_mode(&unit_path, 0o644)?;

    service_control::daemon_reload()?;
    service_control::enable_unit(SERVICE_NAME)?;

    info!("service unit registered at {}", unit_path.display());
    Ok(StepOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> UnitConfig<'static> {
        UnitConfig {
            service_name: SERVICE_NAME,
            description: "Hyprland AI Automator daemon",
            exec_start: "/usr/bin/python /home/alice/.local/share/hypr-ai-automator/daemon.py".into(),
            env_vars: vec![
                ("PYTHONUNBUFFERED".into(), "1".into()),
                (SESSION_ENV.into(), "abc123".into()),
            ],
        }
    }

    #[test]
    fn unit_declares_restart_policy_and_journal_routing() {
        let body = generate_unit_content(&test_config());
        assert!(body.contains("Restart=on-failure\n"));
        assert!(body.contains("RestartSec=10s\n"));
        assert!(body.contains("StandardOutput=journal\n"));
        assert!(body.contains("StandardError=journal\n"));
        assert!(body.contains("SyslogIdentifier=hypr-ai-automator\n"));
    }

    #[test]
    fn unit_orders_after_graphical_session() {
        let body = generate_unit_content(&test_config());
        assert!(body.contains("After=graphical-session.target\n"));
        assert!(body.contains("WantedBy=default.target\n"));
    }

    #[test]
    fn environment_variables_are_forwarded() {
        let body = generate_unit_content(&test_config());
        assert!(body.contains("Environment=\"PYTHONUNBUFFERED=1\"\n"));
        assert!(body.contains("Environment=\"HYPRLAND_INSTANCE_SIGNATURE=abc123\"\n"));
    }

    #[test]
    fn regeneration_is_deterministic() {
        let config = test_config();
        assert_eq!(generate_unit_content(&config), generate_unit_content(&config));
    }

    #[test]
    fn daemon_config_executes_installed_entry_point() {
        let target = InstallationTarget::from_home("/home/alice");
        let config = UnitConfig::for_daemon(&target);
        assert!(config
            .exec_start
            .ends_with(".local/share/hypr-ai-automator/daemon.py"));
        assert!(config.exec_start.starts_with("/usr/bin/python "));
    }
}

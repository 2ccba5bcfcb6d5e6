//! Secret collection and configuration file materialization.
//!
//! An existing configuration file is never touched: the step is a complete
//! no-op. A fresh install prompts for the Gemini API key (or takes it from the
//! CLI or environment) and writes the daemon's INI configuration with
//! owner-only permissions. The key is stored in plaintext; confidentiality
//! rests on the 0o600 file mode.

use std::fs;

use inquire::Password;
use log::info;

use super::error::InstallerError;
use super::file_ops;
use super::steps::StepOutcome;
use super::target::InstallationTarget;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8765;
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Environment variable consulted before falling back to the terminal prompt.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Source of the API key, so automated runs need no terminal.
pub trait SecretProvider {
    fn api_key(&self) -> Result<String, InstallerError>;
}

/// Prompts on the terminal with echo suppressed.
pub struct InteractiveProvider;

impl SecretProvider for InteractiveProvider {
    fn api_key(&self) -> Result<String, InstallerError> {
        Password::new("Gemini API key:")
            .without_confirmation()
            .with_help_message("Stored locally in config.ini with owner-only permissions")
            .prompt()
            .map_err(|e| InstallerError::Input(format!("prompt cancelled: {e}")))
    }
}

/// Key supplied up front via flag or environment.
pub struct PresetProvider(pub String);

impl SecretProvider for PresetProvider {
    fn api_key(&self) -> Result<String, InstallerError> {
        Ok(self.0.clone())
    }
}

/// Pick a provider: CLI flag first, then the environment, then the terminal.
pub fn provider_from(cli_key: Option<String>) -> Box<dyn SecretProvider> {
    if let Some(key) = cli_key {
        return Box::new(PresetProvider(key));
    }
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Box::new(PresetProvider(key));
        }
    }
    Box::new(InteractiveProvider)
}

/// Render the daemon's configuration file.
pub fn render_config(api_key: &str, target: &InstallationTarget) -> String {
    format!(
        "[gemini]\n\
         api_key = {api_key}\n\
         model = {DEFAULT_MODEL}\n\
         \n\
         [daemon]\n\
         host = {DEFAULT_HOST}\n\
         port = {DEFAULT_PORT}\n\
         log_level = {DEFAULT_LOG_LEVEL}\n\
         \n\
         [paths]\n\
         db_path = {}\n\
         log_dir = {}\n",
        target.db_path.display(),
        target.log_dir.display(),
    )
}

pub fn run(
    target: &InstallationTarget,
    provider: &dyn SecretProvider,
) -> Result<StepOutcome, InstallerError> {
    if target.config_path.exists() {
        info!("configuration already exists at {}, leaving it untouched", target.config_path.display());
        return Ok(StepOutcome::Skipped);
    }

    let key = provider.api_key()?;
    let key = key.trim();
    if key.is_empty() {
        return Err(InstallerError::Input("API key must not be empty".into()));
    }

    fs::create_dir_all(&target.config_dir)
        .map_err(|e| InstallerError::System(format!("failed to create config directory: {e}")))?;

    file_ops::write_file_atomic(&target.config_path, &render_config(key, target))?;
    file_ops::set_mode(&target.config_path, 0o600)?;

    info!("configuration written to {}", target.config_path.display());
    Ok(StepOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn fresh_install_writes_all_sections_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::from_home(tmp.path());

        let outcome = run(&target, &PresetProvider("AIza-test".into())).unwrap();
        assert_eq!(outcome, StepOutcome::Completed);

        let body = fs::read_to_string(&target.config_path).unwrap();
        assert!(body.contains("[gemini]"));
        assert!(body.contains("[daemon]"));
        assert!(body.contains("[paths]"));
        assert!(body.contains("api_key = AIza-test"));
        assert!(body.contains("model = gemini-2.0-flash"));
        assert!(body.contains("port = 8765"));
        assert!(body.contains("host = 127.0.0.1"));
    }

    #[test]
    fn config_file_is_owner_only() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::from_home(tmp.path());
        run(&target, &PresetProvider("k".into())).unwrap();

        let mode = fs::metadata(&target.config_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn existing_config_is_never_rewritten() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::from_home(tmp.path());

        run(&target, &PresetProvider("original".into())).unwrap();
        let before = fs::read(&target.config_path).unwrap();
        let mode_before = fs::metadata(&target.config_path).unwrap().permissions().mode();

        let outcome = run(&target, &PresetProvider("replacement".into())).unwrap();
        assert_eq!(outcome, StepOutcome::Skipped);

        assert_eq!(fs::read(&target.config_path).unwrap(), before);
        let mode_after = fs::metadata(&target.config_path).unwrap().permissions().mode();
        assert_eq!(mode_before, mode_after);
    }

    #[test]
    fn empty_key_is_fatal_and_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::from_home(tmp.path());

        let err = run(&target, &PresetProvider("   ".into())).unwrap_err();
        assert!(matches!(err, InstallerError::Input(_)));
        assert!(!target.config_path.exists());
    }

    #[test]
    fn preset_key_wins_over_interactive() {
        let provider = provider_from(Some("from-flag".into()));
        assert_eq!(provider.api_key().unwrap(), "from-flag");
    }
}

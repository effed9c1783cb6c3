//! CLI configuration: thin wrapper around `marspro_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` overrides (--profile, --username, --timeout).

use std::time::Duration;

use marspro_core::HubConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use marspro_config::{
    Config, Profile, config_path, keyring_entry, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names, sorted, for help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build a `HubConfig` from the config file, profile, and CLI overrides.
///
/// Returns the profile name alongside so errors can name it.
pub fn build_hub_config(global: &GlobalOpts) -> Result<(HubConfig, String), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // Explicitly asked for a profile that isn't there
        None if global.profile.is_some() && !cfg.profiles.is_empty() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        // No profile: flags and env vars alone must carry the account
        None if global.username.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }

    let mut hub = marspro_config::profile_to_hub_config(&profile, &profile_name)?;
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);
    hub.timeout = Duration::from_secs(timeout);

    Ok((hub, profile_name))
}

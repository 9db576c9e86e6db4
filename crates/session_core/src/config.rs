use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "session.toml";

/// Simulated round-trip latency per backend operation, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LatencySettings {
    pub startup_ms: u64,
    pub sign_in_ms: u64,
    pub sign_up_ms: u64,
    pub sign_out_ms: u64,
    pub profile_update_ms: u64,
    pub verification_code_ms: u64,
    pub password_reset_ms: u64,
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self {
            startup_ms: 1000,
            sign_in_ms: 1500,
            sign_up_ms: 1500,
            sign_out_ms: 500,
            profile_update_ms: 1500,
            verification_code_ms: 1000,
            password_reset_ms: 1500,
        }
    }
}

impl LatencySettings {
    pub fn instant() -> Self {
        Self {
            startup_ms: 0,
            sign_in_ms: 0,
            sign_up_ms: 0,
            sign_out_ms: 0,
            profile_update_ms: 0,
            verification_code_ms: 0,
            password_reset_ms: 0,
        }
    }

    pub fn startup(&self) -> Duration {
        Duration::from_millis(self.startup_ms)
    }

    pub fn sign_in(&self) -> Duration {
        Duration::from_millis(self.sign_in_ms)
    }

    pub fn sign_up(&self) -> Duration {
        Duration::from_millis(self.sign_up_ms)
    }

    pub fn sign_out(&self) -> Duration {
        Duration::from_millis(self.sign_out_ms)
    }

    pub fn profile_update(&self) -> Duration {
        Duration::from_millis(self.profile_update_ms)
    }

    pub fn verification_code(&self) -> Duration {
        Duration::from_millis(self.verification_code_ms)
    }

    pub fn password_reset(&self) -> Duration {
        Duration::from_millis(self.password_reset_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub latency: LatencySettings,
}

/// Defaults, then `session.toml` from the working directory, then
/// `APP__*_LATENCY_MS` environment overrides.
pub fn load_settings() -> anyhow::Result<SessionSettings> {
    let path = Path::new(DEFAULT_SETTINGS_FILE);
    let mut settings = if path.exists() {
        load_settings_file(path)?
    } else {
        SessionSettings::default()
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn load_settings_file(path: &Path) -> anyhow::Result<SessionSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn apply_env_overrides(settings: &mut SessionSettings, lookup: impl Fn(&str) -> Option<String>) {
    let latency = &mut settings.latency;
    let slots: [(&str, &mut u64); 7] = [
        ("APP__STARTUP_LATENCY_MS", &mut latency.startup_ms),
        ("APP__SIGN_IN_LATENCY_MS", &mut latency.sign_in_ms),
        ("APP__SIGN_UP_LATENCY_MS", &mut latency.sign_up_ms),
        ("APP__SIGN_OUT_LATENCY_MS", &mut latency.sign_out_ms),
        ("APP__PROFILE_UPDATE_LATENCY_MS", &mut latency.profile_update_ms),
        ("APP__VERIFICATION_CODE_LATENCY_MS", &mut latency.verification_code_ms),
        ("APP__PASSWORD_RESET_LATENCY_MS", &mut latency.password_reset_ms),
    ];

    for (key, slot) in slots {
        let Some(raw) = lookup(key) else {
            continue;
        };
        match raw.trim().parse::<u64>() {
            Ok(parsed) => *slot = parsed,
            Err(_) => tracing::warn!(key, value = %raw, "ignoring non-numeric latency override"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn defaults_match_the_simulated_round_trips() {
        let latency = SessionSettings::default().latency;
        assert_eq!(latency.sign_in(), Duration::from_millis(1500));
        assert_eq!(latency.sign_out(), Duration::from_millis(500));
        assert_eq!(latency.startup(), Duration::from_secs(1));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("pattern_scanner_settings_{suffix}.toml"));
        fs::write(&path, "[latency]\nsign_in_ms = 10\n").expect("write settings");

        let settings = load_settings_file(&path).expect("load settings");
        assert_eq!(settings.latency.sign_in_ms, 10);
        assert_eq!(settings.latency.sign_up_ms, 1500);

        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn env_overrides_replace_numeric_values_only() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("APP__SIGN_OUT_LATENCY_MS", "0"),
            ("APP__SIGN_UP_LATENCY_MS", "fast"),
        ]);
        let mut settings = SessionSettings::default();
        apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.latency.sign_out_ms, 0);
        assert_eq!(settings.latency.sign_up_ms, 1500);
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = env::temp_dir().join("pattern_scanner_settings_does_not_exist.toml");
        assert!(load_settings_file(&path).is_err());
    }
}

//! Report configuration: a TOML file, overridable from the environment.
//!
//! ```toml
//! [telemetry]
//! server = "my.geotab.com"
//!
//! [window]
//! lookback_days = 30
//! since_activation = false
//!
//! [capability]
//! region = 2
//! token = "..."
//!
//! [view]
//! alert_threshold = 20.0
//! ```
//!
//! Every section and key is optional. Environment variables win over the
//! file: `GEOTAB_SERVER`, `FLEET_REPORT_LOOKBACK_DAYS`, `FLEET_REPORT_REGION`,
//! `FLEET_REPORT_ALERT_THRESHOLD` and `MYADMIN_TOKEN`.

use std::fmt;

use anyhow::Context;
use fleet_telemetry::{
    providers::myadmin_rest::provider::DEFAULT_ENDPOINT,
    reconcile::{DEFAULT_LOOKBACK_DAYS, DEFAULT_REGION, PassOptions, WindowStrategy},
    views::DEFAULT_ALERT_THRESHOLD_PCT,
};
use secrecy::SecretString;
use serde::Deserialize;
use shared_utils::{
    config::{ConfigError, parse_number_or},
    env::get_optional_env_var,
};

pub const SERVER_VAR: &str = "GEOTAB_SERVER";
pub const LOOKBACK_VAR: &str = "FLEET_REPORT_LOOKBACK_DAYS";
pub const REGION_VAR: &str = "FLEET_REPORT_REGION";
pub const THRESHOLD_VAR: &str = "FLEET_REPORT_ALERT_THRESHOLD";
pub const TOKEN_VAR: &str = "MYADMIN_TOKEN";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub telemetry: TelemetryCfg,
    pub window: WindowCfg,
    pub capability: CapabilityCfg,
    pub view: ViewCfg,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryCfg {
    /// Host name of the fleet platform, e.g. `my.geotab.com`.
    pub server: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowCfg {
    pub lookback_days: u32,
    /// Scan from the earliest device activation instead of a fixed lookback.
    pub since_activation: bool,
}

impl Default for WindowCfg {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            since_activation: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilityCfg {
    pub region: u32,
    pub endpoint: String,
    pub token: Option<String>,
}

impl Default for CapabilityCfg {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
        }
    }
}

impl fmt::Debug for CapabilityCfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityCfg")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewCfg {
    /// Odometer fallback percentage above which a model is flagged.
    pub alert_threshold: f64,
}

impl Default for ViewCfg {
    fn default() -> Self {
        Self {
            alert_threshold: DEFAULT_ALERT_THRESHOLD_PCT,
        }
    }
}

impl ReportConfig {
    /// Applies environment overrides on top of the file values.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(server) = get_optional_env_var(SERVER_VAR) {
            self.telemetry.server = Some(server);
        }
        self.window.lookback_days = parse_number_or(
            LOOKBACK_VAR,
            get_optional_env_var(LOOKBACK_VAR).as_deref(),
            self.window.lookback_days,
        )?;
        self.capability.region = parse_number_or(
            REGION_VAR,
            get_optional_env_var(REGION_VAR).as_deref(),
            self.capability.region,
        )?;
        self.view.alert_threshold = parse_number_or(
            THRESHOLD_VAR,
            get_optional_env_var(THRESHOLD_VAR).as_deref(),
            self.view.alert_threshold,
        )?;
        if let Some(token) = get_optional_env_var(TOKEN_VAR) {
            self.capability.token = Some(token);
        }
        Ok(())
    }

    /// The fleet platform host. Required to run a pass.
    pub fn server(&self) -> Result<&str, ConfigError> {
        self.telemetry
            .server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(SERVER_VAR.to_string()))
    }

    pub fn window_strategy(&self) -> WindowStrategy {
        if self.window.since_activation {
            WindowStrategy::SinceActivation
        } else {
            WindowStrategy::Lookback {
                days: self.window.lookback_days,
            }
        }
    }

    pub fn pass_options(&self) -> PassOptions {
        PassOptions {
            window: self.window_strategy(),
            credential: self
                .capability
                .token
                .as_ref()
                .map(|t| SecretString::new(t.as_str().into())),
            region: self.capability.region,
            ..Default::default()
        }
    }
}

/// Parse a report config from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<ReportConfig> {
    toml::from_str(toml_str).context("failed to parse report config TOML")
}

/// Read a report config TOML file from disk and parse it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<ReportConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read report config {}", path.as_ref().display()))?;
    load_config_str(&text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        // SAFETY: every caller is #[serial].
        unsafe {
            for var in [SERVER_VAR, LOOKBACK_VAR, REGION_VAR, THRESHOLD_VAR, TOKEN_VAR] {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = load_config_str("").unwrap();
        assert_eq!(cfg.window.lookback_days, 30);
        assert_eq!(cfg.capability.region, 2);
        assert_eq!(cfg.capability.endpoint, DEFAULT_ENDPOINT);
        assert!((cfg.view.alert_threshold - 20.0).abs() < f64::EPSILON);
        assert_eq!(
            cfg.window_strategy(),
            WindowStrategy::Lookback { days: 30 }
        );
        assert!(matches!(cfg.server(), Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn full_file_is_read() {
        let cfg = load_config_str(
            r#"
[telemetry]
server = "my.geotab.com"

[window]
since_activation = true

[capability]
region = 5
token = "abc"

[view]
alert_threshold = 35.5
"#,
        )
        .unwrap();

        assert_eq!(cfg.server().unwrap(), "my.geotab.com");
        assert_eq!(cfg.window_strategy(), WindowStrategy::SinceActivation);
        let options = cfg.pass_options();
        assert_eq!(options.region, 5);
        assert_eq!(options.credential.unwrap().expose_secret(), "abc");
        assert!(!format!("{cfg:?}").contains("abc"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(load_config_str("[window]\nlookback = 3\n").is_err());
        assert!(load_config_str("[views]\n").is_err());
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\nlookback_days = 7").unwrap();
        let cfg = load_config_path(file.path()).unwrap();
        assert_eq!(cfg.window.lookback_days, 7);
        assert!(load_config_path(file.path().with_extension("missing")).is_err());
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        clear_env();
        unsafe {
            std::env::set_var(SERVER_VAR, "other.geotab.com");
            std::env::set_var(LOOKBACK_VAR, " 90 ");
            std::env::set_var(THRESHOLD_VAR, "12.5");
            std::env::set_var(TOKEN_VAR, "Bearer xyz");
        }

        let mut cfg = load_config_str("[telemetry]\nserver = \"my.geotab.com\"\n").unwrap();
        cfg.apply_env().unwrap();
        clear_env();

        assert_eq!(cfg.server().unwrap(), "other.geotab.com");
        assert_eq!(cfg.window.lookback_days, 90);
        assert_eq!(cfg.capability.region, 2);
        assert!((cfg.view.alert_threshold - 12.5).abs() < f64::EPSILON);
        assert_eq!(cfg.capability.token.as_deref(), Some("Bearer xyz"));
    }

    #[test]
    #[serial]
    fn unparseable_override_is_an_error() {
        clear_env();
        unsafe { std::env::set_var(REGION_VAR, "eu") };

        let mut cfg = ReportConfig::default();
        let err = cfg.apply_env().unwrap_err();
        clear_env();

        assert!(matches!(err, ConfigError::InvalidNumber { ref name, .. } if name == REGION_VAR));
    }
}

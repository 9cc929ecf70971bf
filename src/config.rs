use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pto::LocationSet;
use crate::seasonal::profiles::FALLBACK_PROFILE;
use crate::settings::TenantSettings;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tenant: TenantSettings,
    #[serde(default)]
    pub locations: LocationSet,
    #[serde(default)]
    pub triggers: TriggersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggersConfig {
    /// Target profile applied to the built-in trigger rules.
    #[serde(default = "default_profile")]
    pub profile: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub trigger_profile: Option<String>,
    pub weather_threshold_f: Option<f64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/scheduling-engine/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(profile) = overrides.trigger_profile {
            self.triggers.profile = profile;
        }
        if let Some(threshold) = overrides.weather_threshold_f {
            self.tenant.weather_threshold_f = threshold;
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.parse()
            .with_context(|| format!("invalid bind address: {raw}"))
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[server]
host = "127.0.0.1"
port = 8080

[tenant]
gpMarginFactor = 0.72
weatherThresholdF = 10.0
revenueMissThreshold = 0.9
laborPressureDelta = 3.0
repeatAssignmentWeeks = 12
weatherNormalsYears = 6

[tenant.mondayScenarios]
low = 0.55
base = 0.65
high = 0.75

[tenant.payRates]
manager = 28.0
keyLead = 17.0
scooper = 15.0

[tenant.targetProfile]
laborTargetPct = 24.0
laborWatchPct = 27.0
profitFloorPct = 11.0
profitBasePct = 15.0
profitStretchPct = 17.0

[tenant.workflow]
minOpeners = 1
minClosers = 2
requirePolicyApproval = true
requireGMApproval = true

[tenant.seasonHours]
winterOpen = "12:00"
winterClose = "22:00"
springOpen = "12:00"
springClose = "22:00"
summerOpen = "12:00"
summerClose = "23:00"
fallOpen = "12:00"
fallClose = "22:00"

[locations]
codes = ["EP", "NL"]
wildcard = "BOTH"

[triggers]
profile = "balanced"
"#;
        template.to_string()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TriggersConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_profile() -> String {
    FALLBACK_PROFILE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_matches_defaults() {
        let parsed: Config =
            toml::from_str(&Config::default_template()).expect("template should parse");
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
[server]
port = 9000

[tenant.workflow]
minClosers = 3
"#,
        )
        .expect("partial config should parse");
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert_eq!(parsed.tenant.workflow.min_closers, 3);
        assert_eq!(parsed.tenant.workflow.min_openers, 1);
        assert_eq!(parsed.tenant.gp_margin_factor, 0.72);
        assert_eq!(parsed.locations.wildcard, "BOTH");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join(format!(
            "scheduling-engine-missing-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let config = Config::load(Some(&path)).expect("missing file is not an error");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let dir = std::env::temp_dir().join(format!("scheduling-engine-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        Config::write_template(&path).expect("template written");
        let loaded = Config::load(Some(&path)).expect("template loads");
        assert_eq!(loaded.triggers.profile, "balanced");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn overrides_replace_fields() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            host: Some("0.0.0.0".to_string()),
            port: Some(3000),
            trigger_profile: Some("growth".to_string()),
            weather_threshold_f: Some(8.0),
        });
        assert_eq!(config.bind_addr().expect("valid").port(), 3000);
        assert_eq!(config.triggers.profile, "growth");
        assert_eq!(config.tenant.weather_threshold_f, 8.0);
    }
}

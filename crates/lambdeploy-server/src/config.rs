use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

const MASK: &str = "****";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeployerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Management API location and credentials
    #[serde(default)]
    pub meta: MetaSettings,
    /// Where lambdas are deployed
    #[serde(default)]
    pub target: TargetSettings,
    /// Optional GitLab callback
    #[serde(default)]
    pub gitlab: GitlabSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeployerConfig {
    /// Checks what can be checked at startup.
    ///
    /// Management API URL, credentials, target org and provider id are not
    /// required here: they can be supplied per invocation and are checked when
    /// an invocation starts.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if let Some(meta_url) = non_empty(&self.meta.url) {
            url::Url::parse(meta_url).map_err(|e| format!("meta.url is not a valid URL: {e}"))?;
        }
        if let Some(gitlab_url) = non_empty(&self.gitlab.api_url) {
            url::Url::parse(gitlab_url)
                .map_err(|e| format!("gitlab.api_url is not a valid URL: {e}"))?;
            if non_empty(&self.gitlab.token).is_none() {
                return Err("gitlab.api_url requires gitlab.token".into());
            }
            if non_empty(&self.gateway.url).is_none() {
                return Err("gitlab.api_url requires gateway.url".into());
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    pub fn gitlab_enabled(&self) -> bool {
        non_empty(&self.gitlab.api_url).is_some()
    }

    /// Copy with every secret replaced, for printing.
    pub fn masked(&self) -> Self {
        let mut cfg = self.clone();
        for secret in [
            &mut cfg.meta.api_secret,
            &mut cfg.meta.token,
            &mut cfg.gitlab.token,
        ] {
            if secret.is_some() {
                *secret = Some(MASK.to_string());
            }
        }
        cfg
    }
}

/// `Some` only for a present, non-blank value.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetaSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Precomputed bearer token, preferred over key/secret
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TargetSettings {
    /// Fully-qualified name of the org lambdas are deployed into
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub lambda_provider_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GitlabSettings {
    /// e.g. `https://gitlab.com/api/v4`
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewaySettings {
    /// Public base URL of the API gateway
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Record debug lines in the per-invocation journal
    #[serde(default)]
    pub debug_journal: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            debug_journal: false,
        }
    }
}

pub mod loader {
    use super::DeployerConfig;
    use config::builder::DefaultState;
    use config::{Config, ConfigBuilder, ConfigError, Environment, File};
    use std::env;
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "lambdeploy.toml";

    /// Flat variables understood for compatibility with existing CI setups.
    const LEGACY_ENV: &[(&str, &str)] = &[
        ("META_URL", "meta.url"),
        ("API_KEY", "meta.api_key"),
        ("API_SECRET", "meta.api_secret"),
        ("META_TOKEN", "meta.token"),
        ("TARGET_ORG", "target.org"),
        ("LAMBDA_PROVIDER_ID", "target.lambda_provider_id"),
        ("GITLAB_API_URL", "gitlab.api_url"),
        ("GITLAB_TOKEN", "gitlab.token"),
        ("API_GATEWAY_URL", "gateway.url"),
    ];

    pub fn load_config(path: Option<&str>) -> Result<DeployerConfig, String> {
        let mut builder = Config::builder();
        let file = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if file.exists() {
            builder = builder.add_source(File::from(file));
        }
        // Environment variable overrides, e.g., LAMBDEPLOY__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("LAMBDEPLOY")
                .try_parsing(true)
                .separator("__"),
        );
        builder =
            apply_legacy_env(builder).map_err(|e| format!("config override error: {e}"))?;
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: DeployerConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }

    fn apply_legacy_env(
        mut builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        for (var, key) in LEGACY_ENV {
            let value = env::var(var).ok().filter(|v| !v.is_empty());
            builder = builder.set_override_option(*key, value)?;
        }
        let debug_journal = env::var("LOG_DEBUG")
            .ok()
            .map(|v| v.eq_ignore_ascii_case("true"));
        builder.set_override_option("logging.debug_journal", debug_journal)
    }
}

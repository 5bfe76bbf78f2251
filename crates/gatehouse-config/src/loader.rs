// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Turning a file into a [`GatehouseConfig`].
//!
//! The file format comes from the extension. Before parsing, `${VAR}` and
//! `${VAR:default}` placeholders are expanded from the environment; after
//! parsing, a handful of `GATEHOUSE_*` variables override individual fields:
//!
//! ```text
//! GATEHOUSE_HOST=127.0.0.1
//! GATEHOUSE_PORT=9090
//! GATEHOUSE_JWT_SECRET=...
//! GATEHOUSE_TOKEN_TTL=30m
//! GATEHOUSE_LOG_LEVEL=debug
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{GatehouseConfig, LogLevel, SecretValue};

/// Prefix of the override variables.
pub const ENV_PREFIX: &str = "GATEHOUSE";

/// Applies one override value to the configuration, or explains why it can't.
type Override = fn(&mut GatehouseConfig, &str) -> Result<(), String>;

const OVERRIDES: &[(&str, Override)] = &[
    ("HOST", |config, value| {
        config.server.host = value.parse().map_err(|_| "expected an IP address")?;
        Ok(())
    }),
    ("PORT", |config, value| {
        config.server.port = value.parse().map_err(|_| "expected a port number")?;
        Ok(())
    }),
    ("JWT_SECRET", |config, value| {
        config.security.jwt_secret = Some(SecretValue::new(value));
        Ok(())
    }),
    ("TOKEN_TTL", |config, value| {
        config.security.token_ttl = humantime::parse_duration(value).map_err(|e| e.to_string())?;
        Ok(())
    }),
    ("LOG_LEVEL", |config, value| {
        match LogLevel::parse(value) {
            Some(level) => config.logging.level = level,
            None => warn!(value, "Ignoring unknown log level override"),
        }
        Ok(())
    }),
];

/// Where `${VAR}` placeholders and overrides are looked up.
#[derive(Debug, Clone, Default)]
enum Vars {
    #[default]
    Process,
    Fixed(HashMap<String, String>),
}

impl Vars {
    fn get(&self, name: &str) -> Option<String> {
        match self {
            Vars::Process => std::env::var(name).ok(),
            Vars::Fixed(vars) => vars.get(name).cloned(),
        }
    }
}

/// Reads, expands, parses, overrides and validates configuration files.
///
/// ```no_run
/// use gatehouse_config::ConfigLoader;
///
/// let config = ConfigLoader::new().load("gatehouse.yaml").unwrap();
/// println!("listening on {}", config.server.socket_addr());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    vars: Vars,
}

impl ConfigLoader {
    /// A loader reading the process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks variables up in `vars` instead of the process environment.
    pub fn with_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Vars::Fixed(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Loads `path` and rejects it unless it validates.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<GatehouseConfig> {
        let config = self.load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` with placeholders and overrides applied, skipping
    /// validation. Used to pick up logging settings before anything else.
    pub fn load_unvalidated(&self, path: impl AsRef<Path>) -> ConfigResult<GatehouseConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;

        let config = self.build(&raw, format).map_err(|e| match e {
            ConfigError::Encoding(message) => ConfigError::malformed(path, message),
            other => other,
        })?;

        info!(
            path = %path.display(),
            users = config.directory.users.len(),
            endpoints = config.directory.endpoints.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads and validates configuration held in memory.
    pub fn load_from_str(&self, raw: &str, format: ConfigFormat) -> ConfigResult<GatehouseConfig> {
        let config = self.build(raw, format)?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults with overrides applied, validated.
    pub fn load_defaults(&self) -> ConfigResult<GatehouseConfig> {
        let mut config = GatehouseConfig::default();
        self.apply_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn build(&self, raw: &str, format: ConfigFormat) -> ConfigResult<GatehouseConfig> {
        let expanded = expand_placeholders(raw, |name| self.vars.get(name));
        let mut config: GatehouseConfig = format.parse(&expanded)?;
        self.apply_overrides(&mut config)?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut GatehouseConfig) -> ConfigResult<()> {
        for (suffix, apply) in OVERRIDES {
            let name = format!("{}_{}", ENV_PREFIX, suffix);
            if let Some(value) = self.vars.get(&name) {
                debug!(variable = %name, "Applying environment override");
                apply(&mut *config, &value)
                    .map_err(|message| ConfigError::bad_override(&name, message))?;
            }
        }
        Ok(())
    }
}

/// Replaces `${NAME}` with the value of `NAME`, or `${NAME:default}` with
/// `default` when `NAME` is unset. Unset names without a default and
/// unterminated placeholders are kept verbatim.
pub fn expand_placeholders(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, default) = match body.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (body, None),
        };
        match (lookup(name), default) {
            (Some(value), _) => out.push_str(&value),
            (None, Some(default)) => out.push_str(default),
            (None, None) => {
                warn!(variable = name, "Placeholder has no value");
                out.push_str(&rest[start..start + 2 + end + 1]);
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// File formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` or `.yml`, read through the `config` crate.
    Yaml,
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Err(ConfigError::unknown_format("(no extension)"));
        };
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::unknown_format(ext)),
        }
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> ConfigResult<T> {
        match self {
            Self::Yaml => config::Config::builder()
                .add_source(config::File::from_str(text, config::FileFormat::Yaml))
                .build()
                .and_then(|c| c.try_deserialize())
                .map_err(ConfigError::encoding),
            Self::Toml => toml::from_str(text).map_err(ConfigError::encoding),
            Self::Json => serde_json::from_str(text).map_err(ConfigError::encoding),
        }
    }
}

/// `ConfigLoader::new().load(path)`.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<GatehouseConfig> {
    ConfigLoader::new().load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const YAML: &str = r#"
server:
  port: ${PORT:9000}
  base_path: /auth
security:
  jwt_secret: "${SECRET}"
  token_ttl: 30m
directory:
  permissions:
    - id: 1
      name: ALL
      grants_all: true
    - id: 5
      name: READ_USERS
  roles:
    - id: 1
      name: SUPERADMIN
      permissions: [1]
    - id: 2
      name: VIEWER
      permissions: [5]
  endpoints:
    - service: users
      path: /users
      method: GET
      permission: 5
  default_roles: [2]
"#;

    fn loader(vars: &[(&str, &str)]) -> ConfigLoader {
        ConfigLoader::new().with_vars(vars.iter().copied())
    }

    fn write_temp(ext: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_placeholders() {
        let lookup = |name: &str| (name == "SECRET").then(|| "s3cret".to_string());
        assert_eq!(
            expand_placeholders("a=${SECRET} b=${MISSING:fallback} c=${GONE}", lookup),
            "a=s3cret b=fallback c=${GONE}"
        );
        assert_eq!(expand_placeholders("${open", lookup), "${open");
        assert_eq!(expand_placeholders("x ${SECRET}${SECRET} y", lookup), "x s3crets3cret y");
        assert_eq!(expand_placeholders("${EMPTY:}", lookup), "");
        assert_eq!(expand_placeholders("price: $5 {}", lookup), "price: $5 {}");
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_temp(".yaml", YAML);
        let config = loader(&[("SECRET", "s3cret")]).load(file.path()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.base_path, "/auth");
        assert_eq!(config.security.token_ttl, Duration::from_secs(1800));
        assert_eq!(config.security.jwt_secret.unwrap().expose(), "s3cret");
        assert_eq!(config.directory.roles.len(), 2);
        assert!(config.directory.permissions[0].grants_all());
        assert_eq!(config.directory.endpoints[0].permission.0, 5);
    }

    #[test]
    fn test_unresolved_secret_fails_validation() {
        let file = write_temp(".yaml", YAML);
        let err = loader(&[]).load(file.path()).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_env_overrides() {
        let file = write_temp(".yaml", YAML);
        let config = loader(&[
            ("SECRET", "from-file"),
            ("GATEHOUSE_PORT", "7070"),
            ("GATEHOUSE_HOST", "127.0.0.1"),
            ("GATEHOUSE_JWT_SECRET", "from-env"),
            ("GATEHOUSE_TOKEN_TTL", "1h"),
            ("GATEHOUSE_LOG_LEVEL", "debug"),
        ])
        .load(file.path())
        .unwrap();

        assert_eq!(config.server.port, 7070);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.security.jwt_secret.unwrap().expose(), "from-env");
        assert_eq!(config.security.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_env_override() {
        let err = loader(&[("GATEHOUSE_JWT_SECRET", "x"), ("GATEHOUSE_PORT", "http")])
            .load_defaults()
            .unwrap_err();
        assert!(matches!(err, ConfigError::BadOverride { ref name, .. } if name == "GATEHOUSE_PORT"));
    }

    #[test]
    fn test_load_toml_and_json() {
        let toml = r#"
[server]
port = 8181

[security]
jwt_secret = "toml-secret"
algorithm = "HS384"
"#;
        let file = write_temp(".toml", toml);
        let config = loader(&[]).load(file.path()).unwrap();
        assert_eq!(config.server.port, 8181);
        assert_eq!(config.security.algorithm, "HS384");

        let json = r#"{"security": {"jwt_secret": "json-secret", "token_ttl": "2h"}}"#;
        let config = loader(&[]).load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.security.token_ttl, Duration::from_secs(7200));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"security": {"jwt_secret": "s", "issuer": "nobody"}}"#;
        assert!(loader(&[]).load_from_str(json, ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_missing_file_and_bad_extension() {
        assert!(loader(&[]).load("/definitely/not/here.yaml").unwrap_err().is_io_error());

        let file = write_temp(".ini", "port=1");
        assert!(matches!(
            loader(&[]).load(file.path()).unwrap_err(),
            ConfigError::UnknownFormat { .. }
        ));
        assert_eq!(
            ConfigFormat::from_path(Path::new("Gate.YML")).unwrap(),
            ConfigFormat::Yaml
        );
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let file = write_temp(".json", "{ not json");
        let err = loader(&[]).load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }
}

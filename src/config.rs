//! Console configuration
//!
//! Read once at start from a YAML file shaped like the detection team's
//! `config.yaml`, then patched from the environment (`.env` included).

use crate::session::Credentials;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_BIND: &str = "0.0.0.0:8501";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Detection service host.
    pub url: String,
    pub port: u16,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    pub usernames: UsernamesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsernamesConfig {
    pub demo: Credentials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Config {
    pub fn default_path() -> &'static str {
        "config.yaml"
    }

    /// Load the YAML file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `DETECTION_HOST`, `DETECTION_PORT` and `CONSOLE_BIND` win over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DETECTION_HOST") {
            self.url = host;
        }
        if let Some(port) = lookup("DETECTION_PORT") {
            self.port = port
                .parse()
                .map_err(|_| Error::Config(format!("DETECTION_PORT '{}' is not a port", port)))?;
        }
        if let Some(bind) = lookup("CONSOLE_BIND") {
            self.console.bind = bind;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("detection service host is empty".to_string()));
        }
        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(Error::Config(format!(
                "unsupported scheme '{}'",
                self.scheme
            )));
        }
        if self.credentials.usernames.demo.email.trim().is_empty() {
            return Err(Error::Config("demo email is empty".to_string()));
        }
        Ok(())
    }

    /// `scheme://host:port`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.url.trim(), self.port)
    }

    pub fn demo_credentials(&self) -> &Credentials {
        &self.credentials.usernames.demo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SAMPLE: &str = r#"
url: detector.local
port: 8000
credentials:
  usernames:
    demo:
      email: demo@watches.test
      password: s3cret
"#;

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_yaml(SAMPLE).unwrap();

        assert_eq!(config.base_url(), "http://detector.local:8000");
        assert_eq!(config.console.bind, DEFAULT_BIND);
        assert_eq!(config.demo_credentials().email, "demo@watches.test");
        assert_eq!(config.demo_credentials().password, "s3cret");
    }

    #[test]
    fn test_scheme_and_bind_are_read() {
        let yaml = format!("{}scheme: https\nconsole:\n  bind: 127.0.0.1:9000\n", SAMPLE);
        let config = Config::from_yaml(&yaml).unwrap();

        assert_eq!(config.base_url(), "https://detector.local:8000");
        assert_eq!(config.console.bind, "127.0.0.1:9000");
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        let yaml = format!("{}scheme: ftp\n", SAMPLE);
        assert!(matches!(
            Config::from_yaml(&yaml).unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_missing_credentials_is_an_error() {
        let err = Config::from_yaml("url: a\nport: 1\n").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::from_yaml(SAMPLE).unwrap();
        let env: HashMap<&str, &str> = [
            ("DETECTION_HOST", "10.0.0.5"),
            ("DETECTION_PORT", "9100"),
            ("CONSOLE_BIND", "127.0.0.1:8080"),
        ]
        .into_iter()
        .collect();

        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url(), "http://10.0.0.5:9100");
        assert_eq!(config.console.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = Config::from_yaml(SAMPLE).unwrap();
        let err = config
            .apply_overrides(|key| (key == "DETECTION_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.demo_credentials().email, "demo@watches.test");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

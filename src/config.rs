//! Configuration loading.
//!
//! Settings are read once at startup from a TOML file, then environment
//! overrides are applied, secrets are resolved, and the result is validated.
//! The returned [`Config`] is immutable and shared by reference; nothing in
//! the request path reads the environment.
//!
//! Every section is optional:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:5000"
//!
//! [webhook]
//! secret_env = "SHOPIFY_WEBHOOK_SECRET"
//!
//! [index]
//! url = "http://localhost:8882"
//! name = "trueclassic-products"
//! api_key_env = "MARQO_API_KEY"
//! timeout_secs = 5
//! simulate = false
//! ```
//!
//! # Environment overrides
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `MARQO_URL` | replaces `index.url` |
//! | `MARQO_INDEX_NAME` | replaces `index.name` |
//! | `TEST_MODE` | `"true"` turns on `index.simulate` |
//! | `MARQO_CONFIG` | replaces `index.settings_json` |
//! | `PORT` | replaces the port of `server.bind` |

use anyhow::{bail, Context, Result};
use catalog_sync_core::IndexSettings;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}
fn default_body_limit_bytes() -> usize {
    2 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    /// Inline secret. When unset, it is read from `secret_env` at load time.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            secret_env: default_secret_env(),
        }
    }
}

fn default_secret_env() -> String {
    "SHOPIFY_WEBHOOK_SECRET".to_string()
}

impl WebhookConfig {
    /// HMAC key for signature checks. Empty when no secret is configured.
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_deref().unwrap_or_default().as_bytes()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_index_url")]
    pub url: String,
    #[serde(default = "default_index_name")]
    pub name: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub simulate: bool,
    /// JSON override for the tensor fields and mappings.
    #[serde(default)]
    pub settings_json: Option<String>,
    /// Parsed from `settings_json` (or the built-in default) during load.
    #[serde(skip)]
    pub settings: IndexSettings,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            name: default_index_name(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            simulate: false,
            settings_json: None,
            settings: IndexSettings::default(),
        }
    }
}

fn default_index_url() -> String {
    "http://localhost:8882".to_string()
}
fn default_index_name() -> String {
    "trueclassic-products".to_string()
}
fn default_api_key_env() -> String {
    "MARQO_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}

/// Load, resolve, and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content, |key| std::env::var(key).ok())
}

/// Like [`load_config`], but falls back to built-in defaults when the file
/// does not exist. Used by the offline CLI commands.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        parse_config("", |key| std::env::var(key).ok())
    }
}

/// Parse TOML `content`, then apply overrides and secrets from `env`.
///
/// `env` is injected so tests do not depend on the process environment.
pub fn parse_config<F>(content: &str, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;

    apply_env(&mut config, &env)?;

    config.index.url = config.index.url.trim_end_matches('/').to_string();
    config.index.settings = match &config.index.settings_json {
        Some(json) => IndexSettings::from_json(json)
            .with_context(|| "index.settings_json is not a valid index settings object")?,
        None => IndexSettings::default(),
    };

    validate(&config)?;
    Ok(config)
}

fn apply_env<F>(config: &mut Config, env: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env("MARQO_URL") {
        config.index.url = url;
    }
    if let Some(name) = env("MARQO_INDEX_NAME") {
        config.index.name = name;
    }
    if env("TEST_MODE").as_deref() == Some("true") {
        config.index.simulate = true;
    }
    if let Some(json) = env("MARQO_CONFIG") {
        config.index.settings_json = Some(json);
    }
    if let Some(port) = env("PORT") {
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("PORT is not a valid port number: '{}'", port))?;
        let mut addr: SocketAddr = config
            .server
            .bind
            .parse()
            .with_context(|| format!("server.bind is not a socket address: '{}'", config.server.bind))?;
        addr.set_port(port);
        config.server.bind = addr.to_string();
    }

    if config.webhook.secret.is_none() {
        config.webhook.secret = env(&config.webhook.secret_env);
    }
    if config.index.api_key.is_none() {
        config.index.api_key = env(&config.index.api_key_env);
    }

    Ok(())
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.parse::<SocketAddr>().is_err() {
        bail!("server.bind is not a socket address: '{}'", config.server.bind);
    }

    if config.server.body_limit_bytes == 0 {
        bail!("server.body_limit_bytes must be > 0");
    }

    let url = &config.index.url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("index.url must start with http:// or https://, got '{}'", url);
    }

    if config.index.name.trim().is_empty() {
        bail!("index.name must not be empty");
    }

    if config.index.timeout_secs == 0 {
        bail!("index.timeout_secs must be > 0");
    }

    if config.index.settings.tensor_fields.is_empty() {
        bail!("index settings must name at least one tensor field");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("", env_of(&[])).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:5000");
        assert_eq!(config.index.url, "http://localhost:8882");
        assert_eq!(config.index.name, "trueclassic-products");
        assert_eq!(config.index.timeout_secs, 5);
        assert!(!config.index.simulate);
        assert_eq!(config.index.settings, IndexSettings::default());
        assert!(config.webhook.secret.is_none());
        assert!(config.webhook.secret_bytes().is_empty());
    }

    #[test]
    fn test_file_values() {
        let config = parse_config(
            r#"
[server]
bind = "127.0.0.1:7400"

[webhook]
secret = "inline"

[index]
url = "https://index.example.com/"
name = "products"
api_key = "k"
timeout_secs = 2
simulate = true
"#,
            env_of(&[]),
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:7400");
        assert_eq!(config.webhook.secret_bytes(), b"inline");
        assert_eq!(config.index.url, "https://index.example.com");
        assert_eq!(config.index.name, "products");
        assert_eq!(config.index.api_key.as_deref(), Some("k"));
        assert_eq!(config.index.timeout_secs, 2);
        assert!(config.index.simulate);
    }

    #[test]
    fn test_secrets_from_env() {
        let config = parse_config(
            "",
            env_of(&[("SHOPIFY_WEBHOOK_SECRET", "shh"), ("MARQO_API_KEY", "key")]),
        )
        .unwrap();
        assert_eq!(config.webhook.secret.as_deref(), Some("shh"));
        assert_eq!(config.index.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_custom_secret_env_name() {
        let config = parse_config(
            "[webhook]\nsecret_env = \"HOOK_SECRET\"\n",
            env_of(&[("HOOK_SECRET", "custom"), ("SHOPIFY_WEBHOOK_SECRET", "default")]),
        )
        .unwrap();
        assert_eq!(config.webhook.secret.as_deref(), Some("custom"));
    }

    #[test]
    fn test_inline_secret_wins_over_env() {
        let config = parse_config(
            "[webhook]\nsecret = \"inline\"\n",
            env_of(&[("SHOPIFY_WEBHOOK_SECRET", "env")]),
        )
        .unwrap();
        assert_eq!(config.webhook.secret.as_deref(), Some("inline"));
    }

    #[test]
    fn test_env_overrides() {
        let config = parse_config(
            "",
            env_of(&[
                ("MARQO_URL", "http://marqo:8882"),
                ("MARQO_INDEX_NAME", "staging-products"),
                ("TEST_MODE", "true"),
                ("PORT", "8080"),
                (
                    "MARQO_CONFIG",
                    r#"{"tensorFields":["name"],"mappings":{}}"#,
                ),
            ]),
        )
        .unwrap();

        assert_eq!(config.index.url, "http://marqo:8882");
        assert_eq!(config.index.name, "staging-products");
        assert!(config.index.simulate);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.index.settings.tensor_fields, vec!["name"]);
        assert!(config.index.settings.mappings.is_empty());
    }

    #[test]
    fn test_test_mode_only_exact_true() {
        let config = parse_config("", env_of(&[("TEST_MODE", "1")])).unwrap();
        assert!(!config.index.simulate);
    }

    #[test]
    fn test_invalid_settings_json_fails() {
        let err = parse_config("[index]\nsettings_json = \"{ nope\"\n", env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("settings_json"));
    }

    #[test]
    fn test_empty_tensor_fields_fails() {
        let result = parse_config(
            "[index]\nsettings_json = '{\"tensorFields\":[]}'\n",
            env_of(&[]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_fails() {
        assert!(parse_config("[index]\ntimeout_secs = 0\n", env_of(&[])).is_err());
    }

    #[test]
    fn test_bad_url_fails() {
        assert!(parse_config("[index]\nurl = \"localhost:8882\"\n", env_of(&[])).is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let config = parse_config(
            include_str!("../config/catalog-sync.example.toml"),
            env_of(&[]),
        )
        .unwrap();
        assert_eq!(config.server.body_limit_bytes, 2 * 1024 * 1024);
        assert_eq!(config.index.settings, IndexSettings::default());
    }

    #[test]
    fn test_bad_port_fails() {
        assert!(parse_config("", env_of(&[("PORT", "http")])).is_err());
    }
}

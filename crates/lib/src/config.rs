//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.airbot/config.json`) and environment.
//! Secrets are usually supplied through the environment; the file holds endpoints and tuning.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE Messaging API settings (webhook secret, reply token, API base).
    #[serde(default)]
    pub line: LineConfig,

    /// Completion service used to guess a region when the lexicon misses.
    #[serde(default)]
    pub ai: AiConfig,

    /// Air-quality data provider.
    #[serde(default)]
    pub air_quality: AirQualityConfig,

    /// Region resolution strategy order.
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Reply card appearance.
    #[serde(default)]
    pub reply: ReplyConfig,
}

/// Listener bind address and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 8080). Overridden by PORT env.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; LINE must be able to reach the webhook).
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_port() -> u16 {
    8080
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

/// LINE channel config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel access token. Overridden by LINE_CHANNEL_ACCESS_TOKEN env when set.
    pub channel_access_token: Option<String>,
    /// Channel secret used to verify X-Line-Signature. Overridden by LINE_CHANNEL_SECRET env when set.
    pub channel_secret: Option<String>,
    /// Messaging API base (default https://api.line.me).
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
    /// Route the webhook is mounted on (default /callback).
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

fn default_webhook_path() -> String {
    "/callback".to_string()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base: default_line_api_base(),
            webhook_path: default_webhook_path(),
        }
    }
}

/// OpenAI-compatible completion service config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    /// API key. Overridden by OPENAI_API_KEY env when set.
    pub api_key: Option<String>,
    /// Base URL including the version segment (default https://api.openai.com/v1).
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Chat model id (default gpt-3.5-turbo).
    #[serde(default = "default_ai_model")]
    pub model: String,
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
        }
    }
}

/// Air-quality provider config. The region is appended to `base_url` as a path segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityConfig {
    #[serde(default = "default_air_quality_base_url")]
    pub base_url: String,
    /// Static bearer token. Overridden by AIR_QUALITY_API_TOKEN env when set.
    pub token: Option<String>,
}

fn default_air_quality_base_url() -> String {
    "https://data-external.airq.tw/v1/airquality".to_string()
}

impl Default for AirQualityConfig {
    fn default() -> Self {
        Self {
            base_url: default_air_quality_base_url(),
            token: None,
        }
    }
}

/// One region resolution strategy, as named in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Substring match against the built-in region list.
    Lexicon,
    /// Ask the completion service.
    Ai,
}

/// Order in which region strategies are tried; first hit wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionConfig {
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,
}

fn default_strategies() -> Vec<StrategyKind> {
    vec![StrategyKind::Lexicon, StrategyKind::Ai]
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyConfig {
    /// Hero image shown at the top of every reply card.
    #[serde(default = "default_hero_image_url")]
    pub hero_image_url: String,
}

fn default_hero_image_url() -> String {
    "https://i.imgur.com/Hf6jAlp.png".to_string()
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            hero_image_url: default_hero_image_url(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required secret(s): {}", .0.join(", "))]
    MissingSecrets(Vec<&'static str>),
    #[error("invalid webhook path {0:?}: must start with '/' and contain no ':' or '*'")]
    InvalidWebhookPath(String),
}

impl LineConfig {
    /// The webhook route as a fixed path: starts with '/', is not the root, has no captures.
    pub fn webhook_route(&self) -> Result<&str, ConfigError> {
        let path = self.webhook_path.as_str();
        if !path.starts_with('/') || path == "/" || path.contains([':', '*']) {
            return Err(ConfigError::InvalidWebhookPath(path.to_string()));
        }
        Ok(path)
    }
}

/// The three secrets the bot cannot run without, resolved from env and config.
#[derive(Clone)]
pub struct Secrets {
    pub channel_access_token: String,
    pub channel_secret: String,
    pub ai_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets").finish_non_exhaustive()
    }
}

impl Secrets {
    /// Resolve all required secrets; the error lists every one that is missing.
    pub fn resolve(config: &Config) -> Result<Self, ConfigError> {
        let channel_access_token = resolve_channel_access_token(config);
        let channel_secret = resolve_channel_secret(config);
        let ai_api_key = resolve_ai_api_key(config);
        match (channel_access_token, channel_secret, ai_api_key) {
            (Some(channel_access_token), Some(channel_secret), Some(ai_api_key)) => Ok(Self {
                channel_access_token,
                channel_secret,
                ai_api_key,
            }),
            (a, b, c) => {
                let mut missing = Vec::new();
                if a.is_none() {
                    missing.push("LINE_CHANNEL_ACCESS_TOKEN");
                }
                if b.is_none() {
                    missing.push("LINE_CHANNEL_SECRET");
                }
                if c.is_none() {
                    missing.push("OPENAI_API_KEY");
                }
                Err(ConfigError::MissingSecrets(missing))
            }
        }
    }
}

/// Non-empty trimmed env var, if set.
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn config_non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the LINE channel access token: env LINE_CHANNEL_ACCESS_TOKEN overrides config.
pub fn resolve_channel_access_token(config: &Config) -> Option<String> {
    env_non_empty("LINE_CHANNEL_ACCESS_TOKEN")
        .or_else(|| config_non_empty(config.line.channel_access_token.as_ref()))
}

/// Resolve the LINE channel secret: env LINE_CHANNEL_SECRET overrides config.
pub fn resolve_channel_secret(config: &Config) -> Option<String> {
    env_non_empty("LINE_CHANNEL_SECRET")
        .or_else(|| config_non_empty(config.line.channel_secret.as_ref()))
}

/// Resolve the completion service key: env OPENAI_API_KEY overrides config.
pub fn resolve_ai_api_key(config: &Config) -> Option<String> {
    env_non_empty("OPENAI_API_KEY").or_else(|| config_non_empty(config.ai.api_key.as_ref()))
}

/// Resolve the air-quality bearer token: env AIR_QUALITY_API_TOKEN overrides config.
pub fn resolve_air_quality_token(config: &Config) -> Option<String> {
    env_non_empty("AIR_QUALITY_API_TOKEN")
        .or_else(|| config_non_empty(config.air_quality.token.as_ref()))
}

/// Apply the PORT env override, if it parses.
pub fn apply_port_env(config: &mut Config) {
    if let Some(p) = env_non_empty("PORT") {
        match p.parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => log::warn!("ignoring invalid PORT value: {}", p),
        }
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("AIRBOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".airbot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or the default path). Missing file => default config.
/// The PORT env override is applied after parsing.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let mut config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    apply_port_env(&mut config);
    config
        .line
        .webhook_route()
        .with_context(|| format!("checking config from {}", path.display()))?;
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.server.port, 8080);
        assert_eq!(c.server.bind, "0.0.0.0");
        assert_eq!(c.line.webhook_path, "/callback");
        assert_eq!(c.ai.model, "gpt-3.5-turbo");
        assert_eq!(
            c.resolution.strategies,
            vec![StrategyKind::Lexicon, StrategyKind::Ai]
        );
    }

    #[test]
    fn empty_json_object_is_default() {
        let c: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(c.server.port, 8080);
        assert_eq!(c.air_quality.base_url, default_air_quality_base_url());
        assert_eq!(c.reply.hero_image_url, default_hero_image_url());
    }

    #[test]
    fn camel_case_keys_and_strategy_order() {
        let c: Config = serde_json::from_str(
            r#"{
                "server": { "port": 9000 },
                "line": { "channelSecret": "s", "apiBase": "http://127.0.0.1:1" },
                "airQuality": { "baseUrl": "http://aq", "token": "t" },
                "resolution": { "strategies": ["ai"] }
            }"#,
        )
        .unwrap();
        assert_eq!(c.server.port, 9000);
        assert_eq!(c.server.bind, "0.0.0.0");
        assert_eq!(c.line.channel_secret.as_deref(), Some("s"));
        assert_eq!(c.line.api_base, "http://127.0.0.1:1");
        assert_eq!(c.air_quality.base_url, "http://aq");
        assert_eq!(c.resolution.strategies, vec![StrategyKind::Ai]);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let r: Result<Config, _> =
            serde_json::from_str(r#"{ "resolution": { "strategies": ["geo"] } }"#);
        assert!(r.is_err());
    }

    #[test]
    fn config_non_empty_trims_and_filters() {
        assert_eq!(config_non_empty(Some(&"  x ".to_string())), Some("x".to_string()));
        assert_eq!(config_non_empty(Some(&"   ".to_string())), None);
        assert_eq!(config_non_empty(None), None);
    }

    #[test]
    fn missing_secrets_error_lists_names() {
        let err = ConfigError::MissingSecrets(vec!["LINE_CHANNEL_SECRET", "OPENAI_API_KEY"]);
        assert_eq!(
            err.to_string(),
            "missing required secret(s): LINE_CHANNEL_SECRET, OPENAI_API_KEY"
        );
    }

    #[test]
    fn webhook_route_accepts_fixed_paths() {
        let mut line = LineConfig::default();
        assert_eq!(line.webhook_route().unwrap(), "/callback");
        line.webhook_path = "/hooks/line".to_string();
        assert_eq!(line.webhook_route().unwrap(), "/hooks/line");
    }

    #[test]
    fn webhook_route_rejects_unroutable_paths() {
        for bad in ["callback", "", "/", "/:id", "/*rest"] {
            let line = LineConfig {
                webhook_path: bad.to_string(),
                ..LineConfig::default()
            };
            assert!(
                matches!(line.webhook_route(), Err(ConfigError::InvalidWebhookPath(p)) if p == bad),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn load_config_rejects_webhook_path_without_slash() {
        let dir = std::env::temp_dir().join(format!("airbot-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"line":{"webhookPath":"callback"}}"#).unwrap();
        let err = load_config(Some(path)).expect_err("unroutable webhook path");
        assert!(format!("{:#}", err).contains("invalid webhook path"), "{:#}", err);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,
}

impl Config {
    /// Load the YAML config at `path`, or defaults when the file does not exist.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path.as_ref()).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Self::parse(&contents)
    }

    /// Parse YAML text after environment variable expansion.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        Ok(serde_saphyr::from_str(&expanded)?)
    }
}

/// Resolve a path relative to the config file directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config_dir.join(path)
}

// ============================================================================
// Defaults
// ============================================================================

/// Default database file (relative to the config file).
pub const DEFAULT_DATABASE_PATH: &str = ".taleweaver/taleweaver.db";
/// Default remote content service.
pub const DEFAULT_CONTENT_URL: &str = "http://127.0.0.1:5000";
/// Name used when a player never picked one or picked only invalid characters.
pub const DEFAULT_PLAYER_NAME: &str = "Traveler";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    256
}

fn default_content_url() -> String {
    DEFAULT_CONTENT_URL.to_string()
}

fn default_content_timeout() -> u64 {
    10
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_player_name() -> String {
    DEFAULT_PLAYER_NAME.to_string()
}

fn default_speaker_aliases() -> Vec<String> {
    vec!["user".to_string(), "player".to_string()]
}

fn default_user_header() -> String {
    "x-remote-user".to_string()
}

fn default_staff_header() -> String {
    "x-remote-staff".to_string()
}

fn default_cookie_name() -> String {
    "taleweaver_session".to_string()
}

/// Serde default for bool fields that should be `true` (serde's default is `false`).
fn default_true() -> bool {
    true
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}`, `${VAR:-default}` and `$$` in config text.
///
/// A plain `$` not followed by `{` is kept literally. Missing required
/// variables and an unterminated `${` are errors. Defaults are not expanded
/// recursively.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                out.push_str(&read_var_reference(&mut chars)?);
            }
            _ => out.push('$'),
        }
    }

    Ok(out)
}

/// Consume `NAME}` or `NAME:-default}` and return the substituted value.
fn read_var_reference(
    chars: &mut std::iter::Peekable<std::str::Chars>,
) -> Result<String, ConfigError> {
    let mut body = String::new();
    let mut closed = false;

    for c in chars.by_ref() {
        if c == '}' {
            closed = true;
            break;
        }
        body.push(c);
    }

    if !closed {
        return Err(ConfigError::UnclosedVarReference);
    }

    let (name, default) = match body.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (body.as_str(), None),
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Requests handled concurrently before new ones wait.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

// ============================================================================
// ContentConfig
// ============================================================================

/// Connection settings for the remote content service.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_content_url")]
    pub base_url: String,

    /// Sent as `X-API-KEY` on every request when set.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upper bound for a single remote call. Calls are never retried.
    #[serde(default = "default_content_timeout")]
    pub request_timeout_seconds: u64,

    /// Ping the service once at startup so an idle host begins waking up.
    #[serde(default = "default_true")]
    pub wake_up_on_startup: bool,
}

impl ContentConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: default_content_url(),
            api_key: None,
            request_timeout_seconds: default_content_timeout(),
            wake_up_on_startup: true,
        }
    }
}

// ============================================================================
// StorageConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file, relative to the config file directory.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

// ============================================================================
// PlayerConfig
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_name")]
    pub default_name: String,

    /// Dialogue speaker names that stand for the player (case-insensitive).
    #[serde(default = "default_speaker_aliases")]
    pub speaker_aliases: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_name: default_player_name(),
            speaker_aliases: default_speaker_aliases(),
        }
    }
}

// ============================================================================
// IdentityConfig
// ============================================================================

/// Headers set by the upstream authentication proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_user_header")]
    pub user_header: String,
    #[serde(default = "default_staff_header")]
    pub staff_header: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_header: default_user_header(),
            staff_header: default_staff_header(),
        }
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.content.base_url, DEFAULT_CONTENT_URL);
        assert_eq!(config.content.request_timeout_seconds, 10);
        assert!(config.content.wake_up_on_startup);
        assert!(config.content.api_key.is_none());
        assert_eq!(config.storage.path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.player.default_name, "Traveler");
        assert_eq!(config.player.speaker_aliases, vec!["user", "player"]);
        assert_eq!(config.session.cookie_name, "taleweaver_session");
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let config = Config::load(tmp_dir.path().join("missing.yaml"))
            .await
            .unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[tokio::test]
    async fn test_load_valid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 3000
content:
  base_url: "https://stories.example.com"
  api_key: "k-123"
  request_timeout_seconds: 4
  wake_up_on_startup: false
storage:
  path: "data/plays.db"
player:
  default_name: "Wanderer"
  speaker_aliases: ["user", "người chơi"]
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.content.base_url, "https://stories.example.com");
        assert_eq!(config.content.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.content.request_timeout(), Duration::from_secs(4));
        assert!(!config.content.wake_up_on_startup);
        assert_eq!(config.storage.path, PathBuf::from("data/plays.db"));
        assert_eq!(config.player.default_name, "Wanderer");
        assert_eq!(config.player.speaker_aliases.len(), 2);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::parse("content:\n  base_url: http://remote:9000\n").unwrap();
        assert_eq!(config.content.base_url, "http://remote:9000");
        assert_eq!(config.content.request_timeout_seconds, 10);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.identity.user_header, "x-remote-user");
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::parse("invalid: yaml: content: [").is_err());
    }

    #[test]
    fn test_resolve_path_absolute() {
        let result = resolve_path(
            Path::new("/etc/taleweaver/taleweaver.yaml"),
            Path::new("/var/lib/tw.db"),
        );
        assert_eq!(result, PathBuf::from("/var/lib/tw.db"));
    }

    #[test]
    fn test_resolve_path_relative() {
        let result = resolve_path(
            Path::new("/etc/taleweaver/taleweaver.yaml"),
            Path::new(".taleweaver/taleweaver.db"),
        );
        assert_eq!(
            result,
            PathBuf::from("/etc/taleweaver/.taleweaver/taleweaver.db")
        );
    }

    #[test]
    fn test_resolve_path_config_in_current_dir() {
        let result = resolve_path(Path::new("taleweaver.yaml"), Path::new("tw.db"));
        assert_eq!(result, PathBuf::from("tw.db"));
    }

    #[test]
    fn test_expand_env_vars_required_var() {
        // SAFETY: Single-threaded test
        unsafe { std::env::set_var("TW_TEST_API_KEY", "secret") };
        let result = expand_env_vars("api_key: ${TW_TEST_API_KEY}").unwrap();
        assert_eq!(result, "api_key: secret");
        unsafe { std::env::remove_var("TW_TEST_API_KEY") };
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: Single-threaded test
        unsafe { std::env::remove_var("TW_MISSING_VAR_12345") };
        match expand_env_vars("value: ${TW_MISSING_VAR_12345}") {
            Err(ConfigError::MissingEnvVar(name)) => assert_eq!(name, "TW_MISSING_VAR_12345"),
            other => panic!("expected MissingEnvVar error, got {other:?}"),
        }
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        // SAFETY: Single-threaded test
        unsafe { std::env::remove_var("TW_UNSET_WITH_DEFAULT") };
        let result = expand_env_vars("url: ${TW_UNSET_WITH_DEFAULT:-http://localhost:5000}").unwrap();
        assert_eq!(result, "url: http://localhost:5000");
    }

    #[test]
    fn test_expand_env_vars_empty_default() {
        // SAFETY: Single-threaded test
        unsafe { std::env::remove_var("TW_UNSET_EMPTY") };
        assert_eq!(expand_env_vars("k: ${TW_UNSET_EMPTY:-}").unwrap(), "k: ");
    }

    #[test]
    fn test_expand_env_vars_escapes_and_literals() {
        assert_eq!(expand_env_vars("price: $$100").unwrap(), "price: $100");
        assert_eq!(expand_env_vars("cost is $50").unwrap(), "cost is $50");
    }

    #[test]
    fn test_expand_env_vars_unclosed_brace() {
        assert!(matches!(
            expand_env_vars("value: ${UNCLOSED:-x"),
            Err(ConfigError::UnclosedVarReference)
        ));
    }
}

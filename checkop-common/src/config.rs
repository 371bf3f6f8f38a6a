//! Configuration loading and endpoint resolution

use std::path::PathBuf;

/// Compiled-in default REST endpoint.
pub const DEFAULT_API_URL: &str = "https://zapchecker.bigdates.com.br";
/// Compiled-in default notification channel endpoint.
pub const DEFAULT_WS_URL: &str = "wss://zapchecker.bigdates.com.br/ws";

/// Client endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL for REST requests (no trailing slash).
    pub api_base_url: String,
    /// URL of the persistent notification WebSocket.
    pub ws_url: String,
}

impl ClientConfig {
    /// Resolve endpoints following the priority order:
    /// 1. Command-line argument (highest priority)
    /// 2. Environment variable (`CHECKOP_API_URL` / `CHECKOP_WS_URL`)
    /// 3. TOML config file (`api_url` / `ws_url` keys)
    /// 4. Compiled default (fallback)
    pub fn resolve(cli_api_url: Option<&str>, cli_ws_url: Option<&str>) -> Self {
        let file = load_config_file()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|content| toml::from_str::<toml::Value>(&content).ok());

        let api_base_url = resolve_value(
            cli_api_url,
            "CHECKOP_API_URL",
            file.as_ref(),
            "api_url",
            DEFAULT_API_URL,
        );
        let ws_url = resolve_value(
            cli_ws_url,
            "CHECKOP_WS_URL",
            file.as_ref(),
            "ws_url",
            DEFAULT_WS_URL,
        );

        ClientConfig {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            ws_url,
        }
    }
}

fn resolve_value(
    cli: Option<&str>,
    env_var: &str,
    file: Option<&toml::Value>,
    file_key: &str,
    default: &str,
) -> String {
    if let Some(value) = cli {
        return value.to_string();
    }
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return value;
        }
    }
    if let Some(value) = file.and_then(|f| value_from_toml(f, file_key)) {
        return value;
    }
    default.to_string()
}

/// Extract a string key from a parsed config file.
fn value_from_toml(config: &toml::Value, key: &str) -> Option<String> {
    config.get(key).and_then(|v| v.as_str()).map(String::from)
}

/// Platform config file path: `<config dir>/checkop/config.toml`,
/// with `/etc/checkop/config.toml` as a system-wide fallback on Linux.
fn load_config_file() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("checkop").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }
    if cfg!(target_os = "linux") {
        let system = PathBuf::from("/etc/checkop/config.toml");
        if system.exists() {
            return Some(system);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_key_extraction() {
        let config: toml::Value =
            toml::from_str("api_url = \"https://staging.example.com\"\nws_url = \"wss://staging.example.com/ws\"")
                .unwrap();
        assert_eq!(
            value_from_toml(&config, "api_url").as_deref(),
            Some("https://staging.example.com")
        );
        assert_eq!(
            value_from_toml(&config, "ws_url").as_deref(),
            Some("wss://staging.example.com/ws")
        );
        assert_eq!(value_from_toml(&config, "missing"), None);
    }

    #[test]
    fn cli_argument_wins() {
        let config: toml::Value = toml::from_str("api_url = \"https://from-file\"").unwrap();
        let resolved = resolve_value(
            Some("https://from-cli"),
            "CHECKOP_TEST_UNSET_VAR",
            Some(&config),
            "api_url",
            DEFAULT_API_URL,
        );
        assert_eq!(resolved, "https://from-cli");
    }

    #[test]
    fn file_beats_default() {
        let config: toml::Value = toml::from_str("api_url = \"https://from-file\"").unwrap();
        let resolved = resolve_value(
            None,
            "CHECKOP_TEST_UNSET_VAR",
            Some(&config),
            "api_url",
            DEFAULT_API_URL,
        );
        assert_eq!(resolved, "https://from-file");
    }

    #[test]
    fn default_when_nothing_set() {
        let resolved = resolve_value(None, "CHECKOP_TEST_UNSET_VAR", None, "api_url", DEFAULT_API_URL);
        assert_eq!(resolved, DEFAULT_API_URL);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig::resolve(Some("https://api.example.com/"), Some("wss://api.example.com/ws"));
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.ws_url, "wss://api.example.com/ws");
    }
}

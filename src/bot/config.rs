use std::{net::SocketAddr, path::PathBuf};

use reqwest::Url;
use teloxide::types::UserId;

/* Config holds everything the bot reads from its environment.
 * Only the admin ID matters to the bot's logic; the rest is wiring.
 */

const TOKEN_VARS: [&str; 2] = ["BOT_TOKEN", "TELOXIDE_TOKEN"];
const ADMIN_ID_VAR: &str = "ADMIN_ID";
const DATA_FILE_VAR: &str = "DATA_FILE";
const WEBHOOK_URL_VAR: &str = "WEBHOOK_URL";
const PORT_VAR: &str = "PORT";

const DATA_FILE_DEFAULT: &str = "data.json";
const PORT_DEFAULT: u16 = 10000;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(String),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct WebhookConfig {
    // Full URL Telegram posts updates to, ending in the bot token
    pub url: Url,
    pub address: SocketAddr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BotConfig {
    pub token: String,
    pub admin_id: UserId,
    pub data_file: PathBuf,
    pub webhook: Option<WebhookConfig>,
}

impl BotConfig {
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_id == user_id
    }

    /* Reads the configuration from the process environment.
     */
    pub fn from_env() -> Result<BotConfig, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /* Builds the configuration from any variable lookup.
     * Empty values count as unset.
     */
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<BotConfig, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let token = TOKEN_VARS
            .iter()
            .find_map(|name| get(*name))
            .ok_or_else(|| ConfigError::Missing(TOKEN_VARS.join(" or ")))?;

        let admin_id =
            get(ADMIN_ID_VAR).ok_or_else(|| ConfigError::Missing(ADMIN_ID_VAR.to_string()))?;
        let admin_id = admin_id
            .trim()
            .parse::<u64>()
            .map(UserId)
            .map_err(|_| ConfigError::Invalid {
                name: ADMIN_ID_VAR.to_string(),
                value: admin_id.clone(),
            })?;

        let data_file =
            PathBuf::from(get(DATA_FILE_VAR).unwrap_or(DATA_FILE_DEFAULT.to_string()));

        let webhook = match get(WEBHOOK_URL_VAR) {
            Some(base) => Some(parse_webhook(&base, &token, get(PORT_VAR))?),
            None => None,
        };

        Ok(BotConfig {
            token,
            admin_id,
            data_file,
            webhook,
        })
    }
}

// Webhook URL is "<base>/<token>", served on all interfaces at the given port.
fn parse_webhook(
    base: &str,
    token: &str,
    port: Option<String>,
) -> Result<WebhookConfig, ConfigError> {
    let url = format!("{}/{}", base.trim().trim_end_matches('/'), token);
    let url = Url::parse(&url).map_err(|_| ConfigError::Invalid {
        name: WEBHOOK_URL_VAR.to_string(),
        value: base.to_string(),
    })?;

    let port = match port {
        Some(port) => port.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
            name: PORT_VAR.to_string(),
            value: port.clone(),
        })?,
        None => PORT_DEFAULT,
    };

    Ok(WebhookConfig {
        url,
        address: SocketAddr::from(([0, 0, 0, 0], port)),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        BotConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_minimal_config() {
        let config = config_from(&[("BOT_TOKEN", "123:abc"), ("ADMIN_ID", "42")]).unwrap();
        assert_eq!(config.token, "123:abc");
        assert_eq!(config.admin_id, UserId(42));
        assert_eq!(config.data_file, PathBuf::from("data.json"));
        assert_eq!(config.webhook, None);
        assert!(config.is_admin(UserId(42)));
        assert!(!config.is_admin(UserId(43)));
    }

    #[test]
    fn test_teloxide_token_fallback() {
        let config = config_from(&[("TELOXIDE_TOKEN", "t"), ("ADMIN_ID", "1")]).unwrap();
        assert_eq!(config.token, "t");
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(
            config_from(&[("ADMIN_ID", "1")]),
            Err(ConfigError::Missing("BOT_TOKEN or TELOXIDE_TOKEN".to_string()))
        );
        assert_eq!(
            config_from(&[("BOT_TOKEN", "t"), ("ADMIN_ID", " ")]),
            Err(ConfigError::Missing("ADMIN_ID".to_string()))
        );
    }

    #[test]
    fn test_invalid_admin_id() {
        assert!(matches!(
            config_from(&[("BOT_TOKEN", "t"), ("ADMIN_ID", "admin")]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_webhook_config() {
        let config = config_from(&[
            ("BOT_TOKEN", "123:abc"),
            ("ADMIN_ID", "42"),
            ("WEBHOOK_URL", "https://bot.example.com/"),
            ("PORT", "8443"),
            ("DATA_FILE", "/var/lib/bot/data.json"),
        ])
        .unwrap();

        let webhook = config.webhook.unwrap();
        assert_eq!(webhook.url.as_str(), "https://bot.example.com/123:abc");
        assert_eq!(webhook.address, SocketAddr::from(([0, 0, 0, 0], 8443)));
        assert_eq!(config.data_file, PathBuf::from("/var/lib/bot/data.json"));
    }

    #[test]
    fn test_webhook_default_port() {
        let config = config_from(&[
            ("BOT_TOKEN", "t"),
            ("ADMIN_ID", "42"),
            ("WEBHOOK_URL", "https://bot.example.com"),
        ])
        .unwrap();
        assert_eq!(config.webhook.unwrap().address.port(), 10000);
    }

    #[test]
    fn test_invalid_webhook_values() {
        assert!(matches!(
            config_from(&[
                ("BOT_TOKEN", "t"),
                ("ADMIN_ID", "1"),
                ("WEBHOOK_URL", "not a url"),
            ]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            config_from(&[
                ("BOT_TOKEN", "t"),
                ("ADMIN_ID", "1"),
                ("WEBHOOK_URL", "https://bot.example.com"),
                ("PORT", "99999"),
            ]),
            Err(ConfigError::Invalid { .. })
        ));
    }
}

//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Service configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token.
    pub bot_token: SecretString,
    /// Designated owner/approver — unconditional privilege override,
    /// exclusive rights to resolve approvals and license chats.
    pub owner_id: i64,
    /// Path of the local database file.
    pub db_path: PathBuf,
    /// Long-poll timeout in seconds for update fetching.
    pub poll_timeout_secs: u32,
}

impl Config {
    /// Read configuration from `WARDEN_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("WARDEN_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("WARDEN_BOT_TOKEN".into()))?;

        let owner_raw = std::env::var("WARDEN_OWNER_ID")
            .map_err(|_| ConfigError::MissingEnvVar("WARDEN_OWNER_ID".into()))?;
        let owner_id: i64 = owner_raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "WARDEN_OWNER_ID".into(),
            message: format!("expected a numeric user id, got {owner_raw:?}"),
        })?;

        let db_path = std::env::var("WARDEN_DB_PATH")
            .unwrap_or_else(|_| "./data/warden.db".to_string())
            .into();

        let poll_timeout_secs = match std::env::var("WARDEN_POLL_TIMEOUT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "WARDEN_POLL_TIMEOUT".into(),
                message: format!("expected seconds, got {raw:?}"),
            })?,
            Err(_) => 30,
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            owner_id,
            db_path,
            poll_timeout_secs,
        })
    }
}

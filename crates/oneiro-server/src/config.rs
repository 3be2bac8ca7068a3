use std::{env, net::SocketAddr, path::PathBuf};

use thiserror::Error;
use tracing::warn;

use oneiro_ai::gemini::{DEFAULT_MODEL, GEMINI_BASE_URL};

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    /// `None` disables the AI routes.
    pub gemini: Option<GeminiConfig>,
}

impl ServerConfig {
    /// Read configuration from the environment. `.env` must already be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = var("ONEIRO_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("ONEIRO_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidVar("ONEIRO_PORT".into(), e.to_string())
            })?;
        let bind_address = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidVar("ONEIRO_HOST".into(), e.to_string())
            })?;

        let db_path = PathBuf::from(var("ONEIRO_DB_PATH").unwrap_or_else(|| "oneiro.db".into()));

        let jwt_secret = var("ONEIRO_JWT_SECRET").unwrap_or_else(|| {
            warn!("ONEIRO_JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.into()
        });

        let gemini = var("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| GeminiConfig {
                api_key,
                base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| GEMINI_BASE_URL.into()),
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            });

        Ok(ServerConfig {
            bind_address,
            db_path,
            jwt_secret,
            gemini,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_address, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(cfg.db_path, PathBuf::from("oneiro.db"));
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert!(cfg.gemini.is_none());
    }

    #[test]
    fn gemini_settings_follow_the_key() {
        let cfg = config(&[("GEMINI_API_KEY", "k"), ("GEMINI_MODEL", "gemini-x")]).unwrap();
        let gemini = cfg.gemini.unwrap();
        assert_eq!(gemini.api_key, "k");
        assert_eq!(gemini.model, "gemini-x");
        assert_eq!(gemini.base_url, GEMINI_BASE_URL);

        assert!(config(&[("GEMINI_API_KEY", "  ")]).unwrap().gemini.is_none());
    }

    #[test]
    fn bad_port_is_reported() {
        let err = config(&[("ONEIRO_PORT", "sixty")]).unwrap_err();
        assert!(err.to_string().contains("ONEIRO_PORT"));
    }
}

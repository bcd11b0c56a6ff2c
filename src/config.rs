use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://coursebook.db".to_string());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|_| AppError::Config(format!("BIND_ADDR '{}' is not a socket address", bind_addr)))?;

        let admin_username = lookup("ADMIN_USERNAME")
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| "admin".to_string());
        let admin_password = lookup("ADMIN_PASSWORD").filter(|p| !p.is_empty());

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or_else(|| AppError::Config(format!("BCRYPT_COST '{}' must be 4..=31", raw)))?,
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_url,
            bind_addr,
            admin_username,
            admin_password,
            bcrypt_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite://coursebook.db");
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.admin_username, "admin");
        assert!(config.admin_password.is_none());
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(matches!(config_with(&[("BIND_ADDR", "nowhere")]), Err(AppError::Config(_))));
        assert!(matches!(config_with(&[("BCRYPT_COST", "2")]), Err(AppError::Config(_))));
        assert!(matches!(config_with(&[("BCRYPT_COST", "high")]), Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_USERNAME", " trainer "),
            ("ADMIN_PASSWORD", "s3cret"),
            ("BCRYPT_COST", "6"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.admin_username, "trainer");
        assert_eq!(config.admin_password.as_deref(), Some("s3cret"));
        assert_eq!(config.bcrypt_cost, 6);
    }
}

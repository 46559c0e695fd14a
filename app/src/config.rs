// storefront_app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
  #[default]
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs the catalog on the in-memory store.
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `lookup` returns `None` for unset keys.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL");
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|| "5".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    if database_max_connections == 0 {
      return Err(AppError::Config("DATABASE_MAX_CONNECTIONS must be at least 1.".to_string()));
    }
    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;
    let log_format = match get_env("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("pretty") => LogFormat::Pretty,
      Some("json") => LogFormat::Json,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid LOG_FORMAT '{}': expected 'pretty' or 'json'.",
          other
        )))
      }
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      seed_db,
      log_format,
    })
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_apply_without_variables() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg.server_address(), "127.0.0.1:8080");
    assert_eq!(cfg.database_url, None);
    assert_eq!(cfg.database_max_connections, 5);
    assert!(!cfg.seed_db);
    assert_eq!(cfg.log_format, LogFormat::Pretty);
  }

  #[test]
  fn explicit_values_are_parsed() {
    let cfg = config_from(&[
      ("SERVER_PORT", "9000"),
      ("DATABASE_URL", "postgres://localhost/catalog"),
      ("SEED_DB", "true"),
      ("LOG_FORMAT", "JSON"),
    ])
    .unwrap();
    assert_eq!(cfg.server_port, 9000);
    assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/catalog"));
    assert!(cfg.seed_db);
    assert_eq!(cfg.log_format, LogFormat::Json);
  }

  #[test]
  fn blank_database_url_means_in_memory() {
    let cfg = config_from(&[("DATABASE_URL", "  ")]).unwrap();
    assert_eq!(cfg.database_url, None);
  }

  #[test]
  fn invalid_values_are_config_errors() {
    for vars in [
      vec![("SERVER_PORT", "http")],
      vec![("SEED_DB", "yes")],
      vec![("LOG_FORMAT", "xml")],
      vec![("DATABASE_MAX_CONNECTIONS", "0")],
    ] {
      assert!(matches!(config_from(&vars), Err(AppError::Config(_))), "{:?}", vars);
    }
  }
}

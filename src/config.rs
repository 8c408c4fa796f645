// ⚙️ Configuration - Environment variables with .env support
//
// Every key is optional:
//   PLANNER_DB_PATH        SQLite file            (planner.db)
//   PLANNER_BIND_ADDR      API listen address     (0.0.0.0:8080)
//   PLANNER_CORS_ORIGIN    allowed browser origin (http://localhost:4200)
//   PLANNER_LOG_LEVEL      trace|debug|info|warn|error (info)
//   PLANNER_LOG_DIR        rotate logs here instead of stderr
//   PLANNER_SESSION_PATH   client session file    (.planner_session.json)
//   PLANNER_EMAIL_DOMAIN   required email suffix  (@est.ucab.edu.ve)

use crate::validation::AccountRules;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "planner.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_SESSION_PATH: &str = ".planner_session.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub session_path: PathBuf,
    pub email_domain: String,
}

impl Config {
    /// Read from the process environment after loading `.env` if present
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("PLANNER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .with_context(|| format!("PLANNER_BIND_ADDR is not a socket address: {}", bind_raw))?;

        let default_rules = AccountRules::default();

        Ok(Config {
            db_path: get("PLANNER_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            bind_addr,
            cors_origin: get("PLANNER_CORS_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            log_level: get("PLANNER_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: get("PLANNER_LOG_DIR").map(PathBuf::from),
            session_path: get("PLANNER_SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH)),
            email_domain: get("PLANNER_EMAIL_DOMAIN").unwrap_or(default_rules.email_domain),
        })
    }

    pub fn account_rules(&self) -> AccountRules {
        AccountRules {
            email_domain: self.email_domain.clone(),
        }
    }
}

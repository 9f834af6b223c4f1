use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

/// Where the page tree is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagesBackend {
    /// Whole-document JSON file.
    Json,
    /// `pages` table in the application database.
    Sql,
}

impl FromStr for PagesBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sql" | "sqlite" => Ok(Self::Sql),
            other => anyhow::bail!("unknown pages backend '{}' (expected json or sql)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub pages_backend: PagesBackend,
    pub pages_file: PathBuf,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub static_pages_dir: PathBuf,
    pub templates_dir: Option<PathBuf>,
    pub static_assets_prefix: String,
    pub session_ttl_secs: i64,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub allow_registration: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: var("DATABASE_URL", "sqlite://handbook.db"),
            port: var("PORT", "5000").parse().context("PORT must be a port number")?,
            pages_backend: var("PAGES_BACKEND", "json").parse()?,
            pages_file: PathBuf::from(var("PAGES_FILE", "pages.json")),
            uploads_dir: PathBuf::from(var("UPLOADS_DIR", "public/uploads")),
            max_upload_bytes: var("MAX_UPLOAD_BYTES", "10485760") // 10 MiB
                .parse()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            static_pages_dir: PathBuf::from(var("STATIC_PAGES_DIR", "static_pages")),
            templates_dir: lookup("TEMPLATES_DIR").map(PathBuf::from),
            static_assets_prefix: var("STATIC_ASSETS_PREFIX", "/public/uploads"),
            session_ttl_secs: var("SESSION_TTL_SECS", "86400") // 1 day
                .parse()
                .context("SESSION_TTL_SECS must be a number of seconds")?,
            admin_username: lookup("ADMIN_USERNAME").filter(|v| !v.is_empty()),
            admin_password: lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty()),
            allow_registration: parse_flag(&var("ALLOW_REGISTRATION", "false"))?,
        })
    }
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}

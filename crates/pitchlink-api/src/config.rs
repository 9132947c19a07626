use std::path::PathBuf;

use thiserror::Error;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your-secret-key",
];

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:3000",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PITCHLINK_JWT_SECRET is unset or still a placeholder")]
    InsecureSecret,

    #[error("{key} must be a port number, got '{value}'")]
    InvalidPort { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    /// `None` when SMTP host or credentials are missing.
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| get(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string());

        let jwt_secret = get("PITCHLINK_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::InsecureSecret);
        }

        let port = parse_port("PITCHLINK_PORT", &var("PITCHLINK_PORT", "8000"))?;

        let allowed_origins = match get("PITCHLINK_ALLOWED_ORIGINS").filter(|v| !v.trim().is_empty()) {
            Some(list) => list
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let smtp = match (
            get("PITCHLINK_SMTP_HOST").filter(|v| !v.is_empty()),
            get("PITCHLINK_SMTP_USERNAME").filter(|v| !v.is_empty()),
            get("PITCHLINK_SMTP_PASSWORD").filter(|v| !v.is_empty()),
        ) {
            (Some(host), Some(username), Some(password)) => Some(SmtpConfig {
                port: parse_port("PITCHLINK_SMTP_PORT", &var("PITCHLINK_SMTP_PORT", "587"))?,
                from_address: var("PITCHLINK_MAIL_FROM", &username),
                host,
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            host: var("PITCHLINK_HOST", "0.0.0.0"),
            port,
            db_path: var("PITCHLINK_DB_PATH", "pitchlink.db").into(),
            jwt_secret,
            upload_dir: var("PITCHLINK_UPLOAD_DIR", "./uploads").into(),
            allowed_origins,
            smtp,
        })
    }
}

fn parse_port(key: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidPort {
        key,
        value: value.to_string(),
    })
}

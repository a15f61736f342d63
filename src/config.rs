/*
 * Responsibility
 * - Read settings from the environment (DATABASE_URL, signing key, token lifetimes, CORS allowlist)
 * - Validate them (anything missing or unsafe is a startup failure)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::middleware::cors::{CorsPolicy, CorsPolicyError};
use crate::services::auth::{SigningKey, TokenConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Cors(CorsPolicyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Cors(e) => write!(f, "invalid CORS configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Cors(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CorsPolicyError> for ConfigError {
    fn from(e: CorsPolicyError) -> Self {
        ConfigError::Cors(e)
    }
}

/// Transport limits applied by `middleware::http`.
#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub body_limit_bytes: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub database_url: String,
    pub token: TokenConfig,
    pub cors: CorsPolicy,
    pub http: HttpLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let database_url = lookup("DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let token = token_config(&lookup)?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        let cors_allow_credentials = parse_or(&lookup, "CORS_ALLOW_CREDENTIALS", true)?;
        let cors = CorsPolicy::new(&cors_allowed_origins, cors_allow_credentials)?;

        let http = HttpLimits {
            body_limit_bytes: parse_or(&lookup, "HTTP_BODY_LIMIT_BYTES", 1024 * 1024)?,
            timeout: Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECONDS", 30)?),
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            token,
            cors,
            http,
        })
    }
}

fn token_config<F>(lookup: &F) -> Result<TokenConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw_key = lookup("AUTH_SIGNING_KEY")
        .filter(|s| !s.trim().is_empty())
        .ok_or(ConfigError::Missing("AUTH_SIGNING_KEY"))?;
    let signing_key = STANDARD
        .decode(raw_key.trim())
        .ok()
        .and_then(SigningKey::new)
        .ok_or(ConfigError::Invalid("AUTH_SIGNING_KEY"))?;

    let issuer = lookup("AUTH_ISSUER").unwrap_or_else(|| "shopease".to_string());
    let audience = lookup("AUTH_AUDIENCE").unwrap_or_else(|| "shopease-web".to_string());
    if issuer.trim().is_empty() {
        return Err(ConfigError::Invalid("AUTH_ISSUER"));
    }
    if audience.trim().is_empty() {
        return Err(ConfigError::Invalid("AUTH_AUDIENCE"));
    }

    let ttl_seconds: i64 = parse_or(lookup, "ACCESS_TOKEN_TTL_SECONDS", 3600)?;
    if ttl_seconds <= 0 {
        return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
    }
    let leeway_seconds: u64 = parse_or(lookup, "ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;

    Ok(TokenConfig {
        signing_key,
        issuer,
        audience,
        ttl: chrono::Duration::seconds(ttl_seconds),
        leeway_seconds,
    })
}

// Absent -> default; present but unparsable -> error (never silently fall back).
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    // 32 bytes of 'k'
    const KEY: &str = "a2tra2tra2tra2tra2tra2tra2tra2tra2tra2tra2s=";

    fn base() -> HashMap<&'static str, String> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/shop".to_string()),
            ("AUTH_SIGNING_KEY", KEY.to_string()),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000".to_string()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&base()).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.token.ttl, chrono::Duration::seconds(3600));
        assert_eq!(config.token.leeway_seconds, 0);
        assert_eq!(config.token.issuer, "shopease");
        assert!(config.cors.allow_credentials());
        assert_eq!(config.http.body_limit_bytes, 1024 * 1024);
    }

    #[test]
    fn signing_key_is_required_and_validated() {
        let mut vars = base();
        vars.remove("AUTH_SIGNING_KEY");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Missing("AUTH_SIGNING_KEY"))
        ));

        vars.insert("AUTH_SIGNING_KEY", "c2hvcnQ=".into());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid("AUTH_SIGNING_KEY"))
        ));

        vars.insert("AUTH_SIGNING_KEY", "%%% not base64 %%%".into());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid("AUTH_SIGNING_KEY"))
        ));
    }

    #[test]
    fn signing_key_never_appears_in_debug_output() {
        let printed = format!("{:?}", load(&base()).unwrap());
        assert!(!printed.contains(KEY));
        assert!(!printed.contains("kkkk"));
    }

    #[test]
    fn credentials_without_origins_is_fatal() {
        let mut vars = base();
        vars.remove("CORS_ALLOWED_ORIGINS");
        assert!(matches!(load(&vars), Err(ConfigError::Cors(_))));
    }

    #[test]
    fn wildcard_with_credentials_is_fatal() {
        let mut vars = base();
        vars.insert("CORS_ALLOWED_ORIGINS", "*".into());
        assert!(matches!(load(&vars), Err(ConfigError::Cors(_))));

        vars.insert("CORS_ALLOW_CREDENTIALS", "false".into());
        assert!(load(&vars).is_ok());
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let mut vars = base();
        vars.insert("ACCESS_TOKEN_TTL_SECONDS", "0".into());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))
        ));

        let mut vars = base();
        vars.insert("ACCESS_TOKEN_LEEWAY_SECONDS", "-5".into());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"))
        ));
    }
}

use std::net::IpAddr;
use std::time::Duration;

use ipnet::IpNet;

const INSECURE_JWT_SECRET: &str = "default_secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub reset_token_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub frontend_url: String,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub auth_rate_limit: RateLimitConfig,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

/// Session token signing settings. Issuer and audience are only checked when set.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_required = |key: &str| {
            lookup(key).ok_or_else(|| format!("Missing required environment variable: {key}"))
        };
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;
        let reset_token_secret = env_required("RESET_TOKEN_SECRET")?;

        let host: IpAddr = env_or("APP_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid APP_HOST: {e}"))?;

        let port: u16 = env_or("APP_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid APP_PORT: {e}"))?;

        let db_max_connections: u32 = env_or("APP_DB_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid APP_DB_MAX_CONNECTIONS: {e}"))?;

        let frontend_url = env_or("FRONTEND_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();

        let max_body_size: usize = env_or("APP_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid APP_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("APP_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid APP_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let max_requests: u32 = env_or("AUTH_RATE_LIMIT_MAX", "5")
            .parse()
            .map_err(|e| format!("Invalid AUTH_RATE_LIMIT_MAX: {e}"))?;
        let window_secs: u64 = env_or("AUTH_RATE_LIMIT_WINDOW_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid AUTH_RATE_LIMIT_WINDOW_SECS: {e}"))?;

        let log_level = env_or("APP_LOG_LEVEL", "info");

        let smtp = match (
            lookup("SMTP_HOST"),
            lookup("SMTP_PORT"),
            lookup("SMTP_USERNAME"),
            lookup("SMTP_PASSWORD"),
            lookup("FROM_EMAIL"),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            (None, None, None, None, None) => None,
            _ => {
                return Err(
                    "SMTP_HOST, SMTP_PORT, SMTP_USERNAME, SMTP_PASSWORD and FROM_EMAIL must be set together"
                        .to_string(),
                );
            }
        };

        let config = Config {
            database_url,
            db_max_connections,
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer: lookup("JWT_ISSUER"),
                audience: lookup("JWT_AUDIENCE"),
            },
            reset_token_secret,
            host,
            port,
            frontend_url,
            max_body_size,
            trusted_proxies,
            auth_rate_limit: RateLimitConfig {
                max_requests,
                window: Duration::from_secs(window_secs),
            },
            log_level,
            smtp,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.secret == INSECURE_JWT_SECRET {
            return Err("JWT_SECRET must not use insecure default".to_string());
        }
        if self.reset_token_secret == self.jwt.secret {
            return Err("RESET_TOKEN_SECRET must differ from JWT_SECRET".to_string());
        }
        if self.auth_rate_limit.max_requests == 0 {
            return Err("AUTH_RATE_LIMIT_MAX must be greater than zero".to_string());
        }
        if self.auth_rate_limit.window.is_zero() {
            return Err("AUTH_RATE_LIMIT_WINDOW_SECS must be greater than zero".to_string());
        }
        if let Some(smtp) = &self.smtp {
            if smtp.from.parse::<lettre::message::Mailbox>().is_err() {
                return Err(format!("Invalid FROM_EMAIL: {}", smtp.from));
            }
        }
        Ok(())
    }
}

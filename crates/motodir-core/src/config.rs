use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let backend_url = parse_backend_url(&require("MOTODIR_BACKEND_URL")?)?;
    let anon_key = require("MOTODIR_ANON_KEY")?;

    let env = parse_environment(&or_default("MOTODIR_ENV", "development"))?;
    let log_level = or_default("MOTODIR_LOG_LEVEL", "info");

    let shops_table = or_default("MOTODIR_SHOPS_TABLE", "motorcycle_shops");
    let storage_bucket = or_default("MOTODIR_STORAGE_BUCKET", "images");

    let request_timeout_secs = parse_u64("MOTODIR_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("MOTODIR_USER_AGENT", "motodir/0.1 (shop-directory)");

    let email = optional("MOTODIR_EMAIL");
    let password = optional("MOTODIR_PASSWORD");

    Ok(AppConfig {
        env,
        log_level,
        backend_url,
        anon_key,
        shops_table,
        storage_bucket,
        request_timeout_secs,
        user_agent,
        email,
        password,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MOTODIR_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Checks the scheme and strips trailing slashes.
fn parse_backend_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: "MOTODIR_BACKEND_URL".to_string(),
            reason: "must start with http:// or https://".to_string(),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// configuration; only malformed values are rejected.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let env = parse_environment(&or_default("PARTNERSCAN_ENV", "development"))?;
    let log_level = or_default("PARTNERSCAN_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "PARTNERSCAN_SOURCES_PATH",
        "./config/sources.yaml",
    ));
    let data_dir = PathBuf::from(or_default("PARTNERSCAN_DATA_DIR", "./data"));

    let scraper_request_timeout_secs =
        parse_u64("PARTNERSCAN_SCRAPER_REQUEST_TIMEOUT_SECS", "20")?;
    if scraper_request_timeout_secs == 0 {
        return Err(invalid(
            "PARTNERSCAN_SCRAPER_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let scraper_user_agent = or_default(
        "PARTNERSCAN_SCRAPER_USER_AGENT",
        "partnerscan/0.1 (partner-listing-survey)",
    );
    let scraper_max_retries = parse_u32("PARTNERSCAN_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_ms =
        parse_u64("PARTNERSCAN_SCRAPER_RETRY_BACKOFF_BASE_MS", "3000")?;
    let scraper_inter_request_delay_ms =
        parse_u64("PARTNERSCAN_SCRAPER_INTER_REQUEST_DELAY_MS", "400")?;
    let scraper_max_pages = parse_usize("PARTNERSCAN_SCRAPER_MAX_PAGES", "200")?;
    if scraper_max_pages == 0 {
        return Err(invalid(
            "PARTNERSCAN_SCRAPER_MAX_PAGES",
            "must be at least 1".to_string(),
        ));
    }
    let scraper_pipeline_fetches = parse_bool("PARTNERSCAN_SCRAPER_PIPELINE_FETCHES", "false")?;

    Ok(AppConfig {
        env,
        log_level,
        sources_path,
        data_dir,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        scraper_inter_request_delay_ms,
        scraper_max_pages,
        scraper_pipeline_fetches,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PARTNERSCAN_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

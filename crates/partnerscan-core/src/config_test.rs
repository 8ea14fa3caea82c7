use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PARTNERSCAN_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.sources_path.to_str(), Some("./config/sources.yaml"));
    assert_eq!(cfg.data_dir.to_str(), Some("./data"));
    assert_eq!(cfg.scraper_request_timeout_secs, 20);
    assert_eq!(
        cfg.scraper_user_agent,
        "partnerscan/0.1 (partner-listing-survey)"
    );
    assert_eq!(cfg.scraper_max_retries, 2);
    assert_eq!(cfg.scraper_retry_backoff_base_ms, 3000);
    assert_eq!(cfg.scraper_inter_request_delay_ms, 400);
    assert_eq!(cfg.scraper_max_pages, 200);
    assert!(!cfg.scraper_pipeline_fetches);
}

#[test]
fn build_app_config_applies_overrides() {
    let mut map = HashMap::new();
    map.insert("PARTNERSCAN_ENV", "production");
    map.insert("PARTNERSCAN_DATA_DIR", "/var/lib/partnerscan");
    map.insert("PARTNERSCAN_SCRAPER_REQUEST_TIMEOUT_SECS", "60");
    map.insert("PARTNERSCAN_SCRAPER_MAX_RETRIES", "5");
    map.insert("PARTNERSCAN_SCRAPER_MAX_PAGES", "10");
    map.insert("PARTNERSCAN_SCRAPER_PIPELINE_FETCHES", "true");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.data_dir.to_str(), Some("/var/lib/partnerscan"));
    assert_eq!(cfg.scraper_request_timeout_secs, 60);
    assert_eq!(cfg.scraper_max_retries, 5);
    assert_eq!(cfg.scraper_max_pages, 10);
    assert!(cfg.scraper_pipeline_fetches);
}

#[test]
fn build_app_config_rejects_non_numeric_retries() {
    let mut map = HashMap::new();
    map.insert("PARTNERSCAN_SCRAPER_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PARTNERSCAN_SCRAPER_MAX_RETRIES"),
        "expected InvalidEnvVar(PARTNERSCAN_SCRAPER_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_max_pages() {
    let mut map = HashMap::new();
    map.insert("PARTNERSCAN_SCRAPER_MAX_PAGES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PARTNERSCAN_SCRAPER_MAX_PAGES"),
        "expected InvalidEnvVar(PARTNERSCAN_SCRAPER_MAX_PAGES), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map = HashMap::new();
    map.insert("PARTNERSCAN_SCRAPER_REQUEST_TIMEOUT_SECS", "0");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn build_app_config_rejects_garbage_bool() {
    let mut map = HashMap::new();
    map.insert("PARTNERSCAN_SCRAPER_PIPELINE_FETCHES", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PARTNERSCAN_SCRAPER_PIPELINE_FETCHES"),
        "expected InvalidEnvVar(PARTNERSCAN_SCRAPER_PIPELINE_FETCHES), got: {result:?}"
    );
}

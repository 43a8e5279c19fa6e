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

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("MOTODIR_BACKEND_URL", "https://demo.supabase.co/");
    m.insert("MOTODIR_ANON_KEY", "anon-key");
    m
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
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "MOTODIR_ENV"));
}

#[test]
fn build_app_config_fails_without_backend_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "MOTODIR_BACKEND_URL"),
        "expected MissingEnvVar(MOTODIR_BACKEND_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_anon_key() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("MOTODIR_BACKEND_URL", "https://demo.supabase.co");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "MOTODIR_ANON_KEY"),
        "expected MissingEnvVar(MOTODIR_ANON_KEY), got: {result:?}"
    );
}

#[test]
fn blank_required_var_counts_as_missing() {
    let mut map = full_env();
    map.insert("MOTODIR_ANON_KEY", "  ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "MOTODIR_ANON_KEY"));
}

#[test]
fn build_app_config_rejects_url_without_scheme() {
    let mut map = full_env();
    map.insert("MOTODIR_BACKEND_URL", "demo.supabase.co");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MOTODIR_BACKEND_URL"),
        "expected InvalidEnvVar(MOTODIR_BACKEND_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.backend_url, "https://demo.supabase.co");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.shops_table, "motorcycle_shops");
    assert_eq!(cfg.storage_bucket, "images");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "motodir/0.1 (shop-directory)");
    assert!(cfg.email.is_none());
    assert!(cfg.password.is_none());
}

#[test]
fn request_timeout_invalid() {
    let mut map = full_env();
    map.insert("MOTODIR_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MOTODIR_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(MOTODIR_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn credentials_are_optional_and_redacted() {
    let mut map = full_env();
    map.insert("MOTODIR_EMAIL", "rider@example.com");
    map.insert("MOTODIR_PASSWORD", "hunter22");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.email.as_deref(), Some("rider@example.com"));

    let debug = format!("{cfg:?}");
    assert!(!debug.contains("hunter22"));
    assert!(!debug.contains("anon-key"));
    assert!(debug.contains("[redacted]"));
}

use std::{env, fs};

use lambdeploy_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("lambdeploy.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[meta]
url = "http://meta.internal:14374"
api_key = "key"
api_secret = "secret"

[target]
org = "acme"
lambda_provider_id = "prov-1"

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.meta.url.as_deref(), Some("http://meta.internal:14374"));
    assert_eq!(cfg.target.org.as_deref(), Some("acme"));
    assert_eq!(cfg.logging.level, "debug");
    assert!(!cfg.logging.debug_journal);
    assert!(!cfg.gitlab_enabled());

    // 2) Prefixed env override wins over file
    unsafe {
        env::set_var("LAMBDEPLOY__SERVER__PORT", "9090");
        env::set_var("LAMBDEPLOY__TARGET__ORG", "acme.eng");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9090);
    assert_eq!(cfg_env.target.org.as_deref(), Some("acme.eng"));

    // 3) Flat variables win over both
    unsafe {
        env::set_var("TARGET_ORG", "legacy");
        env::set_var("META_TOKEN", "tok");
        env::set_var("LOG_DEBUG", "true");
        env::set_var("API_SECRET", "");
    }
    let cfg_legacy = load_config(path.to_str()).expect("should parse config with legacy env");
    assert_eq!(cfg_legacy.target.org.as_deref(), Some("legacy"));
    assert_eq!(cfg_legacy.meta.token.as_deref(), Some("tok"));
    assert!(cfg_legacy.logging.debug_journal);
    // Empty legacy values are ignored
    assert_eq!(cfg_legacy.meta.api_secret.as_deref(), Some("secret"));

    unsafe {
        env::remove_var("LAMBDEPLOY__SERVER__PORT");
        env::remove_var("LAMBDEPLOY__TARGET__ORG");
        env::remove_var("TARGET_ORG");
        env::remove_var("META_TOKEN");
        env::remove_var("LOG_DEBUG");
        env::remove_var("API_SECRET");
    }

    // 4) GitLab without gateway fails validation
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[gitlab]
api_url = "https://gitlab.com/api/v4"
token = "glpat"
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("gitlab.api_url requires gateway.url"));

    // 5) Missing file falls back to defaults
    let missing = dir.path().join("missing.toml");
    let cfg_default = load_config(missing.to_str()).expect("defaults");
    assert_eq!(cfg_default.server.port, 8080);
    assert_eq!(cfg_default.logging.level, "info");
}

// tests/config_loading.rs
use company_research::config::{ApiKeys, ResearchConfig, ENV_CONFIG_PATH};
use std::{env, fs};

#[test]
fn toml_file_overrides_selected_fields() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("research.toml");
    fs::write(
        &p,
        r#"
news_quota = 8
dedupe_news = true
store_dir = "data/research"
stage_timeout_secs = 0
"#,
    )
    .unwrap();
    let cfg = ResearchConfig::load_from(&p).unwrap();
    assert_eq!(cfg.news_quota, 8);
    assert!(cfg.dedupe_news);
    assert_eq!(cfg.store_dir.as_deref(), Some(std::path::Path::new("data/research")));
    assert_eq!(cfg.stage_timeout_secs, 20, "zero is sanitized to the default");
    assert_eq!(cfg.deadline_secs, 45);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("research.toml");
    fs::write(&p, "news_quota = \"lots\"").unwrap();
    assert!(ResearchConfig::load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);

    // 1) nothing on disk -> defaults
    assert_eq!(ResearchConfig::load_default().unwrap(), ResearchConfig::default());

    // 2) ./config/research.json
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("research.json"), r#"{"competitor_limit": 5}"#).unwrap();
    assert_eq!(ResearchConfig::load_default().unwrap().competitor_limit, 5);

    // 3) ./config/research.toml wins over JSON
    fs::write(cfg_dir.join("research.toml"), "competitor_limit = 7").unwrap();
    assert_eq!(ResearchConfig::load_default().unwrap().competitor_limit, 7);

    // 4) env path wins over both
    let p_env = tmp.path().join("custom.toml");
    fs::write(&p_env, "competitor_limit = 9").unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(ResearchConfig::load_default().unwrap().competitor_limit, 9);

    // 5) env pointing nowhere is an error, not a silent fallback
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(ResearchConfig::load_default().is_err());

    env::remove_var(ENV_CONFIG_PATH);
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn api_keys_treat_blank_as_absent() {
    env::set_var("NEWS_API_KEY", "  abc123 ");
    env::set_var("ALPHA_VANTAGE_API_KEY", "   ");
    env::remove_var("CRUNCHBASE_API_KEY");
    env::remove_var("TWITTER_BEARER_TOKEN");

    let keys = ApiKeys::from_env();
    assert_eq!(keys.news_api.as_deref(), Some("abc123"));
    assert_eq!(keys.alpha_vantage, None);
    assert_eq!(keys.crunchbase, None);
    assert_eq!(keys.twitter_bearer, None);

    env::remove_var("NEWS_API_KEY");
    env::remove_var("ALPHA_VANTAGE_API_KEY");
}

use super::{apply_env, apply_file, load_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
api_url = "https://tasks.example.com"
organization_id = "org-7"
timeout_secs = 30

[[columns]]
id = "todo"
title = "To Do"

[[columns]]
id = "done"
title = "Done"
"#,
    )
    .expect("parse");

    assert_eq!(settings.api_url, "https://tasks.example.com");
    assert_eq!(settings.organization_id.as_deref(), Some("org-7"));
    assert_eq!(settings.timeout_secs, 30);

    let layout = settings.layout().expect("layout");
    let ids: Vec<_> = layout.columns().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["todo", "done"]);
}

#[test]
fn env_overrides_file() {
    let mut settings = Settings::default();
    apply_file(&mut settings, r#"api_url = "http://from-file""#).expect("parse");
    apply_env(
        &mut settings,
        env_from(&[
            ("TASKBOARD_API_URL", "http://from-env"),
            ("TASKBOARD_USER_ID", "u-1"),
            ("TASKBOARD_TIMEOUT_SECS", " 5 "),
        ]),
    )
    .expect("env");

    assert_eq!(settings.api_url, "http://from-env");
    assert_eq!(settings.user_id.as_deref(), Some("u-1"));
    assert_eq!(settings.timeout_secs, 5);
    assert_eq!(
        settings.context().user_id.map(|u| u.0),
        Some("u-1".to_string())
    );
}

#[test]
fn rejects_bad_timeout() {
    let mut settings = Settings::default();
    let err = apply_env(&mut settings, env_from(&[("TASKBOARD_TIMEOUT_SECS", "soon")]))
        .expect_err("bad timeout");
    assert!(err.to_string().contains("TASKBOARD_TIMEOUT_SECS"));
}

#[test]
fn rejects_unknown_keys_and_duplicate_columns() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, r#"api_ur1 = "typo""#).is_err());

    apply_file(
        &mut settings,
        r#"
[[columns]]
id = "todo"
title = "To Do"

[[columns]]
id = "todo"
title = "Again"
"#,
    )
    .expect("parse");
    assert!(settings.layout().is_err());
}

#[test]
fn default_layout_when_no_columns_configured() {
    let settings = Settings::default();
    assert_eq!(settings.layout().expect("layout").columns().len(), 4);
}

#[test]
fn explicit_missing_config_file_is_an_error() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("taskboard_missing_{suffix}.toml"));

    let err = load_settings(Some(&missing)).expect_err("missing file");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn explicit_config_file_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("taskboard_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("board.toml");
    fs::write(&path, "api_token = \"secret\"\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("load");
    assert!(settings.api_token.is_some());

    fs::remove_dir_all(temp_root).expect("cleanup");
}

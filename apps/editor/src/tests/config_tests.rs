use super::*;

use std::collections::HashMap;

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
output_path = "/tmp/toc.json"
sink = "log"
rows_per_page = 10
confirmation_ttl_ms = 500
resume = false
"#,
    )
    .expect("parse");

    assert_eq!(settings.output_path, PathBuf::from("/tmp/toc.json"));
    assert_eq!(settings.sink, SinkKind::Log);
    assert_eq!(settings.rows_per_page, RowsPerPage::Ten);
    assert_eq!(settings.confirmation_ttl_ms, 500);
    assert!(!settings.resume);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn disallowed_rows_per_page_keeps_default() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "rows_per_page = 7\nsink = \"ftp\"").expect("parse");

    assert_eq!(settings.rows_per_page, RowsPerPage::Five);
    assert_eq!(settings.sink, SinkKind::File);
}

#[test]
fn malformed_file_is_an_error() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "rows_per_page = ").is_err());
}

#[test]
fn app_prefixed_env_wins_over_toc_prefix() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("TOC_ROWS_PER_PAGE", "10"),
        ("APP__ROWS_PER_PAGE", "20"),
        ("TOC_LOG_FILTER", "debug"),
    ]);
    let mut settings = Settings::default();

    apply_env(&mut settings, |key| env.get(key).map(|value| value.to_string()));

    assert_eq!(settings.rows_per_page, RowsPerPage::Twenty);
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn explicit_missing_config_fails() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("nope.toml");
    assert!(load_settings(Some(&missing)).is_err());
}

#[test]
fn explicit_config_file_loads() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("editor.toml");
    fs::write(&path, "confirmation_ttl_ms = 1500").expect("write");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.form_options().confirmation_ttl, Duration::from_millis(1500));
}

use super::*;
use crate::kernel::services::ports::BackrefGrammar;
use tempfile::tempdir;

#[test]
fn test_parse_partial_settings_keeps_defaults() {
    let settings = parse_settings(r#"{ "cyclic_jumping": false }"#).unwrap();
    assert!(!settings.cyclic_jumping);
    assert_eq!(settings.worker_threads, 2);
    assert_eq!(settings.backref_grammar, BackrefGrammar::default());
}

#[test]
fn test_parse_custom_grammar() {
    let settings = parse_settings(
        r#"{ "backref_grammar": { "escape_char": "%", "backref_start_char": "\\" } }"#,
    )
    .unwrap();
    assert_eq!(settings.backref_grammar, BackrefGrammar::new('%', '\\'));
}

#[test]
fn test_load_settings_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "case_insensitive": true, "worker_threads": 4 }"#).unwrap();

    let settings = load_settings_from(&path);
    assert!(settings.case_insensitive);
    assert_eq!(settings.worker_threads, 4);
}

#[test]
fn test_missing_or_invalid_file_falls_back() {
    let dir = tempdir().unwrap();
    assert_eq!(
        load_settings_from(&dir.path().join("missing.json")),
        SearchSettings::default()
    );

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert_eq!(load_settings_from(&path), SearchSettings::default());
}

#[test]
fn test_settings_path_shape() {
    if let Some(path) = get_settings_path() {
        assert!(path.ends_with(".zfind/settings.json"));
    }
}

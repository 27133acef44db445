use std::path::PathBuf;

use slotedit::config::{ConfigFlags, DialectMode, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".sloteditrc");
    let content = r"
# comment
--target

--dialect type

--edit-log=edits.log
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.target);
    assert_eq!(flags.dialect, Some(DialectMode::Type));
    assert_eq!(flags.edit_log, Some(PathBuf::from("edits.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".sloteditrc");
    let content = "--target\n--dialect type\n--edit-log file.log\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "slotedit".to_string(),
        "--dialect".to_string(),
        "expression".to_string(),
        "--json".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.target, "file flags should remain enabled");
    assert!(effective.json, "cli flags should be applied");
    assert_eq!(
        effective.dialect,
        Some(DialectMode::Expression),
        "cli should override dialect"
    );
    assert_eq!(
        effective.edit_log,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "slotedit".to_string(),
        "--dialect=type".to_string(),
        "--range-function=Ranges.closed".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.dialect, Some(DialectMode::Type));
    assert_eq!(flags.range_function.as_deref(), Some("Ranges.closed"));
}

#[test]
fn test_missing_config_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        target: true,
        perf: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        json: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.target);
    assert!(merged.perf);
    assert!(merged.json);
}

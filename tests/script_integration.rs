use std::path::Path;
use std::process::{Command as Process, Output, Stdio};

use slotedit::script::{Command, Session, parse_script};
use slotedit::slot::{CaretPos, Dialect, SlotEditor};

/// Run the binary with config lookups confined to `home`.
fn run(home: &Path, args: &[&str]) -> Output {
    Process::new(env!("CARGO_BIN_EXE_slotedit"))
        .args(args)
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("APPDATA", home.join("config"))
        .env_remove("SLOTEDIT_EDIT_LOG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_session_replays_a_script() {
    let script = "\
# build an expression, then edit inside the bracket
insert a+(b-c)
caret 2,1,1
backspace
insert d
";
    let commands = parse_script(script).unwrap();
    let mut session = Session::new(SlotEditor::new(Dialect::Expression));
    let states = commands
        .iter()
        .map(|command| session.apply(command).state)
        .collect::<Vec<_>>();
    assert_eq!(
        states,
        vec![
            "{a}+{}_({b}-{c})_{$}",
            "{a}+{}_({b}-{c$})_{}",
            "{a}+{}_({b}-{$})_{}",
            "{a}+{}_({b}-{d$})_{}",
        ]
    );
    assert_eq!(session.slot().target_code(), "a + (b - d)");
}

#[test]
fn test_session_select_and_wrap() {
    let commands = parse_script("insert ab+cd\nwrap 0,0 1,2 (\nselect 0,0 2,0\n").unwrap();
    let mut session = Session::new(SlotEditor::new(Dialect::Expression));
    let snapshot = session.apply(&commands[0]);
    assert_eq!(snapshot.state, "{ab}+{cd$}");
    let snapshot = session.apply(&commands[1]);
    assert_eq!(snapshot.state, "{}_({ab}+{cd})_{$}");
    let snapshot = session.apply(&commands[2]);
    assert_eq!(snapshot.state, "{$}");
    assert_eq!(session.caret(), &CaretPos::start());
}

#[test]
fn test_clear_resets_caret() {
    let mut session = Session::new(SlotEditor::from_text(Dialect::Type, "a.b"));
    assert_eq!(session.caret(), &CaretPos::at(1, 1));
    let snapshot = session.apply(&Command::Clear);
    assert_eq!(snapshot.state, "{$}");
}

#[test]
fn test_cli_prints_each_step() {
    let home = tempfile::tempdir().unwrap();
    let output = run(
        home.path(),
        &["-e", "insert a+bc", "-e", "backspace 2", "--target"],
    );
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "  1  {a}+{bc$}\n     a + bc\n  2  {a}+{$}\n     a + \n"
    );
}

#[test]
fn test_cli_reads_script_file_in_type_dialect() {
    let home = tempfile::tempdir().unwrap();
    let script = home.path().join("edits.txt");
    std::fs::write(&script, "insert a<b.c>\n").unwrap();
    let output = run(
        home.path(),
        &["--dialect", "type", script.to_str().unwrap()],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output), "  1  {a}_<{b}.{c}>_{$}\n");
}

#[test]
fn test_cli_json_output() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["--json", "-e", "insert 1..n"]);
    assert!(output.status.success());
    let line = stdout(&output);
    let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(value["step"], 1);
    assert_eq!(value["state"], "{1}..{n$}");
    assert_eq!(value["target"], "lang.stride.Utility.makeRange(1, n)");
    assert_eq!(value["caret"], serde_json::json!([1, 1]));
}

#[test]
fn test_cli_range_function_override() {
    let home = tempfile::tempdir().unwrap();
    let output = run(
        home.path(),
        &["--target", "--range-function", "range", "-e", "insert 1..2"],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("     range(1, 2)\n"));
}

#[test]
fn test_cli_writes_edit_log() {
    let home = tempfile::tempdir().unwrap();
    let log = home.path().join("edits.log");
    let output = run(
        home.path(),
        &["--edit-log", log.to_str().unwrap(), "-e", "insert a+b"],
    );
    assert!(output.status.success());
    let content = std::fs::read_to_string(&log).unwrap();
    assert!(content.contains("#1 insert a+b => {a}+{b$}"));
}

#[test]
fn test_cli_reports_script_errors() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["-e", "undo"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unknown command `undo`"));
}

#[test]
fn test_cli_saved_defaults_apply_to_later_runs() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["--save", "--dialect", "type", "-e", "insert a+b"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "  1  {ab$}\n");

    let output = run(home.path(), &["-e", "insert a+b"]);
    assert_eq!(stdout(&output), "  1  {ab$}\n");

    let output = run(home.path(), &["--clear", "-e", "insert a+b"]);
    assert_eq!(stdout(&output), "  1  {a}+{b$}\n");
}

#[test]
fn test_local_rc_file_is_honoured() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(home.path().join(".sloteditrc"), "--dialect type\n").unwrap();
    let output = run(home.path(), &["-e", "insert a+b"]);
    assert_eq!(stdout(&output), "  1  {ab$}\n");
}

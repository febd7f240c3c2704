use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("cmdbind-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn cmdbind() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cmdbind"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_example(dir: &Path) -> PathBuf {
    let table = dir.join("cmdbind.json");
    let out = cmdbind()
        .arg("schema")
        .arg("--output")
        .arg(&table)
        .output()
        .expect("failed to run cmdbind schema");
    assert_success("cmdbind schema --output", &out);
    table
}

fn assert_success(what: &str, out: &Output) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
}

fn bind_json(table: &Path, extra: &[&str], args: &[&str]) -> serde_json::Value {
    let out = cmdbind()
        .arg("bind")
        .arg(table)
        .args(extra)
        .arg("--")
        .args(args)
        .output()
        .expect("failed to run cmdbind bind");
    assert_success("cmdbind bind", &out);
    serde_json::from_slice(&out.stdout).expect("bind output is not JSON")
}

#[test]
fn help_works() {
    let out = cmdbind()
        .arg("--help")
        .output()
        .expect("failed to run cmdbind --help");
    assert_success("cmdbind --help", &out);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("check") && stdout.contains("bind") && stdout.contains("schema"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn check_accepts_the_example_table() {
    let dir = make_temp_dir("check-ok");
    let table = write_example(&dir);

    let out = cmdbind()
        .current_dir(&dir)
        .arg("check")
        .output()
        .expect("failed to run cmdbind check");
    assert_success("cmdbind check", &out);
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "ok: 4 commands");

    let out = cmdbind()
        .arg("check")
        .arg(&table)
        .output()
        .expect("failed to run cmdbind check TABLE");
    assert_success("cmdbind check TABLE", &out);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_rejects_duplicate_options() {
    let dir = make_temp_dir("check-dup");
    let table = dir.join("bad.json");
    fs::write(
        &table,
        r#"{
  "format-version": 1,
  "commands": [
    {
      "name": "x",
      "params": [
        { "name": "a", "type": { "scalar": "bool" }, "option": { "names": ["verbose"] } },
        { "name": "b", "type": { "scalar": "bool" }, "option": { "names": ["verbose"] } }
      ]
    }
  ]
}"#,
    )
    .expect("failed to write table");

    let out = cmdbind()
        .arg("check")
        .arg(&table)
        .output()
        .expect("failed to run cmdbind check");
    assert!(!out.status.success(), "duplicate options must fail");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("duplicate option: --verbose"),
        "unexpected stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bind_selects_overloads_and_prints_values() {
    let dir = make_temp_dir("bind-commit");
    let table = write_example(&dir);

    let json = bind_json(&table, &[], &["commit", "-m=fix bug", "a.txt"]);
    assert_eq!(json["command"], "commit");
    assert_eq!(json["values"], serde_json::json!(["fix bug", false, "a.txt"]));

    let json = bind_json(&table, &[], &["commit", "--message=x", "-a", "a.txt", "b.txt"]);
    assert_eq!(json["values"], serde_json::json!(["x", true, "a.txt", "b.txt"]));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bind_reads_env_file_for_defaults() {
    let dir = make_temp_dir("bind-env");
    let table = write_example(&dir);
    let env_file = dir.join(".env");
    fs::write(&env_file, "CITY=Lisbon\n").expect("failed to write env file");

    let env_arg = env_file.to_string_lossy().into_owned();
    let json = bind_json(
        &table,
        &["--env-file", &env_arg],
        &["contact", "add", "ada", "--home-street=Main St"],
    );
    assert_eq!(json["command"], "add");
    assert_eq!(json["values"][0], "ada");
    assert_eq!(json["values"][1]["type"], "Address");
    assert_eq!(
        json["values"][1]["args"],
        serde_json::json!(["Main St", "Lisbon"])
    );

    let json = bind_json(&table, &[], &["contact", "add", "ada"]);
    assert_eq!(json["values"][1], serde_json::Value::Null);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bind_reports_unknown_options() {
    let dir = make_temp_dir("bind-unknown");
    let table = write_example(&dir);

    let out = cmdbind()
        .arg("bind")
        .arg(&table)
        .arg("--")
        .args(["commit", "--bogus=1", "-m=x", "a.txt"])
        .output()
        .expect("failed to run cmdbind bind");
    assert!(!out.status.success(), "unknown option must fail");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("unknown option: --bogus"),
        "unexpected stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

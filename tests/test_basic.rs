use std::io::Write;
use std::process::Command;

use insta_cmd::{assert_cmd_snapshot, get_cargo_bin};
use tempfile::NamedTempFile;

fn cli() -> Command {
    let mut cmd = Command::new(get_cargo_bin("jinjapad"));
    // keep the ambient environment from leaking into config resolution
    cmd.env_remove("JINJAPAD_LENIENT")
        .env_remove("JINJAPAD_NEWLINE")
        .env_remove("JINJAPAD_SAMPLE")
        .env_remove("JINJAPAD_EXPR_OUT")
        .env_remove("JINJAPAD_FUEL");
    cmd
}

fn file_with_contents(contents: &str) -> NamedTempFile {
    let mut f = tempfile::Builder::new()
        .prefix("jinjapad-testfile--")
        .tempfile()
        .unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn test_sample_context() {
    let tmpl = file_with_contents("{{ companies | length }}");

    assert_cmd_snapshot!(
        cli().arg(tmpl.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    2

    ----- stderr -----
    "###);
}

#[test]
fn test_sample_founders() {
    let tmpl = file_with_contents("{{ companies[1].founders[0].name }}");

    assert_cmd_snapshot!(
        cli().arg(tmpl.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    Bill Gates

    ----- stderr -----
    "###);
}

#[test]
fn test_data_file() {
    let data = file_with_contents(r#"{"name": "World"}"#);
    let tmpl = file_with_contents("Hello {{ name }}!");

    assert_cmd_snapshot!(
        cli().arg("--data").arg(data.path()).arg(tmpl.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    Hello World!

    ----- stderr -----
    "###);
}

#[test]
fn test_defines() {
    assert_cmd_snapshot!(
        cli()
            .arg("--no-sample")
            .arg("-Dname=Peter")
            .arg("--template=Hello {{ name }}!"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    Hello Peter!

    ----- stderr -----
    "###);
}

#[test]
fn test_define_json_value() {
    assert_cmd_snapshot!(
        cli()
            .arg("-Dnums:=[1, 2, 3]")
            .arg("--template={{ nums | length }}"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    3

    ----- stderr -----
    "###);
}

#[test]
fn test_defines_override_data_file() {
    let data = file_with_contents(r#"{"name": "FromFile"}"#);

    assert_cmd_snapshot!(
        cli()
            .arg("--data")
            .arg(data.path())
            .arg("-Dname=FromDefine")
            .arg("--template=Hello {{ name }}!"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    Hello FromDefine!

    ----- stderr -----
    "###);
}

#[test]
fn test_strict_undefined_fails() {
    let tmpl = file_with_contents("{{ missing }}");

    let output = cli().arg(tmpl.path()).output().unwrap();
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("undefined"), "stderr was: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_lenient_undefined_renders_empty() {
    let tmpl = file_with_contents("[{{ missing }}]");

    assert_cmd_snapshot!(
        cli().arg("--lenient").arg(tmpl.path()),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    []

    ----- stderr -----
    "###);
}

#[test]
fn test_lenient_via_env_var() {
    let tmpl = file_with_contents("[{{ missing }}]");

    let output = cli()
        .env("JINJAPAD_LENIENT", "1")
        .arg(tmpl.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "[]\n");
}

#[test]
fn test_empty_template() {
    let tmpl = file_with_contents("");

    let output = cli().arg(tmpl.path()).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "\n");

    let output = cli()
        .arg("--no-newline")
        .arg(tmpl.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_syntax_error() {
    let tmpl = file_with_contents("{% if %}");

    let output = cli().arg(tmpl.path()).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "), "stderr was: {}", stderr);
}

#[test]
fn test_expr() {
    assert_cmd_snapshot!(
        cli().arg("--expr=1 + 2"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    3

    ----- stderr -----
    "###);
}

#[test]
fn test_expr_json_output() {
    assert_cmd_snapshot!(
        cli()
            .arg("--expr=companies[0].founders | map(attribute='name') | list")
            .arg("--expr-out=json"),
        @r###"
    success: true
    exit_code: 0
    ----- stdout -----
    ["Steve Jobs","Steve Wozniak"]

    ----- stderr -----
    "###);
}

#[test]
fn test_invalid_expr_out_env_var() {
    let output = cli()
        .env("JINJAPAD_EXPR_OUT", "bogus")
        .arg("--expr=1")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "), "stderr was: {}", stderr);
    assert!(
        stderr.contains("JINJAPAD_EXPR_OUT"),
        "stderr was: {}",
        stderr
    );
}

#[test]
fn test_expr_strict_undefined() {
    let output = cli().arg("--expr=missing + 1").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("undefined"), "stderr was: {}", stderr);
}

#[test]
fn test_output_file_is_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.txt");
    std::fs::write(&target, "previous contents").unwrap();

    // a failing render must leave the existing file untouched
    let tmpl = file_with_contents("{{ missing }}");
    let output = cli()
        .arg("-o")
        .arg(&target)
        .arg(tmpl.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous contents");

    // a successful one replaces it
    let tmpl = file_with_contents("{{ companies[0].name }}");
    let output = cli()
        .arg("-o")
        .arg(&target)
        .arg(tmpl.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "Apple\n");
}

#[test]
fn test_repl_conflicts_with_template() {
    let tmpl = file_with_contents("");
    let output = cli().arg("--repl").arg(tmpl.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

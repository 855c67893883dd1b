use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;

#[test]
fn tokenize_prints_kind_codes() {
    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("tokenize").arg("John Smith, -16.0");

    cmd.assert()
        .success()
        .stdout("'John' (W)\n'Smith' (W)\n',' (D)\n-16.0 (F)\n");
}

#[test]
fn tokenize_rejects_unknown_characters() {
    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("tokenize").arg("John # Smith");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Unrecognized input"));
}

#[test]
fn parse_match_exits_zero() {
    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("parse").arg("John Smith, 16 M");

    cmd.assert()
        .success()
        .stdout("match: ['John' (W), 'Smith' (W), 16 (I), 'M' (W)]\n");
}

#[test]
fn parse_missing_field_exits_two() {
    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("parse").arg("John Smith, 16");

    cmd.assert().code(2).stdout("missing: sex\n");
}

#[test]
fn parse_no_match_exits_three() {
    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("parse")
        .arg("John 16")
        .arg("--notation")
        .arg("Word & Word");

    cmd.assert().code(3).stdout("no match\n");
}

#[test]
fn parse_with_builtin_grammar_and_json() {
    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("parse")
        .arg("John Smith, 16 M")
        .arg("--grammar")
        .arg("tagged-demographics")
        .arg("--format")
        .arg("json");

    let output_pred = predicate::str::contains("\"outcome\": \"match\"")
        .and(predicate::str::contains("\"name\": \"age\""));
    cmd.assert().success().stdout(output_pred);
}

#[test]
fn parse_explain_lists_derivations() {
    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("parse").arg("John Smith,").arg("--explain");

    cmd.assert()
        .code(2)
        .stdout("missing: age\n")
        .stderr(predicate::str::contains("1 complete derivation(s)"));
}

#[test]
fn parse_rejects_unknown_matcher() {
    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("parse").arg("John").arg("--notation").arg("Name[1:]");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown matcher `Name`"));
}

#[test]
fn parse_uses_grammar_from_config_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(
        file,
        "[parse]\ndefault_grammar = \"ages\"\n\n[grammars]\nages = 'Number[1:] % missing(\"age\")'"
    )
    .expect("write config");

    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("parse").arg("Ann").arg("--config").arg(file.path());

    cmd.assert().code(2).stdout("missing: age\n");
}

#[test]
fn grammars_lists_configured_and_builtin() {
    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("grammars");

    let output_pred = predicate::str::contains("demographics (default)")
        .and(predicate::str::contains("tagged-demographics"));
    cmd.assert().success().stdout(output_pred);
}

fn json_output_config() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    writeln!(file, "[output]\nformat = \"json\"").expect("write config");
    file
}

#[test]
fn output_format_comes_from_config_file() {
    let file = json_output_config();

    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("tokenize").arg("John").arg("--config").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"Word\""));
}

#[test]
fn format_flag_overrides_config_file() {
    let file = json_output_config();

    let mut cmd = cargo_bin_cmd!("wametuelewa");
    cmd.arg("tokenize")
        .arg("John")
        .arg("--config")
        .arg(file.path())
        .arg("--format")
        .arg("text");

    cmd.assert().success().stdout("'John' (W)\n");
}

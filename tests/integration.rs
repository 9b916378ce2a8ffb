use std::path::Path;
use std::process::{Command, Output};

fn wikiref_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wikiref"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd.env_remove("WIKIREF_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn resolve(args: &[&str]) -> Output {
    wikiref_cmd("wiki").arg("resolve").args(args).output().unwrap()
}

#[test]
fn check_passes_when_every_link_resolves() {
    let check = wikiref_cmd("wiki").arg("check").output().unwrap();
    assert!(
        check.status.success(),
        "check failed: {}\n{}",
        stdout(&check),
        String::from_utf8_lossy(&check.stderr)
    );
}

#[test]
fn check_reports_broken_links() {
    let check = wikiref_cmd("broken").arg("check").output().unwrap();
    assert_eq!(check.status.code(), Some(1));
    let out = stdout(&check);
    assert!(out.contains("BROKEN"), "no broken links reported: {out}");
    assert!(out.contains("xwiki:Missing.Page.WebHome"), "missing fallback target: {out}");
    assert!(out.contains("xwiki:Main.Sandbox.WebHome"), "missing nested space target: {out}");
}

#[test]
fn check_json_lists_broken_links() {
    let check = wikiref_cmd("broken").args(["check", "--json"]).output().unwrap();
    assert_eq!(check.status.code(), Some(1));
    let broken: serde_json::Value = serde_json::from_slice(&check.stdout).unwrap();
    let broken = broken.as_array().unwrap();
    assert_eq!(broken.len(), 2);
    assert_eq!(broken[0]["target"], "Missing.Page");
    assert_eq!(broken[0]["line"], 3);
    assert_eq!(broken[0]["exists"], false);
}

#[test]
fn missing_content_root_is_a_runtime_error() {
    let check = wikiref_cmd("noroot").arg("check").output().unwrap();
    assert_eq!(check.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&check.stderr);
    assert!(stderr.contains("Content Root Not Found"), "unexpected stderr: {stderr}");
}

#[test]
fn untyped_bare_name_lands_in_an_existing_sibling_space() {
    let out = resolve(&["Sandbox"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "xwiki:Sandbox.WebHome");
}

#[test]
fn typed_reference_skips_existence_fallback() {
    let out = resolve(&["Sandbox", "--typed"]);
    assert_eq!(stdout(&out), "xwiki:Main.Sandbox");
}

#[test]
fn attachment_resolves_against_the_current_document() {
    let out = resolve(&["logo.png", "--type", "attach", "--current", "Docs.Guide"]);
    assert_eq!(stdout(&out), "xwiki:Docs.Guide@logo.png");
}

#[test]
fn bases_are_folded_in_order() {
    let out = resolve(&["Page", "--typed", "--base", "dev:Main.WebHome", "--base", "Other.WebHome"]);
    assert_eq!(stdout(&out), "dev:Other.Page");
}

#[test]
fn target_kind_converts_the_result() {
    let out = resolve(&["Guide", "--current", "Docs.Guide", "--target", "space"]);
    assert_eq!(stdout(&out), "xwiki:Docs");
}

#[test]
fn relative_family_leaves_unanchored_references_relative() {
    let out = resolve(&["Space.Page", "--relative"]);
    assert_eq!(stdout(&out), "Space.Page");
}

#[test]
fn unsupported_scheme_prints_nothing() {
    let out = resolve(&["https://example.org", "--type", "url"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
}

#[test]
fn resolve_json_reports_existence() {
    let out = resolve(&["Docs.Guide", "--json"]);
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["resolved"], "xwiki:Docs.Guide");
    assert_eq!(report["type"], "doc");
    assert_eq!(report["target"], "document");
    assert_eq!(report["exists"], true);
    assert_eq!(report["absolute"], true);
}

#[test]
fn unknown_target_kind_is_rejected() {
    let out = resolve(&["Page", "--target", "object"]);
    assert_eq!(out.status.code(), Some(2));
}

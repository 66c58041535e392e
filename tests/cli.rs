//! End-to-end tests for the `crawl` binary.

// `Command::cargo_bin` is deprecated in newer assert_cmd releases in favor of
// the `cargo_bin_cmd!` macro.
#![allow(deprecated)]

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawl_cmd() -> Command {
    let mut cmd = Command::cargo_bin("crawl").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_missing_arguments_exit_1() {
    crawl_cmd()
        .arg("https://example.com")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max-depth").or(predicate::str::contains("MAX_DEPTH")));
}

#[test]
fn test_non_numeric_depth_exit_1() {
    crawl_cmd().args(["https://example.com", "deep"]).assert().code(1);
}

#[test]
fn test_negative_depth_exit_1() {
    crawl_cmd().args(["https://example.com", "-1"]).assert().code(1);
}

#[test]
fn test_zero_workers_exit_1() {
    crawl_cmd().args(["https://example.com", "1", "0"]).assert().code(1);
}

#[test]
fn test_same_host_without_host_exit_1() {
    crawl_cmd()
        .args(["not-a-url", "1", "--same-host", "-q"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid seed URL"));
}

#[test]
fn test_help_exit_0() {
    crawl_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("worker"));
}

async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_crawls_site_and_prints_json_report() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/a">a</a> <a href="/b">b</a> <a href="/missing">x</a>"#.to_string(),
    )
    .await;
    mount_page(&server, "/a", r#"<a href="/">home</a>"#.to_string()).await;
    mount_page(&server, "/b", r#"<a href="/c">c</a>"#.to_string()).await;
    // Anything else, including /missing, falls through to wiremock's 404

    let seed = format!("{}/", server.uri());
    let output = tokio::task::spawn_blocking(move || {
        crawl_cmd()
            .args([seed.as_str(), "1", "2", "--json", "-q"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let visited: Vec<&str> = report["visited"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let base = server.uri();
    assert_eq!(
        visited,
        vec![
            format!("{base}/"),
            format!("{base}/a"),
            format!("{base}/b"),
            format!("{base}/missing"),
        ]
    );
    assert_eq!(report["fetched"], 3);
    assert_eq!(report["failures"][0]["kind"], "fetch");
    assert_eq!(report["failures"][0]["reason"], "HTTP 404");
    assert_eq!(report["cancelled"], false);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_table_output_lists_failures() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/broken">broken</a>"#.to_string()).await;

    let seed = format!("{}/", server.uri());
    let output = tokio::task::spawn_blocking(move || {
        crawl_cmd().args([seed.as_str(), "3", "-q"]).output().unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("/broken"))
        .stdout(predicate::str::contains("HTTP 404"))
        .stdout(predicate::str::contains("Visited: 2"));
}

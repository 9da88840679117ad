//! `doclens files ...` against a mock Files API.


use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::{can_bind_localhost, file_json, mount_file_list, temp_home};
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_files_list_prints_names_and_uris() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_file_list(
        &server,
        vec![
            file_json(&uri, "abc", "report.pdf"),
            file_json(&uri, "def", "invoice.pdf"),
        ],
    )
    .await;

    cargo_bin_cmd!("doclens")
        .env("DOCLENS_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", &uri)
        .args(["files", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files:"))
        .stdout(predicate::str::contains(format!(
            "report.pdf, URI: {uri}/files/abc"
        )))
        .stdout(predicate::str::contains(format!(
            "invoice.pdf, URI: {uri}/files/def"
        )));
}

#[tokio::test]
async fn test_files_list_failure_exits_nonzero() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    cargo_bin_cmd!("doclens")
        .env("DOCLENS_HOME", home.path())
        .env("GEMINI_API_KEY", "bad-key")
        .env("GEMINI_BASE_URL", server.uri())
        .args(["files", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key not valid."));
}

#[tokio::test]
async fn test_delete_all_continues_after_a_failure() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_file_list(
        &server,
        vec![
            file_json(&uri, "one", "1.pdf"),
            file_json(&uri, "two", "2.pdf"),
            file_json(&uri, "three", "3.pdf"),
        ],
    )
    .await;

    for id in ["one", "three"] {
        Mock::given(method("DELETE"))
            .and(path(format!("/files/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/files/two"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "message": "Internal error.", "status": "INTERNAL" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("doclens")
        .env("DOCLENS_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", &uri)
        .args(["files", "delete-all"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Deleted file with ID: one"))
        .stdout(predicate::str::contains(
            "Error deleting file with ID two: HTTP 500: Internal error.",
        ))
        .stdout(predicate::str::contains("Deleted file with ID: three"))
        .stderr(predicate::str::contains("1 deletion(s) failed"));
}

#[tokio::test]
async fn test_delete_single_file() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("doclens")
        .env("DOCLENS_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", server.uri())
        .args(["files", "delete", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted file with ID: abc123"));
}

//! The interactive session reads commands from stdin.


use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::{
    answer_response, can_bind_localhost, file_json, mount_file_list, temp_home, write_pdf,
};
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_warnings_before_any_remote_call() {
    let home = temp_home();

    // Unroutable base URL: any remote call would fail loudly.
    cargo_bin_cmd!("doclens")
        .env("DOCLENS_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", "http://127.0.0.1:9")
        .write_stdin("upload\nask What is this?\nfiles\nbogus\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning: Please upload documents."))
        .stdout(predicate::str::contains(
            "Warning: Please upload files and enter a prompt.",
        ))
        .stdout(predicate::str::contains("No files uploaded in this session."))
        .stdout(predicate::str::contains("Unknown command 'bogus'"))
        .stdout(predicate::str::contains("Error").not());
}

#[test]
fn test_pick_rejects_non_pdf() {
    let home = temp_home();
    let docs = TempDir::new().unwrap();
    let text_file = docs.path().join("notes.pdf");
    std::fs::write(&text_file, "plain text").unwrap();
    let pdf = write_pdf(docs.path(), "real.pdf");

    let input = format!(
        "pick {}\npick {}\npicked\n",
        text_file.display(),
        pdf.display()
    );

    cargo_bin_cmd!("doclens")
        .env("DOCLENS_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", "http://127.0.0.1:9")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("is not a PDF document"))
        .stdout(predicate::str::contains("Selected real.pdf (slot 1)"))
        .stdout(predicate::str::contains("1. real.pdf"));
}

#[tokio::test]
async fn test_session_upload_ask_list_and_delete() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let docs = TempDir::new().unwrap();
    let pdf = write_pdf(docs.path(), "contract.pdf");

    let server = MockServer::start().await;
    let uri = server.uri();
    let session_url = format!("{uri}/upload-session/1");

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": file_json(&uri, "c1", "contract.pdf")
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .respond_with(answer_response("The term is 12 months."))
        .expect(1)
        .mount(&server)
        .await;
    mount_file_list(&server, vec![file_json(&uri, "c1", "contract.pdf")]).await;
    Mock::given(method("DELETE"))
        .and(path("/files/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let input = format!(
        "upload {}\nask What is the contract term?\nlist\ndelete-all\nfiles\nexit\n",
        pdf.display()
    );

    cargo_bin_cmd!("doclens")
        .env("DOCLENS_HOME", home.path())
        .env("GEMINI_API_KEY", "test-api-key")
        .env("GEMINI_BASE_URL", &uri)
        .env_remove("DOCLENS_MODEL")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Files uploaded successfully."))
        .stdout(predicate::str::contains(format!(
            "Uploaded Files:\ncontract.pdf, URI: {uri}/files/c1"
        )))
        .stdout(predicate::str::contains("Response:\nThe term is 12 months."))
        .stdout(predicate::str::contains("Files:\ncontract.pdf"))
        .stdout(predicate::str::contains("Deleted file with ID: c1"))
        .stdout(predicate::str::contains("No files uploaded in this session."));
}

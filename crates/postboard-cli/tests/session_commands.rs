//! End-to-end commands against a mock postboard service.
//!
//! Each command runs in a fresh process sharing one POSTBOARD_HOME, so the
//! session has to survive through the cookie jar and session cache on disk.


use std::net::TcpListener;

use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::{Env, mount_login, mount_profile, post_json};
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_then_status_uses_saved_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_profile(&server).await;
    let env = Env::new(&server);

    env.cmd()
        .args(["login", "--email", "ada@example.com", "--password", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Login successful! Redirecting..."));

    assert!(env.home().join("session.json").exists());
    assert!(env.home().join("cookies.json").exists());

    env.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as Ada <ada@example.com>"));
}

#[tokio::test]
async fn test_login_reads_password_from_stdin() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let env = Env::new(&server);

    env.cmd()
        .args(["login", "--email", "ada@example.com"])
        .write_stdin("secret\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Login successful"));
}

#[tokio::test]
async fn test_wrong_password_shows_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Invalid email or password"})),
        )
        .mount(&server)
        .await;
    let env = Env::new(&server);

    env.cmd()
        .args(["login", "--email", "ada@example.com", "--password", "wrong"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗ Invalid email or password"))
        .stderr(predicate::str::is_empty());

    assert!(!env.home().join("session.json").exists());
}

#[tokio::test]
async fn test_status_when_logged_out_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let env = Env::new(&server);

    env.cmd()
        .arg("status")
        .assert()
        .failure()
        .stdout(predicate::str::contains("i Please log in to continue."))
        .stdout(predicate::str::contains("postboard login"));
}

#[tokio::test]
async fn test_posts_list_renders_newest_first() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_profile(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/posts/list"))
        .and(header("cookie", "sid=s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [post_json("Newest post"), post_json("Older post")]
        })))
        .mount(&server)
        .await;
    let env = Env::new(&server);
    env.login();

    let output = env.cmd().args(["posts", "list"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();

    let newest = stdout.find("Newest post").unwrap();
    let older = stdout.find("Older post").unwrap();
    assert!(newest < older);
    assert!(stdout.contains("by Ada on 2024-03-01 12:00 UTC"));
}

#[tokio::test]
async fn test_posts_list_empty() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_profile(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/posts/list"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .mount(&server)
        .await;
    let env = Env::new(&server);
    env.login();

    env.cmd()
        .args(["posts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No posts yet"));
}

#[tokio::test]
async fn test_create_post_with_short_title_sends_nothing() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_profile(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/posts/create"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let env = Env::new(&server);
    env.login();

    env.cmd()
        .args(["posts", "create", "--title", "Hey", "--content", "Long enough content"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "✗ Title must be at least 5 characters",
        ));
}

#[tokio::test]
async fn test_expired_session_clears_cache() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Not authenticated"})),
        )
        .mount(&server)
        .await;
    let env = Env::new(&server);
    env.login();
    assert!(env.home().join("session.json").exists());

    env.cmd()
        .arg("profile")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "! Your session has expired. Please log in again.",
        ));

    assert!(!env.home().join("session.json").exists());
}

#[tokio::test]
async fn test_logout_twice_succeeds() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Logged out"})),
        )
        .mount(&server)
        .await;
    let env = Env::new(&server);
    env.login();

    for _ in 0..2 {
        env.cmd()
            .arg("logout")
            .assert()
            .success()
            .stdout(predicate::str::contains("i You have been logged out."));
    }

    assert!(!env.home().join("session.json").exists());
    assert!(!env.home().join("cookies.json").exists());
}

#[test]
fn test_service_down_is_reported_as_connectivity() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let home = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("postboard")
        .env("POSTBOARD_HOME", home.path())
        .env("POSTBOARD_BASE_URL", format!("http://127.0.0.1:{port}/api"))
        .args(["login", "--email", "ada@example.com", "--password", "secret"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗ Could not reach the server"));
}

#[tokio::test]
async fn test_shell_logs_in_and_shows_posts() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_profile(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/posts/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [post_json("Shell post")]
        })))
        .mount(&server)
        .await;
    let env = Env::new(&server);

    env.cmd()
        .arg("shell")
        .write_stdin("help\nlogin ada@example.com\nsecret\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("entry> "))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("✓ Login successful"))
        .stdout(predicate::str::contains("Shell post"))
        .stdout(predicate::str::contains("posts> "));
}

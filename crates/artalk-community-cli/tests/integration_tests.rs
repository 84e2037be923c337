//! Integration tests for CLI commands

use std::process::{Command, Output};

/// Helper to run artalk-community
fn artalk_community(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_artalk-community"))
        .args(args)
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_OUTPUT")
        .env_remove("ARTALK_COMMUNITY_ROOT")
        .output()
        .expect("Failed to execute artalk-community")
}

/// Get the fixtures path
fn fixtures_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures")
}

fn fixture(name: &str) -> String {
    format!("{}/{}", fixtures_path(), name)
}

mod validate_command {
    use super::*;

    #[test]
    fn test_validate_valid_lists() {
        let output = artalk_community(&["validate", "--root", &fixture("valid")]);

        assert!(output.status.success(), "Expected success for valid lists");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("[PASS]"));
        assert!(stdout.contains("plugins.yaml\" are valid."));
        assert!(stdout.contains("themes.yaml\" are valid."));
    }

    #[test]
    fn test_validate_invalid_entry() {
        let output = artalk_community(&["validate", "--root", &fixture("invalid")]);

        assert_eq!(output.status.code(), Some(2));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("[FAIL] 😢 Invalid entry \"broken\""));
        assert!(stdout.contains("plugins.yaml:9:3"));
        assert!(stdout.contains("[\"description\", \"author_name\"]"));
        assert!(stdout.contains("- \"name\" should not start or end with a space."));
        assert!(stdout.contains("- \"author_link\" is not a valid URL."));
        // The valid theme list still gets its own verdict
        assert!(stdout.contains("themes.yaml\" are valid."));
    }

    #[test]
    fn test_validate_json_output() {
        let output = artalk_community(&["validate", "--root", &fixture("invalid"), "--json"]);

        assert_eq!(output.status.code(), Some(2));
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");

        assert_eq!(json["valid"], false);
        let entries = json["files"][0]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["id"], "broken");
        assert_eq!(entries[1]["line"], 9);
    }

    #[test]
    fn test_validate_malformed_list() {
        let output = artalk_community(&["validate", "--root", &fixture("malformed")]);

        assert_eq!(output.status.code(), Some(2));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("[FAIL]"));
        assert!(stdout.contains("No entries found"));
    }

    #[test]
    fn test_validate_missing_lists_warn() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let output = artalk_community(&["validate", "--root", &root]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("[WARN] No entries found"));
    }

    #[test]
    fn test_validate_path_overrides() {
        let output = artalk_community(&[
            "validate",
            "--root",
            &fixture("invalid"),
            "--plugins",
            &fixture("valid/plugins.yaml"),
        ]);

        assert!(output.status.success());
    }
}

mod usage {
    use super::*;

    #[test]
    fn test_unknown_flag_is_usage_error() {
        let output = artalk_community(&["build", "--no-such-flag"]);
        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_help() {
        let output = artalk_community(&["--help"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("validate"));
        assert!(stdout.contains("build"));
        assert!(stdout.contains("diff"));
    }
}

/// Build and diff against a local mock of npm, GitHub and the CDN
mod remote_commands {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const THEMES: &str = r#"- id: sakura
  name: Sakura
  description: A soft pink theme
  github_repo: someone/artalk-theme-sakura
  npm_package: artalk-theme-sakura
  author_name: someone
  author_link: https://example.com
"#;

    async fn run_against(server: &MockServer, args: &[&str], envs: &[(&str, &str)]) -> Output {
        let base = server.uri();
        let npm = format!("{}/npm-registry", base);
        let github = format!("{}/github", base);
        let cdn = format!("{}/cdn", base);
        let mut command = tokio::process::Command::new(env!("CARGO_BIN_EXE_artalk-community"));
        command
            .args(args)
            .args([
                "--npm-registry",
                npm.as_str(),
                "--github-api",
                github.as_str(),
                "--cdn",
                cdn.as_str(),
                "--timeout",
                "5",
            ])
            .env_remove("GITHUB_TOKEN")
            .env_remove("GITHUB_OUTPUT")
            .env_remove("ARTALK_COMMUNITY_ROOT");
        for (key, value) in envs {
            command.env(key, value);
        }
        command.output().await.expect("Failed to execute artalk-community")
    }

    async fn mount_theme(server: &MockServer, peer: Option<&str>) {
        let mut manifest = json!({ "main": "dist/sakura.js" });
        if let Some(peer) = peer {
            manifest["peerDependencies"] = json!({ "artalk": peer });
        }
        Mock::given(method("GET"))
            .and(path("/npm-registry/artalk-theme-sakura"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "artalk-theme-sakura",
                "dist-tags": { "latest": "0.3.0" },
                "versions": { "0.3.0": manifest },
                "time": { "0.3.0": "2024-06-01T00:00:00.000Z" }
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/github/repos/someone/artalk-theme-sakura"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "full_name": "someone/artalk-theme-sakura"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cdn/npm/artalk-theme-sakura@0.3.0/dist/sakura.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_build_writes_catalog() {
        let server = MockServer::start().await;
        mount_theme(&server, Some("^2.8.0")).await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("themes.yaml"), THEMES).unwrap();
        let root = dir.path().to_string_lossy().to_string();

        let output = run_against(
            &server,
            &["build", "--root", &root, "--algorithm", "sha256"],
            &[],
        )
        .await;
        assert!(
            output.status.success(),
            "build failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("[DONE] artalk-theme-sakura - v0.3.0"));

        let catalog: serde_json::Value = serde_json::from_slice(
            &std::fs::read(dir.path().join("dist/registry.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(catalog["plugins"], json!([]));
        let theme = &catalog["themes"][0];
        assert_eq!(theme["type"], "theme");
        assert_eq!(theme["verified"], false);
        assert_eq!(theme["min_artalk_version"], "2.8.0");
        assert_eq!(
            theme["integrity"],
            "sha256-uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
        );
        assert_eq!(theme["options_schema"], "");
        assert_eq!(
            theme["source"],
            format!("{}/cdn/npm/artalk-theme-sakura@0.3.0/dist/sakura.js", server.uri())
        );

        // Second run is served from the cache
        let output = run_against(&server, &["build", "--root", &root], &[]).await;
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("[Cached]"));
    }

    #[tokio::test]
    async fn test_build_fails_without_peer_dependency() {
        let server = MockServer::start().await;
        mount_theme(&server, None).await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("themes.yaml"), THEMES).unwrap();
        let root = dir.path().to_string_lossy().to_string();

        let output = run_against(&server, &["build", "--root", &root], &[]).await;
        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Error generating registry"));
        assert!(!dir.path().join("dist/registry.json").exists());
    }

    #[tokio::test]
    async fn test_diff_identical_and_changed() {
        let server = MockServer::start().await;
        let published = "{\n  \"plugins\": [],\n  \"themes\": []\n}\n";
        Mock::given(method("GET"))
            .and(path("/github/repos/ArtalkJS/Community/releases/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tag_name": "v1",
                "assets": [{
                    "name": "registry.json",
                    "browser_download_url": format!("{}/assets/registry.json", server.uri())
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/assets/registry.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(published))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("dist/registry.json"), published).unwrap();
        let github_output = dir.path().join("github_output");
        let github_output_str = github_output.to_string_lossy().to_string();

        let output = run_against(
            &server,
            &["diff", "--root", &root],
            &[("GITHUB_OUTPUT", github_output_str.as_str())],
        )
        .await;
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("::set-output name=is_diff::0"));

        std::fs::write(
            dir.path().join("dist/registry.json"),
            "{\n  \"plugins\": [],\n  \"themes\": [{}]\n}\n",
        )
        .unwrap();
        let output = run_against(
            &server,
            &["diff", "--root", &root, "--show-diff"],
            &[("GITHUB_OUTPUT", github_output_str.as_str())],
        )
        .await;
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("::set-output name=is_diff::1"));
        assert!(stdout.contains("+  \"themes\": [{}]"));

        assert_eq!(
            std::fs::read_to_string(&github_output).unwrap(),
            "is_diff=0\nis_diff=1\n"
        );
    }

    #[tokio::test]
    async fn test_diff_without_release() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/github/repos/ArtalkJS/Community/releases/latest"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let output = run_against(&server, &["diff", "--root", &root], &[]).await;

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("No GitHub release found."));
        assert!(stdout.contains("::set-output name=is_diff::1"));
    }

    #[tokio::test]
    async fn test_diff_server_error_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/github/repos/ArtalkJS/Community/releases/latest"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let output = run_against(&server, &["diff", "--root", &root], &[]).await;

        assert_eq!(output.status.code(), Some(1));
        assert!(!String::from_utf8_lossy(&output.stdout).contains("::set-output"));
    }
}

//! Integration tests for the Vitals CLI
//!
//! These tests run the compiled binary inside an isolated HOME so no
//! real token bundle or config file is ever touched. They exercise the
//! output contract: every invocation prints exactly one JSON document
//! on stdout, and exit codes separate dispatch and session failures
//! from errors a query reports inside its document.

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use vitals_cli::connect::{SessionTokens, TokenStore};

// =============================================================================
// Test Helpers
// =============================================================================

/// An isolated HOME with its own (initially empty) token directory.
struct TestEnv {
    _tmp: TempDir,
    home: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        Self { _tmp: tmp, home }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("vitals").expect("vitals binary");
        cmd.env("HOME", &self.home);
        cmd
    }

    fn token_dir(&self) -> PathBuf {
        self.home.join(".garminconnect")
    }

    /// Stores a token bundle that expires `expires_in` seconds from now.
    fn store_tokens(&self, expires_in: i64) {
        let tokens = SessionTokens::from_exchange(
            "test-access-token".to_string(),
            "Bearer".to_string(),
            None,
            expires_in,
            None,
        );
        TokenStore::at(self.token_dir())
            .save(&tokens)
            .expect("save tokens");
    }

    /// Points the Connect API at a closed local port so any request
    /// fails fast without leaving the machine.
    fn point_api_at_dead_port(&self) {
        fs::create_dir_all(self.token_dir()).expect("create token dir");
        fs::write(
            self.token_dir().join("config.yaml"),
            "connect_url: \"http://127.0.0.1:9\"\n",
        )
        .expect("write config");
    }
}

/// Parses the single JSON document a command printed to stdout.
fn stdout_json(assert: &assert_cmd::assert::Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout)
        .expect("stdout should be exactly one JSON document")
}

// =============================================================================
// Dispatch Tests
// =============================================================================

mod dispatch_tests {
    use super::*;

    #[test]
    fn test_no_command_lists_catalog_and_fails() {
        let env = TestEnv::new();
        let assert = env.cmd().assert().failure().code(1);

        let doc = stdout_json(&assert);
        assert_eq!(doc["error"], "No command specified");
        let available = doc["available_commands"].as_array().expect("command list");
        assert_eq!(available.len(), 31);
        for name in ["today", "hr", "heart", "vo2max", "water"] {
            assert!(available.iter().any(|n| n == name), "missing {name}");
        }
    }

    #[test]
    fn test_unknown_command_fails_with_catalog() {
        let env = TestEnv::new();
        let assert = env.cmd().arg("xyz").assert().failure().code(1);

        let doc = stdout_json(&assert);
        assert_eq!(doc["error"], "Unknown command: xyz");
        let available = doc["available"].as_array().expect("command list");
        assert_eq!(available.len(), 31);
        // The list is sorted for stable output.
        let names: Vec<&str> = available.iter().filter_map(Value::as_str).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_unknown_command_is_reported_lowercased() {
        let env = TestEnv::new();
        let assert = env.cmd().arg("XYZ").assert().failure().code(1);
        assert_eq!(stdout_json(&assert)["error"], "Unknown command: xyz");
    }

    #[test]
    fn test_help_prints_catalog_and_succeeds() {
        let env = TestEnv::new();
        let assert = env.cmd().arg("help").assert().success();

        let doc = stdout_json(&assert);
        let commands = doc["commands"].as_object().expect("commands object");
        assert_eq!(commands.len(), 21);
        assert_eq!(
            commands["today [date]"],
            "Daily summary (steps, HR, sleep, stress)"
        );
        assert_eq!(commands["activity <id>"], "Detailed activity data");
        assert_eq!(commands["hydration [date]"], "Water intake");
    }

    #[test]
    fn test_clap_help_shows_interactive_commands() {
        let env = TestEnv::new();
        env.cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(contains("login"))
            .stdout(contains("EXAMPLES"));
    }
}

// =============================================================================
// Session Tests
// =============================================================================

mod session_tests {
    use super::*;

    #[test]
    fn test_query_without_tokens_fails() {
        let env = TestEnv::new();
        let assert = env.cmd().arg("today").assert().failure().code(1);

        let doc = stdout_json(&assert);
        let error = doc["error"].as_str().expect("error string");
        assert!(error.contains("Not logged in"), "got: {error}");
        assert!(error.contains("vitals login"), "got: {error}");
    }

    #[test]
    fn test_query_with_expired_tokens_fails_without_network() {
        let env = TestEnv::new();
        env.store_tokens(-3600);

        let assert = env.cmd().arg("steps").assert().failure().code(1);
        let doc = stdout_json(&assert);
        let error = doc["error"].as_str().expect("error string");
        assert!(error.contains("Session expired or invalid"), "got: {error}");
        assert!(error.contains("OAuth token expired"), "got: {error}");
    }

    #[test]
    fn test_query_with_unverifiable_session_fails() {
        let env = TestEnv::new();
        env.store_tokens(3600);
        env.point_api_at_dead_port();

        let assert = env.cmd().arg("hrv").assert().failure().code(1);
        let doc = stdout_json(&assert);
        let error = doc["error"].as_str().expect("error string");
        assert!(error.contains("Session expired or invalid"), "got: {error}");
    }

    #[test]
    fn test_alias_resolves_before_session_check() {
        let env = TestEnv::new();
        // An alias must reach the session check, not the unknown-command path.
        let assert = env.cmd().arg("heart").assert().failure().code(1);
        let doc = stdout_json(&assert);
        assert!(doc["error"].as_str().unwrap().contains("Not logged in"));
        assert!(doc.get("available").is_none());
    }
}

// =============================================================================
// Login/Logout Tests
// =============================================================================

mod login_tests {
    use super::*;

    #[test]
    fn test_logout_when_not_logged_in() {
        let env = TestEnv::new();
        env.cmd()
            .arg("logout")
            .assert()
            .success()
            .stdout(contains("Not currently logged in."));
    }

    #[test]
    fn test_logout_deletes_expired_bundle() {
        let env = TestEnv::new();
        // Expired tokens skip the best-effort verify, so no network.
        env.store_tokens(-3600);

        env.cmd()
            .arg("logout")
            .assert()
            .success()
            .stdout(contains("Logged out."));

        let store = TokenStore::at(env.token_dir());
        assert!(store.load().expect("load after delete").is_none());
    }

    #[test]
    fn test_logout_leaves_config_file_alone() {
        let env = TestEnv::new();
        env.store_tokens(-3600);
        env.point_api_at_dead_port();

        env.cmd().arg("logout").assert().success();
        assert!(env.token_dir().join("config.yaml").exists());
    }

    #[test]
    fn test_login_help_mentions_domain_flag() {
        let env = TestEnv::new();
        env.cmd()
            .args(["login", "--help"])
            .assert()
            .success()
            .stdout(contains("--domain"));
    }
}

// =============================================================================
// Output Contract Tests
// =============================================================================

mod output_contract_tests {
    use super::*;

    #[test]
    fn test_every_failure_path_prints_one_json_object() {
        let env = TestEnv::new();
        env.store_tokens(-3600);

        // No command, unknown command, and a session failure all keep
        // the stdout contract.
        for args in [vec![], vec!["xyz"], vec!["today"]] {
            let assert = env.cmd().args(&args).assert().failure();
            let doc = stdout_json(&assert);
            assert!(doc.is_object(), "args {args:?} should print an object");
            assert!(doc.get("error").is_some(), "args {args:?} should carry an error");
        }
    }

    #[test]
    fn test_verbose_logs_stay_off_stdout() {
        let env = TestEnv::new();
        let assert = env
            .cmd()
            .args(["--verbose", "today"])
            .assert()
            .failure()
            .code(1);
        // Anything tracing emits goes to stderr; stdout must still
        // parse as a single document.
        let doc = stdout_json(&assert);
        assert!(doc.is_object());
    }
}

// =============================================================================
// Registry Tests
// =============================================================================

mod registry_tests {
    use vitals_cli::queries;

    #[test]
    fn test_lookup_is_case_insensitive_across_aliases() {
        for (alias, canonical) in [
            ("heart", "hr"),
            ("HR", "hr"),
            ("weight", "body"),
            ("runs", "running"),
            ("vo2", "vo2max"),
            ("predictions", "race"),
            ("weekly", "week"),
            ("pr", "records"),
            ("oxygen", "spo2"),
            ("breathing", "respiration"),
            ("water", "hydration"),
        ] {
            assert_eq!(
                queries::find(alias).map(|c| c.name),
                Some(canonical),
                "alias {alias}"
            );
        }
    }

    #[test]
    fn test_command_names_match_registry() {
        let names = queries::command_names();
        assert_eq!(names.len(), 31);
        for command in queries::COMMANDS {
            assert!(names.contains(&command.name));
        }
    }
}

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const FIXTURE_NOW: &str = "2024-05-15T12:00:00Z";

struct CliTestEnv {
    temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            temp_dir,
            home,
            xdg_config,
            xdg_state,
        }
    }

    fn write_config(&self, content: &str) {
        let dir = self.xdg_config.join("spotifetch");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), content).expect("failed to write config");
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

fn fixture_path() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/history.json")
        .to_string_lossy()
        .into_owned()
}

fn run_report(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("spotifetch-report"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env("TZ", "UTC")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute spotifetch-report: {e}"))
}

/// Run against the fixture export as of the fixture's "now".
fn run_fixture(env: &CliTestEnv, extra: &[&str]) -> Output {
    let input = fixture_path();
    let mut args = vec!["--input", input.as_str(), "--now", FIXTURE_NOW];
    args.extend_from_slice(extra);
    let output = run_report(env, &args);
    assert_success(&args, &output);
    output
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "spotifetch-report {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

#[test]
fn terminal_report_for_default_range() {
    let env = CliTestEnv::new();
    let output = run_fixture(&env, &[]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("LISTENING REPORT: LAST 30 DAYS"),
        "expected month header, got:\n{stdout}"
    );
    assert!(stdout.contains("Plays:    24"));
    assert!(stdout.contains("Peak hour:  9 PM (17 plays)"));
    assert!(stdout.contains("TOP ARTISTS"));
    assert!(stdout.contains("Aurora Lane"));
}

#[test]
fn json_export_contains_full_report() {
    let env = CliTestEnv::new();
    let output = run_fixture(&env, &["--export", "json"]);

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["range"], "month");
    assert_eq!(report["total_plays"], 24);
    assert_eq!(report["hourly"].as_array().map(Vec::len), Some(24));
    assert_eq!(report["hourly"][21], 17);
    assert_eq!(report["top_artists"][0]["name"], "Aurora Lane");
    assert_eq!(report["fingerprint"]["consistency"], 47);
    assert_eq!(report["weekly"]["total"], 4);
    assert_eq!(report["weekly"]["previous_total"], 13);
}

#[test]
fn markdown_export_for_week() {
    let env = CliTestEnv::new();
    let output = run_fixture(&env, &["--range", "week", "--export", "md"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# Listening Report: Last 7 days"));
    assert!(stdout.contains("| Plays | 13 | |"));
    assert!(stdout.contains("## Top Tracks"));
}

#[test]
fn default_range_comes_from_config() {
    let env = CliTestEnv::new();
    env.write_config("[analytics]\ndefault_range = \"week\"\ntop_count = 1\n");
    let output = run_fixture(&env, &["--export", "json"]);

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["range"], "week");
    assert_eq!(report["top_tracks"].as_array().map(Vec::len), Some(1));
}

#[test]
fn svg_output_is_written() {
    let env = CliTestEnv::new();
    let svg_path = env.path("clock.svg");
    let svg_arg = svg_path.to_string_lossy().into_owned();
    run_fixture(&env, &["--svg", svg_arg.as_str(), "--width", "480", "--height", "360"]);

    let svg = fs::read_to_string(&svg_path).expect("svg should be written");
    assert!(svg.contains(r#"width="480""#));
    assert!(svg.contains(r#"height="360""#));
    assert_eq!(svg.matches("<path ").count(), 24);
    assert!(svg.contains(">Peak Hour</text>"));
}

#[test]
fn cap_limits_fetched_history() {
    let env = CliTestEnv::new();
    let output = run_fixture(&env, &["--cap", "10", "--page-size", "10", "--export", "json"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("stopped after 10 events"),
        "expected cap note, got:\n{stderr}"
    );
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["total_plays"], 10);
}

#[test]
fn empty_period_reports_no_activity() {
    let env = CliTestEnv::new();
    let input = fixture_path();
    let args = ["--input", input.as_str(), "--now", "2030-01-01T00:00:00Z"];
    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No listening activity found for this period."));
}

#[test]
fn week_offset_selects_an_earlier_week() {
    let env = CliTestEnv::new();
    let output = run_fixture(&env, &["--week-offset", "1", "--export", "json"]);

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["week_offset"], 1);
    assert_eq!(report["weekly"]["total"], 13);
    assert_eq!(report["weekly"]["previous_total"], 7);
    assert_eq!(report["weekly"]["daily"][3], 3);
    // The selected range is unaffected
    assert_eq!(report["total_plays"], 24);

    let output = run_fixture(&env, &["--week-offset", "1"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("WEEK OF MAY 6, 2024"),
        "expected week heading, got:\n{stdout}"
    );
    assert!(stdout.contains("13 plays that week, 7 plays the week before"));
}

#[test]
fn empty_range_still_shows_fingerprint_and_week() {
    let env = CliTestEnv::new();
    let input = fixture_path();
    // Nothing in the last 7 days, but plays in the last 30 and last week
    let args = [
        "--input",
        input.as_str(),
        "--now",
        "2024-05-25T00:00:00Z",
        "--range",
        "week",
    ];
    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No listening activity found for this period."));
    assert!(stdout.contains("LISTENING FINGERPRINT"));
    assert!(stdout.contains("0 plays this week, 4 plays last week"));
    assert!(!stdout.contains("LISTENING CLOCK"));

    let mut md_args = args.to_vec();
    md_args.extend_from_slice(&["--export", "md"]);
    let output = run_report(&env, &md_args);
    assert_success(&md_args, &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Listening Fingerprint"));
    assert!(stdout.contains("## This Week"));
}

#[test]
fn invalid_arguments_fail() {
    let env = CliTestEnv::new();
    let input = fixture_path();

    for args in [
        vec!["--input", input.as_str(), "--export", "csv"],
        vec!["--input", input.as_str(), "--range", "decade"],
        vec!["--input", input.as_str(), "--page-size", "0"],
        vec!["--input", input.as_str(), "--now", "yesterday"],
        vec!["--input", input.as_str(), "--week-offset", "-1"],
        // No export and no user configured
        vec!["--range", "week"],
    ] {
        let output = run_report(&env, &args);
        assert!(
            !output.status.success(),
            "expected failure for {:?}",
            args
        );
    }
}

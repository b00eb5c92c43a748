//! Integration tests for consent-fixtures
//!
//! The bridge tests drive `CommandEngine` through a shell script standing in
//! for the real engine. The catalog test needs the real engine bridge and a
//! browser, so it is marked #[ignore]. Run with:
//! cargo test --package consent-fixtures -- --ignored

use std::fs;
use std::path::Path;
use std::sync::Arc;

use consent_fixtures::{
    CATALOG, CommandEngine, ExpectedNotice, HarnessConfig, Outcome, Runner, TestCase, Verdict,
};

fn write_fixture(root: &Path, name: &str) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create fixture dir");
    fs::write(
        dir.join("index.html"),
        "<!DOCTYPE html><html><body><div id=\"cc\">We use cookies</div></body></html>",
    )
    .expect("write fixture");
}

/// Shell bridge: records every `prepare`, answers `check` by host override.
#[cfg(unix)]
fn bridge(log: &Path) -> CommandEngine {
    let script = format!(
        r#"input=$(cat)
if [ "$0" = prepare ]; then echo prepare >> '{log}'; exit 0; fi
echo check >> '{log}'
case "$input" in
  *'"hostOverride":"banner.example"'*) printf '{{"identified":true,"markupInner":"abc","hideableElementRange":2,"scrollBlocked":true}}' ;;
  *'"hostOverride":"crash.example"'*) echo 'renderer crashed' >&2; exit 9 ;;
  *) printf '{{"identified":false,"scrollBlocked":false}}' ;;
esac"#,
        log = log.display()
    );
    CommandEngine::new("sh", vec!["-c".to_string(), script])
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn runs_fixtures_through_a_bridge_process() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("data");
    let log = dir.path().join("bridge.log");

    let cases = vec![
        TestCase::new("quiet.example", None, Some(false)),
        TestCase::new(
            "banner.example",
            Some(ExpectedNotice::new(
                "ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=",
                2,
            )),
            Some(true),
        ),
        TestCase::new("crash.example", None, None),
        TestCase::new("unverified.example", None, None),
    ];
    for case in &cases {
        write_fixture(&root, case.name);
    }

    let engine = Arc::new(bridge(&log));
    let report = Runner::new(engine, HarnessConfig::default().base(), &root)
        .with_worker_budget(2)
        .run(&cases)
        .await
        .expect("run should not be fatal");

    let calls = fs::read_to_string(&log).expect("bridge log");
    assert_eq!(calls.lines().filter(|l| *l == "prepare").count(), 1);
    assert_eq!(calls.lines().next(), Some("prepare"));
    assert_eq!(calls.lines().filter(|l| *l == "check").count(), 4);

    assert_eq!(report.fixture("quiet.example").unwrap().outcome(), Outcome::Pass);
    assert_eq!(report.fixture("banner.example").unwrap().outcome(), Outcome::Pass);

    let crash = report.fixture("crash.example").unwrap();
    assert_eq!(crash.outcome(), Outcome::Fail);
    assert!(crash.engine_error.as_deref().unwrap().contains("renderer crashed"));

    let unverified = report.fixture("unverified.example").unwrap();
    assert_eq!(unverified.notice, Verdict::Pass);
    assert!(unverified.scroll_blocking.is_not_verified());

    assert_eq!(report.failed(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn failing_prepare_stops_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("bridge.log");
    let script = format!(
        "cat >/dev/null; echo \"$0\" >> '{}'; [ \"$0\" = check ]",
        log.display()
    );
    let engine = Arc::new(CommandEngine::new("sh", vec!["-c".to_string(), script]));

    let result = Runner::new(engine, HarnessConfig::default().base(), dir.path())
        .run(&CATALOG[..3])
        .await;

    assert!(result.is_err());
    let calls = fs::read_to_string(&log).expect("bridge log");
    assert_eq!(calls.trim(), "prepare");
}

/// Full catalog against the real engine.
///
/// Needs `consent-fixtures.toml` (or `CONSENT_FIXTURES_*`) pointing at the
/// engine bridge and fixture data, and a browser at `BRAVE_BINARY`.
#[tokio::test(flavor = "multi_thread")]
#[ignore] // Requires the detection engine and a browser
async fn catalog_matches_recorded_expectations() {
    let config = HarnessConfig::load(None).expect("load harness config");
    let engine = Arc::new(CommandEngine::from_config(&config));
    let runner = Runner::from_config(engine, &config).expect("fixtures root");

    let report = runner.run(CATALOG).await.expect("profile preparation");

    let failures: Vec<_> = report
        .fixtures
        .iter()
        .filter(|f| f.outcome() == Outcome::Fail)
        .map(|f| {
            format!(
                "{}: {:?} {:?} {:?}",
                f.name, f.engine_error, f.notice, f.scroll_blocking
            )
        })
        .collect();
    assert!(failures.is_empty(), "failed fixtures:\n{}", failures.join("\n"));
}

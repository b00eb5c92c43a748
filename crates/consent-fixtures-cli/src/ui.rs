//! Terminal rendering of run reports and the fixture catalog.
//!
//! Rendering builds a `String` so the output can be asserted on; callers
//! print it to stdout.

use std::fmt::Write as _;
use std::time::Duration;

use consent_fixtures::{FixtureReport, Outcome, RunReport, TestCase, Verdict};
use owo_colors::OwoColorize;

/// Decide whether to color output.
///
/// `--no-color` and `NO_COLOR` disable colors, `FORCE_COLOR` enables them,
/// otherwise they follow whether stdout is a color-capable terminal.
pub fn init_colors(no_color: bool) -> bool {
    if no_color || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stdout().features().colors_supported()
}

/// Format a duration as `50ms`, `1.50s` or `2m 30s`.
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn marker(label: &str, outcome: Option<Outcome>, color: bool) -> String {
    if !color {
        return label.to_string();
    }
    match outcome {
        Some(Outcome::Pass) => label.green().bold().to_string(),
        Some(Outcome::Fail) => label.red().bold().to_string(),
        None => label.yellow().bold().to_string(),
    }
}

fn write_fixture(out: &mut String, fixture: &FixtureReport, color: bool) {
    let outcome = fixture.outcome();
    let label = match outcome {
        Outcome::Pass => "PASS",
        Outcome::Fail => "FAIL",
    };
    let elapsed = format!("({})", format_duration(fixture.elapsed));
    let elapsed = if color {
        elapsed.dimmed().to_string()
    } else {
        elapsed
    };
    let _ = writeln!(
        out,
        "{} {} {}",
        marker(label, Some(outcome), color),
        fixture.name,
        elapsed
    );

    if let Some(error) = &fixture.engine_error {
        let _ = writeln!(out, "     {error}");
        return;
    }

    for (check, verdict) in [
        ("cookie notice", &fixture.notice),
        ("scroll blocking", &fixture.scroll_blocking),
    ] {
        match verdict {
            Verdict::Pass => {}
            Verdict::Fail(message) => {
                let _ = writeln!(out, "     {check}: {message}");
            }
            Verdict::NotVerified(reason) => {
                let _ = writeln!(out, "     {} {check}: {reason}", marker("SKIP", None, color));
            }
        }
    }
}

/// Render one line per fixture, failure details, and a summary line.
pub fn render_report(report: &RunReport, color: bool) -> String {
    let mut out = String::new();
    for fixture in &report.fixtures {
        write_fixture(&mut out, fixture, color);
    }

    let failed = format!("{} failed", report.failed());
    let failed = if color && report.failed() > 0 {
        failed.red().bold().to_string()
    } else {
        failed
    };
    let _ = writeln!(
        out,
        "\n{} fixtures: {} passed, {}, {} sub-checks not verified in {} ({} workers, run {})",
        report.fixtures.len(),
        report.passed(),
        failed,
        report.not_verified(),
        format_duration(report.elapsed),
        report.worker_budget,
        report.run_id
    );
    out
}

/// Render catalog entries with their recorded expectations.
pub fn render_catalog(cases: &[TestCase], color: bool) -> String {
    let width = cases.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let mut out = String::new();

    for case in cases {
        let notice = match case.expected_notice {
            Some(notice) => format!("notice {} range {}", notice.hash, notice.range),
            None => "no notice".to_string(),
        };
        let scroll = match case.expected_scroll_blocked {
            Some(true) => "scroll blocked",
            Some(false) => "scroll free",
            None => "scroll unverified",
        };
        let name = format!("{:<width$}", case.name);
        let name = if color {
            name.bold().to_string()
        } else {
            name
        };
        let _ = writeln!(out, "{name}  {notice}  {scroll}");
    }
    out
}

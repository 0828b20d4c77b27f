//! Harness tests - welcome page contract checks, case isolation and report output

use std::{net::TcpListener, time::Duration};

use crate::{
    cofg::{cli::SmokeArgs, config::Cofg},
    error::{AppError, AssertionError, CaseError},
    harness::{
        CaseFuture, CaseReport, Context, Outcome, Suite, SuiteReport, TestCase, TestGroup,
        check_welcome_page, simple_check, smoke,
    },
    probe::{Prober, ResponseSnapshot},
    request::GREETING,
};

fn snapshot(status: u16, content_type: Option<&str>, body: &str) -> ResponseSnapshot {
    ResponseSnapshot::new(status, content_type.map(|v| ("Content-Type", v)), body)
}

/// Context that no case in this file ever sends a request through.
fn offline_context() -> Context {
    Context::new(
        Prober::new(Duration::from_millis(100)).unwrap(),
        "http://127.0.0.1:9/".parse().unwrap(),
    )
}

#[test]
fn test_simple_check_is_true() {
    assert!(simple_check());
}

#[test]
fn test_welcome_page_contract_holds() {
    let s = snapshot(
        200,
        Some("text/html; charset=utf-8"),
        &format!("<html><body>{GREETING}</body></html>"),
    );
    assert_eq!(check_welcome_page(&s), Ok(()));
}

#[test]
fn test_welcome_page_wrong_status() {
    let s = snapshot(500, Some("text/html"), GREETING);
    let err = check_welcome_page(&s).unwrap_err();
    assert_eq!(err.message(), "expected 200, got 500");
}

#[test]
fn test_welcome_page_wrong_content_type() {
    let s = snapshot(200, Some("application/json"), GREETING);
    let err = check_welcome_page(&s).unwrap_err();
    assert_eq!(err.message(), r#"expected "application/json" to match /html/"#);
}

#[test]
fn test_welcome_page_missing_content_type() {
    let s = snapshot(200, None, GREETING);
    let err = check_welcome_page(&s).unwrap_err();
    assert_eq!(err.actual(), "<missing>");
}

#[test]
fn test_welcome_page_greeting_is_case_sensitive() {
    let s = snapshot(200, Some("text/html"), "<h1>welcome to my ci/cd demo</h1>");
    let err = check_welcome_page(&s).unwrap_err();
    assert_eq!(err.expected(), GREETING);
}

fn passing_case(_: &Context) -> CaseFuture<'_> {
    Box::pin(async { Ok(()) })
}

fn failing_case(_: &Context) -> CaseFuture<'_> {
    Box::pin(async {
        Err(CaseError::from(AssertionError::new(
            "expected true, got false",
            "true",
            "false",
        )))
    })
}

#[actix_web::test]
async fn test_failing_case_does_not_stop_siblings() {
    let suite = Suite::default()
        .group(
            TestGroup::new("first")
                .case(TestCase::new("fails", failing_case))
                .case(TestCase::new("passes", passing_case)),
        )
        .group(TestGroup::new("second").case(TestCase::new("passes too", passing_case)));

    let report = suite.run(&offline_context()).await;

    assert_eq!(report.cases.len(), 3);
    assert_eq!(
        report.cases[0].outcome,
        Outcome::Failed("expected true, got false".to_string())
    );
    assert_eq!(report.cases[1].outcome, Outcome::Passed);
    assert_eq!(report.cases[2].group, "second");
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());
}

#[actix_web::test]
async fn test_empty_suite_succeeds() {
    let report = Suite::default().run(&offline_context()).await;
    assert!(report.cases.is_empty());
    assert!(report.is_success());
}

fn sample_report() -> SuiteReport {
    SuiteReport {
        cases: vec![
            CaseReport {
                group: "Unit Tests".to_string(),
                case: "should return true for a simple check".to_string(),
                outcome: Outcome::Passed,
            },
            CaseReport {
                group: "Integration Tests - Express App".to_string(),
                case: "should return 200 and correct response body for GET /".to_string(),
                outcome: Outcome::Failed("expected 200, got 404".to_string()),
            },
        ],
    }
}

#[test]
fn test_report_display() {
    assert_eq!(
        sample_report().to_string(),
        "Unit Tests\n  ✓ should return true for a simple check\n\
         Integration Tests - Express App\n  ✗ should return 200 and correct response body for GET /\n      expected 200, got 404\n\
         \n1 passing, 1 failing"
    );
}

#[test]
fn test_report_json() {
    let value = serde_json::to_value(sample_report()).unwrap();
    assert_eq!(value["cases"][0]["outcome"]["status"], "passed");
    assert_eq!(value["cases"][1]["outcome"]["status"], "failed");
    assert_eq!(
        value["cases"][1]["outcome"]["message"],
        "expected 200, got 404"
    );
    assert_eq!(value["cases"][1]["group"], "Integration Tests - Express App");
}

#[test]
fn test_failing_report_is_a_smoke_failure() {
    match sample_report().into_result() {
        Err(AppError::SmokeFailed { failed, total }) => {
            assert_eq!(failed, 1);
            assert_eq!(total, 2);
        }
        other => panic!("expected SmokeFailed, got {other:?}"),
    }
}

#[test]
fn test_passing_report_is_ok() {
    let mut report = sample_report();
    report.cases[1].outcome = Outcome::Passed;

    let report = report.into_result().expect("all cases passed");
    assert_eq!(report.passed(), 2);
}

#[test]
fn test_report_render() {
    let report = sample_report();
    assert_eq!(report.render(false).unwrap(), report.to_string());

    let json: serde_json::Value = serde_json::from_str(&report.render(true).unwrap()).unwrap();
    assert_eq!(json["cases"][0]["outcome"]["status"], "passed");
}

#[actix_web::test]
async fn test_smoke_passes_against_own_server() {
    let mut out = Vec::new();
    let report = smoke(&Cofg::default(), &SmokeArgs::default(), &mut out)
        .await
        .expect("smoke run should pass");

    assert!(report.is_success());
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("2 passing, 0 failing"), "output:\n{out}");
}

#[actix_web::test]
async fn test_smoke_fails_against_closed_port_and_writes_json() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let mut c = Cofg::default();
    c.probe.timeout_ms = 1000;
    let args = SmokeArgs {
        target: Some(format!("http://{addr}/")),
        json: true,
        ..Default::default()
    };

    let mut out = Vec::new();
    let result = smoke(&c, &args, &mut out).await;

    assert!(
        matches!(result, Err(AppError::SmokeFailed { failed: 1, total: 2 })),
        "unexpected result: {result:?}"
    );
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["cases"][1]["outcome"]["status"], "failed");
}

#[actix_web::test]
async fn test_smoke_rejects_invalid_target() {
    let args = SmokeArgs {
        target: Some("ftp://127.0.0.1/".to_string()),
        ..Default::default()
    };
    let mut out = Vec::new();

    let result = smoke(&Cofg::default(), &args, &mut out).await;

    assert!(matches!(result, Err(AppError::Transport(_))));
    assert!(out.is_empty(), "nothing is reported when setup fails");
}

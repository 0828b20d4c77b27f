//! Smoke-test harness
//!
//! Two groups run against one server:
//! - `Unit Tests`: `simple_check()` must be exactly `true`.
//! - `Integration Tests - Express App`: `GET /` must answer 200, an HTML content type and a body
//!   containing [`GREETING`].
//!
//! Setup happens once in [`Harness::bootstrap`] (probe client built, server acquired) before any
//! case runs. Cases run sequentially and independently; one failing case never stops the
//! next. A server started by the harness is held in a [`TestServer`] guard and stopped after the
//! last case, or on drop if the run unwinds.

use std::{ fmt, future::Future, io::Write, net::SocketAddr, pin::Pin, sync::LazyLock };

use actix_web::dev::ServerHandle;
use log::{ info, warn };
use regex::Regex;
use reqwest::Method;
use serde::Serialize;

use crate::{
    assertion::expect,
    cofg::{ Cofg, cli::SmokeArgs },
    error::{ AppError, AppResult, AssertionError, CaseError, TransportError },
    probe::{ ProbeTarget, Prober, ResponseSnapshot },
    request::GREETING,
    server,
};

static HTML_CONTENT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("html").expect("Invalid content type regex"));

pub fn simple_check() -> bool {
    true
}

/// Contract of the welcome page, checked against one captured response.
pub fn check_welcome_page(snapshot: &ResponseSnapshot) -> Result<(), AssertionError> {
    expect(snapshot.status()).to_equal(200)?;
    let Some(content_type) = snapshot.content_type() else {
        return Err(AssertionError::new(
            "expected a content-type header, got none",
            format!("/{}/", *HTML_CONTENT_TYPE),
            "<missing>",
        ));
    };
    expect(content_type).to_match(&HTML_CONTENT_TYPE)?;
    expect(snapshot.body()).to_include(GREETING)
}

/// What every case body gets: the shared probe client and the server under test.
#[derive(Debug, Clone)]
pub struct Context {
    prober: Prober,
    target: ProbeTarget,
}

impl Context {
    pub fn new(prober: Prober, target: ProbeTarget) -> Self {
        Self { prober, target }
    }

    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }
}

pub type CaseFuture<'a> = Pin<Box<dyn Future<Output = Result<(), CaseError>> + 'a>>;
pub type CaseFn = for<'a> fn(&'a Context) -> CaseFuture<'a>;

pub struct TestCase {
    name: &'static str,
    body: CaseFn,
}

impl TestCase {
    pub fn new(name: &'static str, body: CaseFn) -> Self {
        Self { name, body }
    }
}

pub struct TestGroup {
    name: &'static str,
    cases: Vec<TestCase>,
}

impl TestGroup {
    pub fn new(name: &'static str) -> Self {
        Self { name, cases: vec![] }
    }

    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }
}

#[derive(Default)]
pub struct Suite {
    groups: Vec<TestGroup>,
}

fn simple_check_case(_: &Context) -> CaseFuture<'_> {
    Box::pin(async { expect(simple_check()).to_be_true().map_err(CaseError::from) })
}

fn get_index_case(ctx: &Context) -> CaseFuture<'_> {
    Box::pin(async move {
        let snapshot = ctx.prober.probe(&ctx.target, Method::GET, "/").await?;
        check_welcome_page(&snapshot)?;
        Ok(())
    })
}

impl Suite {
    pub fn group(mut self, group: TestGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// The welcome page smoke suite.
    pub fn welcome() -> Self {
        Self::default()
            .group(
                TestGroup::new("Unit Tests").case(TestCase::new(
                    "should return true for a simple check",
                    simple_check_case,
                )),
            )
            .group(
                TestGroup::new("Integration Tests - Express App").case(TestCase::new(
                    "should return 200 and correct response body for GET /",
                    get_index_case,
                )),
            )
    }

    pub async fn run(&self, ctx: &Context) -> SuiteReport {
        let mut cases = vec![];
        for group in &self.groups {
            for case in &group.cases {
                let outcome = match (case.body)(ctx).await {
                    Ok(()) => {
                        info!("✓ {} › {}", group.name, case.name);
                        Outcome::Passed
                    }
                    Err(err) => {
                        warn!("✗ {} › {}: {err}", group.name, case.name);
                        Outcome::Failed(err.to_string())
                    }
                };
                cases.push(CaseReport {
                    group: group.name.to_string(),
                    case: case.name.to_string(),
                    outcome,
                });
            }
        }
        SuiteReport { cases }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub group: String,
    pub case: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.outcome == Outcome::Passed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Text listing, or pretty JSON when `json` is set.
    pub fn render(&self, json: bool) -> AppResult<String> {
        if json {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(self.to_string())
        }
    }

    /// `Err(SmokeFailed)` when any case failed; the binary turns that into a non-zero exit.
    pub fn into_result(self) -> AppResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AppError::SmokeFailed {
                failed: self.failed(),
                total: self.cases.len(),
            })
        }
    }
}

impl fmt::Display for SuiteReport {
    /// Group headers, one line per case, failure messages indented, totals last.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current_group: Option<&str> = None;
        for c in &self.cases {
            if current_group != Some(c.group.as_str()) {
                writeln!(f, "{}", c.group)?;
                current_group = Some(c.group.as_str());
            }
            match &c.outcome {
                Outcome::Passed => writeln!(f, "  ✓ {}", c.case)?,
                Outcome::Failed(message) => {
                    writeln!(f, "  ✗ {}", c.case)?;
                    writeln!(f, "      {message}")?;
                }
            }
        }
        write!(f, "\n{} passing, {} failing", self.passed(), self.failed())
    }
}

/// Welcome server owned by the harness. Stops the server when dropped.
pub struct TestServer {
    addr: SocketAddr,
    handle: Option<ServerHandle>,
}

impl TestServer {
    /// Bind `c.addrs` (port 0 picks a free port) with one worker and start serving on the
    /// current actix runtime.
    pub fn start(c: &Cofg) -> AppResult<Self> {
        let mut c = c.clone();
        c.workers = Some(1);
        let (server, addrs) = server::http_server(&c)?;
        let addr = addrs.first().copied().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("{} did not resolve to a listening address", c.addrs),
            )
        })?;
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Ok(Self { addr, handle: Some(handle) })
    }

    /// [`TestServer::start`] on the configured IP and a free port.
    pub fn start_ephemeral(c: &Cofg) -> AppResult<Self> {
        let mut c = c.clone();
        c.addrs.port = 0;
        Self::start(&c)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn target(&self) -> Result<ProbeTarget, TransportError> {
        ProbeTarget::from_addr(self.addr)
    }

    /// Stop accepting and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop(true).await;
            info!("test server on {} stopped", self.addr);
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // the stop command is queued when `stop` is called; the future only awaits completion
            drop(handle.stop(false));
        }
    }
}

/// Setup phase plus the scoped server, if the harness started one.
pub struct Harness {
    ctx: Context,
    server: Option<TestServer>,
}

impl Harness {
    /// Build the probe client and resolve the target. With no `target` a [`TestServer`] is
    /// started on a free port and released when the run ends.
    pub async fn bootstrap(c: &Cofg, target: Option<ProbeTarget>) -> AppResult<Self> {
        let prober = Prober::new(c.probe_timeout())?;
        let (target, server) = match target {
            Some(target) => (target, None),
            None => {
                let server = TestServer::start_ephemeral(c)?;
                (server.target()?, Some(server))
            }
        };
        info!("smoke target: {target} (timeout {:?})", prober.timeout());
        Ok(Self {
            ctx: Context::new(prober, target),
            server,
        })
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub async fn run(self, suite: &Suite) -> SuiteReport {
        let Self { ctx, server } = self;
        let report = suite.run(&ctx).await;
        if let Some(server) = server {
            server.shutdown().await;
        }
        report
    }
}

/// The `smoke` subcommand: run [`Suite::welcome`] against `args.target` (or a server of our
/// own), write the report to `out`, and fail when any case failed.
pub async fn smoke(c: &Cofg, args: &SmokeArgs, out: &mut impl Write) -> AppResult<SuiteReport> {
    let target = args
        .target
        .as_deref()
        .map(str::parse::<ProbeTarget>)
        .transpose()?;
    let harness = Harness::bootstrap(c, target).await?;
    let report = harness.run(&Suite::welcome()).await;

    writeln!(out, "{}", report.render(args.json)?)?;
    report.into_result()
}

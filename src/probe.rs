//! HTTP probe
//!
//! A [`Probe`] issues exactly one request against a live server and captures the complete
//! response as an immutable [`ResponseSnapshot`]. The caller is suspended (async) until the
//! body has fully arrived, the connection fails, or the [`Prober`] timeout elapses; partial
//! responses are never handed out.
//!
//! State of one probe: `Idle -> Sent -> (Received | Failed)`.

use std::{
    collections::BTreeMap,
    fmt,
    net::{ IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr },
    str::FromStr,
    time::Duration,
};

use log::{ debug, trace };
use reqwest::{ Method, Url, header::HeaderMap };
use serde::Serialize;

use crate::error::TransportError;

/// Immutable capture of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseSnapshot {
    status: u16,
    /// lowercased header name -> value; repeated headers joined with `, `
    headers: BTreeMap<String, String>,
    body: String,
}

impl ResponseSnapshot {
    pub fn new<I, K, V>(status: u16, headers: I, body: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            let name = name.as_ref().to_ascii_lowercase();
            let value = value.as_ref();
            map.entry(name)
                .and_modify(|v| {
                    v.push_str(", ");
                    v.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        Self {
            status,
            headers: map,
            body: body.into(),
        }
    }

    fn capture(status: u16, headers: &HeaderMap, body: &[u8]) -> Self {
        Self::new(
            status,
            headers
                .iter()
                .map(|(k, v)| (k.as_str(), String::from_utf8_lossy(v.as_bytes()))),
            String::from_utf8_lossy(body),
        )
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Base URL of a listening server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    base: Url,
}

impl ProbeTarget {
    /// Target for a bound address. A wildcard bind (`0.0.0.0`, `::`) is reached via loopback.
    pub fn from_addr(addr: SocketAddr) -> Result<Self, TransportError> {
        let ip = match addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        format!("http://{}/", SocketAddr::new(ip, addr.port())).parse()
    }

    /// Resolve `path` under the base path, so `http://host/app/` + `/` is `http://host/app/`.
    pub fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidTarget {
                target: format!("{}{path}", self.base),
                reason: e.to_string(),
            })
    }
}

impl FromStr for ProbeTarget {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| TransportError::InvalidTarget {
            target: s.to_string(),
            reason,
        };
        let mut base = Url::parse(s).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", base.scheme())));
        }
        if base.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        // base path must end in `/` or `join` replaces its last segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Sent,
    Received,
    Failed,
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Sent => "sent",
            Self::Received => "received",
            Self::Failed => "failed",
        })
    }
}

/// Shared HTTP client with a hard per-request timeout. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
    timeout: Duration,
}

impl Prober {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            // probes target a known host; ignore HTTP(S)_PROXY from the environment
            .no_proxy()
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One-shot shorthand for `Probe::new(method, path).send(self, target)`.
    pub async fn probe(
        &self,
        target: &ProbeTarget,
        method: Method,
        path: &str,
    ) -> Result<ResponseSnapshot, TransportError> {
        Probe::new(method, path).send(self, target).await
    }

    async fn fetch(&self, method: Method, url: Url) -> Result<ResponseSnapshot, TransportError> {
        let url_str = url.to_string();
        let classify = |e| TransportError::from_reqwest(&url_str, self.timeout, e);

        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?;
        debug!("{url_str}: {status}, {} byte(s)", body.len());
        Ok(ResponseSnapshot::capture(status, &headers, &body))
    }
}

/// A single request. Once it has been sent it cannot be sent again.
#[derive(Debug)]
pub struct Probe {
    method: Method,
    path: String,
    state: ProbeState,
}

impl Probe {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            state: ProbeState::Idle,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub async fn send(
        &mut self,
        prober: &Prober,
        target: &ProbeTarget,
    ) -> Result<ResponseSnapshot, TransportError> {
        if self.state != ProbeState::Idle {
            return Err(TransportError::Spent(self.state));
        }
        let url = match target.url_for(&self.path) {
            Ok(url) => url,
            Err(e) => {
                self.transition(ProbeState::Failed);
                return Err(e);
            }
        };
        self.transition(ProbeState::Sent);
        let outcome = prober.fetch(self.method.clone(), url).await;
        self.transition(match outcome {
            Ok(_) => ProbeState::Received,
            Err(_) => ProbeState::Failed,
        });
        outcome
    }

    fn transition(&mut self, next: ProbeState) {
        trace!("{} {}: {} -> {next}", self.method, self.path, self.state);
        self.state = next;
    }
}

//! Raw reachability measurements, independent of the endpoint matrix.
//!
//! Three best-effort probes: ICMP round-trip via the system `ping` binary,
//! wall-clock timing of an HTTP HEAD against `<base>/models`, and a raw TCP
//! connect to port 443. None of them can fail the diagnosis; absent values
//! render as "unavailable".

use crate::diag::target::ProbeTarget;
use crate::diag::transport::BROWSER_USER_AGENT;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::{TcpStream, ToSocketAddrs};
use std::process::Command;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Ping attempts per measurement.
const PING_ATTEMPTS: usize = 1;

/// HEAD attempts per measurement.
const HEAD_ATTEMPTS: usize = 1;

/// Reply deadline handed to the ping binary.
const PING_REPLY_TIMEOUT_MS: u64 = 1000;

/// Timeout for the HEAD request and the TCP connect.
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(3);

/// Merged reachability figures for the report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyReport {
    /// Average ICMP round-trip in milliseconds.
    pub ping_avg_ms: Option<f64>,
    /// Ping loss percentage over the attempt count.
    pub ping_loss_pct: f64,
    /// Average HTTP HEAD wall-clock time in milliseconds.
    pub http_head_ms: Option<f64>,
    /// Whether a raw TCP connect to port 443 succeeded.
    pub tcp_ok: Option<bool>,
    /// Elapsed time of the successful TCP connect in milliseconds.
    pub tcp_ms: Option<f64>,
}

impl LatencyReport {
    /// A report with every measurement absent (used when latency probing is
    /// not run at all, e.g. in offline assembly tests).
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            ping_avg_ms: None,
            ping_loss_pct: 100.0,
            http_head_ms: None,
            tcp_ok: None,
            tcp_ms: None,
        }
    }
}

/// Run all three measurements against the target.
#[must_use]
pub fn measure(target: &ProbeTarget) -> LatencyReport {
    let (ping_avg_ms, ping_loss_pct) = ping_average(target.host(), PING_ATTEMPTS);
    let http_head_ms = http_head_average(
        &format!("{}/models", target.base_url()),
        target.api_key(),
        HEAD_ATTEMPTS,
    );
    let (tcp_ok, tcp_ms) = tcp_connect_443(target.host());
    debug!(
        ?ping_avg_ms,
        ?http_head_ms,
        ?tcp_ok,
        host = target.host(),
        "latency measurements done"
    );
    LatencyReport {
        ping_avg_ms,
        ping_loss_pct,
        http_head_ms,
        tcp_ok,
        tcp_ms,
    }
}

/// Whether the host is a bare IP literal (v4 or v6).
#[must_use]
pub fn is_ip_literal(host: &str) -> bool {
    host.parse::<std::net::IpAddr>().is_ok()
}

fn ping_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Accepts both `time=12 ms` and the localized `时间=12ms` form.
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:time|时间)[=<]?\s*(\d+)\s*ms").expect("ping regex compiles")
    })
}

/// Parse a round-trip time in whole milliseconds out of ping output.
#[must_use]
pub fn parse_ping_time(output: &str) -> Option<u64> {
    ping_time_regex()
        .captures(output)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

fn ping_once(host: &str) -> Option<u64> {
    // The binary enforces its own reply deadline, so no process timer.
    #[cfg(target_os = "windows")]
    let output = Command::new("ping")
        .args(["-n", "1", "-w"])
        .arg(PING_REPLY_TIMEOUT_MS.to_string())
        .arg(host)
        .output();
    #[cfg(not(target_os = "windows"))]
    let output = Command::new("ping")
        .args(["-c", "1", "-W"])
        .arg((PING_REPLY_TIMEOUT_MS / 1000).max(1).to_string())
        .arg(host)
        .output();

    let output = output.ok()?;
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    parse_ping_time(&text)
}

/// Average round-trip over `attempts` pings, plus the loss percentage.
#[must_use]
pub fn ping_average(host: &str, attempts: usize) -> (Option<f64>, f64) {
    if attempts == 0 {
        return (None, 100.0);
    }
    let mut times = Vec::new();
    let mut failures = 0usize;
    for _ in 0..attempts {
        match ping_once(host) {
            Some(ms) => times.push(ms),
            None => failures += 1,
        }
    }
    let loss_pct = failures as f64 / attempts as f64 * 100.0;
    if times.is_empty() {
        (None, loss_pct)
    } else {
        let avg = times.iter().sum::<u64>() as f64 / times.len() as f64;
        (Some(avg), loss_pct)
    }
}

fn head_client(accept_invalid_certs: bool) -> Option<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(REACHABILITY_TIMEOUT)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .ok()
}

fn head_once(client: &reqwest::blocking::Client, url: &str, api_key: &str) -> reqwest::Result<()> {
    let mut req = client
        .head(url)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT);
    if !api_key.is_empty() {
        req = req.header(reqwest::header::AUTHORIZATION, format!("Bearer {api_key}"));
    }
    req.send().map(drop)
}

/// Average wall-clock time of an HTTP HEAD to `url`.
///
/// Certificate verification is disabled up front when the host is a bare IP
/// literal (such hosts rarely present valid certificates). For named hosts
/// a TLS failure triggers one unverified retry; any other failure, or a
/// failed retry, yields `None`.
#[must_use]
pub fn http_head_average(url: &str, api_key: &str, attempts: usize) -> Option<f64> {
    let host = Url::parse(url).ok()?.host_str().unwrap_or_default().to_owned();
    let verify = !is_ip_literal(&host);
    let client = head_client(!verify)?;

    let mut times = Vec::new();
    for _ in 0..attempts {
        let start = Instant::now();
        match head_once(&client, url, api_key) {
            Ok(()) => {}
            Err(e) if verify && is_tls_error(&e) => {
                let fallback = head_client(true)?;
                head_once(&fallback, url, api_key).ok()?;
            }
            Err(_) => return None,
        }
        times.push(start.elapsed().as_secs_f64() * 1000.0);
    }
    if times.is_empty() {
        None
    } else {
        Some(times.iter().sum::<f64>() / times.len() as f64)
    }
}

fn is_tls_error(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        let text = e.to_string().to_lowercase();
        if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
            return true;
        }
        source = e.source();
    }
    false
}

/// Raw TCP connect to port 443, with elapsed time on success.
#[must_use]
pub fn tcp_connect_443(host: &str) -> (Option<bool>, Option<f64>) {
    let start = Instant::now();
    let addrs = match (host, 443u16).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(_) => return (Some(false), None),
    };
    for addr in addrs {
        if let Ok(stream) = TcpStream::connect_timeout(&addr, REACHABILITY_TIMEOUT) {
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            drop(stream);
            return (Some(true), Some(elapsed_ms));
        }
    }
    (Some(false), None)
}

//! API base URL resolution
//!
//! Computed once when the pipeline is built. An explicit override always
//! wins; a development origin (localhost, loopback, private IPv4) talks to
//! the backend port on the same host; anything else is same-origin.

use std::net::{IpAddr, Ipv4Addr};

use tracing::{debug, warn};
use url::{Host, Url};

/// Resolve the base URL every relative API path is joined to.
///
/// Returns an empty string only when `origin` is unparseable and no
/// override is given, in which case relative paths stay relative.
pub fn resolve_api_base(override_url: Option<&str>, origin: &str, backend_port: u16) -> String {
    if let Some(explicit) = override_url.map(str::trim).filter(|s| !s.is_empty()) {
        debug!(base = explicit, "Using explicit API base");
        return explicit.trim_end_matches('/').to_string();
    }

    let Ok(url) = Url::parse(origin) else {
        warn!(origin, "Origin is not a valid URL, API paths stay relative");
        return String::new();
    };
    let Some(host) = url.host() else {
        warn!(origin, "Origin has no host, API paths stay relative");
        return String::new();
    };

    let base = if is_development_host(&host) {
        format!("{}://{}:{}", url.scheme(), host, backend_port)
    } else {
        url.origin().ascii_serialization()
    };
    debug!(%base, "Resolved API base from origin");
    base
}

fn is_development_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => name.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(addr) => is_private_or_loopback(*addr),
        Host::Ipv6(addr) => IpAddr::V6(*addr).is_loopback(),
    }
}

/// Loopback plus the RFC 1918 ranges `10/8`, `172.16/12`, `192.168/16`.
fn is_private_or_loopback(addr: Ipv4Addr) -> bool {
    addr.is_loopback() || addr.is_private()
}

/// Join `path` to `base` unless it is already absolute.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{base}{path}")
    }
}

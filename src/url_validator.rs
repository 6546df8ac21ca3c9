//! URL validation for document fetches (SSRF prevention).
//!
//! A document URL must:
//! - use HTTPS
//! - point at a configured domain (or one of its subdomains)
//! - resolve only to public addresses
//!
//! Redirect targets get the same scheme and allowlist checks on every hop.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use url::Url;

/// Redirect hops followed before a fetch is abandoned.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Only HTTPS URLs are allowed")]
    NotHttps,
    #[error("Domain not in allowlist: {0}")]
    DomainNotAllowed(String),
    #[error("Internal IP addresses are not allowed: {0}")]
    InternalIpAddress(String),
    #[error("DNS resolution failed: {0}")]
    DnsResolutionFailed(String),
    #[error("Too many redirects ({0})")]
    TooManyRedirects(usize),
}

/// Check if an IPv4 address is internal/private
fn is_internal_ipv4(ip: &Ipv4Addr) -> bool {
    let o = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_unspecified()
        // Shared address space (100.64.0.0/10)
        || (o[0] == 100 && (o[1] & 0xC0) == 64)
        // IETF protocol assignments (192.0.0.0/24)
        || (o[0] == 192 && o[1] == 0 && o[2] == 0)
        // Benchmarking (198.18.0.0/15)
        || (o[0] == 198 && (o[1] == 18 || o[1] == 19))
}

/// Check if an IPv6 address is internal/private
fn is_internal_ipv6(ip: &Ipv6Addr) -> bool {
    let s = ip.segments();
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.to_ipv4_mapped().map(|v4| is_internal_ipv4(&v4)).unwrap_or(false)
        // Unique local (fc00::/7)
        || (s[0] & 0xFE00) == 0xFC00
        // Link-local (fe80::/10)
        || (s[0] & 0xFFC0) == 0xFE80
        // Documentation (2001:db8::/32)
        || (s[0] == 0x2001 && s[1] == 0x0DB8)
}

fn is_internal_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_internal_ipv4(v4),
        IpAddr::V6(v6) => is_internal_ipv6(v6),
    }
}

fn is_domain_allowed(host: &str, allowed_domains: &[String]) -> bool {
    let host = host.to_lowercase();
    allowed_domains
        .iter()
        .any(|allowed| host == *allowed || host.ends_with(&format!(".{}", allowed)))
}

/// Parse `url_str` and check scheme and host against `allowed_domains`.
/// Does not touch the network; see [`ensure_public_host`].
pub fn validate_url(url_str: &str, allowed_domains: &[String]) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlValidationError::InvalidUrl(e.to_string()))?;

    if url.scheme() != "https" {
        return Err(UrlValidationError::NotHttps);
    }

    let host = url
        .host_str()
        .ok_or_else(|| UrlValidationError::InvalidUrl("No host in URL".to_string()))?;

    if !is_domain_allowed(host, allowed_domains) {
        return Err(UrlValidationError::DomainNotAllowed(host.to_string()));
    }

    Ok(url)
}

/// Check a redirect target before following it. `hops` is the number of
/// URLs already visited in this fetch.
pub fn validate_redirect(
    next: &Url,
    hops: usize,
    allowed_domains: &[String],
) -> Result<(), UrlValidationError> {
    if hops >= MAX_REDIRECTS {
        return Err(UrlValidationError::TooManyRedirects(hops));
    }
    validate_url(next.as_str(), allowed_domains).map(|_| ())
}

/// Resolve the URL's host and reject it if any address is internal
/// (DNS rebinding protection).
pub async fn ensure_public_host(url: &Url) -> Result<(), UrlValidationError> {
    let host = url
        .host_str()
        .ok_or_else(|| UrlValidationError::InvalidUrl("No host in URL".to_string()))?;
    let port = url.port_or_known_default().unwrap_or(443);

    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| UrlValidationError::DnsResolutionFailed(e.to_string()))?;

    for addr in addrs {
        if is_internal_ip(&addr.ip()) {
            return Err(UrlValidationError::InternalIpAddress(addr.ip().to_string()));
        }
    }
    Ok(())
}

//! Recognition of the vote service's server addresses
//!
//! The host reports the current connection as a free-form address string:
//! `host`, `host:port`, `[ipv6]`, `[ipv6]:port`, or a bare IPv6 literal.
//! Matching is on the host part only, so the port never changes the outcome.

/// Default domain of the vote service
pub const DEFAULT_SERVICE_DOMAIN: &str = "excalia.fr";

/// Decides whether a connection address belongs to the vote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMatcher {
    /// Root domains; subdomains match too
    domains: Vec<String>,
    /// Exact IP literals
    ips: Vec<String>,
}

impl ServiceMatcher {
    pub fn new<D, I>(domains: D, ips: I) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .filter_map(|d| normalize_host(d.as_ref()))
                .collect(),
            ips: ips
                .into_iter()
                .filter_map(|ip| normalize_host(ip.as_ref()))
                .collect(),
        }
    }

    /// Whether `address` points at the vote service.
    ///
    /// Returns `false` for blank or malformed input.
    pub fn is_match(&self, address: &str) -> bool {
        let Some(host) = extract_host(address) else {
            return false;
        };

        if self.ips.iter().any(|ip| *ip == host) {
            return true;
        }

        self.domains.iter().any(|domain| {
            host == *domain
                || (host.len() > domain.len()
                    && host.ends_with(domain.as_str())
                    && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
        })
    }

    /// Like [`is_match`](Self::is_match) for an optional address
    pub fn matches_current(&self, address: Option<&str>) -> bool {
        address.is_some_and(|a| self.is_match(a))
    }
}

impl Default for ServiceMatcher {
    fn default() -> Self {
        Self::new([DEFAULT_SERVICE_DOMAIN], std::iter::empty::<&str>())
    }
}

/// Extract the lowercased host part of a connection address.
pub fn extract_host(address: &str) -> Option<String> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }

    let host = if let Some(rest) = address.strip_prefix('[') {
        // Bracketed IPv6 literal, optionally followed by :port
        let end = rest.find(']')?;
        let tail = &rest[end + 1..];
        if !tail.is_empty() && !tail.starts_with(':') {
            return None;
        }
        &rest[..end]
    } else if address.matches(':').count() == 1 {
        address.split_once(':').map(|(host, _)| host)?
    } else {
        // No port, or an unbracketed IPv6 literal that must not be split
        address
    };

    normalize_host(host)
}

fn normalize_host(host: &str) -> Option<String> {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        None
    } else {
        Some(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> ServiceMatcher {
        ServiceMatcher::new(["excalia.fr"], ["51.68.12.34", "2001:db8::1"])
    }

    #[test]
    fn extract_host_variants() {
        assert_eq!(extract_host("play.excalia.fr").as_deref(), Some("play.excalia.fr"));
        assert_eq!(extract_host("Play.Excalia.FR:25565").as_deref(), Some("play.excalia.fr"));
        assert_eq!(extract_host("[2001:DB8::1]:25565").as_deref(), Some("2001:db8::1"));
        assert_eq!(extract_host("[2001:db8::1]").as_deref(), Some("2001:db8::1"));
        assert_eq!(extract_host("2001:db8::1").as_deref(), Some("2001:db8::1"));
        assert_eq!(extract_host("10.0.0.1:25565").as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn extract_host_rejects_malformed() {
        assert_eq!(extract_host(""), None);
        assert_eq!(extract_host("   "), None);
        assert_eq!(extract_host(":25565"), None);
        assert_eq!(extract_host("[2001:db8::1"), None);
        assert_eq!(extract_host("[2001:db8::1]x"), None);
        assert_eq!(extract_host("[]:25565"), None);
    }

    #[test]
    fn port_does_not_change_outcome() {
        let m = matcher();
        assert_eq!(m.is_match("play.excalia.fr:25565"), m.is_match("play.excalia.fr"));
        assert!(m.is_match("play.excalia.fr:25565"));
        assert_eq!(m.is_match("example.com:25565"), m.is_match("example.com"));
        assert!(!m.is_match("example.com:25565"));
    }

    #[test]
    fn domain_and_subdomains_match() {
        let m = matcher();
        assert!(m.is_match("excalia.fr"));
        assert!(m.is_match("play.excalia.fr"));
        assert!(m.is_match("eu.play.excalia.fr"));
        assert!(m.is_match("PLAY.EXCALIA.FR."));
    }

    #[test]
    fn lookalike_domains_do_not_match() {
        let m = matcher();
        assert!(!m.is_match("evilexcalia.fr"));
        assert!(!m.is_match("excalia.fr.evil.com"));
        assert!(!m.is_match("excalia.com"));
    }

    #[test]
    fn exact_ips_match() {
        let m = matcher();
        assert!(m.is_match("51.68.12.34"));
        assert!(m.is_match("51.68.12.34:25565"));
        assert!(!m.is_match("51.68.12.35"));
        assert!(m.is_match("[2001:db8::1]:25565"));
        assert!(m.is_match("2001:DB8::1"));
    }

    #[test]
    fn blank_and_missing_never_match() {
        let m = matcher();
        assert!(!m.is_match(""));
        assert!(!m.is_match("  "));
        assert!(!m.matches_current(None));
        assert!(m.matches_current(Some("play.excalia.fr")));
    }

    #[test]
    fn default_matcher_knows_service_domain() {
        assert!(ServiceMatcher::default().is_match("play.excalia.fr:25565"));
    }
}

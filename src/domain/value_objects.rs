//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use std::fmt;

/// Root of the WHOIS delegation tree.
pub const IANA_WHOIS_HOST: &str = "whois.iana.org";

/// Well-known WHOIS port (RFC 3912).
pub const WHOIS_PORT: u16 = 43;

/// A WHOIS server endpoint.
///
/// Registries publish delegation pointers in several shapes
/// (`whois.ripe.net`, `whois://whois.apnic.net`, `rwhois://rwhois.example.net:4321`).
/// `WhoisHost` strips the scheme and any trailing path, keeps an explicit
/// port when one is given, and falls back to port 43 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WhoisHost {
    name: String,
    port: u16,
}

impl WhoisHost {
    /// Parse a host, optionally carrying a URI scheme and a port.
    ///
    /// Returns `None` when nothing usable remains after stripping.
    ///
    /// # Examples
    /// ```
    /// use ipwhois::domain::value_objects::WhoisHost;
    ///
    /// let host = WhoisHost::parse("whois://sub.registry.net").unwrap();
    /// assert_eq!(host.name(), "sub.registry.net");
    /// assert_eq!(host.port(), 43);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let without_scheme = match raw.find("://") {
            Some(idx) => &raw[idx + 3..],
            None => raw,
        };
        let authority = without_scheme
            .split(|c: char| c == '/' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        let (name, port) = split_port(authority)?;
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_ascii_lowercase(),
            port,
        })
    }

    /// Host name without scheme or port, lower-cased.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Build the query line a registry expects for `ip`, without CRLF.
    ///
    /// Most registries take the bare address. ARIN needs the `+` flag or it
    /// answers with a summary that lacks the country line.
    pub fn query_line(&self, ip: &str) -> String {
        match self.name.as_str() {
            "whois.arin.net" => format!("+ {}", ip),
            _ => ip.to_string(),
        }
    }
}

/// Split `authority` into host and port.
///
/// A bare IPv6 literal has several colons and no brackets, so it is taken
/// whole. An unparsable port yields `None`.
fn split_port(authority: &str) -> Option<(&str, u16)> {
    if let Some(rest) = authority.strip_prefix('[') {
        let end = rest.find(']')?;
        let name = &rest[..end];
        return match rest[end + 1..].strip_prefix(':') {
            Some(port) => Some((name, port.parse().ok()?)),
            None => Some((name, WHOIS_PORT)),
        };
    }

    match authority.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') => Some((name, port.parse().ok()?)),
        _ => Some((authority, WHOIS_PORT)),
    }
}

impl fmt::Display for WhoisHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.port, self.name.contains(':')) {
            (WHOIS_PORT, _) => write!(f, "{}", self.name),
            (port, true) => write!(f, "[{}]:{}", self.name, port),
            (port, false) => write!(f, "{}:{}", self.name, port),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_host() {
        let host = WhoisHost::parse("whois.ripe.net").unwrap();
        assert_eq!(host.name(), "whois.ripe.net");
        assert_eq!(host.port(), WHOIS_PORT);
    }

    #[test]
    fn test_parse_strips_scheme_and_whitespace() {
        let host = WhoisHost::parse("  whois://sub.registry.net \n").unwrap();
        assert_eq!(host.name(), "sub.registry.net");

        let host = WhoisHost::parse("rwhois://RWhois.Example.NET:4321").unwrap();
        assert_eq!(host.name(), "rwhois.example.net");
        assert_eq!(host.port(), 4321);
    }

    #[test]
    fn test_parse_drops_trailing_path() {
        let host = WhoisHost::parse("whois://whois.apnic.net/").unwrap();
        assert_eq!(host.name(), "whois.apnic.net");
    }

    #[test]
    fn test_parse_ipv6_literals() {
        let host = WhoisHost::parse("[::1]:4343").unwrap();
        assert_eq!(host.name(), "::1");
        assert_eq!(host.port(), 4343);

        let host = WhoisHost::parse("2001:db8::1").unwrap();
        assert_eq!(host.name(), "2001:db8::1");
        assert_eq!(host.port(), WHOIS_PORT);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(WhoisHost::parse("").is_none());
        assert!(WhoisHost::parse("whois://").is_none());
        assert!(WhoisHost::parse("host:notaport").is_none());
    }

    #[test]
    fn test_query_line_arin_prefix() {
        let arin = WhoisHost::parse("whois.arin.net").unwrap();
        assert_eq!(arin.query_line("8.8.8.8"), "+ 8.8.8.8");

        let ripe = WhoisHost::parse("whois.ripe.net").unwrap();
        assert_eq!(ripe.query_line("193.0.6.139"), "193.0.6.139");
    }

    #[test]
    fn test_display() {
        assert_eq!(WhoisHost::parse("whois.iana.org").unwrap().to_string(), "whois.iana.org");
        assert_eq!(WhoisHost::parse("127.0.0.1:4343").unwrap().to_string(), "127.0.0.1:4343");
        assert_eq!(WhoisHost::parse("[::1]:4343").unwrap().to_string(), "[::1]:4343");
    }
}

//! WHOIS Response Parser
//!
//! Pure domain logic for reading delegation pointers and country lines
//! out of free-form registry output. No I/O happens here.

use crate::domain::value_objects::WhoisHost;

/// Marker of an explicit referral (ARIN style `ReferralServer:`).
pub const REFERRAL_MARKER: &str = "referralserver:";
/// Marker of a generic redirect (IANA style `whois:`).
pub const REDIRECT_MARKER: &str = "whois:";
/// Marker of the country line.
pub const COUNTRY_MARKER: &str = "country:";

/// What a registry response tells the resolver to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Ask another registry, named by an explicit referral
    Referral(WhoisHost),
    /// Ask another registry, named by a generic redirect
    Redirect(WhoisHost),
    /// The answer: an upper-cased country code
    Country(String),
    /// Nothing usable in this response
    NotFound,
}

/// Line-oriented, case-insensitive scanner for registry responses.
///
/// Precedence is referral, then redirect, then country. Only the first line
/// carrying a given marker is considered.
pub struct ResponseParser;

impl ResponseParser {
    /// Decide the next step from a complete response body.
    pub fn parse(body: &str) -> Directive {
        if let Some(host) = Self::referral(body) {
            return Directive::Referral(host);
        }
        if let Some(host) = Self::redirect(body) {
            return Directive::Redirect(host);
        }
        match Self::country(body) {
            Some(country) => Directive::Country(country),
            None => Directive::NotFound,
        }
    }

    /// Host named by the first `referralserver:` line that names one.
    pub fn referral(body: &str) -> Option<WhoisHost> {
        Self::first_host(body, REFERRAL_MARKER)
    }

    /// Host named by the first `whois:` line that names one.
    ///
    /// The marker also matches inside `whois://` URLs, so lines whose value
    /// is not a usable host are skipped.
    pub fn redirect(body: &str) -> Option<WhoisHost> {
        Self::first_host(body, REDIRECT_MARKER)
    }

    /// Trimmed, upper-cased value of the first `country:` line.
    ///
    /// An empty value counts as no country at all.
    pub fn country(body: &str) -> Option<String> {
        let value = Self::first_value(body, COUNTRY_MARKER)?;
        if value.is_empty() {
            return None;
        }
        Some(value.to_ascii_uppercase())
    }

    /// Text following `marker` on the first line containing it, trimmed.
    ///
    /// `marker` must be lower-case. ASCII lower-casing keeps byte offsets
    /// intact, so the value is sliced from the original line.
    fn first_value<'a>(body: &'a str, marker: &str) -> Option<&'a str> {
        body.lines().find_map(|line| Self::value_after(line, marker))
    }

    fn first_host(body: &str, marker: &str) -> Option<WhoisHost> {
        body.lines()
            .find_map(|line| Self::value_after(line, marker).and_then(WhoisHost::parse))
    }

    fn value_after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
        line.to_ascii_lowercase()
            .find(marker)
            .map(|idx| line[idx + marker.len()..].trim())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const IANA_RESPONSE: &str = "\
% IANA WHOIS server
% for more information on IANA, visit http://www.iana.org

refer:        whois.arin.net

inetnum:      8.0.0.0 - 8.255.255.255
organisation: ARIN
status:       ALLOCATED

whois:        whois.arin.net

changed:      1992-12
source:       IANA
";

    const ARIN_RESPONSE: &str = "\
NetRange:       8.0.0.0 - 8.127.255.255
CIDR:           8.0.0.0/9
NetName:        LVLT-ORG-8-8
Organization:   Level 3 Parent, LLC (LPL-141)

OrgName:        Level 3 Parent, LLC
City:           Monroe
StateProv:      LA
Country:        US
";

    #[test]
    fn test_redirect_from_iana() {
        let directive = ResponseParser::parse(IANA_RESPONSE);
        let expected = WhoisHost::parse("whois.arin.net").unwrap();
        assert_eq!(directive, Directive::Redirect(expected));
    }

    #[test]
    fn test_country_is_case_insensitive_and_uppercased() {
        assert_eq!(
            ResponseParser::parse(ARIN_RESPONSE),
            Directive::Country("US".to_string())
        );
        assert_eq!(
            ResponseParser::parse("COUNTRY:   nl  \r\n"),
            Directive::Country("NL".to_string())
        );
    }

    #[test]
    fn test_referral_takes_priority_over_redirect() {
        let body = "\
whois: whois.example-registry.net
ReferralServer: whois://sub.registry.net
Country: US
";
        let expected = WhoisHost::parse("sub.registry.net").unwrap();
        assert_eq!(ResponseParser::parse(body), Directive::Referral(expected));
    }

    #[test]
    fn test_redirect_takes_priority_over_country() {
        let body = "country: ZZ\nwhois: whois.example-registry.net\n";
        let expected = WhoisHost::parse("whois.example-registry.net").unwrap();
        assert_eq!(ResponseParser::parse(body), Directive::Redirect(expected));
    }

    #[test]
    fn test_first_country_line_wins() {
        let body = "Country: BR\nCountry: AR\n";
        assert_eq!(ResponseParser::country(body), Some("BR".to_string()));
    }

    #[test]
    fn test_empty_country_is_not_found() {
        assert_eq!(ResponseParser::parse("country:    \n"), Directive::NotFound);
        assert_eq!(ResponseParser::parse(""), Directive::NotFound);
        assert_eq!(
            ResponseParser::parse("% no entries found\n"),
            Directive::NotFound
        );
    }

    #[test]
    fn test_unparsable_referral_falls_back_to_redirect() {
        let body = "ReferralServer:\nwhois: whois.lacnic.net\n";
        let expected = WhoisHost::parse("whois.lacnic.net").unwrap();
        assert_eq!(ResponseParser::parse(body), Directive::Redirect(expected));
    }

    #[test]
    fn test_empty_whois_url_does_not_hide_later_redirect() {
        let body = "ReferralServer: whois://\nwhois: whois.ripe.net\n";
        let expected = WhoisHost::parse("whois.ripe.net").unwrap();
        assert_eq!(ResponseParser::referral(body), None);
        assert_eq!(ResponseParser::parse(body), Directive::Redirect(expected));
    }

    #[test]
    fn test_rwhois_referral_keeps_port() {
        let body = "ReferralServer:  rwhois://rwhois.example.net:4321\n";
        match ResponseParser::parse(body) {
            Directive::Referral(host) => {
                assert_eq!(host.name(), "rwhois.example.net");
                assert_eq!(host.port(), 4321);
            }
            other => panic!("unexpected directive {:?}", other),
        }
    }
}

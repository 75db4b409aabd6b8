//! Hostname normalization and ancestor walks.

use std::borrow::Cow;

use url::Url;

/// Scheme prepended to bare input so the URL parser sees a host component
const NEUTRAL_SCHEME: &str = "https://";

/// Normalize arbitrary user input into a lowercase ASCII hostname.
///
/// Accepts bare hostnames, URLs, and host:port forms. Returns `None` when no
/// host can be extracted. Never fails on unencodable input: if IDNA encoding
/// is impossible the host is kept as-is.
///
/// ```
/// use gov_domain_registry::normalize_hostname;
///
/// assert_eq!(normalize_hostname(" HTTPS://Www.MF.gov.pl:443/podatki?x=1 ").as_deref(), Some("www.mf.gov.pl"));
/// assert_eq!(normalize_hostname("gov.pl.").as_deref(), Some("gov.pl"));
/// assert_eq!(normalize_hostname("   "), None);
/// ```
pub fn normalize_hostname(value: &str) -> Option<String> {
    let candidate = value.trim();
    if candidate.is_empty() {
        return None;
    }

    let with_scheme = if scheme_prefix(candidate).is_some() {
        Cow::Borrowed(candidate)
    } else {
        Cow::Owned(format!("{}{}", NEUTRAL_SCHEME, candidate))
    };

    let parsed = Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .filter(|host| !host.is_empty());

    let host = match parsed {
        Some(host) => host,
        None => strip_manually(candidate).to_string(),
    };

    let host = host.trim().trim_matches('.');
    if host.is_empty() {
        return None;
    }

    // Empty output means the encoder rejected the input
    let ascii = url::quirks::domain_to_ascii(host);
    let host = if ascii.is_empty() { host } else { ascii.as_str() };

    Some(host.to_lowercase())
}

/// Remainder after a leading `scheme://`, if the input starts with one.
///
/// A `://` inside a path or query does not count: the part before it must be
/// a valid scheme (ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )).
fn scheme_prefix(candidate: &str) -> Option<&str> {
    let (scheme, rest) = candidate.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(rest)
}

/// Fallback host extraction for input the URL parser rejects
fn strip_manually(candidate: &str) -> &str {
    let rest = scheme_prefix(candidate).unwrap_or(candidate);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    host_port.split(':').next().unwrap_or_default()
}

/// Whether `host` is `apex` itself or one of its subdomains
pub fn is_within(host: &str, apex: &str) -> bool {
    match host.strip_suffix(apex) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

/// Candidate ancestor domains, most specific first.
///
/// For `a.b.gov.pl` under apex `gov.pl` this yields `a.b.gov.pl`, `b.gov.pl`,
/// `gov.pl`. Candidates outside the apex are never yielded.
pub fn candidate_domains<'a>(host: &'a str, apex: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    std::iter::successors(Some(host), |&current: &&'a str| {
        current.split_once('.').map(|(_, parent)| parent)
    })
    .take_while(move |candidate| is_within(candidate, apex))
}

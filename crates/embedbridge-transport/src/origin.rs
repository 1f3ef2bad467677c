use std::fmt;

use url::Url;

/// Wire value for "no origin restriction".
pub const WILDCARD: &str = "*";

/// Origin an outbound message is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetOrigin {
    /// Deliver regardless of the host's origin.
    Wildcard,
    /// Deliver only if the host's origin is exactly this `scheme://host[:port]`.
    Exact(String),
}

impl TargetOrigin {
    /// Build an exact target from any URL, keeping only its origin.
    ///
    /// Returns `None` for unparseable URLs and opaque origins (`about:`, `data:`, ...).
    pub fn from_url(input: &str) -> Option<Self> {
        origin_of(input).map(Self::Exact)
    }

    /// String form passed to the host runtime.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wildcard => WILDCARD,
            Self::Exact(origin) => origin,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// Whether a host at `actual` origin may receive a message addressed to `self`.
    pub fn permits(&self, actual: &str) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Exact(origin) => origin == actual,
        }
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized origin (`scheme://host[:port]`) of a URL, or `None` if it has none.
pub fn origin_of(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let origin = Url::parse(input).ok()?.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(origin.ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_strips_path_query_and_default_port() {
        assert_eq!(
            origin_of("https://host.example:443/app/page?x=1#frag").as_deref(),
            Some("https://host.example")
        );
        assert_eq!(
            origin_of("http://localhost:8001/static/chat.html").as_deref(),
            Some("http://localhost:8001")
        );
    }

    #[test]
    fn opaque_and_invalid_inputs_have_no_origin() {
        assert_eq!(origin_of(""), None);
        assert_eq!(origin_of("   "), None);
        assert_eq!(origin_of("about:blank"), None);
        assert_eq!(origin_of("not a url"), None);
    }

    #[test]
    fn wildcard_permits_any_host() {
        assert!(TargetOrigin::Wildcard.permits("https://anything.example"));
        assert_eq!(TargetOrigin::Wildcard.as_str(), "*");
    }

    #[test]
    fn exact_target_requires_equal_origin() {
        let target = TargetOrigin::from_url("https://host.example/embed").unwrap();
        assert!(target.permits("https://host.example"));
        assert!(!target.permits("https://evil.example"));
        assert_eq!(target.to_string(), "https://host.example");
    }
}

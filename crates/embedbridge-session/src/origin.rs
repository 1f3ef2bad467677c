use embedbridge_transport::{origin_of, EmbeddingContext, TargetOrigin};
use tracing::{debug, warn};

use crate::config::SessionOptions;

/// Outcome of origin resolution. Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedOrigin {
    /// The page is top-level; there is no host to address.
    NoHost,
    /// Address the host at this origin (possibly `*`).
    Target(TargetOrigin),
    /// No trusted origin and the `*` fallback is disabled.
    Unresolved,
}

impl ResolvedOrigin {
    pub fn target(&self) -> Option<&TargetOrigin> {
        match self {
            Self::Target(target) => Some(target),
            Self::NoHost | Self::Unresolved => None,
        }
    }
}

/// Decide which origin outbound messages are addressed to.
///
/// Order: no host → configured `target_origin` → referrer origin → `*` (if
/// permitted). A candidate outside a non-empty allowlist is discarded, and a
/// non-empty allowlist never falls back to `*`.
pub fn resolve_origin(context: &dyn EmbeddingContext, options: &SessionOptions) -> ResolvedOrigin {
    if context.is_top_level() {
        warn!("page is not embedded; messages to the host are disabled");
        return ResolvedOrigin::NoHost;
    }

    let candidate = match options.target_origin.as_deref() {
        Some(configured) => {
            let origin = origin_of(configured);
            if origin.is_none() {
                warn!(configured, "configured target origin is not a valid origin");
            }
            origin
        }
        None => context.referrer().as_deref().and_then(origin_of),
    };

    if let Some(origin) = candidate {
        if is_allowed(&options.allowed_origins, &origin) {
            debug!(%origin, "resolved host origin");
            return ResolvedOrigin::Target(TargetOrigin::Exact(origin));
        }
        warn!(%origin, "host origin is not in the allowlist; ignoring it");
    }

    if !options.allowed_origins.is_empty() {
        warn!("no allowlisted host origin; messages to the host are disabled");
        return ResolvedOrigin::Unresolved;
    }

    if options.allow_wildcard {
        debug!("host origin unknown; addressing messages to any origin");
        ResolvedOrigin::Target(TargetOrigin::Wildcard)
    } else {
        warn!("host origin unknown and wildcard delivery disabled");
        ResolvedOrigin::Unresolved
    }
}

/// Whether `origin` passes `allowlist`. An empty allowlist passes everything.
pub fn is_allowed(allowlist: &[String], origin: &str) -> bool {
    allowlist.is_empty()
        || allowlist
            .iter()
            .any(|entry| origin_of(entry).as_deref().unwrap_or(entry.as_str()) == origin)
}

#[cfg(test)]
mod tests {
    use embedbridge_transport::MemoryHost;

    use super::*;

    const HOST: &str = "https://host.example";

    #[test]
    fn top_level_page_has_no_host() {
        let host = MemoryHost::top_level();
        assert_eq!(
            resolve_origin(&host, &SessionOptions::default()),
            ResolvedOrigin::NoHost
        );
    }

    #[test]
    fn referrer_origin_is_trusted() {
        let host = MemoryHost::new(HOST).with_referrer(Some("https://host.example/shop/cart?id=9"));
        assert_eq!(
            resolve_origin(&host, &SessionOptions::default()),
            ResolvedOrigin::Target(TargetOrigin::Exact(HOST.to_string()))
        );
    }

    #[test]
    fn missing_referrer_falls_back_to_wildcard() {
        let host = MemoryHost::new(HOST).with_referrer(None);
        assert_eq!(
            resolve_origin(&host, &SessionOptions::default()),
            ResolvedOrigin::Target(TargetOrigin::Wildcard)
        );
    }

    #[test]
    fn wildcard_opt_out_leaves_origin_unresolved() {
        let host = MemoryHost::new(HOST).with_referrer(None);
        let options = SessionOptions {
            allow_wildcard: false,
            ..SessionOptions::default()
        };
        assert_eq!(resolve_origin(&host, &options), ResolvedOrigin::Unresolved);
    }

    #[test]
    fn configured_origin_overrides_referrer() {
        let host = MemoryHost::new(HOST).with_referrer(Some("https://elsewhere.example/"));
        let options = SessionOptions {
            target_origin: Some("https://host.example/embed".to_string()),
            ..SessionOptions::default()
        };
        assert_eq!(
            resolve_origin(&host, &options),
            ResolvedOrigin::Target(TargetOrigin::Exact(HOST.to_string()))
        );
    }

    #[test]
    fn allowlist_discards_unlisted_referrer() {
        let host = MemoryHost::new(HOST).with_referrer(Some("https://evil.example/"));
        let options = SessionOptions {
            allowed_origins: vec![HOST.to_string()],
            allow_wildcard: false,
            ..SessionOptions::default()
        };
        assert_eq!(resolve_origin(&host, &options), ResolvedOrigin::Unresolved);
    }

    #[test]
    fn allowlist_never_widens_to_wildcard() {
        let options = SessionOptions {
            allowed_origins: vec!["https://shop.example".to_string()],
            ..SessionOptions::default()
        };
        assert!(options.allow_wildcard);

        let unlisted = MemoryHost::new("https://evil.example");
        assert_eq!(resolve_origin(&unlisted, &options), ResolvedOrigin::Unresolved);

        let no_referrer = MemoryHost::new("https://evil.example").with_referrer(None);
        assert_eq!(resolve_origin(&no_referrer, &options), ResolvedOrigin::Unresolved);

        let listed = MemoryHost::new("https://shop.example");
        assert_eq!(
            resolve_origin(&listed, &options),
            ResolvedOrigin::Target(TargetOrigin::Exact("https://shop.example".to_string()))
        );
    }

    #[test]
    fn allowlist_entries_are_compared_as_origins() {
        let allowlist = vec!["https://host.example/any/path".to_string()];
        assert!(is_allowed(&allowlist, HOST));
        assert!(!is_allowed(&allowlist, "https://other.example"));
        assert!(is_allowed(&[], "https://other.example"));
    }
}

use crate::minifier::Minifier;
use mime::Mime;

/// A table mapping media-type patterns to minifiers.
///
/// The registry is populated during setup, before any request is served, and
/// is wrapped in an `Arc` by [`crate::MinifyLayer`]. Lookups during request
/// handling are read-only and need no locking.
///
/// Patterns are parsed [`Mime`] values. A `*` type or subtype (`*/*`,
/// `text/*`) matches as a wildcard; anything else matches on the exact
/// media-type essence, ignoring parameters. When several entries match,
/// exact patterns beat wildcards, and within the same tier the most recently
/// registered entry wins.
#[derive(Debug, Default)]
pub struct MinifierRegistry {
    entries: Vec<(Mime, Minifier)>,
}

impl MinifierRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the standard set of minifiers:
    /// `text/html`, `application/json`, and `image/svg+xml`.
    pub fn standard() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "html")]
        registry.register(mime::TEXT_HTML, Minifier::Html);
        #[cfg(feature = "json")]
        registry.register(mime::APPLICATION_JSON, Minifier::Json);
        #[cfg(feature = "svg")]
        registry.register(mime::IMAGE_SVG, Minifier::Svg);
        registry
    }

    /// Adds an entry. Duplicate patterns are allowed; see the type-level
    /// documentation for the tie-break policy.
    pub fn register(&mut self, pattern: Mime, minifier: Minifier) {
        self.entries.push((pattern, minifier));
    }

    /// Resolves a raw `Content-Type` header value to a minifier.
    ///
    /// Returns the matched minifier together with the parsed media type,
    /// whose parameters (e.g. `charset`) are passed through to the minifier.
    /// Malformed content-type strings are treated as non-matching.
    pub fn lookup(&self, content_type: &str) -> Option<(Minifier, Mime)> {
        let media_type: Mime = content_type.trim().parse().ok()?;

        let exact = self.entries.iter().rev().find(|(pattern, _)| {
            !is_wildcard(pattern) && pattern.essence_str() == media_type.essence_str()
        });
        let matched = exact.or_else(|| {
            self.entries
                .iter()
                .rev()
                .find(|(pattern, _)| is_wildcard(pattern) && wildcard_matches(pattern, &media_type))
        });

        matched.map(|(_, minifier)| (*minifier, media_type))
    }

    /// Returns `true` if no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_wildcard(pattern: &Mime) -> bool {
    pattern.type_() == mime::STAR || pattern.subtype() == mime::STAR
}

fn wildcard_matches(pattern: &Mime, media_type: &Mime) -> bool {
    pattern.type_() == mime::STAR || pattern.type_() == media_type.type_()
}

use std::collections::{BTreeSet, HashMap};

/// Known feed vocabularies as `(namespace URI, canonical prefix)` pairs.
///
/// Several URIs may map to the same prefix: publishers routinely swap
/// `http`/`https`, add or drop a trailing slash, or still emit a
/// historical revision of a vocabulary.
pub const BUILTIN_NAMESPACES: &[(&str, &str)] = &[
    // Atom
    ("http://www.w3.org/2005/Atom", "atom"),
    ("https://www.w3.org/2005/Atom", "atom"),
    ("http://purl.org/atom/ns#", "atom"),
    ("http://www.w3.org/2007/app", "app"),
    // Dublin Core
    ("http://purl.org/dc/elements/1.1/", "dc"),
    ("https://purl.org/dc/elements/1.1/", "dc"),
    ("http://purl.org/dc/terms/", "dcterms"),
    ("https://purl.org/dc/terms/", "dcterms"),
    // RSS 1.0 modules
    ("http://purl.org/rss/1.0/modules/content/", "content"),
    ("http://purl.org/rss/1.0/modules/slash/", "slash"),
    ("http://purl.org/rss/1.0/modules/syndication/", "sy"),
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "rdf"),
    ("http://webns.net/mvcb/", "admin"),
    // Podcasting
    ("http://www.itunes.com/dtds/podcast-1.0.dtd", "itunes"),
    ("https://www.itunes.com/dtds/podcast-1.0.dtd", "itunes"),
    ("https://podcastindex.org/namespace/1.0", "podcast"),
    ("http://podcastindex.org/namespace/1.0", "podcast"),
    (
        "https://github.com/Podcastindex-org/podcast-namespace/blob/main/docs/1.0.md",
        "podcast",
    ),
    ("http://www.google.com/schemas/play-podcasts/1.0", "googleplay"),
    ("https://www.google.com/schemas/play-podcasts/1.0", "googleplay"),
    ("https://www.google.com/schemas/play-podcasts/1.0/", "googleplay"),
    ("http://podlove.org/simple-chapters", "psc"),
    ("http://www.rawvoice.com/rawvoiceRssModule/", "rawvoice"),
    ("http://www.spotify.com/ns/rss", "spotify"),
    ("https://www.spotify.com/ns/rss", "spotify"),
    ("https://feed.press/xmlns", "feedpress"),
    ("https://schema.acast.com/1.0/", "acast"),
    // Media
    ("http://search.yahoo.com/mrss/", "media"),
    ("https://search.yahoo.com/mrss/", "media"),
    ("http://www.youtube.com/xml/schemas/2015", "yt"),
    // Geography
    ("http://www.georss.org/georss", "georss"),
    ("http://www.georss.org/georss/", "georss"),
    ("http://www.w3.org/2003/01/geo/wgs84_pos#", "geo"),
    // Comments and linking
    ("http://purl.org/syndication/thread/1.0", "thr"),
    ("http://wellformedweb.org/CommentAPI/", "wfw"),
    ("http://madskills.com/public/xml/rss/module/pingback/", "pingback"),
    ("http://madskills.com/public/xml/rss/module/trackback/", "trackback"),
    ("http://backend.userland.com/blogChannelModule", "blogchannel"),
    ("http://source.scripting.com/", "source"),
    // Licensing
    (
        "http://backend.userland.com/creativeCommonsRssModule",
        "creativecommons",
    ),
    ("http://creativecommons.org/ns#", "cc"),
    ("http://web.resource.org/cc/", "cc"),
    // Publishing and discovery
    ("http://a9.com/-/spec/opensearch/1.1/", "opensearch"),
    ("http://arxiv.org/schemas/atom", "arxiv"),
    ("http://opds-spec.org/2010/catalog", "opds"),
    ("http://prismstandard.org/namespaces/basic/2.0/", "prism"),
    ("http://prismstandard.org/namespaces/basic/3.0/", "prism"),
    ("http://base.google.com/ns/1.0", "g"),
    ("http://www.w3.org/XML/1998/namespace", "xml"),
];

/// Immutable lookup table from namespace URI to canonical prefix.
///
/// Built once and handed to every [`NamespaceNormalizer`] by reference, so
/// independent documents (and tests) never share mutable state.
///
/// [`NamespaceNormalizer`]: super::NamespaceNormalizer
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    prefixes: HashMap<String, String>,
}

impl NamespaceRegistry {
    /// Creates a registry from `(uri, canonical prefix)` pairs.
    ///
    /// URIs are trimmed on the way in; later entries override earlier ones
    /// for the same URI. Entries whose URI is blank are ignored.
    pub fn new<I, U, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: AsRef<str>,
        P: Into<String>,
    {
        Self::default().with_entries(entries)
    }

    /// Registry preloaded with [`BUILTIN_NAMESPACES`].
    pub fn builtin() -> Self {
        Self::new(BUILTIN_NAMESPACES.iter().copied())
    }

    /// Returns a copy of this registry extended with `entries`.
    pub fn with_entries<I, U, P>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: AsRef<str>,
        P: Into<String>,
    {
        for (uri, prefix) in entries {
            let uri = uri.as_ref().trim();
            if uri.is_empty() {
                continue;
            }
            self.prefixes.insert(uri.to_string(), prefix.into());
        }
        self
    }

    /// Looks up the canonical prefix for a namespace URI.
    ///
    /// Leading and trailing whitespace is ignored. Unknown or blank URIs
    /// yield `None`.
    pub fn resolve(&self, uri: &str) -> Option<&str> {
        let uri = uri.trim();
        if uri.is_empty() {
            return None;
        }
        self.prefixes.get(uri).map(String::as_str)
    }

    /// Number of registered URIs.
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Distinct canonical prefixes, sorted.
    pub fn prefixes(&self) -> BTreeSet<&str> {
        self.prefixes.values().map(String::as_str).collect()
    }
}

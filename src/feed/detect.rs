use std::fmt;
use std::ops::ControlFlow;

use serde::Serialize;

use super::reader::{canonicalize_with, CanonicalEvent, ReadError, ReadOptions};
use crate::namespace::NamespaceRegistry;

/// Syndication format of a document, judged by its root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    Rss,
    Atom,
    Rdf,
    Opml,
}

impl FeedFormat {
    /// Classifies a canonical root element name.
    ///
    /// Matching ignores ASCII case, so `rdf:RDF` and `RSS` are recognized.
    pub fn detect(root: &str) -> Option<Self> {
        match root.to_ascii_lowercase().as_str() {
            "rss" => Some(FeedFormat::Rss),
            "feed" | "atom:feed" => Some(FeedFormat::Atom),
            "rdf:rdf" => Some(FeedFormat::Rdf),
            "opml" => Some(FeedFormat::Opml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedFormat::Rss => "rss",
            FeedFormat::Atom => "atom",
            FeedFormat::Rdf => "rdf",
            FeedFormat::Opml => "opml",
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads `content` up to its root element and classifies it.
///
/// The root has no ancestors to inherit prefixes from, so its own
/// declarations are applied to its name here: `<r:RDF xmlns:r="…rdf-syntax-ns#">`
/// is recognized as RDF whatever prefix the publisher chose.
///
/// Returns `Ok(None)` for well-formed documents of another kind.
pub fn detect_format(
    content: &str,
    registry: &NamespaceRegistry,
    options: &ReadOptions,
) -> Result<Option<FeedFormat>, ReadError> {
    let mut options = *options;
    options.normalizer.self_scoped_names = true;

    let mut root = None;
    canonicalize_with(content, registry, &options, |event| match event {
        CanonicalEvent::Open { name, .. } => {
            root = Some(name);
            ControlFlow::Break(())
        }
        _ => ControlFlow::Continue(()),
    })?;

    let format = root.as_deref().and_then(FeedFormat::detect);
    tracing::debug!(root = ?root, format = ?format, "Detected feed format");
    Ok(format)
}

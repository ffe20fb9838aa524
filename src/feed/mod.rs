//! Feed document reading on top of the namespace engine.
//!
//! The engine in [`crate::namespace`] only sees flat open/close events. This
//! module produces those events from real documents:
//!
//! - [`reader`] - drives a `quick-xml` tokenizer through a
//!   [`NamespaceNormalizer`](crate::namespace::NamespaceNormalizer) and
//!   yields [`CanonicalEvent`]s
//! - [`detect`] - classifies a document as RSS, Atom, RDF or OPML from its
//!   canonical root element
//!
//! # Example
//!
//! ```
//! use feedns::feed::{canonicalize, CanonicalEvent, ReadOptions};
//! use feedns::NamespaceRegistry;
//!
//! let doc = r#"<rss xmlns:dublin="http://purl.org/dc/elements/1.1/">
//!   <channel><dublin:creator>Jane</dublin:creator></channel>
//! </rss>"#;
//!
//! let events = canonicalize(doc, &NamespaceRegistry::builtin(), &ReadOptions::default()).unwrap();
//! assert!(events.iter().any(|event| matches!(
//!     event,
//!     CanonicalEvent::Open { name, .. } if name == "dc:creator"
//! )));
//! ```

pub mod detect;
pub mod reader;

pub use detect::{detect_format, FeedFormat};
pub use reader::{
    canonicalize, canonicalize_with, CanonicalAttribute, CanonicalEvent, ReadError, ReadOptions,
    DEFAULT_MAX_DEPTH,
};

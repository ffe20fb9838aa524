//! Namespace prefix canonicalization for feed documents.
//!
//! Feed publishers pick their own prefixes (`dublin:creator`,
//! `itunes1:duration`) or lean on a default namespace. Field extractors want
//! one stable spelling (`dc:creator`, `itunes:duration`). This module maps
//! the former onto the latter while a document streams past:
//!
//! - [`registry`] - URI → canonical prefix table
//! - [`scope`] - stack of per-element prefix bindings
//! - `transform` - splitting and rewriting of individual names
//! - [`normalizer`] - the event-driven engine tying them together
//!
//! # Example
//!
//! ```
//! use feedns::namespace::{NamespaceNormalizer, NamespaceRegistry};
//!
//! let registry = NamespaceRegistry::builtin();
//! let mut normalizer = NamespaceNormalizer::new(&registry);
//!
//! normalizer.update_tag("feed", "feed", [("@xmlns", "http://www.w3.org/2005/Atom")]);
//! assert_eq!(normalizer.update_tag("entry", "feed.entry", [("@xml:lang", "en")]), "atom:entry");
//! assert_eq!(normalizer.transform_tag_name("/entry"), "/atom:entry");
//! ```

pub mod normalizer;
pub mod registry;
pub mod scope;
mod transform;

pub use normalizer::{NamespaceNormalizer, NormalizerOptions};
pub use registry::{NamespaceRegistry, BUILTIN_NAMESPACES};
pub use scope::{Binding, ScopeFrame, ScopeStack};

//! # feedns
//!
//! Namespace-prefix canonicalization for RSS, Atom and RDF feeds.
//!
//! Publishers declare whatever prefixes they like for the vocabularies they
//! embed (`xmlns:dublin`, `xmlns:itunes1`, a default `xmlns`). Field
//! extractors expect one spelling per vocabulary. feedns rewrites element
//! and attribute names while the document streams past, so `dublin:creator`
//! arrives as `dc:creator` and an unprefixed `<title>` inside an Atom default
//! namespace arrives as `atom:title`.
//!
//! ## Modules
//!
//! - [`namespace`]: the scoped resolver (registry, scope stack, normalizer)
//! - [`feed`]: a `quick-xml` driver producing canonical events, and format detection
//! - [`config`]: optional TOML configuration

pub mod config;
pub mod feed;
pub mod namespace;

pub use config::{Config, ConfigError};
pub use namespace::{Binding, NamespaceNormalizer, NamespaceRegistry, NormalizerOptions};

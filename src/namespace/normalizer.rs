use std::borrow::Cow;
use std::collections::BTreeMap;

use super::scope::parent_path;
use super::transform::canonicalize;
use super::{Binding, NamespaceRegistry, ScopeStack};

/// Behaviour switches for [`NamespaceNormalizer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizerOptions {
    /// Lowercase local names (and unresolved names) on output.
    pub fold_case: bool,
    /// Let an element's own `xmlns*` attributes govern its own name.
    ///
    /// Off by default: an opening tag is named with the namespaces
    /// inherited from its ancestors, and its declarations apply to its
    /// content.
    pub self_scoped_names: bool,
}

/// Rewrites element and attribute names of one document so that every
/// known vocabulary appears under its canonical prefix.
///
/// The normalizer is fed the tokenizer's events in document order:
/// [`update_tag`](Self::update_tag) for every opening tag, and
/// [`transform_tag_name`](Self::transform_tag_name) with a `/`-prefixed
/// name for every closing tag. Self-closing elements need no close call;
/// the next open at the same or a shallower path discards their scope.
/// Tokenizers that track the open path themselves should close with
/// [`close_element`](Self::close_element) instead, which never matches by
/// name.
///
/// Nothing here fails. Unknown URIs, malformed prefixes and odd names all
/// come back unchanged so that a feed with broken declarations still
/// parses.
///
/// Create one normalizer per document; the registry may be shared.
///
/// # Examples
///
/// ```
/// use feedns::{NamespaceNormalizer, NamespaceRegistry};
///
/// let registry = NamespaceRegistry::builtin();
/// let mut normalizer = NamespaceNormalizer::new(&registry);
///
/// normalizer.update_tag("rss", "rss", [("@xmlns:dublin", "http://purl.org/dc/elements/1.1/")]);
/// assert_eq!(normalizer.transform_tag_name("dublin:creator"), "dc:creator");
/// assert_eq!(normalizer.transform_attribute_name("@dublin:lang"), "@dc:lang");
/// ```
#[derive(Debug, Clone)]
pub struct NamespaceNormalizer<'r> {
    registry: &'r NamespaceRegistry,
    scope: ScopeStack,
    options: NormalizerOptions,
}

impl<'r> NamespaceNormalizer<'r> {
    pub fn new(registry: &'r NamespaceRegistry) -> Self {
        Self::with_options(registry, NormalizerOptions::default())
    }

    pub fn with_options(registry: &'r NamespaceRegistry, options: NormalizerOptions) -> Self {
        Self {
            registry,
            scope: ScopeStack::new(),
            options,
        }
    }

    /// Handles an opening tag and returns its canonical name.
    ///
    /// Scopes left over from closed siblings or self-closing elements are
    /// discarded first, the name is resolved, then a scope for `path` is
    /// pushed from the element's attributes. `path` is the dot-joined chain
    /// of ancestor tags ending with this element.
    pub fn update_tag<'a, I, K, V>(&mut self, tag: &'a str, path: &str, attributes: I) -> Cow<'a, str>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.scope.pop_above(path);

        if self.options.self_scoped_names {
            self.scope.push_frame(self.registry, path, attributes);
            return self.element_name(tag);
        }

        let name = self.element_name(tag);
        self.scope.push_frame(self.registry, path, attributes);
        name
    }

    /// Canonicalizes a tag name.
    ///
    /// A leading `/` marks a closing tag: the name is resolved while the
    /// element's scope is still open, then that scope is popped.
    pub fn transform_tag_name<'a>(&mut self, raw: &'a str) -> Cow<'a, str> {
        let Some(name) = raw.strip_prefix('/') else {
            return self.element_name(raw);
        };
        if name.is_empty() {
            return Cow::Borrowed(raw);
        }

        let resolved = format!("/{}", self.element_name(name));
        self.scope.close(name);
        Cow::Owned(resolved)
    }

    /// Canonicalizes an attribute name (`@prefix:local` form).
    ///
    /// Namespace declarations (`@xmlns`, `@xmlns:*`) are returned verbatim.
    /// Unprefixed attributes stay unprefixed: the default namespace applies
    /// to elements only.
    pub fn transform_attribute_name<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        let (marker, name) = match raw.strip_prefix('@') {
            Some(name) => ("@", name),
            None => ("", raw),
        };
        if name == "xmlns" || name.starts_with("xmlns:") {
            return Cow::Borrowed(raw);
        }

        match canonicalize(name, &self.scope, false, self.options.fold_case) {
            Cow::Borrowed(_) => Cow::Borrowed(raw),
            Cow::Owned(name) => Cow::Owned(format!("{marker}{name}")),
        }
    }

    /// Handles a closing tag for the element at `path` and returns its
    /// canonical name (without the `/`).
    ///
    /// The name is resolved while the element's scope is still open, then
    /// the scope is left by path. Nothing is matched by name, so tags with
    /// dots in them or a same-named child still close the right scope.
    pub fn close_element<'a>(&mut self, tag: &'a str, path: &str) -> Cow<'a, str> {
        let name = self.element_name(tag);
        self.leave(path);
        name
    }

    /// Explicitly closes the element at `path` and anything nested in it.
    ///
    /// For tokenizers that report structure directly instead of relying on
    /// close-tag names. Returns the number of scopes removed.
    pub fn leave(&mut self, path: &str) -> usize {
        self.scope.pop_to(parent_path(path))
    }

    /// Effective prefix → canonical prefix mapping at this point.
    pub fn current_context(&self) -> BTreeMap<String, String> {
        self.scope.effective_context()
    }

    /// Declarations made by the innermost open element.
    pub fn current_frame_declarations(&self) -> &BTreeMap<String, Binding> {
        self.scope.top().declarations()
    }

    /// Number of open scopes, counting the document root.
    pub fn stack_depth(&self) -> usize {
        self.scope.depth()
    }

    pub fn scope(&self) -> &ScopeStack {
        &self.scope
    }

    pub fn options(&self) -> NormalizerOptions {
        self.options
    }

    fn element_name<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        canonicalize(raw, &self.scope, true, self.options.fold_case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM: &str = "http://www.w3.org/2005/Atom";
    const DC: &str = "http://purl.org/dc/elements/1.1/";
    const NONE: [(&str, &str); 0] = [];

    #[test]
    fn test_open_tag_uses_inherited_scope() {
        let registry = NamespaceRegistry::builtin();
        let mut normalizer = NamespaceNormalizer::new(&registry);

        assert_eq!(normalizer.update_tag("a:feed", "feed", [("@xmlns:a", ATOM)]), "a:feed");
        assert_eq!(normalizer.transform_tag_name("a:title"), "atom:title");
        assert_eq!(normalizer.transform_tag_name("/a:feed"), "/atom:feed");
        assert_eq!(normalizer.stack_depth(), 1);
    }

    #[test]
    fn test_self_scoped_names() {
        let registry = NamespaceRegistry::builtin();
        let options = NormalizerOptions {
            self_scoped_names: true,
            ..Default::default()
        };
        let mut normalizer = NamespaceNormalizer::with_options(&registry, options);

        assert_eq!(normalizer.update_tag("feed", "feed", [("@xmlns", ATOM)]), "atom:feed");
        assert_eq!(normalizer.transform_tag_name("/feed"), "/atom:feed");
    }

    #[test]
    fn test_attribute_names_ignore_default_namespace() {
        let registry = NamespaceRegistry::builtin();
        let mut normalizer = NamespaceNormalizer::new(&registry);

        normalizer.update_tag("feed", "feed", [("@xmlns", ATOM), ("@xmlns:d", DC)]);
        assert_eq!(normalizer.transform_attribute_name("@href"), "@href");
        assert_eq!(normalizer.transform_attribute_name("@d:lang"), "@dc:lang");
        assert_eq!(normalizer.transform_attribute_name("d:lang"), "dc:lang");
        assert_eq!(normalizer.transform_attribute_name("@xmlns:d"), "@xmlns:d");
        assert_eq!(normalizer.transform_attribute_name("xmlns"), "xmlns");
    }

    #[test]
    fn test_bare_slash_is_untouched() {
        let registry = NamespaceRegistry::builtin();
        let mut normalizer = NamespaceNormalizer::new(&registry);
        normalizer.update_tag("feed", "feed", NONE);

        assert_eq!(normalizer.transform_tag_name("/"), "/");
        assert_eq!(normalizer.stack_depth(), 2);
    }

    #[test]
    fn test_leave_pops_subtree() {
        let registry = NamespaceRegistry::builtin();
        let mut normalizer = NamespaceNormalizer::new(&registry);

        normalizer.update_tag("rss", "rss", [("@xmlns:d", DC)]);
        normalizer.update_tag("channel", "rss.channel", NONE);
        normalizer.update_tag("item", "rss.channel.item", [("@xmlns:a", ATOM)]);
        assert_eq!(normalizer.leave("rss.channel"), 2);
        assert_eq!(normalizer.stack_depth(), 2);
        assert_eq!(normalizer.transform_tag_name("a:link"), "a:link");
        assert_eq!(normalizer.transform_tag_name("d:date"), "dc:date");
    }

    #[test]
    fn test_close_element_leaves_dotted_name() {
        let registry = NamespaceRegistry::builtin();
        let mut normalizer = NamespaceNormalizer::new(&registry);

        normalizer.update_tag("rss", "rss", NONE);
        normalizer.update_tag("channel", "rss.channel", NONE);
        normalizer.update_tag("x.y", "rss.channel.x.y", [("@xmlns", ATOM)]);

        assert_eq!(normalizer.close_element("x.y", "rss.channel.x.y"), "atom:x.y");
        assert_eq!(normalizer.stack_depth(), 3);
        assert_eq!(normalizer.close_element("channel", "rss.channel"), "channel");
        assert_eq!(normalizer.close_element("rss", "rss"), "rss");
        assert_eq!(normalizer.stack_depth(), 1);
    }

    #[test]
    fn test_close_element_skips_same_named_child() {
        let registry = NamespaceRegistry::builtin();
        let mut normalizer = NamespaceNormalizer::new(&registry);

        normalizer.update_tag("body", "body", [("@xmlns", "")]);
        normalizer.update_tag("outline", "body.outline", [("@xmlns", ATOM)]);
        normalizer.update_tag("outline", "body.outline.outline", NONE);

        assert_eq!(
            normalizer.close_element("outline", "body.outline"),
            "atom:outline"
        );
        assert_eq!(normalizer.close_element("body", "body"), "body");
        assert_eq!(normalizer.stack_depth(), 1);
    }

    #[test]
    fn test_fold_case_option() {
        let registry = NamespaceRegistry::builtin();
        let options = NormalizerOptions {
            fold_case: true,
            ..Default::default()
        };
        let mut normalizer = NamespaceNormalizer::with_options(&registry, options);

        assert_eq!(normalizer.update_tag("RSS", "RSS", [("@xmlns:DC", DC)]), "rss");
        assert_eq!(normalizer.transform_tag_name("DC:Creator"), "dc:creator");
        assert_eq!(normalizer.transform_attribute_name("@DC:Lang"), "@dc:lang");
        assert_eq!(normalizer.transform_tag_name("/RSS"), "/rss");
        assert_eq!(normalizer.stack_depth(), 1);
    }
}

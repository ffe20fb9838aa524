use std::collections::BTreeMap;

use super::NamespaceRegistry;

/// What a scope frame says about one local prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// The prefix maps to this canonical prefix.
    Canonical(String),
    /// `xmlns=""`: the inherited default namespace is switched off.
    Cleared,
}

impl Binding {
    pub fn canonical(&self) -> Option<&str> {
        match self {
            Binding::Canonical(prefix) => Some(prefix),
            Binding::Cleared => None,
        }
    }
}

/// Prefix bindings introduced by a single open element.
///
/// The declarations are fixed when the frame is built; nothing mutates
/// them afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFrame {
    path: String,
    declarations: BTreeMap<String, Binding>,
}

impl ScopeFrame {
    fn root() -> Self {
        Self {
            path: String::new(),
            declarations: BTreeMap::new(),
        }
    }

    /// Builds a frame from an element's raw attributes.
    ///
    /// Only `xmlns` and `xmlns:<prefix>` keys are considered, with or
    /// without a leading `@`. Declarations that cannot be used are dropped:
    /// a prefix that is not an identifier, or a URI the registry does not
    /// know. An empty default declaration becomes [`Binding::Cleared`].
    pub fn from_attributes<I, K, V>(registry: &NamespaceRegistry, path: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut declarations = BTreeMap::new();

        for (key, value) in attributes {
            let Some(declared) = parse_declaration(key.as_ref()) else {
                continue;
            };
            let uri = value.as_ref();

            let local_prefix = match declared {
                Declared::Default => {
                    if uri.trim().is_empty() {
                        declarations.insert(String::new(), Binding::Cleared);
                        continue;
                    }
                    ""
                }
                Declared::Prefix(prefix) => {
                    if !is_valid_prefix(prefix) {
                        tracing::debug!(path = %path, prefix = %prefix, "Dropping namespace declaration with invalid prefix");
                        continue;
                    }
                    prefix
                }
            };

            match registry.resolve(uri) {
                Some(canonical) => {
                    declarations.insert(
                        local_prefix.to_string(),
                        Binding::Canonical(canonical.to_string()),
                    );
                }
                None => {
                    tracing::debug!(path = %path, prefix = %local_prefix, uri = %uri, "Unknown namespace URI, leaving prefix unmapped");
                }
            }
        }

        Self {
            path: path.to_string(),
            declarations,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn declarations(&self) -> &BTreeMap<String, Binding> {
        &self.declarations
    }

    fn last_segment(&self) -> &str {
        self.path
            .rsplit_once('.')
            .map_or(self.path.as_str(), |(_, last)| last)
    }
}

enum Declared<'a> {
    Default,
    Prefix(&'a str),
}

fn parse_declaration(key: &str) -> Option<Declared<'_>> {
    let key = key.strip_prefix('@').unwrap_or(key);
    if key == "xmlns" {
        return Some(Declared::Default);
    }
    key.strip_prefix("xmlns:").map(Declared::Prefix)
}

/// Whether `prefix` can name a namespace: a letter or `_` followed by
/// letters, digits, `-`, `_` or `.`.
pub(crate) fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// `ancestor` equals `path` or is one of its dot-separated prefixes.
/// The root path `""` is an ancestor of everything.
pub(crate) fn is_ancestor_or_self(ancestor: &str, path: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    match path.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}

pub(crate) fn is_strict_ancestor(ancestor: &str, path: &str) -> bool {
    ancestor != path && is_ancestor_or_self(ancestor, path)
}

pub(crate) fn parent_path(path: &str) -> &str {
    path.rsplit_once('.').map_or("", |(parent, _)| parent)
}

/// Stack of [`ScopeFrame`]s mirroring the currently open elements.
///
/// Always holds the root frame at the bottom; the root is never popped.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        let mut frames = Vec::with_capacity(16);
        frames.push(ScopeFrame::root());
        Self { frames }
    }

    /// Pushes a frame for `path`, even when it declares nothing.
    pub fn push_frame<I, K, V>(&mut self, registry: &NamespaceRegistry, path: &str, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.push(ScopeFrame::from_attributes(registry, path, attributes));
    }

    pub fn push(&mut self, frame: ScopeFrame) {
        tracing::trace!(
            path = %frame.path,
            declarations = frame.declarations.len(),
            depth = self.frames.len() + 1,
            "Pushing namespace scope"
        );
        self.frames.push(frame);
    }

    /// First binding for `local_prefix`, scanning from the innermost frame.
    pub fn lookup(&self, local_prefix: &str) -> Option<&Binding> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.declarations.get(local_prefix))
    }

    /// Canonical prefix currently in effect for `local_prefix`.
    ///
    /// A [`Binding::Cleared`] found before any mapping stops the search.
    pub fn resolve(&self, local_prefix: &str) -> Option<&str> {
        self.lookup(local_prefix).and_then(Binding::canonical)
    }

    /// Pops frames until the top one is `path` or one of its ancestors.
    ///
    /// Returns the number of frames removed.
    pub fn pop_to(&mut self, path: &str) -> usize {
        let keep = self.retained_len(|frame| is_ancestor_or_self(&frame.path, path));
        self.truncate(keep)
    }

    /// Pops frames until the top one is a strict ancestor of `path`.
    ///
    /// Used before opening an element at `path`: frames of closed siblings
    /// and of self-closing elements that never got a close event go away.
    pub fn pop_above(&mut self, path: &str) -> usize {
        let keep = self.retained_len(|frame| is_strict_ancestor(&frame.path, path));
        self.truncate(keep)
    }

    /// Pops the frame of the innermost open element called `name`, along
    /// with anything stacked above it.
    ///
    /// A frame matches when the last segment of its path equals `name` or
    /// the local part of `name`. Returns the number of frames removed,
    /// zero when nothing matched.
    pub fn close(&mut self, name: &str) -> usize {
        let local = match name.split_once(':') {
            Some((_, local)) if !local.is_empty() => local,
            _ => name,
        };

        let position = self
            .frames
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, frame)| {
                let segment = frame.last_segment();
                segment == name || segment == local
            })
            .map(|(index, _)| index);

        match position {
            Some(index) => self.truncate(index),
            None => {
                tracing::trace!(name = %name, "Close tag matches no open scope");
                0
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn top(&self) -> &ScopeFrame {
        &self.frames[self.frames.len() - 1]
    }

    pub fn frames(&self) -> &[ScopeFrame] {
        &self.frames
    }

    /// Effective canonical mapping of every prefix in scope.
    ///
    /// Cleared prefixes are omitted.
    pub fn effective_context(&self) -> BTreeMap<String, String> {
        let mut context = BTreeMap::new();
        for frame in &self.frames {
            for (prefix, binding) in &frame.declarations {
                match binding {
                    Binding::Canonical(canonical) => {
                        context.insert(prefix.clone(), canonical.clone());
                    }
                    Binding::Cleared => {
                        context.remove(prefix);
                    }
                }
            }
        }
        context
    }

    fn retained_len(&self, keep: impl Fn(&ScopeFrame) -> bool) -> usize {
        let mut len = self.frames.len();
        while len > 1 && !keep(&self.frames[len - 1]) {
            len -= 1;
        }
        len
    }

    fn truncate(&mut self, len: usize) -> usize {
        let len = len.max(1);
        let removed = self.frames.len().saturating_sub(len);
        for frame in self.frames.drain(len..).rev() {
            tracing::trace!(path = %frame.path, "Popping namespace scope");
        }
        removed
    }
}

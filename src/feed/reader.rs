use std::borrow::Cow;
use std::ops::ControlFlow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;

use crate::namespace::{NamespaceNormalizer, NamespaceRegistry, NormalizerOptions};

/// SEC-003: Default maximum element nesting depth.
/// Prevents unbounded scope stacks from maliciously crafted deeply nested feeds.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Errors that can occur while reading a feed document.
#[derive(Debug, Error)]
pub enum ReadError {
    /// SEC-003: Document nesting depth exceeds safety limit.
    #[error("Document nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for ReadError {
    fn from(err: quick_xml::Error) -> Self {
        ReadError::Xml(err.to_string())
    }
}

/// Settings for [`canonicalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    pub normalizer: NormalizerOptions,
    pub max_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            normalizer: NormalizerOptions::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// An attribute with its canonical `@name` and unescaped value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalAttribute {
    pub name: String,
    pub value: String,
}

/// One step of a document, with every name in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CanonicalEvent {
    Open {
        name: String,
        /// Dot-joined raw tag names from the document root to this element.
        path: String,
        attributes: Vec<CanonicalAttribute>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
    Text {
        content: String,
    },
}

/// Reads a whole document and returns its canonical event stream.
///
/// # Errors
///
/// Returns an error if the content is not well-formed XML, or if elements
/// nest deeper than `options.max_depth`.
///
/// # Security
///
/// - XXE is mitigated because `quick-xml` (0.37) does not parse `<!ENTITY>`
///   declarations; custom entity references fail to unescape.
/// - Nesting depth is bounded by `options.max_depth` (SEC-003).
pub fn canonicalize(
    content: &str,
    registry: &NamespaceRegistry,
    options: &ReadOptions,
) -> Result<Vec<CanonicalEvent>, ReadError> {
    let mut events = Vec::new();
    canonicalize_with(content, registry, options, |event| {
        events.push(event);
        ControlFlow::Continue(())
    })?;
    Ok(events)
}

/// Streams canonical events to `on_event` until the document ends or the
/// callback breaks.
///
/// Opening tags go through [`NamespaceNormalizer::update_tag`] with a path
/// built from the raw tag names. Closing tags go through
/// [`NamespaceNormalizer::close_element`] with the same path, so tag names
/// containing dots still close their own scope. Self-closing elements get
/// no close tag; their scope is left with [`NamespaceNormalizer::leave`].
///
/// Entity references XML does not define (`&nbsp;`, `&mdash;`) are kept as
/// written instead of failing the document.
pub fn canonicalize_with<F>(
    content: &str,
    registry: &NamespaceRegistry,
    options: &ReadOptions,
    mut on_event: F,
) -> Result<(), ReadError>
where
    F: FnMut(CanonicalEvent) -> ControlFlow<()>,
{
    // SEC-002: quick-xml (0.37) never expands <!ENTITY> declarations. Entity
    // references other than the five XML builtins are left unexpanded by
    // `unescape_lenient`.
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut normalizer = NamespaceNormalizer::with_options(registry, options.normalizer);
    let mut open_names: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                // SEC-003: Reject excessively nested documents
                if open_names.len() + 1 > options.max_depth {
                    return Err(ReadError::MaxDepthExceeded(options.max_depth));
                }
                let (name, event) = open_element(&e, &reader, &open_names, &mut normalizer, false)?;
                open_names.push(name);
                Some(event)
            }
            Ok(Event::Empty(e)) => {
                // Self-closing elements don't affect depth. Their scope is
                // left right away so a same-named parent's close tag cannot
                // land on it.
                let (_, event) = open_element(&e, &reader, &open_names, &mut normalizer, true)?;
                if let CanonicalEvent::Open { path, .. } = &event {
                    normalizer.leave(path);
                }
                Some(event)
            }
            Ok(Event::End(e)) => {
                let name = decode_name(e.name().as_ref(), &reader)?;
                let path = open_names.join(".");
                open_names.pop();
                let closed = normalizer.close_element(&name, &path).into_owned();
                Some(CanonicalEvent::Close { name: closed })
            }
            Ok(Event::Text(e)) => {
                let raw = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|e| ReadError::Xml(e.to_string()))?;
                let element = open_names.last().map_or("", String::as_str);
                let text = unescape_lenient(&raw, element);
                if text.trim().is_empty() {
                    None
                } else {
                    Some(CanonicalEvent::Text {
                        content: text.into_owned(),
                    })
                }
            }
            Ok(Event::CData(e)) => Some(CanonicalEvent::Text {
                content: String::from_utf8_lossy(&e).into_owned(),
            }),
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReadError::Xml(e.to_string())),
            _ => None,
        };
        buf.clear();

        if let Some(event) = event {
            if on_event(event).is_break() {
                break;
            }
        }
    }

    tracing::trace!(depth = normalizer.stack_depth(), "Finished reading document");
    Ok(())
}

/// Feeds an opening tag to the normalizer and builds its event.
///
/// Returns the raw tag name (for the path of its children) with the event.
fn open_element(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    open_names: &[String],
    normalizer: &mut NamespaceNormalizer<'_>,
    self_closing: bool,
) -> Result<(String, CanonicalEvent), ReadError> {
    let name = decode_name(e.name().as_ref(), reader)?;
    let path = if open_names.is_empty() {
        name.clone()
    } else {
        format!("{}.{}", open_names.join("."), name)
    };

    let decoder = reader.decoder();
    let mut raw_attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(element = %name, error = %e, "Skipping malformed attribute");
                continue;
            }
        };
        let key = decode_name(attr.key.as_ref(), reader)?;
        let value = decoder
            .decode(&attr.value)
            .map_err(|e| ReadError::Xml(e.to_string()))?;
        let value = unescape_lenient(&value, &name).into_owned();
        raw_attributes.push((format!("@{}", key), value));
    }

    let canonical = normalizer
        .update_tag(&name, &path, raw_attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .into_owned();

    let attributes = raw_attributes
        .into_iter()
        .map(|(key, value)| CanonicalAttribute {
            name: normalizer.transform_attribute_name(&key).into_owned(),
            value,
        })
        .collect();

    let event = CanonicalEvent::Open {
        name: canonical,
        path,
        attributes,
        self_closing,
    };
    Ok((name, event))
}

/// Resolves character and builtin entity references in `raw`.
///
/// A reference to any other entity keeps the whole run as written, the way
/// feed parsers that skip entity processing see it.
fn unescape_lenient<'a>(raw: &'a str, element: &str) -> Cow<'a, str> {
    match quick_xml::escape::unescape(raw) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(element = %element, error = %e, "Keeping text with unresolved entity as written");
            Cow::Borrowed(raw)
        }
    }
}

fn decode_name(bytes: &[u8], reader: &Reader<&[u8]>) -> Result<String, ReadError> {
    reader
        .decoder()
        .decode(bytes)
        .map(|name| name.into_owned())
        .map_err(|e| ReadError::Xml(e.to_string()))
}

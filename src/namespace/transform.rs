use std::borrow::Cow;

use super::ScopeStack;

/// A raw element or attribute name, split at its first colon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QualifiedName<'a> {
    Unprefixed(&'a str),
    Prefixed { prefix: &'a str, local: &'a str },
    /// A colon with nothing on one side of it (`":"`, `":x"`, `"x:"`).
    Malformed,
}

pub(crate) fn split_qualified(name: &str) -> QualifiedName<'_> {
    match name.split_once(':') {
        None => QualifiedName::Unprefixed(name),
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
            QualifiedName::Prefixed { prefix, local }
        }
        Some(_) => QualifiedName::Malformed,
    }
}

/// Rewrites `raw` under the canonical prefix in effect on `scope`.
///
/// Unprefixed names pick up the default namespace only when
/// `default_applies` is set (element names, never attribute names).
/// Names that cannot be resolved come back unchanged, apart from case
/// folding when `fold_case` is on. Malformed names are never touched.
pub(crate) fn canonicalize<'a>(
    raw: &'a str,
    scope: &ScopeStack,
    default_applies: bool,
    fold_case: bool,
) -> Cow<'a, str> {
    if raw.is_empty() {
        return Cow::Borrowed(raw);
    }

    match split_qualified(raw) {
        QualifiedName::Unprefixed(local) => {
            if default_applies {
                if let Some(canonical) = scope.resolve("") {
                    return Cow::Owned(format!("{}:{}", canonical, fold(local, fold_case)));
                }
            }
            fold(raw, fold_case)
        }
        QualifiedName::Prefixed { prefix, local } => match scope.resolve(prefix) {
            Some(canonical) => Cow::Owned(format!("{}:{}", canonical, fold(local, fold_case))),
            None => fold(raw, fold_case),
        },
        QualifiedName::Malformed => Cow::Borrowed(raw),
    }
}

fn fold(name: &str, enabled: bool) -> Cow<'_, str> {
    if enabled && name.chars().any(char::is_uppercase) {
        Cow::Owned(name.to_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

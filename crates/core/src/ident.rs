//! Renderer-safe identifiers derived from external board identifiers

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_]+").expect("valid regex"));

/// Prefix for identifiers that do not start with a letter or underscore
pub const ID_PREFIX: char = 'N';

/// Map an external identifier to one usable in diagram markup.
///
/// The result starts with a letter or underscore and contains only ASCII
/// letters, digits and underscores.
pub fn sanitize(raw: &str) -> String {
    let starts_ok = raw
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    let base = if starts_ok {
        raw.to_string()
    } else {
        format!("{ID_PREFIX}{raw}")
    };

    DISALLOWED.replace_all(&base, "_").into_owned()
}

/// Two external identifiers that sanitize to the same canonical identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub canonical: String,
    pub first: String,
    pub second: String,
}

/// External → canonical identifier mapping for one run, in insertion order.
///
/// Collisions are recorded, not resolved: both external identifiers keep
/// the shared canonical identifier.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    forward: IndexMap<String, String>,
    owners: IndexMap<String, String>,
    collisions: Vec<Collision>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an external identifier, returning its canonical form.
    pub fn insert(&mut self, external: &str) -> String {
        if let Some(existing) = self.forward.get(external) {
            return existing.clone();
        }

        let canonical = sanitize(external);
        if let Some(owner) = self.owners.get(&canonical) {
            warn!(
                "Identifier collision: {} and {} both map to {}",
                owner, external, canonical
            );
            self.collisions.push(Collision {
                canonical: canonical.clone(),
                first: owner.clone(),
                second: external.to_string(),
            });
        } else {
            self.owners.insert(canonical.clone(), external.to_string());
        }

        self.forward.insert(external.to_string(), canonical.clone());
        canonical
    }

    /// Canonical identifier for an external one, if registered
    pub fn get(&self, external: &str) -> Option<&str> {
        self.forward.get(external).map(String::as_str)
    }

    pub fn contains(&self, external: &str) -> bool {
        self.forward.contains_key(external)
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<&'a str> for IdentifierMap {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut map = Self::new();
        for external in iter {
            map.insert(external);
        }
        map
    }
}

//! Views as seen by the compiler.
//!
//! The compiler never inspects a view handle. The embedding framework
//! supplies the handles through [`Substitutions`] and, for key paths, a
//! [`KeyPathResolver`] that maps `(view, property)` to another view.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::ast::is_reserved_word;

/// The caller's substitution views, addressable from equations as `$0`,
/// `$1`, ... (indexed) or `$name` (named).
#[derive(Debug, Clone, PartialEq)]
pub enum Substitutions<V> {
    Indexed(Vec<V>),
    Named(BTreeMap<String, V>),
}

impl<V> Default for Substitutions<V> {
    fn default() -> Self {
        Substitutions::Indexed(Vec::new())
    }
}

impl<V> Substitutions<V> {
    /// `$n`. Named collections answer for the key `"n"`.
    pub fn by_index(&self, index: usize) -> Option<&V> {
        match self {
            Substitutions::Indexed(views) => views.get(index),
            Substitutions::Named(views) => views.get(&index.to_string()),
        }
    }

    /// `$name`. Indexed collections have no names.
    pub fn by_name(&self, name: &str) -> Option<&V> {
        match self {
            Substitutions::Indexed(_) => None,
            Substitutions::Named(views) => views.get(name),
        }
    }

    /// Every substitution view, in index order or key order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &V> + '_> {
        match self {
            Substitutions::Indexed(views) => Box::new(views.iter()),
            Substitutions::Named(views) => Box::new(views.values()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Substitutions::Indexed(views) => views.len(),
            Substitutions::Named(views) => views.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First key of a named collection that an equation can never refer to,
    /// because the word parses as a keyword instead of a view name.
    pub fn reserved_name(&self) -> Option<&str> {
        match self {
            Substitutions::Indexed(_) => None,
            Substitutions::Named(views) => {
                views.keys().map(String::as_str).find(|key| is_reserved_word(key))
            }
        }
    }
}

impl<V> From<Vec<V>> for Substitutions<V> {
    fn from(views: Vec<V>) -> Self {
        Substitutions::Indexed(views)
    }
}

impl<V> From<BTreeMap<String, V>> for Substitutions<V> {
    fn from(views: BTreeMap<String, V>) -> Self {
        Substitutions::Named(views)
    }
}

impl<V> FromIterator<(String, V)> for Substitutions<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Substitutions::Named(iter.into_iter().collect())
    }
}

/// Key-path lookup capability supplied by the embedding framework.
///
/// Returns the view stored under `key` on `view`, or `None` when the
/// property is missing or does not hold a view.
pub trait KeyPathResolver<V> {
    fn view_for_key(&self, view: &V, key: &str) -> Option<V>;
}

impl<V, F> KeyPathResolver<V> for F
where
    F: Fn(&V, &str) -> Option<V>,
{
    fn view_for_key(&self, view: &V, key: &str) -> Option<V> {
        self(view, key)
    }
}

/// Resolver for hosts without key-path support: every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKeyPaths;

impl<V> KeyPathResolver<V> for NoKeyPaths {
    fn view_for_key(&self, _view: &V, _key: &str) -> Option<V> {
        None
    }
}

/// Statically declared `(view, property) -> view` table.
#[derive(Debug, Clone)]
pub struct KeyPathTable<V> {
    entries: HashMap<V, HashMap<String, V>>,
}

impl<V> Default for KeyPathTable<V> {
    fn default() -> Self {
        KeyPathTable {
            entries: HashMap::new(),
        }
    }
}

impl<V: Eq + Hash> KeyPathTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `owner.key` is `target`. A later declaration for the same
    /// property replaces the earlier one.
    pub fn insert(&mut self, owner: V, key: impl Into<String>, target: V) {
        self.entries
            .entry(owner)
            .or_default()
            .insert(key.into(), target);
    }

    pub fn with(mut self, owner: V, key: impl Into<String>, target: V) -> Self {
        self.insert(owner, key, target);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Eq + Hash + Clone> KeyPathResolver<V> for KeyPathTable<V> {
    fn view_for_key(&self, view: &V, key: &str) -> Option<V> {
        self.entries.get(view)?.get(key).cloned()
    }
}

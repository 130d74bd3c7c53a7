//! Pass 2: View resolution -- map each symbolic [`ViewPath`] to concrete
//! view handles using the receiver, the substitution collection and the
//! host's key-path capability.
//!
//! Hierarchy membership is not checked here; that belongs to the
//! constraint installer.

use crate::ast::{ViewPath, ViewRef};
use crate::error::ResolveError;
use crate::view::{KeyPathResolver, Substitutions};

/// The views a [`ViewPath`] stands for. Exactly one view for `$self`,
/// `$n` and `$name`; every substitution view (minus the receiver) for `$all`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedViewSet<V> {
    views: Vec<V>,
    all: bool,
}

impl<V> ResolvedViewSet<V> {
    pub fn views(&self) -> &[V] {
        &self.views
    }

    pub fn into_views(self) -> Vec<V> {
        self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Whether the set came from `$all`.
    pub fn is_all(&self) -> bool {
        self.all
    }
}

pub fn resolve<V, K>(
    path: &ViewPath,
    receiver: &V,
    substitutions: &Substitutions<V>,
    key_paths: &K,
) -> Result<ResolvedViewSet<V>, ResolveError>
where
    V: Clone + PartialEq,
    K: KeyPathResolver<V> + ?Sized,
{
    if let Some(name) = substitutions.reserved_name() {
        return Err(ResolveError::ReservedName(name.to_string()));
    }

    let (roots, all) = match &path.root {
        ViewRef::SelfRef => (vec![receiver.clone()], false),
        ViewRef::AllRef => (
            substitutions
                .iter()
                .filter(|v| *v != receiver)
                .cloned()
                .collect(),
            true,
        ),
        ViewRef::IndexRef(index) => {
            let view = substitutions
                .by_index(*index)
                .ok_or_else(|| ResolveError::UnknownView {
                    name: index.to_string(),
                    pos: path.pos,
                })?;
            (vec![view.clone()], false)
        }
        ViewRef::NameRef(name) => {
            let view = substitutions
                .by_name(name)
                .ok_or_else(|| ResolveError::UnknownView {
                    name: name.clone(),
                    pos: path.pos,
                })?;
            (vec![view.clone()], false)
        }
    };

    let views = roots
        .into_iter()
        .map(|root| follow_key_path(root, path, key_paths))
        .collect::<Result<Vec<V>, ResolveError>>()?;

    tracing::trace!(path = %path, count = views.len(), "resolved view path");
    Ok(ResolvedViewSet { views, all })
}

fn follow_key_path<V, K>(root: V, path: &ViewPath, key_paths: &K) -> Result<V, ResolveError>
where
    K: KeyPathResolver<V> + ?Sized,
{
    let mut view = root;
    for segment in &path.key_path {
        view = key_paths
            .view_for_key(&view, segment)
            .ok_or_else(|| ResolveError::KeyPathNotAView {
                segment: segment.clone(),
                pos: path.pos,
            })?;
    }
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{KeyPathTable, NoKeyPaths};

    fn path(root: ViewRef, key_path: &[&str]) -> ViewPath {
        let key_path = key_path.iter().map(|s| s.to_string()).collect();
        ViewPath::new(root, key_path, 0)
    }

    fn indexed() -> Substitutions<&'static str> {
        vec!["a", "b", "c"].into()
    }

    #[test]
    fn self_is_the_receiver() {
        let set = resolve(&path(ViewRef::SelfRef, &[]), &"root", &indexed(), &NoKeyPaths).unwrap();
        assert_eq!(set.views(), &["root"]);
        assert!(!set.is_all());
    }

    #[test]
    fn index_and_name_lookups() {
        let set =
            resolve(&path(ViewRef::IndexRef(2), &[]), &"root", &indexed(), &NoKeyPaths).unwrap();
        assert_eq!(set.views(), &["c"]);

        let named: Substitutions<&str> = [("title".to_string(), "t")].into_iter().collect();
        let set = resolve(
            &path(ViewRef::NameRef("title".into()), &[]),
            &"root",
            &named,
            &NoKeyPaths,
        )
        .unwrap();
        assert_eq!(set.views(), &["t"]);
    }

    #[test]
    fn unknown_views() {
        assert_eq!(
            resolve(&path(ViewRef::IndexRef(3), &[]), &"root", &indexed(), &NoKeyPaths),
            Err(ResolveError::UnknownView {
                name: "3".into(),
                pos: 0
            })
        );
        assert_eq!(
            resolve(
                &path(ViewRef::NameRef("a".into()), &[]),
                &"root",
                &indexed(),
                &NoKeyPaths
            ),
            Err(ResolveError::UnknownView {
                name: "a".into(),
                pos: 0
            })
        );
    }

    #[test]
    fn errors_carry_the_offset_of_the_path() {
        let ghost = ViewPath::new(ViewRef::NameRef("ghost".into()), vec![], 14);
        let err = resolve(&ghost, &"root", &indexed(), &NoKeyPaths).unwrap_err();
        assert_eq!(err.pos(), Some(14));
        assert_eq!(err.to_string(), "unknown view '$ghost' at offset 14");

        let nested = ViewPath::new(ViewRef::SelfRef, vec!["content".into()], 7);
        let err = resolve(&nested, &"root", &indexed(), &NoKeyPaths).unwrap_err();
        assert_eq!(
            err,
            ResolveError::KeyPathNotAView {
                segment: "content".into(),
                pos: 7
            }
        );
    }

    #[test]
    fn reserved_substitution_names_are_rejected() {
        let subs: Substitutions<&str> = [("self".to_string(), "s"), ("title".to_string(), "t")]
            .into_iter()
            .collect();
        assert_eq!(
            resolve(&path(ViewRef::SelfRef, &[]), &"root", &subs, &NoKeyPaths),
            Err(ResolveError::ReservedName("self".into()))
        );

        let subs: Substitutions<&str> = [("width".to_string(), "w")].into_iter().collect();
        let err = resolve(&path(ViewRef::AllRef, &[]), &"root", &subs, &NoKeyPaths).unwrap_err();
        assert_eq!(err, ResolveError::ReservedName("width".into()));
        assert_eq!(err.pos(), None);
    }

    #[test]
    fn all_excludes_the_receiver() {
        let subs: Substitutions<&str> = vec!["a", "root", "b"].into();
        let set = resolve(&path(ViewRef::AllRef, &[]), &"root", &subs, &NoKeyPaths).unwrap();
        assert_eq!(set.views(), &["a", "b"]);
        assert!(set.is_all());
    }

    #[test]
    fn key_paths_are_followed_per_view() {
        let keys = KeyPathTable::new()
            .with("root", "content", "content")
            .with("content", "title", "title")
            .with("a", "icon", "a-icon")
            .with("b", "icon", "b-icon");
        let set = resolve(
            &path(ViewRef::SelfRef, &["content", "title"]),
            &"root",
            &indexed(),
            &keys,
        )
        .unwrap();
        assert_eq!(set.views(), &["title"]);

        let subs: Substitutions<&str> = vec!["a", "b"].into();
        let set = resolve(&path(ViewRef::AllRef, &["icon"]), &"root", &subs, &keys).unwrap();
        assert_eq!(set.views(), &["a-icon", "b-icon"]);
    }

    #[test]
    fn key_path_that_is_not_a_view() {
        let keys = KeyPathTable::new().with("root", "content", "content");
        assert_eq!(
            resolve(
                &path(ViewRef::SelfRef, &["content", "stringValue"]),
                &"root",
                &indexed(),
                &keys
            ),
            Err(ResolveError::KeyPathNotAView {
                segment: "stringValue".into(),
                pos: 0
            })
        );
    }
}

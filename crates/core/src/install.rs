//! Boundary with the host layout framework.
//!
//! Turning a [`ConstraintDescriptor`] into a live native constraint is the
//! host's job, expressed by [`ConstraintInstaller`]. This module drives the
//! compiler and hands every descriptor to the installer, one at a time, so
//! a rejected descriptor never affects the others.

use crate::compile::compile;
use crate::descriptor::ConstraintDescriptor;
use crate::error::EquationError;
use crate::view::{KeyPathResolver, NoKeyPaths, Substitutions};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Host capability: activate constraints and manage the view hierarchy.
pub trait ConstraintInstaller<V> {
    type Error: std::error::Error;

    /// Create and activate one native constraint. Must not touch any other
    /// constraint when it fails.
    fn install(&mut self, descriptor: &ConstraintDescriptor<V>) -> Result<(), Self::Error>;

    /// Insert `subview` into `superview`'s hierarchy.
    fn insert_subview(&mut self, superview: &V, subview: &V) -> Result<(), Self::Error>;
}

/// A descriptor the installer rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallFailure<V, E> {
    pub descriptor: ConstraintDescriptor<V>,
    pub error: E,
}

/// Outcome of [`add_constraints_from_equations`].
#[derive(Debug, Clone, PartialEq)]
pub struct InstallReport<V, E> {
    pub installed: usize,
    pub compile_errors: Vec<EquationError>,
    pub install_failures: Vec<InstallFailure<V, E>>,
}

impl<V, E> InstallReport<V, E> {
    pub fn is_ok(&self) -> bool {
        self.compile_errors.is_empty() && self.install_failures.is_empty()
    }
}

/// Compile `equations` against `receiver` and install every resulting
/// descriptor.
pub fn add_constraints_from_equations<V, K, I, S>(
    installer: &mut I,
    receiver: &V,
    equations: &[S],
    substitutions: &Substitutions<V>,
    key_paths: &K,
) -> InstallReport<V, I::Error>
where
    V: Clone + PartialEq,
    K: KeyPathResolver<V> + ?Sized,
    I: ConstraintInstaller<V> + ?Sized,
    S: AsRef<str>,
{
    let (descriptors, compile_errors) =
        compile(equations, receiver, substitutions, key_paths).into_parts();

    let mut installed = 0;
    let mut install_failures = Vec::new();
    for descriptor in descriptors {
        match installer.install(&descriptor) {
            Ok(()) => installed += 1,
            Err(error) => {
                tracing::warn!(%error, "installer rejected constraint");
                install_failures.push(InstallFailure { descriptor, error });
            }
        }
    }

    InstallReport {
        installed,
        compile_errors,
        install_failures,
    }
}

/// Distance kept between a subview's edges and its superview's edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f64,
    pub leading: f64,
    pub bottom: f64,
    pub trailing: f64,
}

impl EdgeInsets {
    pub fn new(top: f64, leading: f64, bottom: f64, trailing: f64) -> Self {
        EdgeInsets {
            top,
            leading,
            bottom,
            trailing,
        }
    }

    pub fn uniform(inset: f64) -> Self {
        Self::new(inset, inset, inset, inset)
    }

    /// Equation pinning substitution view `$0` inside the receiver. Bottom
    /// and trailing insets point inwards, so their constants are negated.
    pub fn margin_equation(&self) -> String {
        format!(
            "$0.margins = $self.margins + ({}, {}, {}, {})",
            self.top, self.leading, -self.bottom, -self.trailing
        )
    }
}

/// Insert `subview` into `superview` and pin its four margins at `insets`.
///
/// Fails without installing anything when the host refuses the insertion.
pub fn add_subview<V, I>(
    installer: &mut I,
    superview: &V,
    subview: V,
    insets: EdgeInsets,
) -> Result<InstallReport<V, I::Error>, I::Error>
where
    V: Clone + PartialEq,
    I: ConstraintInstaller<V> + ?Sized,
{
    installer.insert_subview(superview, &subview)?;
    let substitutions = Substitutions::Indexed(vec![subview]);
    Ok(add_constraints_from_equations(
        installer,
        superview,
        &[insets.margin_equation()],
        &substitutions,
        &NoKeyPaths,
    ))
}

/// Installer that keeps everything in memory. Useful for tools that only
/// want to inspect the resulting constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingInstaller<V> {
    pub constraints: Vec<ConstraintDescriptor<V>>,
    /// `(superview, subview)` pairs, in insertion order.
    pub hierarchy: Vec<(V, V)>,
}

impl<V> Default for RecordingInstaller<V> {
    fn default() -> Self {
        RecordingInstaller {
            constraints: Vec::new(),
            hierarchy: Vec::new(),
        }
    }
}

impl<V> RecordingInstaller<V> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V: Clone> ConstraintInstaller<V> for RecordingInstaller<V> {
    type Error = Infallible;

    fn install(&mut self, descriptor: &ConstraintDescriptor<V>) -> Result<(), Infallible> {
        self.constraints.push(descriptor.clone());
        Ok(())
    }

    fn insert_subview(&mut self, superview: &V, subview: &V) -> Result<(), Infallible> {
        self.hierarchy.push((superview.clone(), subview.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Attribute;

    /// Rejects any constraint on `height`, and any subview named "locked".
    #[derive(Default)]
    struct PickyInstaller {
        accepted: Vec<ConstraintDescriptor<&'static str>>,
    }

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("rejected")]
    struct Rejected;

    impl ConstraintInstaller<&'static str> for PickyInstaller {
        type Error = Rejected;

        fn install(&mut self, d: &ConstraintDescriptor<&'static str>) -> Result<(), Rejected> {
            if d.item_attribute == Attribute::Height {
                return Err(Rejected);
            }
            self.accepted.push(d.clone());
            Ok(())
        }

        fn insert_subview(
            &mut self,
            _superview: &&'static str,
            subview: &&'static str,
        ) -> Result<(), Rejected> {
            if *subview == "locked" {
                Err(Rejected)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn failures_are_isolated() {
        let mut installer = PickyInstaller::default();
        let report = add_constraints_from_equations(
            &mut installer,
            &"root",
            &["$self.(width, height, top) = 10", "$self.left = $9.left"],
            &Substitutions::default(),
            &NoKeyPaths,
        );
        assert_eq!(report.installed, 2);
        assert_eq!(report.install_failures.len(), 1);
        assert_eq!(report.install_failures[0].descriptor.item_attribute, Attribute::Height);
        assert_eq!(report.compile_errors.len(), 1);
        assert_eq!(report.compile_errors[0].index, 1);
        assert_eq!(installer.accepted.len(), 2);
        assert!(!report.is_ok());
    }

    #[test]
    fn margin_equation_text() {
        assert_eq!(
            EdgeInsets::new(1.0, 2.0, 3.0, 4.5).margin_equation(),
            "$0.margins = $self.margins + (1, 2, -3, -4.5)"
        );
    }

    #[test]
    fn add_subview_pins_four_margins() {
        let mut installer = RecordingInstaller::new();
        let insets = EdgeInsets::new(10.0, 20.0, 30.0, 40.0);
        let report = add_subview(&mut installer, &"super", "sub", insets).unwrap();
        assert!(report.is_ok());
        assert_eq!(installer.hierarchy, vec![("super", "sub")]);

        let pinned: Vec<(Attribute, f64)> = installer
            .constraints
            .iter()
            .map(|d| (d.item_attribute, d.constant))
            .collect();
        assert_eq!(
            pinned,
            vec![
                (Attribute::Top, 10.0),
                (Attribute::Leading, 20.0),
                (Attribute::Bottom, -30.0),
                (Attribute::Trailing, -40.0),
            ]
        );
        for d in &installer.constraints {
            assert_eq!(d.item_view, "sub");
            assert_eq!(d.related_view, Some("super"));
            assert_eq!(d.related_attribute, Some(d.item_attribute));
        }
    }

    #[test]
    fn add_subview_stops_when_insertion_fails() {
        let mut installer = PickyInstaller::default();
        let result = add_subview(&mut installer, &"super", "locked", EdgeInsets::uniform(8.0));
        assert_eq!(result.err(), Some(Rejected));
        assert!(installer.accepted.is_empty());
    }

    #[test]
    fn zero_insets_still_install_every_edge() {
        let mut installer = RecordingInstaller::new();
        let report = add_subview(&mut installer, &"super", "sub", EdgeInsets::default()).unwrap();
        assert_eq!(report.installed, 4);
    }
}

//! Equation compiler: text -> constraint descriptors.
//!
//! This is a thin orchestrator that runs the lexer, the parser and the four
//! passes in order for each equation, and collects results for a batch.

use crate::descriptor::ConstraintDescriptor;
use crate::error::{CompileError, EquationError};
use crate::lexer;
use crate::parser;
use crate::pass1_expand;
use crate::pass2_resolve;
use crate::pass3_broadcast::{self, BroadcastInput};
use crate::pass4_synthesize;
use crate::view::{KeyPathResolver, Substitutions};

/// Result of compiling a batch. A failing equation never prevents the
/// others from compiling.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutput<V> {
    /// Descriptors of every successful equation, in input order.
    pub descriptors: Vec<ConstraintDescriptor<V>>,
    /// One entry per failed equation, ordered by batch index.
    pub errors: Vec<EquationError>,
}

impl<V> Default for CompileOutput<V> {
    fn default() -> Self {
        CompileOutput {
            descriptors: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<V> CompileOutput<V> {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_parts(self) -> (Vec<ConstraintDescriptor<V>>, Vec<EquationError>) {
        (self.descriptors, self.errors)
    }

    fn record(
        &mut self,
        index: usize,
        equation: &str,
        result: Result<Vec<ConstraintDescriptor<V>>, CompileError>,
    ) {
        match result {
            Ok(descriptors) => {
                tracing::debug!(index, count = descriptors.len(), "compiled equation");
                self.descriptors.extend(descriptors);
            }
            Err(error) => {
                tracing::warn!(index, equation, %error, "equation failed to compile");
                self.errors.push(EquationError::new(index, equation, error));
            }
        }
    }
}

/// Compile one equation string against `receiver` and the substitution views.
pub fn compile_equation<V, K>(
    src: &str,
    receiver: &V,
    substitutions: &Substitutions<V>,
    key_paths: &K,
) -> Result<Vec<ConstraintDescriptor<V>>, CompileError>
where
    V: Clone + PartialEq,
    K: KeyPathResolver<V> + ?Sized,
{
    let tokens = lexer::lex(src)?;
    let equation = parser::parse(&tokens)?;
    tracing::trace!(%equation, "parsed equation");

    // Pass 1: attribute expansion
    let left_attributes = pass1_expand::expand(&equation.left.attributes);
    let right_attributes = pass1_expand::expand(&equation.right.attributes);

    // Pass 2: view resolution
    let left_views =
        pass2_resolve::resolve(&equation.left.view, receiver, substitutions, key_paths)?
            .into_views();
    let right_views = match &equation.right.view {
        Some(path) => Some(
            pass2_resolve::resolve(path, receiver, substitutions, key_paths)?.into_views(),
        ),
        None => None,
    };

    // Pass 3: broadcasting
    let aligned = pass3_broadcast::broadcast(&BroadcastInput {
        left_views: &left_views,
        left_attributes: &left_attributes,
        right_views: right_views.as_deref(),
        right_attributes: &right_attributes,
        constants: &equation.right.constants,
    })?;

    // Pass 4: synthesis
    Ok(pass4_synthesize::synthesize(&equation, aligned))
}

/// Compile a batch of equation strings. Errors are reported per input index
/// and never abort the rest of the batch.
pub fn compile<V, K, S>(
    equations: &[S],
    receiver: &V,
    substitutions: &Substitutions<V>,
    key_paths: &K,
) -> CompileOutput<V>
where
    V: Clone + PartialEq,
    K: KeyPathResolver<V> + ?Sized,
    S: AsRef<str>,
{
    let mut output = CompileOutput::default();
    for (index, equation) in equations.iter().enumerate() {
        let src = equation.as_ref();
        let result = compile_equation(src, receiver, substitutions, key_paths);
        output.record(index, src, result);
    }
    output
}

/// Like [`compile`], but compiles the equations on the rayon thread pool.
/// Results are merged by input index, so the output is identical to the
/// sequential version.
#[cfg(feature = "parallel")]
pub fn compile_parallel<V, K, S>(
    equations: &[S],
    receiver: &V,
    substitutions: &Substitutions<V>,
    key_paths: &K,
) -> CompileOutput<V>
where
    V: Clone + PartialEq + Send + Sync,
    K: KeyPathResolver<V> + Sync + ?Sized,
    S: AsRef<str> + Sync,
{
    use rayon::prelude::*;

    let results: Vec<_> = equations
        .par_iter()
        .map(|equation| compile_equation(equation.as_ref(), receiver, substitutions, key_paths))
        .collect();

    let mut output = CompileOutput::default();
    for (index, (equation, result)) in equations.iter().zip(results).enumerate() {
        output.record(index, equation.as_ref(), result);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Attribute, Relation};
    use crate::error::{BroadcastError, ListKind, ParseError, ResolveError};
    use crate::view::{KeyPathTable, NoKeyPaths};

    fn subs() -> Substitutions<&'static str> {
        [("other".to_string(), "other"), ("box".to_string(), "box")]
            .into_iter()
            .collect()
    }

    fn compile_one(src: &str) -> Result<Vec<ConstraintDescriptor<&'static str>>, CompileError> {
        compile_equation(src, &"root", &subs(), &NoKeyPaths)
    }

    #[test]
    fn view_to_view() {
        let out = compile_one("$self.width = $other.width").unwrap();
        assert_eq!(
            out,
            vec![ConstraintDescriptor {
                item_view: "root",
                item_attribute: Attribute::Width,
                relation: Relation::Equal,
                related_view: Some("other"),
                related_attribute: Some(Attribute::Width),
                multiplier: 1.0,
                constant: 0.0,
                priority: 1000,
            }]
        );
    }

    #[test]
    fn right_attributes_default_to_the_left_ones() {
        let out = compile_one("$self.size = 0.5($box)").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].related_attribute, Some(Attribute::Width));
        assert_eq!(out[1].related_attribute, Some(Attribute::Height));
        assert!(out.iter().all(|d| d.multiplier == 0.5));
    }

    #[test]
    fn key_paths_reach_nested_views() {
        let keys = KeyPathTable::new().with("box", "label", "label");
        let out = compile_equation("$box.label.leading = $box.leading + 8", &"root", &subs(), &keys)
            .unwrap();
        assert_eq!(out[0].item_view, "label");
        assert_eq!(out[0].related_view, Some("box"));
        assert_eq!(out[0].constant, 8.0);
    }

    #[test]
    fn each_stage_reports_its_own_error() {
        assert!(matches!(compile_one("$self.width = 5 !"), Err(CompileError::Lex(_))));
        assert!(matches!(
            compile_one("$self.width = $x.width + 1 * 2"),
            Err(CompileError::Parse(ParseError::MultiplierAfterConstant(_)))
        ));
        assert_eq!(
            compile_one("$self.width = $missing.width"),
            Err(CompileError::Resolve(ResolveError::UnknownView {
                name: "missing".into(),
                pos: 14,
            }))
        );
        assert_eq!(
            compile_one("$self.width = $other.(width, height)"),
            Err(CompileError::Broadcast(BroadcastError::SizeMismatch {
                component: ListKind::RightAttributes,
                expected: 1,
                got: 2,
            }))
        );
    }

    #[test]
    fn resolve_errors_point_at_the_view() {
        let err = compile_one("$box.width <= $ghost.height").unwrap_err();
        assert_eq!(err.kind(), "resolve");
        assert_eq!(err.pos(), Some(14));
    }

    #[test]
    fn reserved_substitution_names_fail_every_equation() {
        let subs: Substitutions<&str> = [("self".to_string(), "s"), ("box".to_string(), "box")]
            .into_iter()
            .collect();
        let output = compile(&["$self.width = 10", "$box.top = 0"], &"root", &subs, &NoKeyPaths);
        assert!(output.descriptors.is_empty());
        assert_eq!(output.errors.len(), 2);
        assert!(output
            .errors
            .iter()
            .all(|e| e.error == CompileError::Resolve(ResolveError::ReservedName("self".into()))));
    }

    #[test]
    fn batch_keeps_going_after_a_failure() {
        let output = compile(
            &["$self.width = 10", "$self.height = = 5", "$self.top = $box.top"],
            &"root",
            &subs(),
            &NoKeyPaths,
        );
        assert_eq!(output.descriptors.len(), 2);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].index, 1);
        assert_eq!(output.errors[0].equation, "$self.height = = 5");
        assert!(!output.is_ok());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let equations: Vec<String> = (0..64)
            .map(|i| {
                if i % 7 == 3 {
                    format!("$self.width = $nope{}.width", i)
                } else {
                    format!("$self.(top, bottom) = $box.top + ({}, -)", i)
                }
            })
            .collect();
        let sequential = compile(&equations, &"root", &subs(), &NoKeyPaths);
        let parallel = compile_parallel(&equations, &"root", &subs(), &NoKeyPaths);
        assert_eq!(sequential, parallel);
    }
}

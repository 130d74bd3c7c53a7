#![allow(clippy::result_large_err)]
//! autolay-core: compiler for layout constraint equations.
//!
//! Turns equation strings such as `"$self.(top, bottom) = $0.top + (8, -)"`
//! into fully resolved [`ConstraintDescriptor`]s, ready to be handed to a
//! layout framework.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`compile()`] -- compile a batch of equations, collecting per-index errors
//! - [`compile_equation()`] -- compile one equation string
//! - [`Substitutions`] -- the caller's views, addressed by index or name
//! - [`KeyPathResolver`] -- property lookup used by `$view.key.path` references
//! - [`ConstraintDescriptor`] -- one output constraint
//! - [`CompileError`] / [`EquationError`] -- error types
//! - [`ConstraintInstaller`] -- hook for activating descriptors on a host
//!
//! Individual pass entry functions are also re-exported for selective
//! pipeline execution.

pub mod ast;
pub mod compile;
pub mod descriptor;
pub mod error;
pub mod install;
pub mod lexer;
pub mod parser;
pub mod pass1_expand;
pub mod pass2_resolve;
pub mod pass3_broadcast;
pub mod pass4_synthesize;
pub mod view;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Attribute, AttributeName, Equation, Relation, ViewPath, ViewRef};
pub use descriptor::ConstraintDescriptor;
pub use error::{BroadcastError, CompileError, EquationError, LexError, ParseError, ResolveError};
pub use install::{ConstraintInstaller, EdgeInsets, InstallReport, RecordingInstaller};
pub use view::{KeyPathResolver, KeyPathTable, NoKeyPaths, Substitutions};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::{compile, compile_equation, CompileOutput};
#[cfg(feature = "parallel")]
pub use compile::compile_parallel;
pub use install::{add_constraints_from_equations, add_subview};
pub use lexer::lex;
pub use parser::{parse, parse_str};
pub use pass1_expand::expand;
pub use pass2_resolve::resolve;
pub use pass3_broadcast::broadcast;
pub use pass4_synthesize::synthesize;

/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Correctness oracles for compiler transforms and gradient computations.
//!
//! This crate provides:
//! - A finite-difference gradient checker with adaptive precision
//!   (forward, central, then Richardson-extrapolated differences).
//! - A range-exhaustive oracle that proves an integer predicate at every
//!   point of a finite grid and reports the first counterexample.
//! - A consistency checker for transforms between integer constraint
//!   systems, verifying that the forward/backward maps are mutually inverse
//!   and preserve the target relations.
//!
//! # Expressions
//!
//! Predicates are [`IntExpr`] trees, built directly or parsed from text with
//! [`parse_expr`] / [`parse_predicate`]. The oracle and checker only use the
//! [`ExprEngine`] trait; [`Interpreter`] is the bundled implementation.
//!
//! # Enumeration order
//!
//! Grids are enumerated row-major over [`VarRanges`] in insertion order, so
//! the first variable varies slowest. Counterexamples are always the first
//! failing point in that order.

mod ast;
mod diagnostics;
mod engine;
mod errors;
mod expr;
mod gradient;
mod numeric;
mod oracle;
mod parser;
mod ranges;
mod transform;

pub use ast::{BinOp, UnaryOp};
pub use diagnostics::ParseError;
pub use engine::{ExprEngine, Interpreter, Value, assert_provably_equal};
pub use errors::{
    AllcloseError, ConsistencyStep, Counterexample, Direction, EngineError, GradCheckError,
    OracleError, ToleranceReport, TransformError,
};
pub use expr::{IntExpr, SubstitutionMap};
pub use gradient::{
    GradCheckConfig, GradCheckReport, GradientMap, ValueAssignment, VariableSummary,
    check_numerical_grads, check_numerical_grads_ordered,
};
pub use numeric::assert_allclose;
pub use oracle::{DEFAULT_MAX_GRID_POINTS, RangeEquivalenceOracle};
pub use ranges::{Range, VarRanges};
pub use transform::{ConstraintSystem, ConstraintTransform, TransformConsistencyChecker};

use expr::{ValueKind, lower_expr};

/// Parses an integer or boolean expression.
pub fn parse_expr(source: &str) -> Result<IntExpr, ParseError> {
    let ast = parser::parse_expression(source)?;
    let (expr, _) = lower_expr(&ast, source)?;
    Ok(expr)
}

/// Parses an expression that must be boolean.
pub fn parse_predicate(source: &str) -> Result<IntExpr, ParseError> {
    let ast = parser::parse_expression(source)?;
    match lower_expr(&ast, source)? {
        (expr, ValueKind::Bool) => Ok(expr),
        (_, ValueKind::Int) => Err(ParseError::at(
            "Expected a boolean predicate, found an integer expression",
            source,
            &ast.span,
        )),
    }
}

/// Proves `predicate` over `ranges` (optionally assuming `precondition`)
/// with the bundled [`Interpreter`].
pub fn verify_predicate(
    predicate: &str,
    ranges: &VarRanges,
    precondition: Option<&str>,
) -> Result<(), OracleError> {
    let predicate = parse_predicate(predicate)?;
    let precondition = precondition.map(parse_predicate).transpose()?;
    RangeEquivalenceOracle::new(&Interpreter).verify(&predicate, ranges, precondition.as_ref())
}

/// Checks `transform` with the bundled [`Interpreter`]; `ranges` covers
/// variables shared by both systems.
pub fn verify_transform(
    transform: &ConstraintTransform,
    ranges: &VarRanges,
) -> Result<(), TransformError> {
    TransformConsistencyChecker::new(&Interpreter)
        .with_ranges(ranges.clone())
        .verify(transform)
}

#[cfg(test)]
mod tests;

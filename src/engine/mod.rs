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

//! Expression-evaluation engine contract and the bundled interpreter.
//!
//! The oracle and the transform checker only talk to [`ExprEngine`], so any
//! backend that can substitute, simplify, prove equalities and evaluate over a
//! dense grid can be plugged in.

mod interp;
mod poly;
mod simplify;

use crate::errors::{EngineError, OracleError};
use crate::{IntExpr, SubstitutionMap, VarRanges};
use ndarray::ArrayD;
use std::fmt;

pub use interp::Interpreter;

/// Concrete result of evaluating an expression at one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    /// Boolean interpretation; integers are true when non-zero.
    pub fn truthy(self) -> bool {
        match self {
            Value::Bool(b) => b,
            Value::Int(v) => v != 0,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Services the verification algorithms need from an expression backend.
pub trait ExprEngine {
    /// Replaces free variables named in `bindings`, simultaneously.
    fn substitute(&self, expr: &IntExpr, bindings: &SubstitutionMap) -> IntExpr;

    /// Evaluates `expr` at every point of the grid spanned by `ranges`.
    ///
    /// The result has one axis per range, in `ranges` order, and element
    /// `[i0, i1, ...]` holds the value at `var_k = min_k + i_k`. Every free
    /// variable of `expr` must have a range.
    fn evaluate_over_grid(
        &self,
        expr: &IntExpr,
        ranges: &VarRanges,
    ) -> Result<ArrayD<Value>, EngineError>;

    /// Returns an equivalent, usually smaller, expression.
    fn simplify(&self, expr: &IntExpr) -> IntExpr;

    /// Returns `true` only when `lhs == rhs` holds for every assignment.
    fn provably_equal(&self, lhs: &IntExpr, rhs: &IntExpr) -> bool;
}

/// Fails unless `engine` can prove `lhs` and `rhs` equal.
pub fn assert_provably_equal<E: ExprEngine + ?Sized>(
    engine: &E,
    lhs: &IntExpr,
    rhs: &IntExpr,
) -> Result<(), OracleError> {
    if engine.provably_equal(lhs, rhs) {
        return Ok(());
    }
    Err(OracleError::NotProvablyEqual {
        lhs: engine.simplify(lhs).to_string(),
        rhs: engine.simplify(rhs).to_string(),
    })
}

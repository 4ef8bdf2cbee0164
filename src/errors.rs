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

//! Error types surfaced by the verification APIs.

use crate::ParseError;
use std::fmt;

/// Failures raised by an [`crate::ExprEngine`] while evaluating expressions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The expression mentions a variable with no value or range.
    #[error("Unbound variable '{0}'")]
    UnboundVariable(String),
    /// Floor division or modulo by zero.
    #[error("Division by zero in '{0}'")]
    DivisionByZero(String),
    /// Intermediate value does not fit in `i64`.
    #[error("Integer overflow in '{0}'")]
    Overflow(String),
    /// An operator received an operand of the wrong type.
    #[error("Expected {expected} value in '{expr}'")]
    TypeMismatch {
        /// Expected operand type.
        expected: &'static str,
        /// Offending sub-expression.
        expr: String,
    },
    /// Grid results could not be assembled into an array.
    #[error("Cannot build result grid: {0}")]
    Grid(String),
}

/// Concrete free-variable assignment at which a checked predicate is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    /// Simplified text of the checked predicate.
    pub predicate: String,
    /// Rendered ranges the predicate was checked over.
    pub ranges: String,
    /// Variable values sorted by variable name.
    pub assignment: Vec<(String, i64)>,
}

impl Counterexample {
    /// Returns the value assigned to `name`.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.assignment
            .iter()
            .find(|(var, _)| var == name)
            .map(|(_, value)| *value)
    }

    /// Renders `a = 1, b = 2`.
    pub fn assignment_text(&self) -> String {
        self.assignment
            .iter()
            .map(|(var, value)| format!("{var} = {value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expression {}\nis not true on {}\nCounterexample: {}",
            self.predicate,
            self.ranges,
            self.assignment_text()
        )
    }
}

/// Errors produced by [`crate::RangeEquivalenceOracle`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// A grid point violates the checked predicate.
    #[error("{0}")]
    CounterexampleFound(Counterexample),
    /// A range has a negative extent.
    #[error("Range of '{variable}' has negative extent {extent}")]
    InvalidRange {
        /// Variable name.
        variable: String,
        /// Offending extent.
        extent: i64,
    },
    /// The grid is larger than the configured limit.
    #[error("Grid of {points} points exceeds the limit of {limit}")]
    GridTooLarge {
        /// Number of grid points (saturated at `u64::MAX`).
        points: u64,
        /// Configured limit.
        limit: u64,
    },
    /// Two expressions could not be proven equal.
    #[error("{lhs} and {rhs} are not provably equal")]
    NotProvablyEqual {
        /// Left-hand side, simplified.
        lhs: String,
        /// Right-hand side, simplified.
        rhs: String,
    },
    /// Predicate text could not be parsed.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// The engine failed to evaluate the predicate.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl OracleError {
    /// Returns the counterexample when the predicate was refuted.
    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            OracleError::CounterexampleFound(cex) => Some(cex),
            _ => None,
        }
    }
}

/// Which of the two transform directions is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `src` variables mapped into `dst` and back.
    SrcToDst,
    /// `dst` variables mapped into `src` and back.
    DstToSrc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::SrcToDst => write!(f, "src -> dst"),
            Direction::DstToSrc => write!(f, "dst -> src"),
        }
    }
}

/// The part of the consistency predicate refuted by a counterexample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyStep {
    /// Some variable does not survive the forward/backward round trip.
    Injectivity,
    /// Target relations or ranges fail when pulled back through the inverse map.
    ValidityPreservation,
}

impl fmt::Display for ConsistencyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyStep::Injectivity => write!(f, "injectivity"),
            ConsistencyStep::ValidityPreservation => write!(f, "validity preservation"),
        }
    }
}

/// Errors produced by [`crate::TransformConsistencyChecker`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// The maps are not a consistent bijection in `direction`.
    #[error("Transform check failed in direction {direction} ({step}):\n{counterexample}")]
    Inconsistent {
        /// Direction that failed.
        direction: Direction,
        /// Refuted part of the predicate.
        step: ConsistencyStep,
        /// Oracle counterexample.
        counterexample: Counterexample,
    },
    /// The oracle failed for a reason other than a counterexample.
    #[error("Transform check failed in direction {direction}: {source}")]
    Oracle {
        /// Direction that failed.
        direction: Direction,
        /// Underlying oracle error.
        source: OracleError,
    },
}

impl TransformError {
    pub fn direction(&self) -> Direction {
        match self {
            TransformError::Inconsistent { direction, .. }
            | TransformError::Oracle { direction, .. } => *direction,
        }
    }

    /// Returns the counterexample when the transform was refuted.
    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            TransformError::Inconsistent { counterexample, .. } => Some(counterexample),
            TransformError::Oracle { source, .. } => source.counterexample(),
        }
    }
}

/// Aggregate mismatch details for one gradient variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceReport {
    /// Variable name (synthetic `"0"`, `"1"`, ... for ordered inputs).
    pub variable: String,
    /// Gradient shape.
    pub shape: Vec<usize>,
    /// Analytical gradient in row-major order.
    pub analytical: Vec<f64>,
    /// Numerical gradient in row-major order.
    pub numerical: Vec<f64>,
    /// Total number of positions failing the element-wise test.
    pub wrong_count: usize,
    /// `floor(100 * wrong_count / n)`.
    pub wrong_percentage: usize,
    /// First (at most 10) failing positions as multi-indices, row-major order.
    pub wrong_positions: Vec<Vec<usize>>,
    /// `||numerical - analytical||_2`.
    pub distance: f64,
    /// `||numerical||_2`.
    pub grad_norm: f64,
    /// Absolute tolerance used.
    pub atol: f64,
    /// Relative tolerance used.
    pub rtol: f64,
    /// `sqrt(n)` factor applied to `atol`.
    pub sqrt_n: f64,
}

impl fmt::Display for ToleranceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Analytical and numerical grads wrt '{}' differ too much\n\
             analytical grad = {:?}\n numerical grad = {:?}\n\
             {}% of elements differ, first 10 of wrong positions: {:?}\n\
             distance > atol*sqrt(n) + rtol*grad_norm\n\
             distance {} > {}*{} + {}*{}",
            self.variable,
            self.analytical,
            self.numerical,
            self.wrong_percentage,
            self.wrong_positions,
            self.distance,
            self.atol,
            self.sqrt_n,
            self.rtol,
            self.grad_norm
        )
    }
}

/// Errors produced by the numerical gradient checker.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradCheckError {
    /// Step or tolerances are unusable.
    #[error("Invalid gradient check configuration: {0}")]
    InvalidConfig(String),
    /// A gradient names a variable that has no input value.
    #[error("Gradient wrt '{0}' has no matching input value")]
    MissingInput(String),
    /// Gradient and value shapes differ.
    #[error("Gradient wrt '{variable}' has unexpected shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        /// Variable name.
        variable: String,
        /// Shape of the input value.
        expected: Vec<usize>,
        /// Shape of the supplied gradient.
        actual: Vec<usize>,
    },
    /// Distance or numerical gradient norm is NaN or infinite.
    #[error(
        "NaN or infinity detected during numerical gradient checking wrt '{variable}'\n\
         analytical grad = {analytical:?}\n numerical grad = {numerical:?}"
    )]
    NonFinite {
        /// Variable name.
        variable: String,
        /// Analytical gradient in row-major order.
        analytical: Vec<f64>,
        /// Numerical gradient in row-major order.
        numerical: Vec<f64>,
    },
    /// Aggregate mismatch beyond `atol * sqrt(n) + rtol * grad_norm`.
    #[error("{0}")]
    ToleranceExceeded(Box<ToleranceReport>),
}

/// Errors produced by [`crate::assert_allclose`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllcloseError {
    /// Arrays have different shapes.
    #[error("Shape mismatch: actual {actual:?}, desired {desired:?}")]
    ShapeMismatch {
        /// Shape of `actual`.
        actual: Vec<usize>,
        /// Shape of `desired`.
        desired: Vec<usize>,
    },
    /// Some elements lie outside `atol + rtol * |desired|`.
    #[error(
        "Not equal to tolerance rtol={rtol}, atol={atol}\n\
         Mismatched elements: {mismatched} / {total}\n\
         Max absolute difference: {max_abs_diff}\n\
         Max relative difference: {max_rel_diff}\n\
         First mismatch at {first_index:?}"
    )]
    Mismatch {
        /// Number of failing elements.
        mismatched: usize,
        /// Total number of elements.
        total: usize,
        /// Largest `|actual - desired|`.
        max_abs_diff: f64,
        /// Largest `|actual - desired| / |desired|`.
        max_rel_diff: f64,
        /// Multi-index of the first failing element.
        first_index: Vec<usize>,
        /// Relative tolerance used.
        rtol: f64,
        /// Absolute tolerance used.
        atol: f64,
    },
}

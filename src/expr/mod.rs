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

//! Symbolic integer/boolean expressions consumed by the engine.
//!
//! [`IntExpr`] is the lowered form of a parsed predicate and the currency of
//! [`crate::ExprEngine`]. Builders mirror the textual operators so transforms
//! can be written without going through the parser.

mod lower;

use crate::ast::{BinOp, UnaryOp};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub(crate) use lower::{ValueKind, lower_expr};

/// Per-variable rewriting of one variable space in terms of another.
///
/// Substitution is simultaneous: replacement expressions are not rewritten
/// again by the same map.
pub type SubstitutionMap = BTreeMap<String, IntExpr>;

/// Symbolic integer or boolean expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntExpr {
    /// Integer constant.
    Int(i64),
    /// Boolean constant.
    Bool(bool),
    /// Free variable.
    Var(String),
    /// Prefix operation.
    Unary(UnaryOp, Box<IntExpr>),
    /// Infix operation, or `min`/`max`.
    Binary(BinOp, Box<IntExpr>, Box<IntExpr>),
    /// `select(cond, then, otherwise)`.
    Select(Box<IntExpr>, Box<IntExpr>, Box<IntExpr>),
}

impl IntExpr {
    pub fn int(value: i64) -> Self {
        IntExpr::Int(value)
    }

    pub fn boolean(value: bool) -> Self {
        IntExpr::Bool(value)
    }

    pub fn var(name: impl Into<String>) -> Self {
        IntExpr::Var(name.into())
    }

    pub fn unary(op: UnaryOp, operand: IntExpr) -> Self {
        IntExpr::Unary(op, Box::new(operand))
    }

    pub fn binary(op: BinOp, left: IntExpr, right: IntExpr) -> Self {
        IntExpr::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn neg(operand: IntExpr) -> Self {
        Self::unary(UnaryOp::Neg, operand)
    }

    pub fn not(operand: IntExpr) -> Self {
        Self::unary(UnaryOp::Not, operand)
    }

    pub fn add(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Add, left, right)
    }

    pub fn sub(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Sub, left, right)
    }

    pub fn mul(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Mul, left, right)
    }

    pub fn floordiv(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::FloorDiv, left, right)
    }

    pub fn floormod(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::FloorMod, left, right)
    }

    pub fn min(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Min, left, right)
    }

    pub fn max(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Max, left, right)
    }

    pub fn eq(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Eq, left, right)
    }

    pub fn ne(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Ne, left, right)
    }

    pub fn lt(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Lt, left, right)
    }

    pub fn le(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Le, left, right)
    }

    pub fn gt(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Gt, left, right)
    }

    pub fn ge(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Ge, left, right)
    }

    pub fn and(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::And, left, right)
    }

    pub fn or(left: IntExpr, right: IntExpr) -> Self {
        Self::binary(BinOp::Or, left, right)
    }

    pub fn select(cond: IntExpr, then: IntExpr, otherwise: IntExpr) -> Self {
        IntExpr::Select(Box::new(cond), Box::new(then), Box::new(otherwise))
    }

    /// Left-folded conjunction; the empty conjunction is `true`.
    pub fn all(terms: impl IntoIterator<Item = IntExpr>) -> Self {
        terms
            .into_iter()
            .reduce(IntExpr::and)
            .unwrap_or(IntExpr::Bool(true))
    }

    /// Left-folded disjunction; the empty disjunction is `false`.
    pub fn any(terms: impl IntoIterator<Item = IntExpr>) -> Self {
        terms
            .into_iter()
            .reduce(IntExpr::or)
            .unwrap_or(IntExpr::Bool(false))
    }

    /// Returns whether the expression is the literal `true`.
    pub fn is_true(&self) -> bool {
        matches!(self, IntExpr::Bool(true))
    }

    /// Returns the sorted set of free variable names.
    pub fn free_vars(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut BTreeSet<String>) {
        match self {
            IntExpr::Int(_) | IntExpr::Bool(_) => {}
            IntExpr::Var(name) => {
                out.insert(name.clone());
            }
            IntExpr::Unary(_, operand) => operand.collect_vars(out),
            IntExpr::Binary(_, left, right) => {
                left.collect_vars(out);
                right.collect_vars(out);
            }
            IntExpr::Select(cond, then, otherwise) => {
                cond.collect_vars(out);
                then.collect_vars(out);
                otherwise.collect_vars(out);
            }
        }
    }

    /// Binding strength used by `Display` to decide on parentheses.
    fn precedence(&self) -> u8 {
        match self {
            IntExpr::Int(v) if *v < 0 => 7,
            IntExpr::Int(_) | IntExpr::Bool(_) | IntExpr::Var(_) | IntExpr::Select(..) => 9,
            IntExpr::Unary(UnaryOp::Neg, _) => 7,
            IntExpr::Unary(UnaryOp::Not, _) => 3,
            IntExpr::Binary(op, _, _) => binary_precedence(*op),
        }
    }
}

fn binary_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 4,
        BinOp::Add | BinOp::Sub => 5,
        BinOp::Mul | BinOp::FloorDiv | BinOp::FloorMod => 6,
        BinOp::Min | BinOp::Max => 9,
    }
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, expr: &IntExpr, min_precedence: u8) -> fmt::Result {
    if expr.precedence() < min_precedence {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for IntExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntExpr::Int(v) => write!(f, "{v}"),
            IntExpr::Bool(b) => write!(f, "{b}"),
            IntExpr::Var(name) => write!(f, "{name}"),
            IntExpr::Unary(UnaryOp::Neg, operand) => {
                write!(f, "-")?;
                fmt_operand(f, operand, 7)
            }
            IntExpr::Unary(UnaryOp::Not, operand) => {
                write!(f, "!")?;
                fmt_operand(f, operand, 7)
            }
            IntExpr::Binary(op @ (BinOp::Min | BinOp::Max), left, right) => {
                write!(f, "{}({left}, {right})", op.symbol())
            }
            IntExpr::Binary(op, left, right) => {
                let own = binary_precedence(*op);
                // Comparisons do not chain, so both sides bind tighter.
                let (left_min, right_min) = if op.is_comparison() {
                    (own + 1, own + 1)
                } else {
                    (own, own + 1)
                };
                fmt_operand(f, left, left_min)?;
                write!(f, " {} ", op.symbol())?;
                fmt_operand(f, right, right_min)
            }
            IntExpr::Select(cond, then, otherwise) => {
                write!(f, "select({cond}, {then}, {otherwise})")
            }
        }
    }
}

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

//! Bottom-up rewriting used by [`super::Interpreter`]'s `simplify`.

use super::Value;
use super::interp::int_binary;
use super::poly::Poly;
use crate::IntExpr;
use crate::ast::{BinOp, UnaryOp};

/// Returns an equivalent expression with constants folded, boolean
/// identities applied and `+ - *` subtrees in polynomial normal form.
pub(crate) fn simplify(expr: &IntExpr) -> IntExpr {
    match expr {
        IntExpr::Int(_) | IntExpr::Bool(_) | IntExpr::Var(_) => expr.clone(),
        IntExpr::Unary(UnaryOp::Neg, operand) => canonical(IntExpr::neg(simplify(operand))),
        IntExpr::Unary(UnaryOp::Not, operand) => simplify_not(simplify(operand)),
        IntExpr::Binary(op, left, right) => {
            let left = simplify(left);
            let right = simplify(right);
            match op {
                BinOp::And => simplify_and(left, right),
                BinOp::Or => simplify_or(left, right),
                op if op.is_comparison() => simplify_comparison(*op, left, right),
                BinOp::Add | BinOp::Sub | BinOp::Mul => {
                    canonical(IntExpr::binary(*op, left, right))
                }
                _ => simplify_arith(*op, left, right),
            }
        }
        IntExpr::Select(cond, then, otherwise) => {
            let then = simplify(then);
            let otherwise = simplify(otherwise);
            match simplify(cond) {
                IntExpr::Bool(true) => then,
                IntExpr::Bool(false) => otherwise,
                _ if then == otherwise => then,
                cond => IntExpr::select(cond, then, otherwise),
            }
        }
    }
}

/// Replaces a `+ - *` tree by its polynomial normal form when one exists.
fn canonical(expr: IntExpr) -> IntExpr {
    match Poly::from_expr(&expr) {
        Some(poly) => poly.to_expr(),
        None => expr,
    }
}

fn fold(op: BinOp, left: &IntExpr, right: &IntExpr) -> Option<IntExpr> {
    let (IntExpr::Int(l), IntExpr::Int(r)) = (left, right) else {
        return None;
    };
    // Faulting constant operations are left in place for evaluation to report.
    match int_binary(op, *l, *r)? {
        Ok(Value::Int(v)) => Some(IntExpr::Int(v)),
        Ok(Value::Bool(b)) => Some(IntExpr::Bool(b)),
        Err(_) => None,
    }
}

fn simplify_arith(op: BinOp, left: IntExpr, right: IntExpr) -> IntExpr {
    if let Some(folded) = fold(op, &left, &right) {
        return folded;
    }
    match (op, &right) {
        (BinOp::FloorDiv, IntExpr::Int(1)) => return left,
        (BinOp::FloorMod, IntExpr::Int(1)) => return IntExpr::Int(0),
        _ => {}
    }
    if matches!(op, BinOp::Min | BinOp::Max) && left == right {
        return left;
    }
    IntExpr::binary(op, left, right)
}

fn simplify_comparison(op: BinOp, left: IntExpr, right: IntExpr) -> IntExpr {
    if let Some(folded) = fold(op, &left, &right) {
        return folded;
    }
    if let (IntExpr::Bool(l), IntExpr::Bool(r)) = (&left, &right) {
        return IntExpr::Bool((l == r) == (op == BinOp::Eq));
    }

    // Operands that differ by a known constant decide the comparison.
    let difference = Poly::from_expr(&left)
        .zip(Poly::from_expr(&right))
        .and_then(|(l, r)| l.minus(r))
        .and_then(|d| d.as_constant());
    let difference = difference.or(if left == right { Some(0) } else { None });
    if let Some(d) = difference {
        if let Some(folded) = fold(op, &IntExpr::Int(d), &IntExpr::Int(0)) {
            return folded;
        }
    }
    IntExpr::binary(op, left, right)
}

fn simplify_not(operand: IntExpr) -> IntExpr {
    match operand {
        IntExpr::Bool(b) => IntExpr::Bool(!b),
        IntExpr::Unary(UnaryOp::Not, inner) => *inner,
        IntExpr::Binary(op, left, right) => match op.negated_comparison() {
            Some(negated) => IntExpr::Binary(negated, left, right),
            None => IntExpr::not(IntExpr::Binary(op, left, right)),
        },
        other => IntExpr::not(other),
    }
}

fn simplify_and(left: IntExpr, right: IntExpr) -> IntExpr {
    match (left, right) {
        (IntExpr::Bool(false), _) | (_, IntExpr::Bool(false)) => IntExpr::Bool(false),
        (IntExpr::Bool(true), other) | (other, IntExpr::Bool(true)) => other,
        (l, r) if l == r => l,
        (l, r) => IntExpr::and(l, r),
    }
}

fn simplify_or(left: IntExpr, right: IntExpr) -> IntExpr {
    match (left, right) {
        (IntExpr::Bool(true), _) | (_, IntExpr::Bool(true)) => IntExpr::Bool(true),
        (IntExpr::Bool(false), other) | (other, IntExpr::Bool(false)) => other,
        (l, r) if l == r => l,
        (l, r) => IntExpr::or(l, r),
    }
}

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

//! Tree-walking evaluation with checked `i64` arithmetic.

use super::{ExprEngine, Value, poly, simplify};
use crate::ast::{BinOp, UnaryOp};
use crate::errors::EngineError;
use crate::{IntExpr, SubstitutionMap, VarRanges};
use ndarray::{ArrayD, IxDyn};
use std::collections::HashMap;

/// Reference [`ExprEngine`] that interprets [`IntExpr`] trees directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `expr` under a single assignment.
    pub fn evaluate(
        &self,
        expr: &IntExpr,
        env: &HashMap<&str, i64>,
    ) -> Result<Value, EngineError> {
        eval(expr, env)
    }
}

impl ExprEngine for Interpreter {
    fn substitute(&self, expr: &IntExpr, bindings: &SubstitutionMap) -> IntExpr {
        substitute(expr, bindings)
    }

    fn evaluate_over_grid(
        &self,
        expr: &IntExpr,
        ranges: &VarRanges,
    ) -> Result<ArrayD<Value>, EngineError> {
        if let Some(var) = expr.free_vars().into_iter().find(|v| !ranges.contains(v)) {
            return Err(EngineError::UnboundVariable(var));
        }
        let Some(shape) = ranges.shape() else {
            return Err(EngineError::Grid(format!("negative extent in {ranges}")));
        };
        let total = shape
            .iter()
            .try_fold(1usize, |acc, extent| acc.checked_mul(*extent))
            .ok_or_else(|| EngineError::Grid(format!("too many points in {ranges}")))?;

        let mut env: HashMap<&str, i64> = HashMap::with_capacity(ranges.len());
        let mut index = vec![0usize; shape.len()];
        let mut values = Vec::with_capacity(total);
        for _ in 0..total {
            for ((name, range), offset) in ranges.iter().zip(&index) {
                let value = i64::try_from(*offset)
                    .ok()
                    .and_then(|offset| range.min.checked_add(offset))
                    .ok_or_else(|| EngineError::Overflow(format!("{name} in {range}")))?;
                env.insert(name, value);
            }
            values.push(eval(expr, &env)?);

            // Odometer step: the last axis varies fastest (row-major order).
            for axis in (0..index.len()).rev() {
                index[axis] += 1;
                if index[axis] < shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }

        ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| EngineError::Grid(e.to_string()))
    }

    fn simplify(&self, expr: &IntExpr) -> IntExpr {
        simplify::simplify(expr)
    }

    fn provably_equal(&self, lhs: &IntExpr, rhs: &IntExpr) -> bool {
        let lhs = simplify::simplify(lhs);
        let rhs = simplify::simplify(rhs);
        if lhs == rhs {
            return true;
        }
        match (poly::Poly::from_expr(&lhs), poly::Poly::from_expr(&rhs)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        }
    }
}

/// Simultaneous substitution of free variables.
pub(crate) fn substitute(expr: &IntExpr, bindings: &SubstitutionMap) -> IntExpr {
    match expr {
        IntExpr::Int(_) | IntExpr::Bool(_) => expr.clone(),
        IntExpr::Var(name) => bindings.get(name).cloned().unwrap_or_else(|| expr.clone()),
        IntExpr::Unary(op, operand) => IntExpr::unary(*op, substitute(operand, bindings)),
        IntExpr::Binary(op, left, right) => {
            IntExpr::binary(*op, substitute(left, bindings), substitute(right, bindings))
        }
        IntExpr::Select(cond, then, otherwise) => IntExpr::select(
            substitute(cond, bindings),
            substitute(then, bindings),
            substitute(otherwise, bindings),
        ),
    }
}

/// Arithmetic failure while applying an operator to constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithFault {
    DivisionByZero,
    Overflow,
}

/// Applies an arithmetic or comparison operator to two integers.
///
/// Logical operators are not integer operators and yield `None`.
pub(crate) fn int_binary(op: BinOp, a: i64, b: i64) -> Option<Result<Value, ArithFault>> {
    let int = |v: Option<i64>| v.map(Value::Int).ok_or(ArithFault::Overflow);
    let result = match op {
        BinOp::Add => int(a.checked_add(b)),
        BinOp::Sub => int(a.checked_sub(b)),
        BinOp::Mul => int(a.checked_mul(b)),
        BinOp::FloorDiv => floor_div(a, b).map(Value::Int),
        BinOp::FloorMod => floor_mod(a, b).map(Value::Int),
        BinOp::Min => Ok(Value::Int(a.min(b))),
        BinOp::Max => Ok(Value::Int(a.max(b))),
        BinOp::Eq => Ok(Value::Bool(a == b)),
        BinOp::Ne => Ok(Value::Bool(a != b)),
        BinOp::Lt => Ok(Value::Bool(a < b)),
        BinOp::Le => Ok(Value::Bool(a <= b)),
        BinOp::Gt => Ok(Value::Bool(a > b)),
        BinOp::Ge => Ok(Value::Bool(a >= b)),
        BinOp::And | BinOp::Or => return None,
    };
    Some(result)
}

fn floor_div(a: i64, b: i64) -> Result<i64, ArithFault> {
    if b == 0 {
        return Err(ArithFault::DivisionByZero);
    }
    let q = a.checked_div(b).ok_or(ArithFault::Overflow)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn floor_mod(a: i64, b: i64) -> Result<i64, ArithFault> {
    if b == 0 {
        return Err(ArithFault::DivisionByZero);
    }
    let r = a.checked_rem(b).ok_or(ArithFault::Overflow)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn eval(expr: &IntExpr, env: &HashMap<&str, i64>) -> Result<Value, EngineError> {
    match expr {
        IntExpr::Int(v) => Ok(Value::Int(*v)),
        IntExpr::Bool(b) => Ok(Value::Bool(*b)),
        IntExpr::Var(name) => env
            .get(name.as_str())
            .map(|v| Value::Int(*v))
            .ok_or_else(|| EngineError::UnboundVariable(name.clone())),
        IntExpr::Unary(UnaryOp::Neg, operand) => {
            let v = eval_int(operand, env)?;
            v.checked_neg()
                .map(Value::Int)
                .ok_or_else(|| EngineError::Overflow(expr.to_string()))
        }
        IntExpr::Unary(UnaryOp::Not, operand) => Ok(Value::Bool(!eval_bool(operand, env)?)),
        IntExpr::Binary(BinOp::And, left, right) => {
            Ok(Value::Bool(eval_bool(left, env)? && eval_bool(right, env)?))
        }
        IntExpr::Binary(BinOp::Or, left, right) => {
            Ok(Value::Bool(eval_bool(left, env)? || eval_bool(right, env)?))
        }
        IntExpr::Binary(op @ (BinOp::Eq | BinOp::Ne), left, right) => {
            match (eval(left, env)?, eval(right, env)?) {
                (Value::Bool(l), Value::Bool(r)) => Ok(Value::Bool((l == r) == (*op == BinOp::Eq))),
                (Value::Int(l), Value::Int(r)) => apply(*op, l, r, expr),
                _ => Err(EngineError::TypeMismatch {
                    expected: "matching",
                    expr: expr.to_string(),
                }),
            }
        }
        IntExpr::Binary(op, left, right) => {
            let l = eval_int(left, env)?;
            let r = eval_int(right, env)?;
            apply(*op, l, r, expr)
        }
        IntExpr::Select(cond, then, otherwise) => {
            // Only the chosen branch is evaluated.
            if eval_bool(cond, env)? {
                eval(then, env)
            } else {
                eval(otherwise, env)
            }
        }
    }
}

fn apply(op: BinOp, l: i64, r: i64, expr: &IntExpr) -> Result<Value, EngineError> {
    match int_binary(op, l, r) {
        Some(Ok(value)) => Ok(value),
        Some(Err(ArithFault::DivisionByZero)) => Err(EngineError::DivisionByZero(expr.to_string())),
        Some(Err(ArithFault::Overflow)) => Err(EngineError::Overflow(expr.to_string())),
        None => Err(EngineError::TypeMismatch {
            expected: "integer",
            expr: expr.to_string(),
        }),
    }
}

fn eval_int(expr: &IntExpr, env: &HashMap<&str, i64>) -> Result<i64, EngineError> {
    match eval(expr, env)? {
        Value::Int(v) => Ok(v),
        Value::Bool(_) => Err(EngineError::TypeMismatch {
            expected: "integer",
            expr: expr.to_string(),
        }),
    }
}

fn eval_bool(expr: &IntExpr, env: &HashMap<&str, i64>) -> Result<bool, EngineError> {
    match eval(expr, env)? {
        Value::Bool(b) => Ok(b),
        Value::Int(_) => Err(EngineError::TypeMismatch {
            expected: "boolean",
            expr: expr.to_string(),
        }),
    }
}

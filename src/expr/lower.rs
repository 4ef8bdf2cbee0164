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

//! Type-checked lowering from the spanned AST to [`IntExpr`].

use super::IntExpr;
use crate::ast::{BinOp, Expr, ExprKind, SourceSpan, UnaryOp};
use crate::diagnostics::ParseError;

/// Static result type of a lowered expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Int,
    Bool,
}

impl ValueKind {
    fn name(self) -> &'static str {
        match self {
            ValueKind::Int => "integer",
            ValueKind::Bool => "boolean",
        }
    }
}

/// Lowers a parsed expression, reporting type errors against `source`.
pub(crate) fn lower_expr(expr: &Expr, source: &str) -> Result<(IntExpr, ValueKind), ParseError> {
    LowerContext { source }.lower(expr)
}

struct LowerContext<'a> {
    source: &'a str,
}

impl LowerContext<'_> {
    fn error_at(&self, message: impl Into<String>, span: &SourceSpan) -> ParseError {
        ParseError::at(message, self.source, span)
    }

    fn literal(&self, value: i128, span: &SourceSpan) -> Result<IntExpr, ParseError> {
        i64::try_from(value)
            .map(IntExpr::Int)
            .map_err(|_| self.error_at(format!("Integer literal {value} is out of range"), span))
    }

    fn expect(&self, expr: &Expr, expected: ValueKind) -> Result<IntExpr, ParseError> {
        let (lowered, kind) = self.lower(expr)?;
        if kind != expected {
            return Err(self.error_at(
                format!("Expected {} operand, found {}", expected.name(), kind.name()),
                &expr.span,
            ));
        }
        Ok(lowered)
    }

    fn lower(&self, expr: &Expr) -> Result<(IntExpr, ValueKind), ParseError> {
        match &expr.kind {
            ExprKind::Int(v) => Ok((self.literal(i128::from(*v), &expr.span)?, ValueKind::Int)),
            ExprKind::Bool(b) => Ok((IntExpr::Bool(*b), ValueKind::Bool)),
            // Free variables range over integers.
            ExprKind::Ident(name) => Ok((IntExpr::var(name.as_str()), ValueKind::Int)),
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => {
                // Fold `-<literal>` so negative constants print back the same way.
                if let ExprKind::Int(v) = &operand.kind {
                    return Ok((self.literal(-i128::from(*v), &expr.span)?, ValueKind::Int));
                }
                let inner = self.expect(operand, ValueKind::Int)?;
                Ok((IntExpr::neg(inner), ValueKind::Int))
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                let inner = self.expect(operand, ValueKind::Bool)?;
                Ok((IntExpr::not(inner), ValueKind::Bool))
            }
            ExprKind::Binary { op, left, right } => self.lower_binary(*op, left, right, &expr.span),
            ExprKind::Call { name, args } => self.lower_call(name, args, &expr.span),
        }
    }

    fn lower_binary(
        &self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        span: &SourceSpan,
    ) -> Result<(IntExpr, ValueKind), ParseError> {
        if op.is_logical() {
            let l = self.expect(left, ValueKind::Bool)?;
            let r = self.expect(right, ValueKind::Bool)?;
            return Ok((IntExpr::binary(op, l, r), ValueKind::Bool));
        }

        if matches!(op, BinOp::Eq | BinOp::Ne) {
            // Equality accepts either two integers or two booleans.
            let (l, lk) = self.lower(left)?;
            let (r, rk) = self.lower(right)?;
            if lk != rk {
                return Err(self.error_at(
                    format!(
                        "Cannot compare {} with {} using '{}'",
                        lk.name(),
                        rk.name(),
                        op.symbol()
                    ),
                    span,
                ));
            }
            return Ok((IntExpr::binary(op, l, r), ValueKind::Bool));
        }

        let l = self.expect(left, ValueKind::Int)?;
        let r = self.expect(right, ValueKind::Int)?;
        let kind = if op.is_comparison() {
            ValueKind::Bool
        } else {
            ValueKind::Int
        };
        Ok((IntExpr::binary(op, l, r), kind))
    }

    fn lower_call(
        &self,
        name: &str,
        args: &[Expr],
        span: &SourceSpan,
    ) -> Result<(IntExpr, ValueKind), ParseError> {
        let expected_arity = match name {
            "min" | "max" => 2,
            "select" => 3,
            _ => return Err(self.error_at(format!("Unknown function '{name}'"), span)),
        };
        if args.len() != expected_arity {
            return Err(self.error_at(
                format!(
                    "Function '{name}' expects {expected_arity} arguments, found {}",
                    args.len()
                ),
                span,
            ));
        }

        if name == "select" {
            let cond = self.expect(&args[0], ValueKind::Bool)?;
            let (then, then_kind) = self.lower(&args[1])?;
            let (otherwise, otherwise_kind) = self.lower(&args[2])?;
            if then_kind != otherwise_kind {
                return Err(self.error_at("select branches must have the same type", span));
            }
            return Ok((IntExpr::select(cond, then, otherwise), then_kind));
        }

        let op = if name == "min" { BinOp::Min } else { BinOp::Max };
        let l = self.expect(&args[0], ValueKind::Int)?;
        let r = self.expect(&args[1], ValueKind::Int)?;
        Ok((IntExpr::binary(op, l, r), ValueKind::Int))
    }
}

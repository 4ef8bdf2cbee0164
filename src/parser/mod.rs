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

//! `nom` parser for textual integer predicates.
//!
//! Expressions support:
//! - integer literals, `true`/`false` and identifiers
//! - unary `-` and `!`
//! - binary `* / %`, `+ -`, one comparison `== != < <= > >=`, `&&`, `||`
//! - calls `min(a, b)`, `max(a, b)`, `select(cond, a, b)`
//! - `#` and `//` line comments

mod expr;
mod utils;

use crate::ast::{Expr, SourceSpan, Span};
use crate::diagnostics::ParseError;
use nom::{
    IResult,
    combinator::all_consuming,
    error::{VerboseError, VerboseErrorKind},
    sequence::delimited,
};

use self::utils::trivia;

type PResult<'a, O> = IResult<Span<'a>, O, VerboseError<Span<'a>>>;

/// Parses predicate text into a spanned AST expression.
pub(crate) fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let input = Span::new(source);
    // `all_consuming` ensures trailing garbage is treated as syntax error.
    match all_consuming(delimited(trivia, expr::expr, trivia))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(err) => Err(parse_error_to_diagnostic(err, source)),
    }
}

/// Converts a `nom` verbose error to a crate-level diagnostic.
fn parse_error_to_diagnostic(err: nom::Err<VerboseError<Span<'_>>>, source: &str) -> ParseError {
    match err {
        nom::Err::Incomplete(_) => ParseError::unlocated("Incomplete input"),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            // The first recorded entry is the deepest failure position.
            let Some((span, kind)) = e.errors.first() else {
                return ParseError::unlocated("Syntax error");
            };
            let anchor = SourceSpan::from_bounds(*span, *span);
            let detail = match kind {
                VerboseErrorKind::Context(ctx) => format!("Syntax error: expected {ctx}"),
                VerboseErrorKind::Char(c) => format!("Syntax error: expected '{c}'"),
                VerboseErrorKind::Nom(kind) => format!("Syntax error near {kind:?}"),
            };
            ParseError::at(detail, source, &anchor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, ExprKind, UnaryOp};

    fn binary_parts(expr: &Expr) -> (BinOp, &Expr, &Expr) {
        match &expr.kind {
            ExprKind::Binary { op, left, right } => (*op, left, right),
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn parses_comparison_below_arithmetic() {
        let expr = parse_expression("2*x > 4*y").expect("parse should succeed");
        let (op, left, right) = binary_parts(&expr);
        assert_eq!(op, BinOp::Gt);
        assert_eq!(binary_parts(left).0, BinOp::Mul);
        assert_eq!(binary_parts(right).0, BinOp::Mul);
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse_expression("a < 1 || b < 2 && c < 3").expect("parse should succeed");
        let (op, _, right) = binary_parts(&expr);
        assert_eq!(op, BinOp::Or);
        assert_eq!(binary_parts(right).0, BinOp::And);
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = parse_expression("a - b - c").expect("parse should succeed");
        let (op, left, right) = binary_parts(&expr);
        assert_eq!(op, BinOp::Sub);
        assert_eq!(binary_parts(left).0, BinOp::Sub);
        assert_eq!(right.kind, ExprKind::Ident("c".to_string()));
    }

    #[test]
    fn bang_does_not_swallow_not_equal() {
        let expr = parse_expression("!(x != 1)").expect("parse should succeed");
        let ExprKind::Unary { op, operand } = &expr.kind else {
            panic!("expected unary expression");
        };
        assert_eq!(*op, UnaryOp::Not);
        assert_eq!(binary_parts(operand).0, BinOp::Ne);
    }

    #[test]
    fn recognizes_literals_calls_and_comments() {
        let expr = parse_expression("select(true, min(x, 3), 0) # trailing note")
            .expect("parse should succeed");
        let ExprKind::Call { name, args } = &expr.kind else {
            panic!("expected call");
        };
        assert_eq!(name, "select");
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].kind, ExprKind::Bool(true));
    }

    #[test]
    fn reports_caret_for_dangling_operator() {
        let err = parse_expression("x + ").expect_err("parse should fail");
        assert_eq!(err.line, 1);
        assert!(err.column > 0);
        assert!(err.message.contains("Syntax error"));
        assert!(err.pointer.contains('^'));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse_expression("x < 1 )").expect_err("parse should fail");
        assert!(err.message.contains("Syntax error"));
        assert_eq!(err.snippet, "x < 1 )");
    }

    #[test]
    fn rejects_chained_comparisons() {
        assert!(parse_expression("0 <= x < 10").is_err());
    }
}

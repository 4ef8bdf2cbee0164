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

//! Expression parser.

use crate::ast::{BinOp, Expr, ExprKind, SourceSpan, Span, UnaryOp};
use nom::Parser;
use nom::{
    branch::alt,
    combinator::{map, opt},
    error::context,
    multi::separated_list0,
    sequence::delimited,
};

use super::PResult;
use super::utils::{decimal, lexeme, logical_not, name, punct, symbol};

/// Top-level expression parser.
pub(super) fn expr(input: Span<'_>) -> PResult<'_, Expr> {
    parse_or(input)
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    let span = left.span.merge(&right.span);
    Expr {
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    }
}

/// Parses left-associative `||`.
fn parse_or(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_and(input)?;
    loop {
        let (next, op) = opt(symbol("||")).parse(input)?;
        if op.is_none() {
            break;
        }
        let (next, right) = parse_and(next)?;
        left = binary(BinOp::Or, left, right);
        input = next;
    }
    Ok((input, left))
}

/// Parses left-associative `&&`.
fn parse_and(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_not(input)?;
    loop {
        let (next, op) = opt(symbol("&&")).parse(input)?;
        if op.is_none() {
            break;
        }
        let (next, right) = parse_not(next)?;
        left = binary(BinOp::And, left, right);
        input = next;
    }
    Ok((input, left))
}

/// Parses prefix `!` chains.
fn parse_not(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    if let Ok((input, _)) = logical_not(input) {
        let (input, inner) = parse_not(input)?;
        let span = SourceSpan::from_bounds(start, input);
        return Ok((
            input,
            Expr {
                kind: ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(inner),
                },
                span,
            },
        ));
    }
    parse_comparison(input)
}

/// Parses a single, non-associative comparison.
fn parse_comparison(input: Span<'_>) -> PResult<'_, Expr> {
    let (input, left) = parse_add_sub(input)?;
    // Two-character tokens must be tried before their one-character prefixes.
    let (input, op) = opt(alt((
        map(symbol("=="), |_| BinOp::Eq),
        map(symbol("!="), |_| BinOp::Ne),
        map(symbol("<="), |_| BinOp::Le),
        map(symbol(">="), |_| BinOp::Ge),
        map(symbol("<"), |_| BinOp::Lt),
        map(symbol(">"), |_| BinOp::Gt),
    )))
    .parse(input)?;
    let Some(op) = op else {
        return Ok((input, left));
    };
    let (input, right) = context("comparison operand", parse_add_sub).parse(input)?;
    Ok((input, binary(op, left, right)))
}

/// Parses left-associative `+`/`-`.
fn parse_add_sub(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_mul_div(input)?;
    loop {
        let (next, op) = opt(alt((punct('+'), punct('-')))).parse(input)?;
        let Some(op_char) = op else {
            break;
        };

        let (next, right) = parse_mul_div(next)?;
        let op = if op_char == '+' { BinOp::Add } else { BinOp::Sub };
        left = binary(op, left, right);
        input = next;
    }
    Ok((input, left))
}

/// Parses left-associative `*`, `/` (floor division) and `%` (floor modulo).
fn parse_mul_div(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_unary(input)?;
    loop {
        let (next, op) = opt(alt((punct('*'), punct('/'), punct('%')))).parse(input)?;
        let Some(op_char) = op else {
            break;
        };

        let (next, right) = parse_unary(next)?;
        let op = match op_char {
            '*' => BinOp::Mul,
            '/' => BinOp::FloorDiv,
            _ => BinOp::FloorMod,
        };
        left = binary(op, left, right);
        input = next;
    }
    Ok((input, left))
}

/// Parses unary negation.
fn parse_unary(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    if let Ok((input, _)) = punct('-').parse(input) {
        let (input, inner) = parse_unary(input)?;
        let span = SourceSpan::from_bounds(start, input);
        return Ok((
            input,
            Expr {
                kind: ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(inner),
                },
                span,
            },
        ));
    }
    parse_primary(input)
}

/// Parses expression atoms.
fn parse_primary(input: Span<'_>) -> PResult<'_, Expr> {
    context(
        "expression",
        alt((parse_parenthesized, parse_integer, parse_ident_or_call)),
    )
    .parse(input)
}

/// Parses parenthesized expressions.
fn parse_parenthesized(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    let (input, mut inner) =
        delimited(punct('('), expr, context("')'", punct(')'))).parse(input)?;
    // Keep the outer range so diagnostics cover the parentheses too.
    inner.span = SourceSpan::from_bounds(start, input);
    Ok((input, inner))
}

/// Parses integer literal expressions.
fn parse_integer(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    let (input, n) = lexeme(decimal).parse(input)?;
    let span = SourceSpan::from_bounds(start, input);
    Ok((
        input,
        Expr {
            kind: ExprKind::Int(n),
            span,
        },
    ))
}

/// Parses a boolean literal, an identifier or a function call.
fn parse_ident_or_call(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    let (input, name) = lexeme(name).parse(input)?;
    let (input, args) = opt(delimited(
        punct('('),
        separated_list0(punct(','), expr),
        context("')'", punct(')')),
    ))
    .parse(input)?;

    let span = SourceSpan::from_bounds(start, input);
    let kind = match (name.as_str(), args) {
        (_, Some(args)) => ExprKind::Call { name, args },
        ("true", None) => ExprKind::Bool(true),
        ("false", None) => ExprKind::Bool(false),
        (_, None) => ExprKind::Ident(name),
    };

    Ok((input, Expr { kind, span }))
}

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

//! Lexical layer: trivia skipping and token recognizers.
//!
//! Every token parser here consumes the trivia (whitespace, `#` and `//`
//! line comments) on both sides of the token.

use crate::ast::Span;
use nom::Parser;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending},
    combinator::{map_res, not, recognize},
    multi::many0_count,
    sequence::{delimited, pair, preceded, terminated},
};

use super::PResult;

/// Skips any run of whitespace and line comments.
pub(super) fn trivia(input: Span<'_>) -> PResult<'_, ()> {
    let line_comment = preceded(alt((tag("//"), tag("#"))), not_line_ending);
    many0_count(alt((multispace1, line_comment)))
        .map(|_| ())
        .parse(input)
}

/// Runs `parser` between two trivia runs.
pub(super) fn lexeme<'a, O, P>(mut parser: P) -> impl FnMut(Span<'a>) -> PResult<'a, O>
where
    P: FnMut(Span<'a>) -> PResult<'a, O>,
{
    move |input| delimited(trivia, &mut parser, trivia)(input)
}

/// Operator or keyword token such as `&&` or `<=`.
pub(super) fn symbol<'a>(token: &'static str) -> impl FnMut(Span<'a>) -> PResult<'a, Span<'a>> {
    lexeme(tag(token))
}

/// Single-character punctuation.
pub(super) fn punct<'a>(c: char) -> impl FnMut(Span<'a>) -> PResult<'a, char> {
    lexeme(char(c))
}

/// Logical not. A `!` directly followed by `=` belongs to `!=`.
pub(super) fn logical_not(input: Span<'_>) -> PResult<'_, char> {
    lexeme(terminated(char('!'), not(char('=')))).parse(input)
}

/// Variable or function name: `[A-Za-z_][A-Za-z0-9_]*`.
pub(super) fn name(input: Span<'_>) -> PResult<'_, String> {
    recognize(pair(
        take_while1(|c: char| c == '_' || c.is_ascii_alphabetic()),
        take_while(|c: char| c == '_' || c.is_ascii_alphanumeric()),
    ))
    .map(|s: Span<'_>| s.fragment().to_string())
    .parse(input)
}

/// Unsigned decimal literal. The `i64` range is checked during lowering,
/// once the sign is known.
pub(super) fn decimal(input: Span<'_>) -> PResult<'_, u64> {
    map_res(digit1, |digits: Span<'_>| digits.fragment().parse::<u64>()).parse(input)
}

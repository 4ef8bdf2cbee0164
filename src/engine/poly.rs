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

//! Integer polynomial normal form for the `+ - *` fragment.
//!
//! A polynomial is a map from a sorted list of variable names (the monomial)
//! to its non-zero coefficient. Two expressions in this fragment are equal
//! for every assignment exactly when their normal forms match.

use crate::IntExpr;
use crate::ast::{BinOp, UnaryOp};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Poly {
    terms: BTreeMap<Vec<String>, i64>,
}

impl Poly {
    fn constant(value: i64) -> Self {
        let mut poly = Poly::default();
        if value != 0 {
            poly.terms.insert(Vec::new(), value);
        }
        poly
    }

    fn variable(name: &str) -> Self {
        let mut poly = Poly::default();
        poly.terms.insert(vec![name.to_string()], 1);
        poly
    }

    /// Normalizes `expr`; `None` outside the polynomial fragment or on
    /// coefficient overflow.
    pub(crate) fn from_expr(expr: &IntExpr) -> Option<Poly> {
        match expr {
            IntExpr::Int(v) => Some(Poly::constant(*v)),
            IntExpr::Var(name) => Some(Poly::variable(name)),
            IntExpr::Unary(UnaryOp::Neg, operand) => Poly::from_expr(operand)?.scale(-1),
            IntExpr::Binary(BinOp::Add, l, r) => Poly::from_expr(l)?.plus(&Poly::from_expr(r)?),
            IntExpr::Binary(BinOp::Sub, l, r) => {
                Poly::from_expr(l)?.plus(&Poly::from_expr(r)?.scale(-1)?)
            }
            IntExpr::Binary(BinOp::Mul, l, r) => Poly::from_expr(l)?.times(&Poly::from_expr(r)?),
            _ => None,
        }
    }

    fn add_term(&mut self, monomial: Vec<String>, coeff: i64) -> Option<()> {
        let slot = self.terms.entry(monomial).or_insert(0);
        *slot = slot.checked_add(coeff)?;
        // Drop cancelled terms so equal polynomials compare equal.
        self.terms.retain(|_, c| *c != 0);
        Some(())
    }

    fn plus(mut self, other: &Poly) -> Option<Poly> {
        for (monomial, coeff) in &other.terms {
            self.add_term(monomial.clone(), *coeff)?;
        }
        Some(self)
    }

    fn scale(mut self, factor: i64) -> Option<Poly> {
        for coeff in self.terms.values_mut() {
            *coeff = coeff.checked_mul(factor)?;
        }
        self.terms.retain(|_, c| *c != 0);
        Some(self)
    }

    fn times(&self, other: &Poly) -> Option<Poly> {
        let mut product = Poly::default();
        for (lm, lc) in &self.terms {
            for (rm, rc) in &other.terms {
                let mut monomial = lm.clone();
                monomial.extend(rm.iter().cloned());
                monomial.sort();
                product.add_term(monomial, lc.checked_mul(*rc)?)?;
            }
        }
        Some(product)
    }

    /// Returns the value when the polynomial has no variables.
    pub(crate) fn as_constant(&self) -> Option<i64> {
        match self.terms.len() {
            0 => Some(0),
            1 => self.terms.get(&Vec::new()).copied(),
            _ => None,
        }
    }

    /// Difference `self - other`, `None` on overflow.
    pub(crate) fn minus(self, other: Poly) -> Option<Poly> {
        self.plus(&other.scale(-1)?)
    }

    /// Rebuilds an expression: variable terms in monomial order, then the constant.
    pub(crate) fn to_expr(&self) -> IntExpr {
        let mut ordered: Vec<(&Vec<String>, i64)> = self
            .terms
            .iter()
            .filter(|(m, _)| !m.is_empty())
            .map(|(m, c)| (m, *c))
            .collect();
        let constant = self.terms.get(&Vec::new()).copied();

        let mut acc: Option<IntExpr> = None;
        for (monomial, coeff) in ordered.drain(..) {
            acc = Some(push_term(acc, coeff, Some(monomial)));
        }
        if let Some(c) = constant {
            acc = Some(push_term(acc, c, None));
        }
        acc.unwrap_or(IntExpr::Int(0))
    }
}

fn monomial_expr(monomial: &[String]) -> Option<IntExpr> {
    monomial
        .iter()
        .map(|name| IntExpr::var(name.as_str()))
        .reduce(IntExpr::mul)
}

fn scaled(magnitude: i64, monomial: Option<&Vec<String>>) -> IntExpr {
    match monomial.and_then(|m| monomial_expr(m)) {
        None => IntExpr::Int(magnitude),
        Some(base) if magnitude == 1 => base,
        Some(base) => IntExpr::mul(IntExpr::Int(magnitude), base),
    }
}

fn push_term(acc: Option<IntExpr>, coeff: i64, monomial: Option<&Vec<String>>) -> IntExpr {
    let Some(acc) = acc else {
        // Leading term keeps its sign on the coefficient.
        return match (coeff, monomial) {
            (-1, Some(m)) => IntExpr::neg(scaled(1, Some(m))),
            _ => scaled(coeff, monomial),
        };
    };
    match coeff.checked_abs() {
        Some(magnitude) if coeff < 0 => IntExpr::sub(acc, scaled(magnitude, monomial)),
        Some(_) => IntExpr::add(acc, scaled(coeff, monomial)),
        None => IntExpr::add(acc, scaled(coeff, monomial)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_expr;

    fn poly(text: &str) -> Poly {
        let expr = parse_expr(text).expect("parse should succeed");
        Poly::from_expr(&expr).expect("expression is polynomial")
    }

    #[test]
    fn collects_like_terms() {
        assert_eq!(poly("x + x + 3 - 3"), poly("2 * x"));
        assert_eq!(poly("x * y - y * x").as_constant(), Some(0));
        assert_eq!(poly("(x + 1) * (x + 1)"), poly("x * x + 2 * x + 1"));
    }

    #[test]
    fn rebuilt_expression_is_a_fixpoint() {
        for text in ["3 - x * y + 2 * x", "-x + 4", "x * x * 5 - 7", "0 * z"] {
            let normal = poly(text);
            let rebuilt = normal.to_expr();
            assert_eq!(Poly::from_expr(&rebuilt), Some(normal), "{text}");
        }
        assert_eq!(poly("3 - x * y + 2 * x").to_expr().to_string(), "2 * x - x * y + 3");
        assert_eq!(poly("-x + 4").to_expr().to_string(), "-x + 4");
    }

    #[test]
    fn non_polynomial_operators_are_rejected() {
        let expr = parse_expr("x / 2 + 1").expect("parse should succeed");
        assert_eq!(Poly::from_expr(&expr), None);
    }

    #[test]
    fn coefficient_overflow_is_rejected() {
        let expr = parse_expr("9223372036854775807 * x + x * 9223372036854775807")
            .expect("parse should succeed");
        assert_eq!(Poly::from_expr(&expr), None);
    }
}

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

//! Range-exhaustive boolean oracle.
//!
//! A predicate is proven by evaluating it at every point of the Cartesian
//! grid spanned by its variables' ranges. The cost is the product of all
//! extents, so this is meant for small symbolic checks only.

use crate::errors::{Counterexample, OracleError};
use crate::{ExprEngine, IntExpr, VarRanges};
use ndarray::Dimension;
use std::fmt;
use tracing::{debug, info};

/// Default upper bound on the number of evaluated grid points.
pub const DEFAULT_MAX_GRID_POINTS: u64 = 1 << 24;

/// Proves predicates over finite integer grids using an [`ExprEngine`].
pub struct RangeEquivalenceOracle<'e, E: ExprEngine + ?Sized> {
    engine: &'e E,
    max_grid_points: u64,
}

impl<E: ExprEngine + ?Sized> Clone for RangeEquivalenceOracle<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: ExprEngine + ?Sized> Copy for RangeEquivalenceOracle<'_, E> {}

impl<E: ExprEngine + ?Sized> fmt::Debug for RangeEquivalenceOracle<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeEquivalenceOracle")
            .field("max_grid_points", &self.max_grid_points)
            .finish_non_exhaustive()
    }
}

impl<'e, E: ExprEngine + ?Sized> RangeEquivalenceOracle<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self::with_limit(engine, DEFAULT_MAX_GRID_POINTS)
    }

    /// Creates an oracle that refuses grids above `max_grid_points`.
    pub fn with_limit(engine: &'e E, max_grid_points: u64) -> Self {
        Self {
            engine,
            max_grid_points,
        }
    }

    pub fn engine(&self) -> &'e E {
        self.engine
    }

    pub fn max_grid_points(&self) -> u64 {
        self.max_grid_points
    }

    /// Checks that `predicate` holds at every grid point of `ranges`.
    ///
    /// With a `precondition` the checked formula is
    /// `!precondition || predicate`. On failure the reported counterexample is
    /// the first failing point in row-major order over `ranges`, with the
    /// assignment sorted by variable name.
    pub fn verify(
        &self,
        predicate: &IntExpr,
        ranges: &VarRanges,
        precondition: Option<&IntExpr>,
    ) -> Result<(), OracleError> {
        let checked = match precondition {
            Some(cond) => IntExpr::or(IntExpr::not(cond.clone()), predicate.clone()),
            None => predicate.clone(),
        };

        if let Some((name, range)) = ranges.first_negative() {
            return Err(OracleError::InvalidRange {
                variable: name.to_string(),
                extent: range.extent,
            });
        }
        let points = ranges.point_count().unwrap_or(u64::MAX);
        if points > self.max_grid_points {
            return Err(OracleError::GridTooLarge {
                points,
                limit: self.max_grid_points,
            });
        }

        debug!(points, ranges = %ranges, "evaluating predicate over grid");
        let grid = self.engine.evaluate_over_grid(&checked, ranges)?;

        let Some((index, _)) = grid.indexed_iter().find(|(_, value)| !value.truthy()) else {
            info!(points, "predicate holds on every grid point");
            return Ok(());
        };

        let mut assignment: Vec<(String, i64)> = ranges
            .iter()
            .zip(index.slice())
            .map(|((name, range), offset)| {
                let offset = i64::try_from(*offset).unwrap_or(i64::MAX);
                (name.to_string(), range.min.saturating_add(offset))
            })
            .collect();
        assignment.sort_by(|a, b| a.0.cmp(&b.0));

        Err(OracleError::CounterexampleFound(Counterexample {
            predicate: self.engine.simplify(&checked).to_string(),
            ranges: ranges.to_string(),
            assignment,
        }))
    }
}

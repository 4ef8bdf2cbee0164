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

//! Consistency checking of bijective transforms between constraint systems.

use crate::errors::{ConsistencyStep, Counterexample, Direction, OracleError, TransformError};
use crate::{ExprEngine, IntExpr, Range, RangeEquivalenceOracle, SubstitutionMap, VarRanges};
use tracing::{debug, info};

/// Free variables, their ranges and a conjunction of relations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSystem {
    variables: Vec<String>,
    ranges: VarRanges,
    relations: Vec<IntExpr>,
}

impl ConstraintSystem {
    pub fn new<S: Into<String>>(variables: impl IntoIterator<Item = S>) -> Self {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
            ranges: VarRanges::new(),
            relations: Vec::new(),
        }
    }

    /// Adds a range for `name`.
    pub fn with_range(mut self, name: impl Into<String>, range: Range) -> Self {
        self.ranges.insert(name, range);
        self
    }

    /// Adds a relation that must hold.
    pub fn with_relation(mut self, relation: IntExpr) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn ranges(&self) -> &VarRanges {
        &self.ranges
    }

    pub fn relations(&self) -> &[IntExpr] {
        &self.relations
    }
}

/// Two constraint systems linked by a forward and a backward map.
///
/// `src_to_dst` rewrites each `src` variable in terms of `dst` variables and
/// `dst_to_src` does the opposite.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintTransform {
    pub src: ConstraintSystem,
    pub dst: ConstraintSystem,
    pub src_to_dst: SubstitutionMap,
    pub dst_to_src: SubstitutionMap,
}

impl ConstraintTransform {
    pub fn new(
        src: ConstraintSystem,
        dst: ConstraintSystem,
        src_to_dst: SubstitutionMap,
        dst_to_src: SubstitutionMap,
    ) -> Self {
        Self {
            src,
            dst,
            src_to_dst,
            dst_to_src,
        }
    }

    /// The transform from `system` to itself with both maps the identity.
    pub fn identity(system: ConstraintSystem) -> Self {
        let map: SubstitutionMap = system
            .variables()
            .iter()
            .map(|v| (v.clone(), IntExpr::var(v.as_str())))
            .collect();
        Self::new(system.clone(), system, map.clone(), map)
    }

    /// Swaps the roles of `src` and `dst`.
    pub fn inverse(&self) -> Self {
        Self::new(
            self.dst.clone(),
            self.src.clone(),
            self.dst_to_src.clone(),
            self.src_to_dst.clone(),
        )
    }
}

/// Verifies that a [`ConstraintTransform`] is a relation-preserving bijection.
pub struct TransformConsistencyChecker<'e, E: ExprEngine + ?Sized> {
    oracle: RangeEquivalenceOracle<'e, E>,
    ranges: VarRanges,
}

impl<'e, E: ExprEngine + ?Sized> TransformConsistencyChecker<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self::from_oracle(RangeEquivalenceOracle::new(engine))
    }

    pub fn from_oracle(oracle: RangeEquivalenceOracle<'e, E>) -> Self {
        Self {
            oracle,
            ranges: VarRanges::new(),
        }
    }

    /// Ranges for variables shared by both systems (e.g. symbolic sizes).
    ///
    /// A system's own ranges take precedence over these.
    pub fn with_ranges(mut self, ranges: VarRanges) -> Self {
        self.ranges = ranges;
        self
    }

    /// Checks both directions; the first failing direction is reported.
    pub fn verify(&self, transform: &ConstraintTransform) -> Result<(), TransformError> {
        self.check_direction(
            Direction::SrcToDst,
            &transform.src,
            &transform.dst,
            &transform.src_to_dst,
            &transform.dst_to_src,
        )?;
        self.check_direction(
            Direction::DstToSrc,
            &transform.dst,
            &transform.src,
            &transform.dst_to_src,
            &transform.src_to_dst,
        )?;
        info!(
            src_vars = transform.src.variables().len(),
            dst_vars = transform.dst.variables().len(),
            "constraint transform is consistent in both directions"
        );
        Ok(())
    }

    fn check_direction(
        &self,
        direction: Direction,
        src: &ConstraintSystem,
        dst: &ConstraintSystem,
        forward: &SubstitutionMap,
        backward: &SubstitutionMap,
    ) -> Result<(), TransformError> {
        let engine = self.oracle.engine();
        let mut all_ranges = self.ranges.clone();
        all_ranges.union_with(src.ranges());

        // Every mapped variable must come back unchanged.
        let mut round_trips = Vec::new();
        for var in src.variables() {
            let Some(image) = forward.get(var) else {
                continue;
            };
            let original = IntExpr::var(var.as_str());
            let recovered = engine.simplify(&engine.substitute(image, backward));
            if engine.provably_equal(&original, &recovered) {
                debug!(%direction, variable = %var, "round trip proven symbolically");
                continue;
            }
            round_trips.push(IntExpr::eq(original, recovered));
        }
        let cond_on_vars = IntExpr::all(round_trips);

        // Target relations and ranges, pulled back into the source space.
        let mut targets: Vec<IntExpr> = dst.relations().to_vec();
        for var in dst.variables() {
            if let Some(range) = dst.ranges().get(var) {
                targets.push(range.condition(var));
            }
        }
        let cond_subst = engine.simplify(&engine.substitute(&IntExpr::all(targets), backward));

        let predicate = IntExpr::and(cond_subst, cond_on_vars.clone());
        let precondition = IntExpr::all(src.relations().iter().cloned());
        debug!(%direction, predicate = %predicate, "checking transform direction");

        match self.oracle.verify(&predicate, &all_ranges, Some(&precondition)) {
            Ok(()) => Ok(()),
            Err(OracleError::CounterexampleFound(counterexample)) => {
                let step = self.refuted_step(&cond_on_vars, &all_ranges, &counterexample);
                Err(TransformError::Inconsistent {
                    direction,
                    step,
                    counterexample,
                })
            }
            Err(source) => Err(TransformError::Oracle { direction, source }),
        }
    }

    /// Re-evaluates the round-trip conjunct at the counterexample point.
    ///
    /// Only a definite `false` counts as an injectivity failure.
    fn refuted_step(
        &self,
        cond_on_vars: &IntExpr,
        ranges: &VarRanges,
        counterexample: &Counterexample,
    ) -> ConsistencyStep {
        let point: VarRanges = ranges
            .names()
            .filter_map(|name| {
                counterexample
                    .value_of(name)
                    .map(|value| (name, Range::new(value, 1)))
            })
            .collect();
        match self.oracle.engine().evaluate_over_grid(cond_on_vars, &point) {
            Ok(grid) if grid.iter().any(|value| !value.truthy()) => ConsistencyStep::Injectivity,
            Ok(_) => ConsistencyStep::ValidityPreservation,
            // The predicate short-circuited before reaching the round trip.
            Err(err) => {
                debug!(error = %err, "round trip is undefined at the counterexample");
                ConsistencyStep::ValidityPreservation
            }
        }
    }
}

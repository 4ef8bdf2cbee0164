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

//! Crate unit tests.

use super::*;
use ndarray::{ArrayD, arr1, arr2};
use proptest::prelude::*;
use std::cell::Cell;

fn sum_of_squares(values: &ValueAssignment) -> f64 {
    values.values().flat_map(|a| a.iter()).map(|v| v * v).sum()
}

fn single(name: &str, value: ArrayD<f64>) -> ValueAssignment {
    let mut map = ValueAssignment::new();
    map.insert(name.to_string(), value);
    map
}

fn grid_10x10() -> VarRanges {
    VarRanges::new()
        .with("x", Range::new(0, 10))
        .with("y", Range::new(0, 10))
}

fn pred(text: &str) -> IntExpr {
    parse_predicate(text).expect("predicate should parse")
}

fn map(entries: &[(&str, &str)]) -> SubstitutionMap {
    entries
        .iter()
        .map(|(var, text)| {
            (
                var.to_string(),
                parse_expr(text).expect("map expression should parse"),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Gradient checking
// ---------------------------------------------------------------------------

#[test]
fn exact_gradient_of_square_passes() {
    let inputs = single("x", arr1(&[3.0]).into_dyn());
    let grads = single("x", arr1(&[6.0]).into_dyn());
    let report = check_numerical_grads(
        sum_of_squares,
        &inputs,
        &grads,
        None,
        &GradCheckConfig::default(),
    )
    .expect("exact gradient should pass");

    let summary = report.variable("x").expect("x was checked");
    assert_eq!(summary.shape, vec![1]);
    assert_eq!(summary.escalated, 0);
    assert!((summary.numerical[0] - 6.001).abs() < 1e-6);
    assert!(summary.distance < 2e-3);
}

#[test]
fn grossly_wrong_gradient_exceeds_tolerance() {
    let inputs = single("x", arr1(&[3.0]).into_dyn());
    let grads = single("x", arr1(&[1.0]).into_dyn());
    let err = check_numerical_grads(
        sum_of_squares,
        &inputs,
        &grads,
        None,
        &GradCheckConfig::default(),
    )
    .expect_err("wrong gradient should fail");

    let GradCheckError::ToleranceExceeded(report) = err else {
        panic!("expected ToleranceExceeded, got {err:?}");
    };
    assert_eq!(report.variable, "x");
    assert_eq!(report.wrong_positions, vec![vec![0]]);
    assert_eq!(report.wrong_count, 1);
    assert_eq!(report.wrong_percentage, 100);
    // All escalation levels agree on the true derivative.
    assert!((report.numerical[0] - 6.0).abs() < 1e-6);
    assert!(report.distance > 4.9);
    assert!(report.to_string().contains("100% of elements differ"));
}

#[test]
fn shape_mismatch_is_reported_before_sampling() {
    let calls = Cell::new(0usize);
    let f = |values: &ValueAssignment| {
        calls.set(calls.get() + 1);
        sum_of_squares(values)
    };
    let inputs = single("w", arr1(&[1.0, 2.0, 3.0]).into_dyn());
    let grads = single("w", arr1(&[2.0, 4.0]).into_dyn());

    let err = check_numerical_grads(f, &inputs, &grads, None, &GradCheckConfig::default())
        .expect_err("shapes differ");
    assert_eq!(
        err,
        GradCheckError::ShapeMismatch {
            variable: "w".to_string(),
            expected: vec![3],
            actual: vec![2],
        }
    );
    assert_eq!(calls.get(), 0);
}

#[test]
fn gradient_without_input_is_rejected() {
    let inputs = single("x", arr1(&[1.0]).into_dyn());
    let grads = single("z", arr1(&[1.0]).into_dyn());
    let err = check_numerical_grads(
        sum_of_squares,
        &inputs,
        &grads,
        None,
        &GradCheckConfig::default(),
    )
    .expect_err("z has no input");
    assert_eq!(err, GradCheckError::MissingInput("z".to_string()));
}

#[test]
fn ordered_and_keyed_calls_agree() {
    let x = arr1(&[3.0, -1.5]).into_dyn();
    let good = arr1(&[6.0, -3.0]).into_dyn();
    let bad = arr1(&[1.0, -3.0]).into_dyn();
    let config = GradCheckConfig::default();
    let positional = |args: &[ArrayD<f64>]| args[0].iter().map(|v| v * v).sum::<f64>();

    let ordered_ok =
        check_numerical_grads_ordered(positional, &[x.clone()], &[good.clone()], None, &config);
    let keyed_ok = check_numerical_grads(
        sum_of_squares,
        &single("0", x.clone()),
        &single("0", good),
        None,
        &config,
    );
    assert!(ordered_ok.is_ok());
    assert_eq!(ordered_ok, keyed_ok);

    let ordered_err =
        check_numerical_grads_ordered(positional, &[x.clone()], &[bad.clone()], None, &config);
    let keyed_err = check_numerical_grads(
        sum_of_squares,
        &single("0", x),
        &single("0", bad),
        None,
        &config,
    );
    assert!(matches!(ordered_err, Err(GradCheckError::ToleranceExceeded(_))));
    assert_eq!(ordered_err, keyed_err);
}

#[test]
fn ordered_call_passes_arguments_in_position() {
    // f(a, b) = a0 * b0, so df/da = b and df/db = a.
    let a = arr1(&[2.0]).into_dyn();
    let b = arr1(&[5.0]).into_dyn();
    let product = |args: &[ArrayD<f64>]| args[0].sum() * args[1].sum();
    let report = check_numerical_grads_ordered(
        product,
        &[a.clone(), b.clone()],
        &[b, a],
        None,
        &GradCheckConfig::default(),
    )
    .expect("product gradients are exact");
    let names: Vec<&str> = report.variables.iter().map(|s| s.variable.as_str()).collect();
    assert_eq!(names, vec!["0", "1"]);
}

#[test]
fn ordered_call_rejects_more_gradients_than_inputs() {
    let x = arr1(&[1.0]).into_dyn();
    let err = check_numerical_grads_ordered(
        |args: &[ArrayD<f64>]| args[0].sum(),
        &[x.clone()],
        &[x.clone(), x],
        None,
        &GradCheckConfig::default(),
    )
    .expect_err("second gradient has no input");
    assert_eq!(err, GradCheckError::MissingInput("1".to_string()));
}

#[test]
fn ordered_call_with_fewer_gradients_matches_keyed_subset() {
    // f(a, b) = a0 * b0; only df/da = b is supplied.
    let a = arr1(&[3.0]).into_dyn();
    let b = arr1(&[2.0]).into_dyn();
    let config = GradCheckConfig::default();

    let ordered = check_numerical_grads_ordered(
        |args: &[ArrayD<f64>]| args[0].sum() * args[1].sum(),
        &[a.clone(), b.clone()],
        &[b.clone()],
        None,
        &config,
    );

    let mut inputs = single("0", a);
    inputs.insert("1".to_string(), b.clone());
    let keyed = check_numerical_grads(
        |values: &ValueAssignment| values["0"].sum() * values["1"].sum(),
        &inputs,
        &single("0", b),
        None,
        &config,
    );

    assert!(ordered.is_ok());
    assert_eq!(ordered, keyed);
    let report = ordered.expect("checked above");
    assert_eq!(report.variables.len(), 1);
    assert_eq!(report.variables[0].variable, "0");
}

#[test]
fn wrong_position_is_reported_as_multi_index() {
    let a = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn();
    let grad = arr2(&[[2.0, 4.0, 6.0], [8.0, 10.0, 0.0]]).into_dyn();
    let err = check_numerical_grads(
        sum_of_squares,
        &single("a", a),
        &single("a", grad),
        None,
        &GradCheckConfig::default(),
    )
    .expect_err("last element is wrong");
    let GradCheckError::ToleranceExceeded(report) = err else {
        panic!("expected ToleranceExceeded");
    };
    assert_eq!(report.shape, vec![2, 3]);
    assert_eq!(report.wrong_positions, vec![vec![1, 2]]);
    assert_eq!(report.wrong_percentage, 16);
}

#[test]
fn wrong_positions_are_capped_at_ten() {
    let x = ArrayD::from_elem(ndarray::IxDyn(&[4, 5]), 1.0);
    let grad = ArrayD::from_elem(ndarray::IxDyn(&[4, 5]), -50.0);
    let err = check_numerical_grads(
        sum_of_squares,
        &single("x", x),
        &single("x", grad),
        None,
        &GradCheckConfig::default(),
    )
    .expect_err("every element is wrong");
    let GradCheckError::ToleranceExceeded(report) = err else {
        panic!("expected ToleranceExceeded");
    };
    assert_eq!(report.wrong_count, 20);
    assert_eq!(report.wrong_positions.len(), 10);
    assert_eq!(report.wrong_positions[0], vec![0, 0]);
    assert_eq!(report.wrong_positions[9], vec![1, 4]);
}

#[test]
fn supplied_function_value_skips_baseline_evaluation() {
    let calls = Cell::new(0usize);
    let f = |values: &ValueAssignment| {
        calls.set(calls.get() + 1);
        sum_of_squares(values)
    };
    let inputs = single("x", arr1(&[3.0]).into_dyn());
    let grads = single("x", arr1(&[6.0]).into_dyn());

    check_numerical_grads(&f, &inputs, &grads, Some(9.0), &GradCheckConfig::default())
        .expect("exact gradient should pass");
    assert_eq!(calls.get(), 1);

    calls.set(0);
    check_numerical_grads(&f, &inputs, &grads, None, &GradCheckConfig::default())
        .expect("exact gradient should pass");
    assert_eq!(calls.get(), 2);
}

#[test]
fn central_difference_rescues_truncation_error() {
    // Forward difference of x^3 at 10 is off by ~0.03.
    let cube = |values: &ValueAssignment| values["x"].iter().map(|v| v * v * v).sum::<f64>();
    let config = GradCheckConfig::default().with_atol(1e-3).with_rtol(1e-5);
    let report = check_numerical_grads(
        cube,
        &single("x", arr1(&[10.0]).into_dyn()),
        &single("x", arr1(&[300.0]).into_dyn()),
        None,
        &config,
    )
    .expect("central difference is accurate enough");
    assert_eq!(report.variables[0].escalated, 1);
    assert!((report.variables[0].numerical[0] - 300.0).abs() < 1e-5);
}

#[test]
fn richardson_extrapolation_is_exact_for_quartics() {
    let quartic = |values: &ValueAssignment| values["x"].iter().map(|v| v.powi(4)).sum::<f64>();
    let calls = Cell::new(0usize);
    let counted = |values: &ValueAssignment| {
        calls.set(calls.get() + 1);
        quartic(values)
    };
    // Central difference is off by h^2 = 4e-6; the extrapolated value is not.
    let config = GradCheckConfig::default().with_atol(1e-7).with_rtol(0.0);
    let report = check_numerical_grads(
        counted,
        &single("x", arr1(&[1.0]).into_dyn()),
        &single("x", arr1(&[4.0]).into_dyn()),
        None,
        &config,
    )
    .expect("Richardson extrapolation should match");
    assert!((report.variables[0].numerical[0] - 4.0).abs() < 1e-7);
    // Baseline plus four samples.
    assert_eq!(calls.get(), 5);
}

#[test]
fn non_finite_gradients_are_rejected() {
    let blow_up = |values: &ValueAssignment| {
        let x = values["x"].sum();
        if x > 1.0 { f64::INFINITY } else { x }
    };
    let err = check_numerical_grads(
        blow_up,
        &single("x", arr1(&[1.0]).into_dyn()),
        &single("x", arr1(&[1.0]).into_dyn()),
        None,
        &GradCheckConfig::default(),
    )
    .expect_err("forward sample is infinite");
    assert!(matches!(err, GradCheckError::NonFinite { .. }));
}

// ---------------------------------------------------------------------------
// Range equivalence oracle
// ---------------------------------------------------------------------------

#[test]
fn oracle_reports_first_counterexample() {
    let oracle = RangeEquivalenceOracle::new(&Interpreter);
    let err = oracle
        .verify(&pred("x > y"), &grid_10x10(), None)
        .expect_err("x > y fails at the origin");
    let cex = err.counterexample().expect("counterexample expected");
    assert_eq!(
        cex.assignment,
        vec![("x".to_string(), 0), ("y".to_string(), 0)]
    );
    assert_eq!(cex.predicate, "x > y");
    assert!(err.to_string().contains("Counterexample: x = 0, y = 0"));
}

#[test]
fn oracle_honors_precondition() {
    let oracle = RangeEquivalenceOracle::new(&Interpreter);
    let cond = pred("2*x > 4*y");
    oracle
        .verify(&pred("x > 2*y"), &grid_10x10(), Some(&cond))
        .expect("x > 2y follows from 2x > 4y");
    oracle
        .verify(&pred("x > y"), &grid_10x10(), Some(&cond))
        .expect("x > y follows from 2x > 4y on naturals");
}

#[test]
fn oracle_counterexample_under_precondition() {
    let err = verify_predicate("x > 3*y", &grid_10x10(), Some("2*x > 4*y"))
        .expect_err("x > 3y does not follow");
    let cex = err.counterexample().expect("counterexample expected");
    assert_eq!(cex.value_of("x"), Some(3));
    assert_eq!(cex.value_of("y"), Some(1));
    assert_eq!(cex.predicate, "2 * x <= 4 * y || x > 3 * y");
}

#[test]
fn enumeration_follows_range_order() {
    let predicate = pred("x + y < 3");
    let y_first = VarRanges::new()
        .with("y", Range::new(0, 3))
        .with("x", Range::new(0, 3));
    let x_first = VarRanges::new()
        .with("x", Range::new(0, 3))
        .with("y", Range::new(0, 3));
    let oracle = RangeEquivalenceOracle::new(&Interpreter);

    let err = oracle.verify(&predicate, &y_first, None).expect_err("fails");
    assert_eq!(
        err.counterexample().map(|c| c.assignment.clone()),
        Some(vec![("x".to_string(), 2), ("y".to_string(), 1)])
    );
    let err = oracle.verify(&predicate, &x_first, None).expect_err("fails");
    assert_eq!(
        err.counterexample().map(|c| c.assignment.clone()),
        Some(vec![("x".to_string(), 1), ("y".to_string(), 2)])
    );
}

#[test]
fn oracle_rejects_negative_extent_and_large_grids() {
    let oracle = RangeEquivalenceOracle::new(&Interpreter);
    let ranges = VarRanges::new().with("x", Range::new(0, -2));
    assert_eq!(
        oracle.verify(&pred("x >= 0"), &ranges, None),
        Err(OracleError::InvalidRange {
            variable: "x".to_string(),
            extent: -2,
        })
    );

    let small = RangeEquivalenceOracle::with_limit(&Interpreter, 50);
    assert_eq!(
        small.verify(&pred("x >= 0"), &grid_10x10(), None),
        Err(OracleError::GridTooLarge {
            points: 100,
            limit: 50,
        })
    );
}

#[test]
fn empty_grid_holds_vacuously() {
    let ranges = VarRanges::new()
        .with("x", Range::new(0, 4))
        .with("y", Range::new(7, 0));
    RangeEquivalenceOracle::new(&Interpreter)
        .verify(&pred("false"), &ranges, None)
        .expect("no grid points to refute");
}

#[test]
fn oracle_surfaces_engine_errors() {
    let err = verify_predicate("x / y >= 0", &grid_10x10(), None).expect_err("y = 0 divides");
    assert!(matches!(
        err,
        OracleError::Engine(EngineError::DivisionByZero(_))
    ));

    let err = verify_predicate("x < z", &grid_10x10(), None).expect_err("z has no range");
    assert_eq!(
        err,
        OracleError::Engine(EngineError::UnboundVariable("z".to_string()))
    );
}

#[test]
fn oracle_results_are_deterministic() {
    let oracle = RangeEquivalenceOracle::new(&Interpreter);
    let predicate = pred("x * x + y < 50");
    let first = oracle.verify(&predicate, &grid_10x10(), None);
    for _ in 0..5 {
        assert_eq!(oracle.verify(&predicate, &grid_10x10(), None), first);
    }
    assert!(first.is_err());
}

proptest! {
    #[test]
    fn counterexample_is_first_failing_point(
        a in -3i64..=3,
        b in -3i64..=3,
        c in -5i64..=10,
        x_min in -3i64..=3,
        x_ext in 0i64..=5,
        y_min in -3i64..=3,
        y_ext in 0i64..=5,
    ) {
        let predicate = IntExpr::lt(
            IntExpr::add(
                IntExpr::mul(IntExpr::int(a), IntExpr::var("x")),
                IntExpr::mul(IntExpr::int(b), IntExpr::var("y")),
            ),
            IntExpr::int(c),
        );
        let ranges = VarRanges::new()
            .with("x", Range::new(x_min, x_ext))
            .with("y", Range::new(y_min, y_ext));

        let mut expected = None;
        'outer: for x in x_min..x_min + x_ext {
            for y in y_min..y_min + y_ext {
                if a * x + b * y >= c {
                    expected = Some(vec![("x".to_string(), x), ("y".to_string(), y)]);
                    break 'outer;
                }
            }
        }

        let oracle = RangeEquivalenceOracle::new(&Interpreter);
        let outcome = oracle.verify(&predicate, &ranges, None);
        let found = outcome
            .as_ref()
            .err()
            .and_then(|e| e.counterexample())
            .map(|c| c.assignment.clone());
        prop_assert_eq!(found, expected);
        prop_assert_eq!(oracle.verify(&predicate, &ranges, None), outcome);
    }
}

// ---------------------------------------------------------------------------
// Transform consistency
// ---------------------------------------------------------------------------

#[test]
fn identity_transform_verifies() {
    let system = ConstraintSystem::new(["x", "y"])
        .with_range("x", Range::new(0, 5))
        .with_range("y", Range::new(0, 5))
        .with_relation(pred("x <= y"));
    verify_transform(&ConstraintTransform::identity(system), &VarRanges::new())
        .expect("identity is a bijection");
}

#[test]
fn non_inverse_maps_fail_injectivity() {
    let system = ConstraintSystem::new(["v"]).with_range("v", Range::new(0, 10));
    let transform = ConstraintTransform::new(
        system.clone(),
        system,
        map(&[("v", "2 * v")]),
        map(&[("v", "v")]),
    );
    let err = verify_transform(&transform, &VarRanges::new()).expect_err("not inverse");
    let TransformError::Inconsistent {
        direction,
        step,
        counterexample,
    } = &err
    else {
        panic!("expected Inconsistent, got {err:?}");
    };
    assert_eq!(*direction, Direction::SrcToDst);
    assert_eq!(*step, ConsistencyStep::Injectivity);
    assert_eq!(counterexample.assignment, vec![("v".to_string(), 1)]);
    assert!(err.to_string().contains("src -> dst"));
}

fn shift_transform(dst_extent: i64) -> ConstraintTransform {
    ConstraintTransform::new(
        ConstraintSystem::new(["x"]).with_range("x", Range::new(0, 10)),
        ConstraintSystem::new(["y"]).with_range("y", Range::new(3, dst_extent)),
        map(&[("x", "y - 3")]),
        map(&[("y", "x + 3")]),
    )
}

#[test]
fn shifted_ranges_verify() {
    verify_transform(&shift_transform(10), &VarRanges::new()).expect("shift is a bijection");
}

#[test]
fn shrunken_target_range_fails_validity() {
    let err = verify_transform(&shift_transform(9), &VarRanges::new())
        .expect_err("x = 9 maps outside [3, 12)");
    let TransformError::Inconsistent {
        direction,
        step,
        counterexample,
    } = err
    else {
        panic!("expected Inconsistent");
    };
    assert_eq!(direction, Direction::SrcToDst);
    assert_eq!(step, ConsistencyStep::ValidityPreservation);
    assert_eq!(counterexample.value_of("x"), Some(9));
}

#[test]
fn non_surjective_map_fails_in_reverse_direction() {
    let transform = ConstraintTransform::new(
        ConstraintSystem::new(["x"]).with_range("x", Range::new(0, 5)),
        ConstraintSystem::new(["y"]).with_range("y", Range::new(0, 10)),
        map(&[("x", "y / 2")]),
        map(&[("y", "2 * x")]),
    );
    let err = verify_transform(&transform, &VarRanges::new()).expect_err("odd y unreachable");
    assert_eq!(err.direction(), Direction::DstToSrc);
    let cex = err.counterexample().expect("counterexample expected");
    assert_eq!(cex.assignment, vec![("y".to_string(), 1)]);
    assert!(matches!(
        err,
        TransformError::Inconsistent {
            step: ConsistencyStep::Injectivity,
            ..
        }
    ));

    // The reversed transform fails in the other direction.
    let reversed = verify_transform(&transform.inverse(), &VarRanges::new())
        .expect_err("still not a bijection");
    assert_eq!(reversed.direction(), Direction::SrcToDst);
}

#[test]
fn undefined_round_trip_is_not_blamed_on_injectivity() {
    // At x = 0 the target range fails first, and `4 / x` divides by zero.
    let transform = ConstraintTransform::new(
        ConstraintSystem::new(["x"]).with_range("x", Range::new(0, 3)),
        ConstraintSystem::new(["y"]).with_range("y", Range::new(1, 2)),
        map(&[("x", "4 / y")]),
        map(&[("y", "x")]),
    );
    let err = verify_transform(&transform, &VarRanges::new()).expect_err("x = 0 has no image");
    let TransformError::Inconsistent {
        direction,
        step,
        counterexample,
    } = err
    else {
        panic!("expected Inconsistent, got {err:?}");
    };
    assert_eq!(direction, Direction::SrcToDst);
    assert_eq!(step, ConsistencyStep::ValidityPreservation);
    assert_eq!(counterexample.assignment, vec![("x".to_string(), 0)]);
}

#[test]
fn loop_fusion_is_a_bijection() {
    let transform = ConstraintTransform::new(
        ConstraintSystem::new(["i", "j"])
            .with_range("i", Range::new(0, 4))
            .with_range("j", Range::new(0, 4)),
        ConstraintSystem::new(["k"]).with_range("k", Range::new(0, 16)),
        map(&[("i", "k / 4"), ("j", "k % 4")]),
        map(&[("k", "4 * i + j")]),
    );
    verify_transform(&transform, &VarRanges::new()).expect("fusion is a bijection");
}

#[test]
fn source_relations_act_as_precondition() {
    let src = ConstraintSystem::new(["x", "y"])
        .with_range("x", Range::new(0, 6))
        .with_range("y", Range::new(0, 6));
    let dst = ConstraintSystem::new(["t"]).with_range("t", Range::new(0, 3));
    let src_to_dst = map(&[("x", "2 * t"), ("y", "t")]);
    let dst_to_src = map(&[("t", "y")]);

    let constrained = ConstraintTransform::new(
        src.clone().with_relation(pred("x == 2 * y")),
        dst.clone(),
        src_to_dst.clone(),
        dst_to_src.clone(),
    );
    verify_transform(&constrained, &VarRanges::new()).expect("relation restricts the domain");

    let unconstrained = ConstraintTransform::new(src, dst, src_to_dst, dst_to_src);
    let err = verify_transform(&unconstrained, &VarRanges::new())
        .expect_err("x is not recoverable without the relation");
    assert_eq!(err.direction(), Direction::SrcToDst);
    assert_eq!(
        err.counterexample().map(|c| c.assignment.clone()),
        Some(vec![("x".to_string(), 0), ("y".to_string(), 1)])
    );
}

#[test]
fn shared_ranges_cover_symbolic_parameters() {
    let transform = ConstraintTransform::new(
        ConstraintSystem::new(["i"])
            .with_range("i", Range::new(0, 8))
            .with_relation(pred("i < n")),
        ConstraintSystem::new(["j"])
            .with_range("j", Range::new(0, 8))
            .with_relation(pred("j < n")),
        map(&[("i", "j")]),
        map(&[("j", "i")]),
    );
    let shared = VarRanges::new().with("n", Range::new(0, 9));
    verify_transform(&transform, &shared).expect("renaming is a bijection");

    let err = verify_transform(&transform, &VarRanges::new()).expect_err("n has no range");
    assert!(matches!(
        err,
        TransformError::Oracle {
            source: OracleError::Engine(EngineError::UnboundVariable(_)),
            ..
        }
    ));
}

// ---------------------------------------------------------------------------
// Parsing, printing and symbolic helpers
// ---------------------------------------------------------------------------

#[test]
fn printing_preserves_structure() {
    for text in [
        "a - (b - c)",
        "(a + b) * c",
        "!(x < 3) || y >= -2",
        "x * -y == min(x, y % 4)",
        "select(a > 0 && b > 0, a / b, 0) != 1",
    ] {
        let parsed = parse_expr(text).expect("parse should succeed");
        let reparsed = parse_expr(&parsed.to_string()).expect("printed form should parse");
        assert_eq!(parsed, reparsed, "{text}");
    }
    assert_eq!(parse_expr("a - (b - c)").map(|e| e.to_string()), Ok("a - (b - c)".to_string()));
}

#[test]
fn extreme_literals_print_and_reparse() {
    let min = IntExpr::int(i64::MIN);
    assert_eq!(min.to_string(), "-9223372036854775808");
    assert_eq!(parse_expr(&min.to_string()), Ok(min.clone()));

    let folded = Interpreter.simplify(&parse_expr("-9223372036854775807 - 1").expect("parses"));
    assert_eq!(folded, min);
    assert_eq!(parse_expr(&folded.to_string()), Ok(folded));

    let max = IntExpr::int(i64::MAX);
    assert_eq!(parse_expr(&max.to_string()), Ok(max));

    let err = parse_expr("9223372036854775808").expect_err("one past i64::MAX");
    assert!(err.message.contains("out of range"));
    assert_eq!(err.column, 1);
}

#[test]
fn predicate_parser_reports_type_errors() {
    let err = parse_predicate("x + 1").expect_err("integer is not a predicate");
    assert!(err.message.contains("boolean predicate"));
    assert_eq!(err.column, 1);

    let err = parse_expr("x && y < 2").expect_err("x is an integer");
    assert!(err.message.contains("Expected boolean operand"));
    assert_eq!(err.column, 1);
    assert_eq!(err.pointer, "^");

    let err = parse_expr("1 + foo(2)").expect_err("unknown function");
    assert!(err.message.contains("Unknown function 'foo'"));
    assert_eq!(err.column, 5);

    let err = parse_expr("min(1)").expect_err("wrong arity");
    assert!(err.message.contains("expects 2 arguments"));

    let err = parse_expr("true == 1").expect_err("mixed equality");
    assert!(err.message.contains("Cannot compare boolean with integer"));
}

#[test]
fn provable_equality_assertion() {
    let lhs = parse_expr("4 * i + j - j").expect("parse should succeed");
    let rhs = parse_expr("i * 4").expect("parse should succeed");
    assert_provably_equal(&Interpreter, &lhs, &rhs).expect("same polynomial");

    let err = assert_provably_equal(&Interpreter, &lhs, &IntExpr::var("i"))
        .expect_err("4i is not i");
    assert_eq!(
        err,
        OracleError::NotProvablyEqual {
            lhs: "4 * i".to_string(),
            rhs: "i".to_string(),
        }
    );
}

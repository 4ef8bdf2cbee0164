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

//! Element-wise closeness assertion for numeric arrays.

use crate::errors::AllcloseError;
use ndarray::{ArrayD, Dimension};

/// Checks `|actual - desired| <= atol + rtol * |desired|` element-wise.
///
/// The arguments are not interchangeable: the relative part scales with
/// `desired`. Shapes must match exactly, and NaNs at the same position are
/// considered equal.
pub fn assert_allclose(
    actual: &ArrayD<f64>,
    desired: &ArrayD<f64>,
    rtol: f64,
    atol: f64,
) -> Result<(), AllcloseError> {
    if actual.shape() != desired.shape() {
        return Err(AllcloseError::ShapeMismatch {
            actual: actual.shape().to_vec(),
            desired: desired.shape().to_vec(),
        });
    }

    let mut mismatched = 0usize;
    let mut max_abs_diff = 0.0f64;
    let mut max_rel_diff = 0.0f64;
    let mut first_index: Option<Vec<usize>> = None;

    for ((index, a), d) in actual.indexed_iter().zip(desired.iter()) {
        if a.is_nan() && d.is_nan() {
            continue;
        }
        let diff = (a - d).abs();
        let close = diff <= atol + rtol * d.abs() || a == d;
        if close {
            continue;
        }
        mismatched += 1;
        max_abs_diff = max_abs_diff.max(diff);
        if *d != 0.0 {
            max_rel_diff = max_rel_diff.max(diff / d.abs());
        }
        if first_index.is_none() {
            first_index = Some(index.slice().to_vec());
        }
    }

    match first_index {
        None => Ok(()),
        Some(first_index) => Err(AllcloseError::Mismatch {
            mismatched,
            total: actual.len(),
            max_abs_diff,
            max_rel_diff,
            first_index,
            rtol,
            atol,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn accepts_values_within_tolerance() {
        let actual = arr1(&[1.0, 2.0000001, f64::NAN]).into_dyn();
        let desired = arr1(&[1.0, 2.0, f64::NAN]).into_dyn();
        assert_allclose(&actual, &desired, 1e-7, 1e-7).expect("values are close");
    }

    #[test]
    fn reports_first_mismatch_in_row_major_order() {
        let actual = arr2(&[[1.0, 2.0], [3.5, 4.5]]).into_dyn();
        let desired = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let err = assert_allclose(&actual, &desired, 1e-7, 1e-7).expect_err("values differ");
        let AllcloseError::Mismatch {
            mismatched,
            total,
            max_abs_diff,
            first_index,
            ..
        } = err
        else {
            panic!("expected value mismatch");
        };
        assert_eq!(mismatched, 2);
        assert_eq!(total, 4);
        assert!((max_abs_diff - 0.5).abs() < 1e-12);
        assert_eq!(first_index, vec![1, 0]);
    }

    #[test]
    fn rejects_different_shapes() {
        let actual = arr1(&[1.0, 2.0]).into_dyn();
        let desired = arr2(&[[1.0, 2.0]]).into_dyn();
        let err = assert_allclose(&actual, &desired, 1e-7, 1e-7).expect_err("shapes differ");
        assert!(matches!(err, AllcloseError::ShapeMismatch { .. }));
    }
}

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

//! Finite-difference verification of analytical gradients.
//!
//! Each partial derivative starts as a forward difference. Positions that
//! disagree with the analytical value escalate to a central difference and
//! then to Richardson extrapolation over two step sizes, so a position costs
//! at most four evaluations on top of the shared baseline.

use crate::errors::{GradCheckError, ToleranceReport};
use ndarray::ArrayD;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Point in a function's domain: variable name to value array.
pub type ValueAssignment = BTreeMap<String, ArrayD<f64>>;

/// Variable name to gradient array of the same shape as its value.
pub type GradientMap = BTreeMap<String, ArrayD<f64>>;

/// Most wrong positions kept for diagnostics.
const MAX_REPORTED_POSITIONS: usize = 10;

/// Step size and tolerances for [`check_numerical_grads`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckConfig {
    /// Finite-difference step.
    pub delta: f64,
    /// Absolute tolerance; multiplied by `sqrt(n)` in the aggregate test.
    pub atol: f64,
    /// Relative tolerance.
    pub rtol: f64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        Self {
            delta: 1e-3,
            atol: 1e-2,
            rtol: 0.1,
        }
    }
}

impl GradCheckConfig {
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    fn validate(&self) -> Result<(), GradCheckError> {
        if !self.delta.is_finite() || self.delta == 0.0 {
            return Err(GradCheckError::InvalidConfig(format!(
                "delta must be finite and non-zero, got {}",
                self.delta
            )));
        }
        for (name, value) in [("atol", self.atol), ("rtol", self.rtol)] {
            if !value.is_finite() || value < 0.0 {
                return Err(GradCheckError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Element-wise acceptance test: `|nder - der| < atol + rtol * |nder|`.
    fn accepts(&self, numerical: f64, analytical: f64) -> bool {
        (numerical - analytical).abs() < self.atol + self.rtol * numerical.abs()
    }
}

/// Per-variable statistics of a passing check.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSummary {
    pub variable: String,
    pub shape: Vec<usize>,
    /// `||numerical - analytical||_2`.
    pub distance: f64,
    pub max_abs_diff: f64,
    pub mean_abs_diff: f64,
    /// Positions that needed more than a forward difference.
    pub escalated: usize,
    /// Numerical gradient in row-major order.
    pub numerical: Vec<f64>,
}

/// Outcome of a passing gradient check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradCheckReport {
    /// One entry per gradient, in check order.
    pub variables: Vec<VariableSummary>,
}

impl GradCheckReport {
    pub fn variable(&self, name: &str) -> Option<&VariableSummary> {
        self.variables.iter().find(|summary| summary.variable == name)
    }
}

/// Checks `grads` against finite differences of `function` at `inputs`.
///
/// `function_value` must equal `function(inputs)` when given; otherwise it is
/// computed once and reused as the reference point of every sample.
pub fn check_numerical_grads<F>(
    function: F,
    inputs: &ValueAssignment,
    grads: &GradientMap,
    function_value: Option<f64>,
    config: &GradCheckConfig,
) -> Result<GradCheckReport, GradCheckError>
where
    F: Fn(&ValueAssignment) -> f64,
{
    let order: Vec<(&str, &ArrayD<f64>)> = grads
        .iter()
        .map(|(name, grad)| (name.as_str(), grad))
        .collect();
    check_grads_keyed(&function, inputs, &order, function_value, config)
}

/// Positional form of [`check_numerical_grads`].
///
/// Inputs and gradients are renamed `"0"`, `"1"`, ... and checked in order;
/// `function` receives the values in their original positions. A shorter
/// gradient list checks only the leading inputs.
pub fn check_numerical_grads_ordered<F>(
    function: F,
    inputs: &[ArrayD<f64>],
    grads: &[ArrayD<f64>],
    function_value: Option<f64>,
    config: &GradCheckConfig,
) -> Result<GradCheckReport, GradCheckError>
where
    F: Fn(&[ArrayD<f64>]) -> f64,
{
    if grads.len() > inputs.len() {
        return Err(GradCheckError::MissingInput(inputs.len().to_string()));
    }

    let names: Vec<String> = (0..inputs.len()).map(|idx| idx.to_string()).collect();
    let named: ValueAssignment = names.iter().cloned().zip(inputs.iter().cloned()).collect();
    let order: Vec<(&str, &ArrayD<f64>)> = names
        .iter()
        .map(String::as_str)
        .zip(grads.iter())
        .collect();

    let positional = |values: &ValueAssignment| {
        let args: Vec<ArrayD<f64>> = names
            .iter()
            .filter_map(|name| values.get(name).cloned())
            .collect();
        function(&args)
    };
    check_grads_keyed(&positional, &named, &order, function_value, config)
}

fn check_grads_keyed(
    function: &dyn Fn(&ValueAssignment) -> f64,
    inputs: &ValueAssignment,
    grads: &[(&str, &ArrayD<f64>)],
    function_value: Option<f64>,
    config: &GradCheckConfig,
) -> Result<GradCheckReport, GradCheckError> {
    config.validate()?;

    // Shapes are validated before anything is evaluated.
    for (name, grad) in grads {
        let Some(value) = inputs.get(*name) else {
            return Err(GradCheckError::MissingInput(name.to_string()));
        };
        if grad.shape() != value.shape() {
            return Err(GradCheckError::ShapeMismatch {
                variable: name.to_string(),
                expected: value.shape().to_vec(),
                actual: grad.shape().to_vec(),
            });
        }
    }

    let baseline = function_value.unwrap_or_else(|| function(inputs));
    let mut sampler = Sampler::new(function, inputs, baseline);

    let mut report = GradCheckReport::default();
    for (name, grad) in grads {
        report
            .variables
            .push(check_variable(&mut sampler, name, grad, config)?);
    }
    Ok(report)
}

/// Evaluates one-sided difference quotients around a fixed baseline.
struct Sampler<'f> {
    function: &'f dyn Fn(&ValueAssignment) -> f64,
    point: ValueAssignment,
    baseline: f64,
}

impl<'f> Sampler<'f> {
    /// Copies `inputs` into row-major contiguous storage so element `i` of a
    /// variable is slot `i` of its slice.
    fn new(
        function: &'f dyn Fn(&ValueAssignment) -> f64,
        inputs: &ValueAssignment,
        baseline: f64,
    ) -> Self {
        let point = inputs
            .iter()
            .map(|(name, value)| (name.clone(), value.as_standard_layout().into_owned()))
            .collect();
        Self {
            function,
            point,
            baseline,
        }
    }

    /// `(f(x + step * e_index) - f(x)) / step` for element `index` of `name`.
    fn derivative(&mut self, name: &str, index: usize, step: f64) -> f64 {
        let Some(original) = self.shift(name, index, step) else {
            return f64::NAN;
        };
        let value = (self.function)(&self.point);
        self.restore(name, index, original);
        (value - self.baseline) / step
    }

    fn shift(&mut self, name: &str, index: usize, step: f64) -> Option<f64> {
        let slot = self.point.get_mut(name)?.as_slice_mut()?.get_mut(index)?;
        let original = *slot;
        *slot = original + step;
        Some(original)
    }

    fn restore(&mut self, name: &str, index: usize, original: f64) {
        if let Some(slot) = self
            .point
            .get_mut(name)
            .and_then(|value| value.as_slice_mut())
            .and_then(|slots| slots.get_mut(index))
        {
            *slot = original;
        }
    }
}

/// Row-major multi-index of flat position `flat` in `shape`.
fn unravel(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (axis, extent) in shape.iter().enumerate().rev() {
        if *extent > 0 {
            index[axis] = flat % extent;
            flat /= extent;
        }
    }
    index
}

fn l2_norm(values: impl Iterator<Item = f64>) -> f64 {
    values.map(|v| v * v).sum::<f64>().sqrt()
}

fn check_variable(
    sampler: &mut Sampler<'_>,
    name: &str,
    grad: &ArrayD<f64>,
    config: &GradCheckConfig,
) -> Result<VariableSummary, GradCheckError> {
    let delta = config.delta;
    let analytical: Vec<f64> = grad.iter().copied().collect();
    let mut numerical = Vec::with_capacity(analytical.len());
    let mut wrong_count = 0usize;
    let mut wrong_positions = Vec::new();
    let mut escalated = 0usize;

    for (j, &der) in analytical.iter().enumerate() {
        let mut nder = sampler.derivative(name, j, delta);

        if !config.accepts(nder, der) {
            escalated += 1;
            // Same baseline on both sides, so this is the symmetric difference.
            nder = (sampler.derivative(name, j, -delta) + nder) / 2.0;
            debug!(variable = name, position = j, nder, der, "escalated to central difference");

            if !config.accepts(nder, der) {
                let half = delta / 2.0;
                let central_half =
                    (sampler.derivative(name, j, half) + sampler.derivative(name, j, -half)) / 2.0;
                nder = (4.0 * central_half - nder) / 3.0;
                debug!(variable = name, position = j, nder, der, "escalated to Richardson extrapolation");
            }
        }

        if !config.accepts(nder, der) {
            wrong_count += 1;
            if wrong_positions.len() < MAX_REPORTED_POSITIONS {
                wrong_positions.push(unravel(j, grad.shape()));
            }
        }
        numerical.push(nder);
    }

    let n = analytical.len();
    let diffs: Vec<f64> = numerical
        .iter()
        .zip(&analytical)
        .map(|(num, ana)| num - ana)
        .collect();
    let distance = l2_norm(diffs.iter().copied());
    let grad_norm = l2_norm(numerical.iter().copied());

    if !(distance.is_finite() && grad_norm.is_finite()) {
        return Err(GradCheckError::NonFinite {
            variable: name.to_string(),
            analytical,
            numerical,
        });
    }

    let sqrt_n = (n as f64).sqrt();
    if distance > config.atol * sqrt_n + config.rtol * grad_norm {
        let wrong_percentage = if n == 0 { 0 } else { 100 * wrong_count / n };
        return Err(GradCheckError::ToleranceExceeded(Box::new(ToleranceReport {
            variable: name.to_string(),
            shape: grad.shape().to_vec(),
            analytical,
            numerical,
            wrong_count,
            wrong_percentage,
            wrong_positions,
            distance,
            grad_norm,
            atol: config.atol,
            rtol: config.rtol,
            sqrt_n,
        })));
    }

    let max_abs_diff = diffs.iter().fold(0.0f64, |acc, d| acc.max(d.abs()));
    let mean_abs_diff = if n == 0 {
        0.0
    } else {
        diffs.iter().map(|d| d.abs()).sum::<f64>() / n as f64
    };
    info!(
        variable = name,
        shape = ?grad.shape(),
        dist = distance,
        max_diff = max_abs_diff,
        avg_diff = mean_abs_diff,
        "numerical gradient check passed"
    );

    Ok(VariableSummary {
        variable: name.to_string(),
        shape: grad.shape().to_vec(),
        distance,
        max_abs_diff,
        mean_abs_diff,
        escalated,
        numerical,
    })
}
